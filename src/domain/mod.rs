// Domain model for entity URLs: templates, references, formats and capabilities

pub mod capability;
pub mod format;
pub mod reference;
pub mod template;

pub use capability::{Capabilities, Capability};
pub use format::Format;
pub use reference::{EntityReference, EntityView};
