// Configuration - command line options and the providers file

pub mod cli;
pub mod providers;
pub mod yml_settings;

pub use cli::CliArgs;
pub use providers::{load_providers, DEFAULT_PROVIDERS_FILE};
