// Services layer - provider registry, custom actions, redirects and the broker tying them together

pub mod action_service;
pub mod broker;
pub mod provider_registry;
pub mod redirect_service;

pub use action_service::{ActionRequest, ActionReturn, ActionTable, CustomAction};
pub use broker::{EntityBroker, ProviderDescription, DIRECT};
pub use provider_registry::{ProviderEntry, ProviderRegistration, ProviderRegistry};
pub use redirect_service::{RedirectOutcome, RedirectRequest, UrlRedirect};
