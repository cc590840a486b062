use anyhow::Context;
use std::path::Path;

use crate::{
    config::yml_settings::YmlSettings,
    services::{EntityBroker, ProviderRegistration},
};

pub const DEFAULT_PROVIDERS_FILE: &str = "providers.yml";

/// Parse the providers YAML document
pub fn parse_provider_settings(yml: &str) -> anyhow::Result<Vec<YmlSettings>> {
    serde_yaml::from_str(yml).context("Invalid providers configuration")
}

/// Read and parse a providers file, falling back to `providers.yml`
pub fn read_provider_settings(maybe_path: Option<&Path>) -> anyhow::Result<Vec<YmlSettings>> {
    let path = maybe_path.unwrap_or_else(|| Path::new(DEFAULT_PROVIDERS_FILE));
    let yml = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read providers file {}", path.display()))?;
    parse_provider_settings(&yml).with_context(|| format!("Failed to load {}", path.display()))
}

/// Register every provider, skipping the ones that fail
///
/// Returns the number of providers that were registered.
pub fn register_providers(broker: &EntityBroker, settings: Vec<YmlSettings>) -> usize {
    let total = settings.len();
    let mut registered = 0;

    for settings in settings {
        let prefix = settings.prefix.clone();
        match broker.register_provider(ProviderRegistration::from(settings)) {
            Ok(_) => registered += 1,
            Err(e) => {
                tracing::warn!(prefix = %prefix, error = %e, "Skipping provider from configuration");
            }
        }
    }

    if registered < total {
        tracing::warn!(registered, total, "Some configured providers were skipped");
    }
    registered
}

/// Read a providers file and register its providers with the broker
pub fn load_providers(broker: &EntityBroker, maybe_path: Option<&Path>) -> anyhow::Result<usize> {
    let settings = read_provider_settings(maybe_path)?;
    Ok(register_providers(broker, settings))
}
