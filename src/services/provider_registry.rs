// Provider registry - which prefixes are registered, what they can do, and
// the compiled templates, actions and redirects used to serve their URLs

use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::action_service::{ActionTable, CustomAction};
use super::redirect_service::{compile_redirects, CompiledRedirect, UrlRedirect};
use crate::{
    domain::{
        template::{preprocess_templates, PreProcessedTemplate, Template, TemplateKey},
        Capabilities, Capability,
    },
    error::BrokerError,
    validation::validate_prefix,
};

/// What a provider supplies when it registers a prefix
#[derive(Debug, Clone)]
pub struct ProviderRegistration {
    pub prefix: String,
    pub capabilities: Capabilities,
    pub templates: Vec<Template>,
    pub redirects: Vec<UrlRedirect>,
}

impl ProviderRegistration {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            capabilities: Capabilities::root(),
            templates: Vec::new(),
            redirects: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn with_template(mut self, key: TemplateKey, template: &str) -> Self {
        self.templates.push(Template::new(key, template));
        self
    }

    pub fn with_templates(mut self, templates: Vec<Template>) -> Self {
        self.templates.extend(templates);
        self
    }

    pub fn with_redirect(mut self, redirect: UrlRedirect) -> Self {
        self.redirects.push(redirect);
        self
    }
}

/// A registered provider; replaced as a whole, never mutated in place
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub prefix: String,
    pub capabilities: Capabilities,
    pub templates: Vec<PreProcessedTemplate>,
    pub actions: ActionTable,
    pub redirects: Vec<CompiledRedirect>,
}

impl ProviderEntry {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Concurrent map of prefix to provider entry
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<ProviderEntry>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, compile and register a provider
    ///
    /// Any template error rejects this registration only. Registering an
    /// existing prefix replaces its entry, actions included.
    pub fn register(&self, registration: ProviderRegistration) -> Result<Arc<ProviderEntry>, BrokerError> {
        let ProviderRegistration {
            prefix,
            mut capabilities,
            templates,
            redirects,
        } = registration;

        let compiled = validate_prefix(&prefix).and_then(|_| {
            let templates = preprocess_templates(&templates)?;
            let redirects = compile_redirects(&redirects)?;
            Ok((templates, redirects))
        });
        let (compiled_templates, compiled_redirects) = match compiled {
            Ok(compiled) => compiled,
            Err(e) => {
                tracing::warn!(prefix = %prefix, error = %e, "Rejected entity provider registration");
                return Err(e);
            }
        };

        if !templates.is_empty() {
            capabilities.insert(Capability::ViewUrlCustomizable);
        }
        // actions are attached separately, so a fresh entry has none
        capabilities.remove(Capability::ActionsExecutable);
        if compiled_redirects.is_empty() {
            capabilities.remove(Capability::Redirectable);
        } else {
            capabilities.insert(Capability::Redirectable);
        }

        let entry = Arc::new(ProviderEntry {
            prefix: prefix.clone(),
            capabilities,
            templates: compiled_templates,
            actions: ActionTable::default(),
            redirects: compiled_redirects,
        });

        if self.providers.insert(prefix.clone(), Arc::clone(&entry)).is_some() {
            tracing::info!(prefix = %prefix, "Replaced entity provider");
        } else {
            tracing::info!(prefix = %prefix, templates = entry.templates.len(), "Registered entity provider");
        }

        Ok(entry)
    }

    /// Remove a prefix and everything registered for it
    pub fn unregister(&self, prefix: &str) -> bool {
        let removed = self.providers.remove(prefix).is_some();
        if removed {
            tracing::info!(prefix = %prefix, "Unregistered entity provider");
        }
        removed
    }

    /// Attach the custom actions of a registered provider
    ///
    /// The table and the `ActionsExecutable` capability change together.
    pub fn register_actions(&self, prefix: &str, actions: Vec<CustomAction>) -> Result<(), BrokerError> {
        let table = ActionTable::new(prefix, actions)?;
        let count = table.len();
        self.update_entry(prefix, |entry| {
            if table.is_empty() {
                entry.capabilities.remove(Capability::ActionsExecutable);
            } else {
                entry.capabilities.insert(Capability::ActionsExecutable);
            }
            entry.actions = table;
        })?;
        tracing::info!(prefix = %prefix, actions = count, "Registered custom actions");
        Ok(())
    }

    /// Remove a single capability from a registered provider
    ///
    /// Dropping `ActionsExecutable` or `Redirectable` also drops the actions
    /// or redirects that back it.
    pub fn unregister_capability(&self, prefix: &str, capability: Capability) -> Result<(), BrokerError> {
        if capability == Capability::EntityProvider {
            return Err(BrokerError::RootCapability(prefix.to_string()));
        }
        self.update_entry(prefix, |entry| {
            entry.capabilities.remove(capability);
            match capability {
                Capability::ActionsExecutable => entry.actions = ActionTable::default(),
                Capability::Redirectable => entry.redirects.clear(),
                _ => {}
            }
        })?;
        tracing::debug!(prefix = %prefix, ?capability, "Unregistered capability");
        Ok(())
    }

    /// Add a capability to a registered provider
    pub fn add_capability(&self, prefix: &str, capability: Capability) -> Result<(), BrokerError> {
        self.update_entry(prefix, |entry| entry.capabilities.insert(capability))
    }

    // Copy-on-write under the shard lock so readers see the old or the new entry
    fn update_entry<F>(&self, prefix: &str, update: F) -> Result<(), BrokerError>
    where
        F: FnOnce(&mut ProviderEntry),
    {
        let mut slot = self
            .providers
            .get_mut(prefix)
            .ok_or_else(|| BrokerError::UnknownProvider(prefix.to_string()))?;

        let mut entry = ProviderEntry::clone(&slot);
        update(&mut entry);
        *slot = Arc::new(entry);
        Ok(())
    }

    pub fn provider(&self, prefix: &str) -> Option<Arc<ProviderEntry>> {
        self.providers.get(prefix).map(|entry| Arc::clone(entry.value()))
    }

    pub fn provider_with_capability(&self, prefix: &str, capability: Capability) -> Option<Arc<ProviderEntry>> {
        self.provider(prefix)
            .filter(|entry| entry.has_capability(capability))
    }

    /// Compiled templates of a provider, in matching order
    pub fn templates(&self, prefix: &str) -> Option<Vec<PreProcessedTemplate>> {
        self.providers.get(prefix).map(|entry| entry.templates.clone())
    }

    /// A custom action, if the provider can currently execute actions
    pub fn action(&self, prefix: &str, name: &str) -> Option<CustomAction> {
        self.provider_with_capability(prefix, Capability::ActionsExecutable)
            .and_then(|entry| entry.actions.get(name).cloned())
    }

    /// Sorted names of a provider's custom actions
    pub fn action_names(&self, prefix: &str) -> Vec<String> {
        self.provider(prefix)
            .map(|entry| entry.actions.names())
            .unwrap_or_default()
    }

    pub fn registered_prefixes(&self) -> BTreeSet<String> {
        self.providers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Snapshot of all providers, sorted by prefix
    pub fn providers(&self) -> Vec<Arc<ProviderEntry>> {
        let mut providers: Vec<_> = self
            .providers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        providers.sort_by(|a, b| a.prefix.cmp(&b.prefix));
        providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
