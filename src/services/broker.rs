// Entity broker - resolves references and entity URLs against registered
// providers, and builds URLs back out of references

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use super::action_service::{ActionRequest, ActionReturn, CustomAction};
use super::provider_registry::{ProviderEntry, ProviderRegistration, ProviderRegistry};
use super::redirect_service::{find_redirect, RedirectOutcome};
use crate::{
    domain::{
        template::{parse_template, TemplateKey, TemplateMetadata},
        Capabilities, Capability, EntityReference, EntityView,
    },
    error::BrokerError,
};

/// Path under the server URL where entity URLs live
pub const DIRECT: &str = "/direct";

/// One provider as reported by [`EntityBroker::describe`]
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDescription {
    pub prefix: String,
    pub capabilities: Capabilities,
    pub templates: Vec<TemplateMetadata>,
    pub actions: Vec<String>,
    pub redirects: Vec<String>,
}

pub struct EntityBroker {
    registry: ProviderRegistry,
    server_url: Url,
}

impl EntityBroker {
    pub fn new(server_url: Url) -> Self {
        Self {
            registry: ProviderRegistry::new(),
            server_url,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn register_provider(&self, registration: ProviderRegistration) -> Result<Arc<ProviderEntry>, BrokerError> {
        self.registry.register(registration)
    }

    /// Register the custom actions of an already registered provider
    pub fn register_actions(&self, prefix: &str, actions: Vec<CustomAction>) -> Result<(), BrokerError> {
        self.registry.register_actions(prefix, actions)
    }

    /// Remove a provider together with its actions and redirects
    pub fn unregister_provider(&self, prefix: &str) -> bool {
        self.registry.unregister(prefix)
    }

    /// Parse a reference owned by a registered provider
    ///
    /// Returns `Ok(None)` when no provider owns the prefix.
    pub fn parse_reference(&self, reference: &str) -> Result<Option<EntityReference>, BrokerError> {
        let Some(prefix) = EntityReference::prefix_of(reference) else {
            return Err(BrokerError::InvalidReference(reference.to_string()));
        };
        if self.registry.provider(&prefix).is_none() {
            return Ok(None);
        }
        EntityReference::parse(reference).map(Some)
    }

    /// Resolve an entity URL path (without the `/direct` part)
    ///
    /// Returns `Ok(None)` when the prefix is not registered or none of the
    /// provider's templates match.
    pub fn parse_entity_url(&self, path: &str) -> Result<Option<EntityView>, BrokerError> {
        let Some(prefix) = EntityReference::prefix_of(path) else {
            return Ok(None);
        };
        let Some(provider) = self.registry.provider(&prefix) else {
            tracing::debug!(path = %path, prefix = %prefix, "No provider for prefix");
            return Ok(None);
        };

        match parse_template(path, &provider.templates)? {
            Some(result) => EntityView::from_match(&provider.prefix, result).map(Some),
            None => {
                tracing::debug!(path = %path, prefix = %prefix, "No template matched entity URL");
                Ok(None)
            }
        }
    }

    /// Resolve an absolute entity URL such as `http://host/direct/site/1.xml`
    pub fn parse_full_url(&self, entity_url: &str) -> Result<Option<EntityView>, BrokerError> {
        let url = Url::parse(entity_url)
            .map_err(|_| BrokerError::InvalidReference(entity_url.to_string()))?;
        let decoded = urlencoding::decode(url.path())
            .map_err(|_| BrokerError::InvalidReference(entity_url.to_string()))?;
        let path = decoded.strip_prefix(DIRECT).unwrap_or(decoded.as_ref());
        self.parse_entity_url(path)
    }

    /// Check the provider's redirects for an entity URL path
    ///
    /// Entity paths produced by a redirect are turned into full URLs.
    pub fn find_redirect(
        &self,
        path: &str,
        params: &HashMap<String, String>,
    ) -> Result<Option<RedirectOutcome>, BrokerError> {
        let Some(provider) = EntityReference::prefix_of(path)
            .and_then(|prefix| self.registry.provider_with_capability(&prefix, Capability::Redirectable))
        else {
            return Ok(None);
        };

        let outcome = find_redirect(&provider.redirects, path, params)?.map(|outcome| match outcome {
            RedirectOutcome::Redirect(target) if target.starts_with('/') => {
                RedirectOutcome::Redirect(self.full_url(&target))
            }
            other => other,
        });
        Ok(outcome)
    }

    pub fn make_entity_view(
        &self,
        reference: EntityReference,
        view_key: Option<TemplateKey>,
        extension: Option<&str>,
    ) -> EntityView {
        let view_key = view_key.unwrap_or(match reference.id() {
            Some(_) => TemplateKey::Show,
            None => TemplateKey::List,
        });
        EntityView::new(reference, view_key, extension)
    }

    /// Render a view to a path with its provider's templates
    pub fn entity_path(&self, view: &EntityView) -> Result<String, BrokerError> {
        let prefix = view.reference.prefix();
        let provider = self
            .registry
            .provider(prefix)
            .ok_or_else(|| BrokerError::UnknownProvider(prefix.to_string()))?;
        Ok(view.entity_path(&provider.templates)?)
    }

    /// Build the full URL for a reference
    ///
    /// The view defaults to `show` for references with an id and `list`
    /// otherwise.
    pub fn entity_url(
        &self,
        reference: &str,
        view_key: Option<TemplateKey>,
        extension: Option<&str>,
    ) -> Result<String, BrokerError> {
        let reference = self
            .parse_reference(reference)?
            .ok_or_else(|| BrokerError::UnknownProvider(EntityReference::prefix_of(reference).unwrap_or_default()))?;
        let view = self.make_entity_view(reference, view_key, extension);
        let path = self.entity_path(&view)?;
        Ok(self.full_url(&path))
    }

    fn full_url(&self, path: &str) -> String {
        format!("{}{}{}", self.server_url.as_str().trim_end_matches('/'), DIRECT, path)
    }

    /// Find the custom action a resolved view asks for
    ///
    /// An action URL is the URL of the action's view followed by
    /// `/action`. For the list view that is `/prefix/action`, which the
    /// show template reads as an id, so such an id is checked against the
    /// list actions. List actions are never found after an id. The
    /// returned view is the one the action runs against.
    pub fn requested_action(&self, view: &EntityView) -> Option<(EntityView, CustomAction)> {
        let prefix = view.reference.prefix();
        let provider = self
            .registry
            .provider_with_capability(prefix, Capability::ActionsExecutable)?;

        if let Some(action) = view
            .trailing_segment()
            .and_then(|name| provider.actions.get(name))
            .filter(|action| action.view_key != TemplateKey::List)
        {
            return Some((view.clone(), action.clone()));
        }

        if view.view_key != TemplateKey::Show || view.remainder.is_some() {
            return None;
        }
        let action = provider
            .actions
            .get(view.reference.id()?)
            .filter(|action| action.view_key == TemplateKey::List)?;

        let reference = EntityReference::new(prefix, None).ok()?;
        let list_view = EntityView::new(reference, TemplateKey::List, view.extension.as_deref());
        Some((list_view, action.clone()))
    }

    /// Run a custom action against the entity a view points at
    pub fn execute_action(
        &self,
        view: &EntityView,
        action: &str,
        params: HashMap<String, String>,
    ) -> Result<ActionReturn, BrokerError> {
        let prefix = view.reference.prefix();
        let provider = self
            .registry
            .provider_with_capability(prefix, Capability::ActionsExecutable)
            .ok_or_else(|| BrokerError::UnknownAction {
                prefix: prefix.to_string(),
                action: action.to_string(),
            })?;

        let request = ActionRequest {
            reference: view.reference.clone(),
            view_key: view.view_key,
            extension: view.extension.clone(),
            params,
        };
        provider.actions.execute(action, &request)
    }

    pub fn describe(&self) -> Vec<ProviderDescription> {
        self.registry
            .providers()
            .into_iter()
            .map(|provider| ProviderDescription {
                prefix: provider.prefix.clone(),
                capabilities: provider.capabilities,
                templates: provider.templates.iter().map(TemplateMetadata::from_template).collect(),
                actions: provider.actions.names(),
                redirects: provider.redirects.iter().map(|r| r.template.clone()).collect(),
            })
            .collect()
    }
}
