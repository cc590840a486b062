// Custom actions - per-provider table of named handlers, fixed at registration

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    domain::{template::TemplateKey, EntityReference, Format},
    error::BrokerError,
    validation::validate_action_name,
};

/// Action names that collide with template keys or built-in endpoints
pub const RESERVED_ACTIONS: [&str; 4] = ["describe", "new", "edit", "delete"];

/// Function invoked when an action runs
pub type ActionHandler = Arc<dyn Fn(&ActionRequest) -> anyhow::Result<ActionReturn> + Send + Sync>;

/// Everything an action handler gets to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub reference: EntityReference,
    pub view_key: TemplateKey,
    pub extension: Option<String>,
    pub params: HashMap<String, String>,
}

impl ActionRequest {
    pub fn new(reference: EntityReference) -> Self {
        Self {
            reference,
            view_key: TemplateKey::Show,
            extension: None,
            params: HashMap::new(),
        }
    }

    pub fn format(&self) -> Option<Format> {
        self.extension.as_deref().and_then(Format::from_extension)
    }
}

/// Output of an action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReturn {
    Text(String),
    Data(serde_json::Value),
}

/// A named action and its handler
#[derive(Clone)]
pub struct CustomAction {
    pub name: String,
    pub view_key: TemplateKey,
    handler: ActionHandler,
}

impl CustomAction {
    pub fn new<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&ActionRequest) -> anyhow::Result<ActionReturn> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            view_key: TemplateKey::Show,
            handler: Arc::new(handler),
        }
    }

    pub fn with_view_key(mut self, view_key: TemplateKey) -> Self {
        self.view_key = view_key;
        self
    }
}

impl fmt::Debug for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAction")
            .field("name", &self.name)
            .field("view_key", &self.view_key)
            .finish()
    }
}

/// Custom actions of one provider, keyed by name
#[derive(Clone, Default)]
pub struct ActionTable {
    actions: Arc<HashMap<String, CustomAction>>,
}

impl ActionTable {
    /// Build a table, rejecting invalid, reserved and duplicate names
    pub fn new(prefix: &str, actions: Vec<CustomAction>) -> Result<Self, BrokerError> {
        let mut table = HashMap::with_capacity(actions.len());

        for action in actions {
            validate_action_name(&action.name)?;
            if RESERVED_ACTIONS.contains(&action.name.as_str()) {
                return Err(BrokerError::ReservedAction {
                    prefix: prefix.to_string(),
                    action: action.name,
                });
            }
            if table.contains_key(&action.name) {
                return Err(BrokerError::DuplicateAction {
                    prefix: prefix.to_string(),
                    action: action.name,
                });
            }
            table.insert(action.name.clone(), action);
        }

        Ok(Self {
            actions: Arc::new(table),
        })
    }

    pub fn get(&self, name: &str) -> Option<&CustomAction> {
        self.actions.get(name)
    }

    /// Sorted action names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run an action for the reference's prefix
    pub fn execute(&self, name: &str, request: &ActionRequest) -> Result<ActionReturn, BrokerError> {
        let prefix = request.reference.prefix();
        let action = self.get(name).ok_or_else(|| BrokerError::UnknownAction {
            prefix: prefix.to_string(),
            action: name.to_string(),
        })?;

        tracing::debug!(prefix = %prefix, action = %name, reference = %request.reference, "Executing custom action");
        (action.handler)(request).map_err(|e| BrokerError::ActionFailed {
            action: name.to_string(),
            message: e.to_string(),
        })
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
