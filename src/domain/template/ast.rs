// Abstract Syntax Tree types for entity URL templates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TemplateError;

/// Name of the variable that holds the provider prefix
pub const PREFIX: &str = "prefix";
/// Name of the variable that holds the entity id
pub const ID: &str = "id";

/// The role a template plays for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKey {
    List,
    Show,
    New,
    Edit,
    Delete,
}

impl TemplateKey {
    /// All known keys in default parse order, most specific first
    pub const PARSE_ORDER: [TemplateKey; 5] = [
        TemplateKey::Edit,
        TemplateKey::Delete,
        TemplateKey::New,
        TemplateKey::Show,
        TemplateKey::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::List => "list",
            TemplateKey::Show => "show",
            TemplateKey::New => "new",
            TemplateKey::Edit => "edit",
            TemplateKey::Delete => "delete",
        }
    }

    /// Canonical template used when a provider does not define one for this key
    pub fn default_template(&self) -> &'static str {
        match self {
            TemplateKey::List => "/{prefix}",
            TemplateKey::Show => "/{prefix}/{id}",
            TemplateKey::New => "/{prefix}/new",
            TemplateKey::Edit => "/{prefix}/{id}/edit",
            TemplateKey::Delete => "/{prefix}/{id}/delete",
        }
    }

    /// Collection templates must consume the whole path, every other key
    /// tolerates trailing segments after the template
    pub fn allows_trailing_segments(&self) -> bool {
        !matches!(self, TemplateKey::List)
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKey {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateKey::PARSE_ORDER
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| TemplateError::UnknownTemplateKey(s.to_string()))
    }
}

/// A raw template string bound to the key it serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub key: TemplateKey,
    pub template: String,
    #[serde(default = "default_prefix_first")]
    pub prefix_first: bool,
}

fn default_prefix_first() -> bool {
    true
}

impl Template {
    pub fn new(key: TemplateKey, template: &str) -> Self {
        Self {
            key,
            template: template.to_string(),
            prefix_first: true,
        }
    }

    /// Allow a template that does not open with `/{prefix}`
    pub fn without_prefix_first(mut self) -> Self {
        self.prefix_first = false;
        self
    }
}

/// A compiled template is an ordered list of segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

/// Compiled form of a [`Template`], created once at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreProcessedTemplate {
    pub key: TemplateKey,
    pub template: String,
    pub segments: Vec<Segment>,
}

impl PreProcessedTemplate {
    /// Get all variable names in this template, in order
    pub fn variable_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Variable(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variable_names().contains(&name)
    }
}

/// Serializable summary of a compiled template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateMetadata {
    pub key: TemplateKey,
    pub template: String,
    pub variables: Vec<String>,
}

impl TemplateMetadata {
    pub fn from_template(template: &PreProcessedTemplate) -> Self {
        Self {
            key: template.key,
            template: template.template.clone(),
            variables: template
                .variable_names()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
