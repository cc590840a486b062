// Entity references (/prefix/id) and resolved entity views

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::format::Format;
use super::template::{
    find_extension, merge_preprocessed, MatchResult, PreProcessedTemplate, TemplateKey, ID, PREFIX,
};
use crate::error::{BrokerError, TemplateError};
use crate::validation::{validate_input_path, validate_prefix};

/// A pointer to an entity owned by a provider: `/prefix` or `/prefix/id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityReference {
    prefix: String,
    id: Option<String>,
}

impl EntityReference {
    pub fn new(prefix: &str, id: Option<&str>) -> Result<Self, BrokerError> {
        validate_prefix(prefix)?;
        let id = id.filter(|id| !id.is_empty());
        if let Some(id) = id {
            if id.contains('/') {
                return Err(BrokerError::InvalidReference(format!("/{}/{}", prefix, id)));
            }
        }
        Ok(Self {
            prefix: prefix.to_string(),
            id: id.map(String::from),
        })
    }

    /// Parse a reference string, ignoring any extension and trailing segments
    pub fn parse(reference: &str) -> Result<Self, BrokerError> {
        validate_input_path(reference)?;
        if !reference.starts_with('/') {
            return Err(BrokerError::InvalidReference(reference.to_string()));
        }

        let base = find_extension(reference).base;
        let mut parts = base[1..].split('/');
        let prefix = parts.next().unwrap_or_default();
        if prefix.is_empty() {
            return Err(BrokerError::InvalidReference(reference.to_string()));
        }
        Self::new(prefix, parts.next())
    }

    /// Get the prefix of a reference or entity URL path without validating the rest
    pub fn prefix_of(path: &str) -> Option<String> {
        let rest = path.strip_prefix('/')?;
        let prefix = match rest.find('/') {
            Some(slash) => rest[..slash].to_string(),
            None => find_extension(rest).base,
        };
        (!prefix.is_empty()).then_some(prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Segment values suitable for merging into a template
    pub fn segment_values(&self) -> HashMap<String, String> {
        let mut values = HashMap::new();
        values.insert(PREFIX.to_string(), self.prefix.clone());
        if let Some(id) = &self.id {
            values.insert(ID.to_string(), id.clone());
        }
        values
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "/{}/{}", self.prefix, id),
            None => write!(f, "/{}", self.prefix),
        }
    }
}

/// An entity reference seen through one of its provider's templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityView {
    pub reference: EntityReference,
    pub view_key: TemplateKey,
    pub extension: Option<String>,
    pub segment_values: HashMap<String, String>,
    pub remainder: Option<String>,
}

impl EntityView {
    pub fn new(reference: EntityReference, view_key: TemplateKey, extension: Option<&str>) -> Self {
        Self {
            segment_values: reference.segment_values(),
            reference,
            view_key,
            extension: extension.filter(|e| !e.is_empty()).map(String::from),
            remainder: None,
        }
    }

    /// Build a view from a template match for the provider owning `prefix`
    pub fn from_match(prefix: &str, result: MatchResult) -> Result<Self, BrokerError> {
        let reference = EntityReference::new(prefix, result.id())?;
        let mut segment_values = result.segment_values;
        segment_values.extend(reference.segment_values());
        Ok(Self {
            reference,
            view_key: result.template_key,
            extension: result.extension,
            segment_values,
            remainder: result.remainder,
        })
    }

    pub fn format(&self) -> Option<Format> {
        self.extension.as_deref().and_then(Format::from_extension)
    }

    /// First segment of the unconsumed trailing path, if any
    pub fn trailing_segment(&self) -> Option<&str> {
        self.remainder
            .as_deref()
            .and_then(|r| r.trim_start_matches('/').split('/').next())
            .filter(|s| !s.is_empty())
    }

    /// Render this view back to a path using the first template for its key
    pub fn entity_path(&self, templates: &[PreProcessedTemplate]) -> Result<String, TemplateError> {
        let template = templates
            .iter()
            .find(|t| t.key == self.view_key)
            .ok_or_else(|| TemplateError::UnknownTemplateKey(self.view_key.to_string()))?;

        let mut path = merge_preprocessed(template, &self.segment_values)?;
        if let Some(extension) = &self.extension {
            path.push('.');
            path.push_str(extension);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::{default_preprocessed_templates, parse_template};

    #[test]
    fn test_parse_reference() {
        let reference = EntityReference::parse("/site/abc").unwrap();
        assert_eq!(reference.prefix(), "site");
        assert_eq!(reference.id(), Some("abc"));
        assert_eq!(reference.to_string(), "/site/abc");

        let reference = EntityReference::parse("/site").unwrap();
        assert_eq!(reference.id(), None);
        assert_eq!(reference.to_string(), "/site");
    }

    #[test]
    fn test_parse_reference_strips_extension_and_tail() {
        let reference = EntityReference::parse("/site/abc.json").unwrap();
        assert_eq!(reference.id(), Some("abc"));

        let reference = EntityReference::parse("/site/abc/pages/1").unwrap();
        assert_eq!(reference.id(), Some("abc"));
    }

    #[test]
    fn test_parse_reference_invalid() {
        assert!(EntityReference::parse("site/abc").is_err());
        assert!(EntityReference::parse("/").is_err());
        assert!(EntityReference::parse("//abc").is_err());
        assert!(EntityReference::parse("/site/a%20b").is_err());
    }

    #[test]
    fn test_prefix_of() {
        assert_eq!(EntityReference::prefix_of("/site/abc"), Some("site".to_string()));
        assert_eq!(EntityReference::prefix_of("/site.xml"), Some("site".to_string()));
        assert_eq!(EntityReference::prefix_of("site/abc"), None);
        assert_eq!(EntityReference::prefix_of("/"), None);
    }

    #[test]
    fn test_view_from_match_round_trips() {
        let result = parse_template("/site/abc/edit.xml", default_preprocessed_templates())
            .unwrap()
            .unwrap();
        let view = EntityView::from_match("site", result).unwrap();
        assert_eq!(view.view_key, TemplateKey::Edit);
        assert_eq!(view.format(), Some(Format::Xml));
        assert_eq!(
            view.entity_path(default_preprocessed_templates()).unwrap(),
            "/site/abc/edit.xml"
        );
    }

    #[test]
    fn test_view_without_id_cannot_render_show() {
        let view = EntityView::new(
            EntityReference::new("site", None).unwrap(),
            TemplateKey::Show,
            None,
        );
        assert!(matches!(
            view.entity_path(default_preprocessed_templates()),
            Err(TemplateError::MissingSegmentValue { .. })
        ));
    }

    #[test]
    fn test_trailing_segment() {
        let result = parse_template("/site/abc/publish/now", default_preprocessed_templates())
            .unwrap()
            .unwrap();
        let view = EntityView::from_match("site", result).unwrap();
        assert_eq!(view.trailing_segment(), Some("publish"));
    }
}
