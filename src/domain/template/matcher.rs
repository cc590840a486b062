// Template matcher: resolves an incoming path against an ordered template list

use serde::Serialize;
use std::collections::HashMap;

use super::ast::{PreProcessedTemplate, Segment, TemplateKey, ID, PREFIX};
use crate::error::TemplateError;
use crate::validation::validate_input_path;

/// Result of splitting a format extension off a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSplit {
    pub original: String,
    pub base: String,
    pub extension: Option<String>,
}

/// Split the trailing format extension off a path
///
/// Only the last '.' after the last '/' counts. A trailing bare dot is
/// dropped without producing an extension; a dot that starts the last
/// segment, or a suffix that is not purely alphanumeric, leaves the input
/// untouched.
pub fn find_extension(input: &str) -> ExtensionSplit {
    let unchanged = || ExtensionSplit {
        original: input.to_string(),
        base: input.to_string(),
        extension: None,
    };

    let segment_start = input.rfind('/').map(|p| p + 1).unwrap_or(0);
    let Some(dot) = input[segment_start..].rfind('.') else {
        return unchanged();
    };
    if dot == 0 {
        return unchanged();
    }

    let dot = segment_start + dot;
    let extension = &input[dot + 1..];
    if !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return unchanged();
    }

    ExtensionSplit {
        original: input.to_string(),
        base: input[..dot].to_string(),
        extension: (!extension.is_empty()).then(|| extension.to_string()),
    }
}

/// Output of a successful match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub template_key: TemplateKey,
    pub template: String,
    pub segment_values: HashMap<String, String>,
    pub extension: Option<String>,
    /// Trailing path the template did not consume
    pub remainder: Option<String>,
}

impl MatchResult {
    pub fn prefix(&self) -> Option<&str> {
        self.segment_values.get(PREFIX).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.segment_values.get(ID).map(String::as_str)
    }
}

/// Match a path against templates in order, first structural match wins
///
/// Returns `Ok(None)` when nothing matches. Paths containing characters
/// outside the safe set are rejected before any segment is bound.
pub fn parse_template(
    input: &str,
    templates: &[PreProcessedTemplate],
) -> Result<Option<MatchResult>, TemplateError> {
    if input.is_empty() {
        return Err(TemplateError::EmptyPath);
    }
    validate_input_path(input)?;

    let split = find_extension(input);

    for template in templates {
        let allow_trailing = template.key.allows_trailing_segments();

        let attempt = |path: &str, extension: Option<&String>| {
            bind(&template.segments, path, allow_trailing).map(|(segment_values, end)| MatchResult {
                template_key: template.key,
                template: template.template.clone(),
                segment_values,
                extension: extension.cloned(),
                remainder: (end < path.len()).then(|| path[end..].to_string()),
            })
        };

        // a template may spell out its own extension as a literal
        let matched = attempt(&split.base, split.extension.as_ref()).or_else(|| {
            split
                .extension
                .as_ref()
                .and_then(|_| attempt(&split.original, None))
        });

        if let Some(result) = matched {
            tracing::trace!(
                path = input,
                template = %template.template,
                key = %template.key,
                "Template matched"
            );
            return Ok(Some(result));
        }
    }

    tracing::trace!(path = input, "No template matched");
    Ok(None)
}

/// Variables bound by a pattern that matched a whole path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub segment_values: HashMap<String, String>,
    pub extension: Option<String>,
}

/// Match a path against a single compiled pattern, with no trailing segments
///
/// Used for patterns that are not bound to a template key. Extension and
/// character rules are the same as for [`parse_template`].
pub fn match_pattern(input: &str, segments: &[Segment]) -> Result<Option<PatternMatch>, TemplateError> {
    if input.is_empty() {
        return Err(TemplateError::EmptyPath);
    }
    validate_input_path(input)?;

    let split = find_extension(input);
    let matched = bind(segments, &split.base, false)
        .map(|(segment_values, _)| PatternMatch {
            segment_values,
            extension: split.extension.clone(),
        })
        .or_else(|| {
            split.extension.as_ref()?;
            bind(segments, &split.original, false).map(|(segment_values, _)| PatternMatch {
                segment_values,
                extension: None,
            })
        });

    Ok(matched)
}

fn bind(segments: &[Segment], path: &str, allow_trailing: bool) -> Option<(HashMap<String, String>, usize)> {
    let mut values = Vec::new();
    let end = align(segments, path, 0, allow_trailing, &mut values)?;
    let values = values
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    Some((values, end))
}

// Returns the input position where the template ended. Variables never sit
// next to each other, so the backtracking is bounded by one path segment
// per variable.
fn align<'t, 'i>(
    segments: &'t [Segment],
    input: &'i str,
    pos: usize,
    allow_trailing: bool,
    values: &mut Vec<(&'t str, &'i str)>,
) -> Option<usize> {
    let Some((first, rest)) = segments.split_first() else {
        let remaining = &input[pos..];
        let complete = remaining.is_empty() || (allow_trailing && remaining.starts_with('/'));
        return complete.then_some(pos);
    };

    match first {
        Segment::Literal(literal) => {
            if input[pos..].starts_with(literal.as_str()) {
                align(rest, input, pos + literal.len(), allow_trailing, values)
            } else {
                None
            }
        }
        Segment::Variable(name) => {
            let segment_end = input[pos..]
                .find('/')
                .map(|offset| pos + offset)
                .unwrap_or(input.len());

            // longest value first
            for end in (pos + 1..=segment_end).rev() {
                values.push((name.as_str(), &input[pos..end]));
                if let Some(done) = align(rest, input, end, allow_trailing, values) {
                    return Some(done);
                }
                values.pop();
            }
            None
        }
    }
}
