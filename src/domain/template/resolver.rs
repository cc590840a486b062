// Template merging: the reverse of matching

use std::collections::HashMap;

use super::ast::{PreProcessedTemplate, Segment};
use super::parser::TemplateParser;
use crate::error::TemplateError;

/// Merge a raw template with segment values into a concrete path
///
/// Every variable the template declares must have a non-empty value without
/// '/'. Extra entries in `values` are ignored.
pub fn merge_template(
    template: &str,
    values: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    if template.is_empty() {
        return Err(TemplateError::EmptyTemplate);
    }
    let segments = TemplateParser::parse(template)?;
    merge_segments(template, &segments, values)
}

/// Merge an already compiled template
pub fn merge_preprocessed(
    template: &PreProcessedTemplate,
    values: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    merge_segments(&template.template, &template.segments, values)
}

fn merge_segments(
    template: &str,
    segments: &[Segment],
    values: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len());

    for segment in segments {
        match segment {
            Segment::Literal(s) => result.push_str(s),
            Segment::Variable(name) => {
                // Treat empty strings as missing
                let value = values
                    .get(name)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| TemplateError::MissingSegmentValue {
                        template: template.to_string(),
                        name: name.clone(),
                    })?;

                if value.contains('/') {
                    return Err(TemplateError::InvalidSegmentValue {
                        name: name.clone(),
                        value: value.clone(),
                    });
                }

                result.push_str(value);
            }
        }
    }

    Ok(result)
}

/// List the variables of a template that have no value in `values`
pub fn missing_segments(
    template: &PreProcessedTemplate,
    values: &HashMap<String, String>,
) -> Vec<String> {
    template
        .variable_names()
        .into_iter()
        .filter(|name| values.get(*name).map_or(true, |v| v.is_empty()))
        .map(String::from)
        .collect()
}
