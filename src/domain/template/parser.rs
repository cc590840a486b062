// Template compiler: validates a raw template and tokenizes it into segments

use std::sync::OnceLock;

use super::ast::{PreProcessedTemplate, Segment, Template, TemplateKey, PREFIX};
use crate::error::TemplateError;
use crate::validation::{validate_template, validate_template_key};

pub struct TemplateParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TemplateParser<'a> {
    /// Validate and tokenize a raw template into literal and variable segments
    pub fn parse(template: &'a str) -> Result<Vec<Segment>, TemplateError> {
        validate_template(template)?;
        let mut parser = Self {
            input: template,
            pos: 0,
        };
        Ok(parser.parse_segments())
    }

    // Validation already guarantees balanced, non-nested, non-empty braces
    fn parse_segments(&mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();

        while let Some(ch) = self.peek_char() {
            if ch == '{' {
                if !literal_buf.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal_buf)));
                }
                segments.push(Segment::Variable(self.parse_variable_name()));
            } else {
                literal_buf.push(ch);
                self.pos += ch.len_utf8();
            }
        }

        if !literal_buf.is_empty() {
            segments.push(Segment::Literal(literal_buf));
        }

        segments
    }

    fn parse_variable_name(&mut self) -> String {
        let start = self.pos + 1;
        let end = self.input[start..]
            .find('}')
            .map(|offset| start + offset)
            .unwrap_or(self.input.len());
        self.pos = (end + 1).min(self.input.len());
        self.input[start..end].to_string()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }
}

/// Get the canonical template for a key given by name
pub fn default_template(key: &str) -> Result<&'static str, TemplateError> {
    Ok(validate_template_key(key)?.default_template())
}

/// Compile a single template
pub fn preprocess_template(template: &Template) -> Result<PreProcessedTemplate, TemplateError> {
    let segments = TemplateParser::parse(&template.template)?;
    let compiled = PreProcessedTemplate {
        key: template.key,
        template: template.template.clone(),
        segments,
    };

    if template.prefix_first && !starts_with_prefix(&compiled.segments) {
        return Err(TemplateError::PrefixNotFirst(template.template.clone()));
    }

    Ok(compiled)
}

/// Compile a keyless URL pattern, which must begin with `/{prefix}`
pub fn compile_pattern(pattern: &str) -> Result<Vec<Segment>, TemplateError> {
    let segments = TemplateParser::parse(pattern)?;
    if !starts_with_prefix(&segments) {
        return Err(TemplateError::PrefixNotFirst(pattern.to_string()));
    }
    Ok(segments)
}

fn starts_with_prefix(segments: &[Segment]) -> bool {
    matches!(
        segments,
        [Segment::Literal(slash), Segment::Variable(name), ..] if slash == "/" && name == PREFIX
    )
}

/// Compile a provider's template set
///
/// Custom templates come first in their declared order, followed by the
/// defaults for every key the custom templates do not cover. Matching is
/// first-match-wins so the order of the result is significant.
pub fn preprocess_templates(custom: &[Template]) -> Result<Vec<PreProcessedTemplate>, TemplateError> {
    let mut compiled = custom
        .iter()
        .map(preprocess_template)
        .collect::<Result<Vec<_>, _>>()?;

    for key in TemplateKey::PARSE_ORDER {
        if !custom.iter().any(|t| t.key == key) {
            compiled.push(preprocess_template(&Template::new(key, key.default_template()))?);
        }
    }

    Ok(compiled)
}

/// The compiled default templates in parse order
pub fn default_preprocessed_templates() -> &'static [PreProcessedTemplate] {
    static DEFAULTS: OnceLock<Vec<PreProcessedTemplate>> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        TemplateKey::PARSE_ORDER
            .into_iter()
            .map(|key| PreProcessedTemplate {
                key,
                template: key.default_template().to_string(),
                segments: TemplateParser {
                    input: key.default_template(),
                    pos: 0,
                }
                .parse_segments(),
            })
            .collect()
    })
}
