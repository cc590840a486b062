// Validation functions for entitybroker
// Grammar rules for URL templates and the character whitelist for incoming paths

use crate::domain::template::TemplateKey;
use crate::error::{BrokerError, SyntaxErrorKind, TemplateError, TemplateSyntaxError};

/// Characters allowed outside of `{}` blocks in a template and anywhere in an input path
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | ';' | '=' | '/')
}

/// Check if a variable name is valid (alphanumeric + underscore)
pub(crate) fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate the syntax of a URL template
///
/// Rules are checked in order and the first failure is returned:
/// non-empty, leading slash, no trailing slash, balanced non-nested braces
/// around non-empty word-character names, no adjacent variables, and only
/// safe characters outside of braces.
pub fn validate_template(template: &str) -> Result<(), TemplateSyntaxError> {
    let fail = |kind| TemplateSyntaxError::new(kind, template);

    if template.is_empty() {
        return Err(fail(SyntaxErrorKind::Empty));
    }
    if !template.starts_with('/') {
        return Err(fail(SyntaxErrorKind::MissingLeadingSlash));
    }
    if template.ends_with('/') {
        return Err(fail(SyntaxErrorKind::TrailingSlash).at(template.len() - 1));
    }

    // braces and variable names
    let mut open: Option<usize> = None;
    for (pos, c) in template.char_indices() {
        match (c, open) {
            ('{', None) => open = Some(pos),
            ('{', Some(_)) => return Err(fail(SyntaxErrorKind::UnbalancedBraces).at(pos)),
            ('}', None) => return Err(fail(SyntaxErrorKind::UnbalancedBraces).at(pos)),
            ('}', Some(start)) => {
                let name = &template[start + 1..pos];
                if name.is_empty() {
                    return Err(fail(SyntaxErrorKind::EmptyVariableName).at(start));
                }
                if !is_valid_variable_name(name) {
                    return Err(fail(SyntaxErrorKind::InvalidCharacter).at(start + 1));
                }
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        return Err(fail(SyntaxErrorKind::UnbalancedBraces).at(start));
    }

    if let Some(pos) = template.find("}{") {
        return Err(fail(SyntaxErrorKind::AdjacentVariablesNoSeparator).at(pos + 1));
    }

    let mut in_braces = false;
    for (pos, c) in template.char_indices() {
        match c {
            '{' => in_braces = true,
            '}' => in_braces = false,
            _ if in_braces => {}
            _ if is_safe_char(c) => {}
            _ => return Err(fail(SyntaxErrorKind::InvalidCharacter).at(pos)),
        }
    }

    Ok(())
}

/// Validate that a template key is one of the known keys
pub fn validate_template_key(key: &str) -> Result<TemplateKey, TemplateError> {
    key.parse()
}

/// Validate that an incoming path only uses the safe character set
///
/// A path is not a template, so braces are rejected along with percent
/// sequences and query metacharacters.
pub fn validate_input_path(input: &str) -> Result<(), TemplateError> {
    match input.chars().find(|c| !is_safe_char(*c)) {
        Some(character) => Err(TemplateError::InvalidCharacters {
            input: input.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

/// Validate an entity prefix: letters, numbers, '_' and '-'
///
/// A '.' would be read back as the start of a format extension.
pub fn validate_prefix(prefix: &str) -> Result<(), BrokerError> {
    let valid = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
    if prefix.is_empty() || !prefix.chars().all(valid) {
        return Err(BrokerError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Validate a custom action name (word characters only)
pub fn validate_action_name(action: &str) -> Result<(), BrokerError> {
    if !is_valid_variable_name(action) {
        return Err(BrokerError::InvalidActionName(action.to_string()));
    }
    Ok(())
}
