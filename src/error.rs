// Error handling for entitybroker

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// The rule a template string broke, in the order the rules are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    Empty,
    MissingLeadingSlash,
    TrailingSlash,
    UnbalancedBraces,
    EmptyVariableName,
    AdjacentVariablesNoSeparator,
    InvalidCharacter,
}

impl SyntaxErrorKind {
    fn describe(&self) -> &'static str {
        match self {
            SyntaxErrorKind::Empty => "template cannot be empty",
            SyntaxErrorKind::MissingLeadingSlash => "template must start with '/'",
            SyntaxErrorKind::TrailingSlash => "template cannot end with '/'",
            SyntaxErrorKind::UnbalancedBraces => "braces must be balanced and cannot be nested",
            SyntaxErrorKind::EmptyVariableName => "variable names cannot be empty",
            SyntaxErrorKind::AdjacentVariablesNoSeparator => {
                "variables must be separated by at least one literal character"
            }
            SyntaxErrorKind::InvalidCharacter => "template contains a character that is not allowed",
        }
    }
}

/// A template string failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid template '{template}': {}{}", .kind.describe(), position_suffix(.position))]
pub struct TemplateSyntaxError {
    pub kind: SyntaxErrorKind,
    pub template: String,
    pub position: Option<usize>,
}

fn position_suffix(position: &Option<usize>) -> String {
    position
        .map(|p| format!(" (at position {})", p))
        .unwrap_or_default()
}

impl TemplateSyntaxError {
    pub fn new(kind: SyntaxErrorKind, template: &str) -> Self {
        Self {
            kind,
            template: template.to_string(),
            position: None,
        }
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// Errors raised by the template compiler, matcher and merger
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Syntax(#[from] TemplateSyntaxError),

    #[error("Unknown template key '{0}', must be one of: list, show, new, edit, delete")]
    UnknownTemplateKey(String),

    #[error("Cannot parse an empty path")]
    EmptyPath,

    #[error("Invalid characters in '{input}': '{character}' is not allowed, only letters, numbers and . - _ : ; = / may be used")]
    InvalidCharacters { input: String, character: char },

    #[error("Cannot merge an empty template")]
    EmptyTemplate,

    #[error("Missing value for segment '{name}' in template {template}")]
    MissingSegmentValue { template: String, name: String },

    #[error("Value '{value}' for segment '{name}' cannot contain '/'")]
    InvalidSegmentValue { name: String, value: String },

    #[error("Template {0} must begin with /{{prefix}}")]
    PrefixNotFirst(String),
}

/// Errors raised by the provider registry, the action table and the broker
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Invalid entity prefix '{0}'")]
    InvalidPrefix(String),

    #[error("No entity provider registered for prefix '{0}'")]
    UnknownProvider(String),

    #[error("Invalid reference '{0}', references look like /prefix or /prefix/id")]
    InvalidReference(String),

    #[error("Cannot separately unregister the root EntityProvider capability for '{0}', unregister the prefix instead")]
    RootCapability(String),

    #[error("Action '{action}' is reserved and cannot be registered for prefix '{prefix}'")]
    ReservedAction { prefix: String, action: String },

    #[error("Action '{action}' is registered more than once for prefix '{prefix}'")]
    DuplicateAction { prefix: String, action: String },

    #[error("Invalid action name '{0}': must contain only letters, numbers, and underscores")]
    InvalidActionName(String),

    #[error("Invalid action ({action}), this action is not a supported custom action for prefix ({prefix})")]
    UnknownAction { prefix: String, action: String },

    #[error("Action '{action}' failed: {message}")]
    ActionFailed { action: String, message: String },

    #[error("Redirect for {template} failed: {message}")]
    RedirectFailed { template: String, message: String },
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Implement IntoResponse so Axum can convert errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<BrokerError> for AppError {
    fn from(err: BrokerError) -> Self {
        match err {
            BrokerError::UnknownProvider(_) | BrokerError::UnknownAction { .. } => {
                AppError::NotFound(err.to_string())
            }
            BrokerError::ActionFailed { .. } | BrokerError::RedirectFailed { .. } => {
                AppError::Internal(err.to_string())
            }
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
