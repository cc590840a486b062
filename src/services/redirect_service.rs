// URL redirects - incoming patterns a provider answers by sending the
// request somewhere else

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    domain::template::{compile_pattern, match_pattern, merge_template, Segment, TemplateParser},
    error::{BrokerError, TemplateError},
};

/// Variable holding the extension of the incoming path, e.g. `xml`
pub const EXTENSION: &str = "extension";
/// Variable holding the extension with its dot, e.g. `.xml`
pub const DOT_EXTENSION: &str = "dotExtension";

/// What to do with a request that matched a redirect pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Send the client elsewhere; a path starting with '/' is an entity path
    Redirect(String),
    /// Resolve another entity path in place of the requested one
    Forward(String),
    /// Answer with an empty response
    NoContent,
    /// Decline, the next pattern or normal resolution handles the request
    Continue,
}

/// Everything a redirect handler gets to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRequest {
    pub path: String,
    pub segment_values: HashMap<String, String>,
    pub extension: Option<String>,
    pub params: HashMap<String, String>,
}

pub type RedirectHandler = Arc<dyn Fn(&RedirectRequest) -> anyhow::Result<RedirectOutcome> + Send + Sync>;

#[derive(Clone)]
pub enum RedirectTarget {
    /// Outgoing template merged with the variables of the incoming pattern
    Template(String),
    Handler(RedirectHandler),
}

impl fmt::Debug for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectTarget::Template(template) => f.debug_tuple("Template").field(template).finish(),
            RedirectTarget::Handler(_) => f.write_str("Handler"),
        }
    }
}

/// An incoming pattern starting with `/{prefix}` and where it leads
#[derive(Debug, Clone)]
pub struct UrlRedirect {
    pub template: String,
    pub target: RedirectTarget,
}

impl UrlRedirect {
    pub fn to_template(template: &str, target: &str) -> Self {
        Self {
            template: template.to_string(),
            target: RedirectTarget::Template(target.to_string()),
        }
    }

    pub fn with_handler<F>(template: &str, handler: F) -> Self
    where
        F: Fn(&RedirectRequest) -> anyhow::Result<RedirectOutcome> + Send + Sync + 'static,
    {
        Self {
            template: template.to_string(),
            target: RedirectTarget::Handler(Arc::new(handler)),
        }
    }
}

/// A redirect whose incoming pattern has been compiled
#[derive(Debug, Clone)]
pub struct CompiledRedirect {
    pub template: String,
    segments: Vec<Segment>,
    target: RedirectTarget,
}

/// Compile redirects in declaration order
///
/// Incoming patterns must start with `/{prefix}`; outgoing templates must
/// be valid templates.
pub fn compile_redirects(redirects: &[UrlRedirect]) -> Result<Vec<CompiledRedirect>, TemplateError> {
    redirects
        .iter()
        .map(|redirect| -> Result<CompiledRedirect, TemplateError> {
            let segments = compile_pattern(&redirect.template)?;
            if let RedirectTarget::Template(target) = &redirect.target {
                TemplateParser::parse(target)?;
            }
            Ok(CompiledRedirect {
                template: redirect.template.clone(),
                segments,
                target: redirect.target.clone(),
            })
        })
        .collect()
}

/// Try each redirect in order; the first one that does not decline wins
///
/// Returns `Ok(None)` when no pattern matches or every match declined.
pub fn find_redirect(
    redirects: &[CompiledRedirect],
    path: &str,
    params: &HashMap<String, String>,
) -> Result<Option<RedirectOutcome>, BrokerError> {
    for redirect in redirects {
        let Some(matched) = match_pattern(path, &redirect.segments)? else {
            continue;
        };

        let mut segment_values = matched.segment_values;
        if let Some(extension) = &matched.extension {
            segment_values.insert(EXTENSION.to_string(), extension.clone());
            segment_values.insert(DOT_EXTENSION.to_string(), format!(".{}", extension));
        }

        let outcome = match &redirect.target {
            RedirectTarget::Template(target) => match merge_template(target, &segment_values) {
                Ok(merged) => RedirectOutcome::Redirect(merged),
                Err(e) => {
                    tracing::debug!(template = %redirect.template, error = %e, "Redirect target could not be built");
                    RedirectOutcome::Continue
                }
            },
            RedirectTarget::Handler(handler) => {
                let request = RedirectRequest {
                    path: path.to_string(),
                    segment_values,
                    extension: matched.extension,
                    params: params.clone(),
                };
                handler(&request).map_err(|e| BrokerError::RedirectFailed {
                    template: redirect.template.clone(),
                    message: e.to_string(),
                })?
            }
        };

        if outcome != RedirectOutcome::Continue {
            tracing::debug!(path = %path, template = %redirect.template, ?outcome, "Redirect matched");
            return Ok(Some(outcome));
        }
    }

    Ok(None)
}
