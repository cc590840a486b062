// Entity URL handlers - resolve /direct paths, follow redirects, describe providers, build URLs

use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};

use crate::{
    domain::{template::TemplateKey, Format},
    error::AppError,
    services::{ActionReturn, ProviderDescription, RedirectOutcome, DIRECT},
    AppState,
};

/// Query parameters for building an entity URL
#[derive(Debug, Deserialize)]
pub struct UrlParams {
    pub reference: String,
    pub view: Option<String>,
    pub extension: Option<String>,
}

/// Resolve `/direct/...` to an entity view, or run the custom action it names
///
/// Provider redirects are tried first. A forward is resolved in place of
/// the requested path, without looking for further redirects.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let raw = uri.path().strip_prefix(DIRECT).unwrap_or(uri.path());
    let path = urlencoding::decode(raw)
        .map_err(|_| AppError::BadRequest(format!("Path is not valid UTF-8: {}", raw)))?;

    let path = match state.broker.find_redirect(&path, &params)? {
        Some(RedirectOutcome::Redirect(url)) => return Ok(Redirect::to(&url).into_response()),
        Some(RedirectOutcome::NoContent) => return Ok(StatusCode::NO_CONTENT.into_response()),
        Some(RedirectOutcome::Forward(target)) => target,
        Some(RedirectOutcome::Continue) | None => path.into_owned(),
    };

    let view = state
        .broker
        .parse_entity_url(&path)?
        .ok_or_else(|| AppError::NotFound(format!("No entity found for {}", path)))?;

    match state.broker.requested_action(&view) {
        Some((action_view, action)) => {
            let output = state.broker.execute_action(&action_view, &action.name, params)?;
            Ok(action_response(output, action_view.format()))
        }
        None => Ok(Json(view).into_response()),
    }
}

fn action_response(output: ActionReturn, format: Option<Format>) -> Response {
    match output {
        ActionReturn::Data(value) => Json(value).into_response(),
        ActionReturn::Text(text) => {
            let format = format.unwrap_or(Format::Xml);
            ([(header::CONTENT_TYPE, format.mime_type())], text).into_response()
        }
    }
}

/// List every registered provider with its templates and actions
pub async fn describe(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderDescription>> {
    Json(state.broker.describe())
}

/// Build the full URL of a reference
pub async fn entity_url(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UrlParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view_key = params
        .view
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::parse::<TemplateKey>)
        .transpose()?;

    let url = state
        .broker
        .entity_url(&params.reference, view_key, params.extension.as_deref())?;

    Ok(Json(serde_json::json!({ "url": url })))
}
