// Common test utilities shared across test files

use axum::{body::Body, http::Request, response::Response, Router};
use entitybroker::{
    create_router,
    domain::template::TemplateKey,
    services::{ActionReturn, CustomAction, EntityBroker, ProviderRegistration, RedirectOutcome, UrlRedirect},
    AppState,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use url::Url;

pub const SERVER_URL: &str = "http://localhost:8080";

/// Broker with a default provider `site` (with actions and redirects) and a customised `content`
#[allow(dead_code)]
pub fn create_test_broker() -> EntityBroker {
    let broker = EntityBroker::new(Url::parse(SERVER_URL).unwrap());

    broker
        .register_provider(
            ProviderRegistration::new("site")
                .with_redirect(UrlRedirect::to_template("/{prefix}/{id}/home", "/{prefix}/{id}"))
                .with_redirect(UrlRedirect::with_handler("/{prefix}/{id}/latest", |req| {
                    Ok(match req.segment_values["id"].as_str() {
                        "none" => RedirectOutcome::NoContent,
                        "skip" => RedirectOutcome::Continue,
                        id => RedirectOutcome::Forward(format!("/site/{}-latest/edit", id)),
                    })
                })),
        )
        .unwrap();
    broker
        .register_provider(
            ProviderRegistration::new("content")
                .with_template(TemplateKey::Show, "/{prefix}/{siteId}/{id}")
                .with_template(TemplateKey::List, "/{prefix}/{siteId}"),
        )
        .unwrap();

    broker
        .register_actions(
            "site",
            vec![
                CustomAction::new("summary", |req| {
                    Ok(ActionReturn::Text(format!("<summary ref=\"{}\"/>", req.reference)))
                }),
                CustomAction::new("stats", |req| {
                    Ok(ActionReturn::Data(serde_json::json!({
                        "reference": req.reference.to_string(),
                        "params": req.params,
                    })))
                }),
                CustomAction::new("boom", |_| anyhow::bail!("provider unavailable")),
                CustomAction::new("archive", |req| {
                    Ok(ActionReturn::Data(serde_json::json!({
                        "reference": req.reference.to_string(),
                        "view": req.view_key,
                    })))
                })
                .with_view_key(TemplateKey::List),
            ],
        )
        .unwrap();

    broker
}

/// Create a test Axum router for integration tests
#[allow(dead_code)]
pub fn create_test_app() -> Router {
    create_router(Arc::new(AppState::new(create_test_broker())))
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
