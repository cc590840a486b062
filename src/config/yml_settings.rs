use serde::{Deserialize, Serialize};

use crate::domain::{template::Template, Capabilities, Capability};
use crate::services::{ProviderRegistration, UrlRedirect};

/// One provider entry of the providers YAML file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct YmlSettings {
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<Capability>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<Template>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirects: Option<Vec<RedirectSettings>>,
}

/// A template redirect: incoming pattern and the entity path it leads to
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RedirectSettings {
    pub template: String,
    pub target: String,
}

impl From<YmlSettings> for ProviderRegistration {
    fn from(value: YmlSettings) -> Self {
        let capabilities: Capabilities = value.capabilities.unwrap_or_default().into_iter().collect();
        let redirects = value
            .redirects
            .unwrap_or_default()
            .into_iter()
            .map(|r| UrlRedirect::to_template(&r.template, &r.target))
            .collect();
        ProviderRegistration {
            capabilities,
            redirects,
            ..ProviderRegistration::new(&value.prefix)
        }
        .with_templates(value.templates.unwrap_or_default())
    }
}
