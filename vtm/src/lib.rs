//! Terraform provider for Pulse Virtual Traffic Manager
//!
//! Configuration objects of the traffic manager are described once in
//! [`objects`]; resources, data sources and the registration table are
//! generated from those descriptions.

pub mod api;
pub mod data_sources;
pub mod error;
pub mod filter;
pub mod objects;
pub mod provider_data;
pub mod registry;
pub mod resources;
pub mod schema;

pub use provider_data::VtmProviderData;
pub use registry::registry;

use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::defaults::{EnvDefault, StaticDefault};
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, Provider, ProviderSchemaRequest,
    ProviderSchemaResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

/// Prefix of every resource and data source type name
pub const PROVIDER_NAME: &str = "vtm";

pub const BASE_URL_ENV: &str = "VTM_BASE_URL";
pub const PASSWORD_ENV: &str = "VTM_PASSWORD";
pub const VERIFY_SSL_CERT_ENV: &str = "VTM_VERIFY_SSL_CERT";

#[derive(Default)]
pub struct VtmProvider {
    provider_data: Option<VtmProviderData>,
}

impl VtmProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider_data(&self) -> Option<&VtmProviderData> {
        self.provider_data.as_ref()
    }

    fn client_config(config: &DynamicValue) -> Result<api::ClientConfig, Vec<Diagnostic>> {
        let string = |name: &str| {
            config
                .get_string(&AttributePath::new(name))
                .ok()
                .filter(|value| !value.is_empty())
        };

        let mut diagnostics = vec![];
        let base_url = string("base_url");
        if base_url.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    format!(
                        "base_url is required (set in provider config or {} env var)",
                        BASE_URL_ENV
                    ),
                    "",
                )
                .with_attribute(AttributePath::new("base_url")),
            );
        }
        let password = string("password");
        if password.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    format!(
                        "password is required (set in provider config or {} env var)",
                        PASSWORD_ENV
                    ),
                    "",
                )
                .with_attribute(AttributePath::new("password")),
            );
        }
        let (Some(base_url), Some(password)) = (base_url, password) else {
            return Err(diagnostics);
        };

        let username = string("username").unwrap_or_else(|| api::DEFAULT_USERNAME.to_string());
        let mut client_config = api::ClientConfig::new(&base_url, &username, &password);
        if let Ok(verify) = config.get_bool(&AttributePath::new("verify_ssl_cert")) {
            client_config.verify_ssl_cert = verify;
        }
        if let Some(version) = string("api_version") {
            client_config.api_version = version;
        }
        Ok(client_config)
    }
}

#[async_trait]
impl Provider for VtmProvider {
    fn type_name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages Pulse Virtual Traffic Manager configuration")
            .attribute(
                AttributeBuilder::new("base_url", AttributeType::String)
                    .description("REST API URL, e.g. https://vtm.example.com:9070/api")
                    .optional()
                    .default(EnvDefault::string(BASE_URL_ENV))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("Administrator user name")
                    .optional()
                    .default(StaticDefault::string(api::DEFAULT_USERNAME))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("Administrator password")
                    .optional()
                    .sensitive()
                    .default(EnvDefault::string(PASSWORD_ENV))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("verify_ssl_cert", AttributeType::Bool)
                    .description("Verify the TLS certificate of the REST API")
                    .optional()
                    .default(EnvDefault::bool_or(VERIFY_SSL_CERT_ENV, true))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_version", AttributeType::String)
                    .description("REST API version")
                    .optional()
                    .default(StaticDefault::string(api::DEFAULT_API_VERSION))
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let client_config = match Self::client_config(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        };
        let base_url = client_config.base_url.clone();

        let result = async {
            ctx.check()?;
            let client = api::Client::new(client_config)?;
            client.check_connection().await?;
            Ok::<_, error::Error>(client)
        }
        .await;

        match result {
            Ok(client) => {
                tracing::debug!("Connected to Virtual Traffic Manager at {}", base_url);
                let data = VtmProviderData::new(client);
                self.provider_data = Some(data.clone());
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(Arc::new(data) as Arc<dyn Any + Send + Sync>),
                }
            }
            Err(e) => {
                tracing::error!("Failed to connect to {}: {}", base_url, e);
                ConfigureProviderResponse {
                    diagnostics: vec![Diagnostic::error(
                        format!(
                            "Failed to connect to Virtual Traffic Manager at '{}'",
                            base_url
                        ),
                        e.to_string(),
                    )],
                    provider_data: None,
                }
            }
        }
    }
}
