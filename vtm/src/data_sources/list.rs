//! `vtm_<type>_list` data sources: object names with optional filtering

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::RegexSyntaxValidator;

use crate::error::{ErrorKind, Result};
use crate::filter::{NameFilter, CONTAINS, ENDS_WITH, REGEX_MATCH, STARTS_WITH};
use crate::objects::ObjectKind;
use crate::provider_data::{not_configured, VtmProviderData};

pub const OBJECT_LIST: &str = "object_list";

pub struct ListDataSource {
    kind: &'static ObjectKind,
    type_name: String,
    provider_data: Option<VtmProviderData>,
}

impl ListDataSource {
    pub fn new(kind: &'static ObjectKind) -> Self {
        Self {
            kind,
            type_name: kind.list_type_name(),
            provider_data: None,
        }
    }

    async fn names(
        &self,
        ctx: &Context,
        data: &VtmProviderData,
        filter: &NameFilter,
    ) -> Result<Vec<String>> {
        ctx.check()?;
        let names = data.client.config(self.kind.path).list().await?;
        tracing::debug!("{} objects in {}", names.len(), self.kind.path);
        filter.apply(names)
    }
}

#[async_trait]
impl DataSource for ListDataSource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description(&format!("Lists the names of {} objects", self.kind.name))
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The data source ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(OBJECT_LIST, AttributeType::List(Box::new(AttributeType::String)))
                    .description("Matching object names in the order the service lists them")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(STARTS_WITH, AttributeType::String)
                    .description("Only names starting with this prefix")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(ENDS_WITH, AttributeType::String)
                    .description("Only names ending with this suffix")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(CONTAINS, AttributeType::String)
                    .description("Only names containing this substring")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(REGEX_MATCH, AttributeType::String)
                    .description("Only names entirely matched by this regular expression")
                    .optional()
                    .validator(RegexSyntaxValidator)
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let data = match &self.provider_data {
            Some(data) => data,
            None => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![not_configured()],
                }
            }
        };

        let filter = NameFilter::from_config(&request.config);
        let names = match self.names(&ctx, data, &filter).await {
            Ok(names) => names,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", self.type_name, e);
                let mut diagnostic =
                    Diagnostic::error(format!("Failed to read {}", self.type_name), e.to_string());
                if e.kind() == ErrorKind::InvalidPattern {
                    diagnostic = diagnostic.with_attribute(AttributePath::new(REGEX_MATCH));
                }
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![diagnostic],
                };
            }
        };

        let mut state = request.config;
        let result = state
            .set_string(&AttributePath::new("id"), format!("{}_list", self.kind.name))
            .and_then(|()| {
                state.set_list(
                    &AttributePath::new(OBJECT_LIST),
                    names.into_iter().map(Dynamic::String).collect(),
                )
            });
        let diagnostics = match result {
            Ok(()) => vec![],
            Err(e) => vec![Diagnostic::error(
                format!("Failed to read {}", self.type_name),
                e.to_string(),
            )],
        };
        ReadDataSourceResponse { state, diagnostics }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ListDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        match VtmProviderData::from_any(request.provider_data) {
            Ok(data) => {
                self.provider_data = data;
                ConfigureDataSourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diagnostic) => ConfigureDataSourceResponse {
                diagnostics: vec![diagnostic],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::tests::configure;
    use crate::objects::find;
    use mockito::Server;

    const POOLS: &str = r#"{"children":[
        {"name":"alpha","href":"/api/tm/7.0/config/active/pools/alpha"},
        {"name":"beta","href":"/api/tm/7.0/config/active/pools/beta"},
        {"name":"alphabet","href":"/api/tm/7.0/config/active/pools/alphabet"}
    ]}"#;

    async fn read(server: &Server, config: DynamicValue) -> ReadDataSourceResponse {
        let mut source = ListDataSource::new(find("pool").unwrap());
        configure(&mut source, &server.url()).await;
        source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "vtm_pool_list".into(),
                    config,
                },
            )
            .await
    }

    fn object_list(state: &DynamicValue) -> Vec<String> {
        state
            .get_list(&AttributePath::new(OBJECT_LIST))
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn lists_everything_without_filters() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tm/7.0/config/active/pools")
            .with_body(POOLS)
            .create_async()
            .await;

        let response = read(&server, DynamicValue::object()).await;
        assert!(response.diagnostics.is_empty());
        assert_eq!(object_list(&response.state), ["alpha", "beta", "alphabet"]);
        assert_eq!(
            response.state.get_string(&AttributePath::new("id")).unwrap(),
            "pool_list"
        );
    }

    #[tokio::test]
    async fn filters_narrow_the_list() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tm/7.0/config/active/pools")
            .with_body(POOLS)
            .create_async()
            .await;

        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new(STARTS_WITH), "a")
            .unwrap();
        config.set_string(&AttributePath::new(CONTAINS), "ph").unwrap();
        config
            .set_string(&AttributePath::new(REGEX_MATCH), "alpha.*")
            .unwrap();

        let response = read(&server, config).await;
        assert_eq!(object_list(&response.state), ["alpha", "alphabet"]);
        // filter options are echoed back
        assert_eq!(
            response
                .state
                .get_string(&AttributePath::new(STARTS_WITH))
                .unwrap(),
            "a"
        );
    }

    #[tokio::test]
    async fn invalid_pattern_fails_without_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tm/7.0/config/active/pools")
            .with_body(POOLS)
            .create_async()
            .await;

        let mut config = DynamicValue::object();
        config.set_string(&AttributePath::new(REGEX_MATCH), "(").unwrap();

        let response = read(&server, config).await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Failed to read vtm_pool_list");
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new(REGEX_MATCH))
        );
        assert!(response.state.is_null());
    }

    #[tokio::test]
    async fn remote_failure_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tm/7.0/config/active/pools")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let response = read(&server, DynamicValue::object()).await;
        assert_eq!(response.diagnostics[0].summary, "Failed to read vtm_pool_list");
        assert!(response.diagnostics[0].detail.contains("unavailable"));
    }
}
