//! `vtm_information` data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::error::Result;
use crate::provider_data::{not_configured, VtmProviderData};

#[derive(Default)]
pub struct InformationDataSource {
    provider_data: Option<VtmProviderData>,
}

impl InformationDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub const TYPE_NAME: &'static str = "vtm_information";

    async fn fetch(&self, ctx: &Context, data: &VtmProviderData) -> Result<DynamicValue> {
        ctx.check()?;
        let information = data.client.information().await?;

        let mut state = DynamicValue::object();
        state.set_string(&AttributePath::new("id"), information.uuid.clone())?;
        state.set_string(&AttributePath::new("tm_version"), information.tm_version)?;
        state.set_string(&AttributePath::new("uuid"), information.uuid)?;
        Ok(state)
    }
}

#[async_trait]
impl DataSource for InformationDataSource {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Gets the version and identity of the traffic manager")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The data source ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("tm_version", AttributeType::String)
                    .description("Traffic manager software version")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("uuid", AttributeType::String)
                    .description("Unique identifier of the traffic manager")
                    .computed()
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

    async fn read(&self, ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(data) = &self.provider_data else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![not_configured()],
            };
        };

        match self.fetch(&ctx, data).await {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(e) => {
                tracing::error!("Failed to get traffic manager information: {}", e);
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        "Failed to get traffic manager information",
                        format!("API error: {}", e),
                    )],
                }
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for InformationDataSource {
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
