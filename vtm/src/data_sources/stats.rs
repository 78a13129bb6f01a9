//! `vtm_<type>_stats` data sources: runtime counters of one object

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::StringLengthValidator;

use crate::error::Result;
use crate::objects::convert::value_from_json;
use crate::objects::{ObjectKind, Statistics};
use crate::provider_data::{not_configured, VtmProviderData};
use crate::schema::NAME_ATTRIBUTE;

pub struct StatsDataSource {
    kind: &'static ObjectKind,
    statistics: &'static Statistics,
    type_name: String,
    provider_data: Option<VtmProviderData>,
}

impl StatsDataSource {
    pub fn new(kind: &'static ObjectKind, statistics: &'static Statistics) -> Self {
        Self {
            kind,
            statistics,
            type_name: kind.stats_type_name(),
            provider_data: None,
        }
    }

    async fn fetch(&self, ctx: &Context, data: &VtmProviderData, name: &str) -> Result<DynamicValue> {
        ctx.check()?;
        let counters = data.client.statistics(self.statistics.path, name).await?;

        let mut state = DynamicValue::object();
        state.set_string(&AttributePath::new("id"), name)?;
        state.set_string(&AttributePath::new(NAME_ATTRIBUTE), name)?;
        for counter in self.statistics.counters {
            let value = counters
                .get(counter.name)
                .map(|v| value_from_json(v, counter.kind))
                .unwrap_or(Dynamic::Null);
            state.set(&AttributePath::new(counter.name), value)?;
        }
        Ok(state)
    }
}

#[async_trait]
impl DataSource for StatsDataSource {
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
            .description(&format!("Runtime statistics of a {}", self.kind.name))
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The data source ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(NAME_ATTRIBUTE, AttributeType::String)
                    .description("Name of the object")
                    .required()
                    .validator(StringLengthValidator::non_empty())
                    .build(),
            )
            .attributes(self.statistics.counters.iter().map(|counter| {
                AttributeBuilder::new(counter.name, counter.kind.attribute_type())
                    .description(counter.description)
                    .computed()
                    .build()
            }))
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
        let Some(data) = &self.provider_data else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![not_configured()],
            };
        };

        let name = request
            .config
            .get_string(&AttributePath::new(NAME_ATTRIBUTE))
            .unwrap_or_default();

        match self.fetch(&ctx, data, &name).await {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(e) => {
                tracing::error!("Failed to read {} '{}': {}", self.type_name, name, e);
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        format!("Failed to read {} '{}'", self.type_name, name),
                        e.to_string(),
                    )],
                }
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for StatsDataSource {
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
