//! `vtm_<type>` data sources: read one named object

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::error::Result;
use crate::objects::convert::{state_from_content, state_from_properties, StateMode};
use crate::objects::ObjectKind;
use crate::provider_data::{not_configured, VtmProviderData};
use crate::schema::{relax, NAME_ATTRIBUTE};

pub struct ConfigDataSource {
    kind: &'static ObjectKind,
    type_name: String,
    provider_data: Option<VtmProviderData>,
}

impl ConfigDataSource {
    pub fn new(kind: &'static ObjectKind) -> Self {
        Self {
            kind,
            type_name: kind.resource_type_name(),
            provider_data: None,
        }
    }

    async fn fetch(&self, ctx: &Context, data: &VtmProviderData, name: &str) -> Result<DynamicValue> {
        ctx.check()?;
        let api = data.client.config(self.kind.path);

        if self.kind.is_raw() {
            let content = api.get_raw(name).await?;
            return state_from_content(name, &content);
        }
        let properties = api.get(name).await?;
        state_from_properties(self.kind, name, &properties, StateMode::All)
    }
}

#[async_trait]
impl DataSource for ConfigDataSource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: relax(&self.kind.resource_schema()),
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
        let name = match request.config.get_string(&AttributePath::new(NAME_ATTRIBUTE)) {
            Ok(name) => name,
            Err(e) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        format!("Failed to read {}", self.type_name),
                        e.to_string(),
                    )],
                }
            }
        };

        tracing::debug!("Reading {} '{}'", self.type_name, name);
        match self.fetch(&ctx, data, &name).await {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} '{}' not found", self.type_name, name);
                let mut state = request.config;
                let diagnostics = match state.set(&AttributePath::new("id"), Dynamic::Null) {
                    Ok(()) => vec![Diagnostic::warning(
                        format!("{} '{}' not found", self.type_name, name),
                        e.to_string(),
                    )],
                    Err(e) => vec![Diagnostic::error(
                        format!("Failed to read {} '{}'", self.type_name, name),
                        e.to_string(),
                    )],
                };
                ReadDataSourceResponse { state, diagnostics }
            }
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
impl DataSourceWithConfigure for ConfigDataSource {
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
