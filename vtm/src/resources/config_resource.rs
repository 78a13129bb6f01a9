//! Generic resource for one configuration object kind
//!
//! `vtm_pool`, `vtm_rule`, ... are all instances of [`ConfigResource`];
//! the [`ObjectKind`] decides the schema and how the body is written.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::import_state_passthrough_id;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::error::Result;
use crate::objects::convert::{
    properties_from_state, state_from_content, state_from_properties, StateMode,
};
use crate::objects::{FieldKind, ObjectKind, CONTENT_ATTRIBUTE};
use crate::provider_data::{not_configured, VtmProviderData};

pub struct ConfigResource {
    kind: &'static ObjectKind,
    type_name: String,
    provider_data: Option<VtmProviderData>,
}

impl ConfigResource {
    pub fn new(kind: &'static ObjectKind) -> Self {
        Self {
            kind,
            type_name: kind.resource_type_name(),
            provider_data: None,
        }
    }

    fn provider_data(&self) -> std::result::Result<&VtmProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(not_configured)
    }

    fn failure(&self, action: &str, name: &str, e: impl std::fmt::Display) -> Diagnostic {
        Diagnostic::error(
            format!("Failed to {} {} '{}'", action, self.type_name, name),
            e.to_string(),
        )
    }

    /// PUT the known values of `planned` and build state from the stored object
    async fn write(
        &self,
        ctx: &Context,
        data: &VtmProviderData,
        name: &str,
        planned: &DynamicValue,
    ) -> Result<DynamicValue> {
        ctx.check()?;
        let api = data.client.config(self.kind.path);

        if self.kind.is_raw() {
            let content = planned.get_string(&AttributePath::new(CONTENT_ATTRIBUTE))?;
            api.put_raw(name, &content).await?;
            return state_from_content(name, &content);
        }

        let properties = properties_from_state(self.kind.fields(), planned)?;
        let stored = api.put(name, &properties).await?;
        state_from_properties(self.kind, name, &stored, StateMode::Tracked(planned))
    }

    async fn fetch(
        &self,
        ctx: &Context,
        data: &VtmProviderData,
        name: &str,
        current: &DynamicValue,
    ) -> Result<DynamicValue> {
        ctx.check()?;
        let api = data.client.config(self.kind.path);

        if self.kind.is_raw() {
            let content = api.get_raw(name).await?;
            return state_from_content(name, &content);
        }

        let properties = api.get(name).await?;
        state_from_properties(self.kind, name, &properties, StateMode::Tracked(current))
    }

    async fn remove(&self, ctx: &Context, data: &VtmProviderData, name: &str) -> Result<()> {
        ctx.check()?;
        data.client.config(self.kind.path).delete(name).await?;
        Ok(())
    }

    async fn create_or_update(
        &self,
        ctx: &Context,
        action: &str,
        planned: &DynamicValue,
    ) -> std::result::Result<DynamicValue, Diagnostic> {
        let data = self.provider_data()?;
        let name = planned
            .get_string(&AttributePath::new("name"))
            .map_err(|e| self.failure(action, "", e))?;

        tracing::debug!("{} {} '{}'", action, self.type_name, name);
        self.write(ctx, data, &name, planned).await.map_err(|e| {
            tracing::error!("Failed to {} {} '{}': {}", action, self.type_name, name, e);
            self.failure(action, &name, e)
        })
    }

    /// Allowed values of table columns; top-level attributes are covered by
    /// their schema validators
    fn validate_tables(&self, config: &DynamicValue, diagnostics: &mut Vec<Diagnostic>) {
        for field in self.kind.fields() {
            let FieldKind::Table(columns) = field.kind else {
                continue;
            };
            let name = field.attribute_name();
            let Some(Dynamic::List(rows)) = config.get(&AttributePath::new(&name)) else {
                continue;
            };

            for (index, row) in rows.iter().enumerate() {
                for column in columns.iter().filter(|c| !c.allowed.is_empty()) {
                    let Some(value) = row
                        .as_map()
                        .and_then(|cells| cells.get(column.name))
                        .and_then(Dynamic::as_str)
                    else {
                        continue;
                    };
                    if !column.allowed.contains(&value) {
                        diagnostics.push(
                            Diagnostic::error(
                                format!("Invalid {} '{}'", column.name, value),
                                format!("Must be one of: {}", column.allowed.join(", ")),
                            )
                            .with_attribute(
                                AttributePath::new(&name)
                                    .index(index as i64)
                                    .attribute(column.name),
                            ),
                        );
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Resource for ConfigResource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: self.kind.resource_schema(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];
        self.validate_tables(&request.config, &mut diagnostics);
        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self
            .create_or_update(&ctx, "create", &request.planned_state)
            .await
        {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diagnostic) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![diagnostic],
            },
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diagnostic) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diagnostic],
                }
            }
        };
        let name = match request
            .current_state
            .get_string(&AttributePath::new("name"))
            .or_else(|_| request.current_state.get_string(&AttributePath::new("id")))
        {
            Ok(name) => name,
            Err(e) => {
                return ReadResourceResponse {
                    diagnostics: vec![self.failure("read", "", e)],
                    new_state: Some(request.current_state),
                }
            }
        };

        match self.fetch(&ctx, data, &name, &request.current_state).await {
            Ok(state) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} '{}' no longer exists, removing from state", self.type_name, name);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                tracing::error!("Failed to read {} '{}': {}", self.type_name, name, e);
                ReadResourceResponse {
                    diagnostics: vec![self.failure("read", &name, e)],
                    new_state: Some(request.current_state),
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        match self
            .create_or_update(&ctx, "update", &request.planned_state)
            .await
        {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diagnostic) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diagnostic],
            },
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let data = match self.provider_data() {
            Ok(data) => data,
            Err(diagnostic) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diagnostic],
                }
            }
        };
        let name = match request.prior_state.get_string(&AttributePath::new("name")) {
            Ok(name) => name,
            Err(e) => {
                return DeleteResourceResponse {
                    diagnostics: vec![self.failure("delete", "", e)],
                }
            }
        };

        tracing::debug!("delete {} '{}'", self.type_name, name);
        let diagnostics = match self.remove(&ctx, data, &name).await {
            Ok(()) => vec![],
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} '{}' was already deleted", self.type_name, name);
                vec![]
            }
            Err(e) => {
                tracing::error!("Failed to delete {} '{}': {}", self.type_name, name, e);
                vec![self.failure("delete", &name, e)]
            }
        };
        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(
            &ctx,
            &[AttributePath::new("id"), AttributePath::new("name")],
            &request,
            &mut response,
        );
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for ConfigResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        match VtmProviderData::from_any(request.provider_data) {
            Ok(data) => {
                self.provider_data = data;
                ConfigureResourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diagnostic) => ConfigureResourceResponse {
                diagnostics: vec![diagnostic],
            },
        }
    }
}
