//! In-process protocol dispatcher
//!
//! [`ProviderServer`] implements the Terraform plugin protocol operations on
//! top of a [`Provider`] and a [`Registry`]. It does the schema-driven work
//! that the plugin framework is responsible for (defaults, required and
//! type checks, validators, unknown computed values, plan modifiers) and
//! forwards the rest to fresh, configured resource and data source
//! instances. A wire transport only has to decode requests and call these
//! methods.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ReadDataSourceResponse, ValidateDataSourceConfigRequest,
};
use crate::error::TfplugError;
use crate::plan_modifier::PlanModifyRequest;
use crate::provider::{ConfigureProviderRequest, Provider, ProviderSchemaRequest};
use crate::registry::Registry;
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceSchemaRequest, ResourceWithConfigure, UpdateResourceRequest,
    ValidateResourceConfigRequest,
};
use crate::schema::Schema;
use crate::types::{has_errors, AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct GetProviderSchemaResponse {
    pub provider: Schema,
    pub resource_schemas: BTreeMap<String, Schema>,
    pub data_source_schemas: BTreeMap<String, Schema>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PlanResourceChangeRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub proposed_new_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct PlanResourceChangeResponse {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ApplyResourceChangeRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct ApplyResourceChangeResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ProviderServer<'r, P: Provider> {
    provider: P,
    registry: &'r Registry,
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
    configured: bool,
}

impl<'r, P: Provider> ProviderServer<'r, P> {
    pub fn new(provider: P, registry: &'r Registry) -> Self {
        Self {
            provider,
            registry,
            provider_data: None,
            configured: false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub async fn get_provider_schema(&self, ctx: Context) -> GetProviderSchemaResponse {
        let provider = self
            .provider
            .schema(ctx.clone(), ProviderSchemaRequest)
            .await;
        let mut diagnostics = provider.diagnostics;

        let mut resource_schemas = BTreeMap::new();
        for type_name in self.registry.resource_names() {
            match self.resource_schema(&ctx, type_name).await {
                Ok(schema) => {
                    resource_schemas.insert(type_name.to_string(), schema);
                }
                Err(diags) => diagnostics.extend(diags),
            }
        }

        let mut data_source_schemas = BTreeMap::new();
        for type_name in self.registry.data_source_names() {
            match self.data_source_schema(&ctx, type_name).await {
                Ok(schema) => {
                    data_source_schemas.insert(type_name.to_string(), schema);
                }
                Err(diags) => diagnostics.extend(diags),
            }
        }

        GetProviderSchemaResponse {
            provider: provider.schema,
            resource_schemas,
            data_source_schemas,
            diagnostics,
        }
    }

    /// Apply provider schema defaults, check the result and configure the
    /// provider. Provider data is stored for every later request.
    pub async fn configure_provider(
        &mut self,
        ctx: Context,
        terraform_version: &str,
        config: DynamicValue,
    ) -> Vec<Diagnostic> {
        tracing::debug!(
            "Configuring provider {} (terraform {})",
            self.provider.type_name(),
            terraform_version
        );

        let schema_response = self
            .provider
            .schema(ctx.clone(), ProviderSchemaRequest)
            .await;
        let mut diagnostics = schema_response.diagnostics;
        let schema = schema_response.schema;

        let mut config = if config.is_null() {
            DynamicValue::object()
        } else {
            config
        };
        let defaults_source = config.clone();
        diagnostics.extend(apply_defaults(&schema, &defaults_source, &mut config));
        diagnostics.extend(validate_config(&schema, &config));
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = self
            .provider
            .configure(
                ctx,
                ConfigureProviderRequest {
                    terraform_version: terraform_version.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        if !has_errors(&diagnostics) {
            self.provider_data = response.provider_data;
            self.configured = true;
        }
        diagnostics
    }

    pub async fn validate_resource_config(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> Vec<Diagnostic> {
        let resource = match self.resource(&ctx, type_name).await {
            Ok(resource) => resource,
            Err(diags) => return diags,
        };
        let schema_response = resource.schema(ctx.clone(), ResourceSchemaRequest).await;

        let mut diagnostics = schema_response.diagnostics;
        diagnostics.extend(validate_config(&schema_response.schema, &config));
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = resource
            .validate(
                ctx,
                ValidateResourceConfigRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    pub async fn validate_data_source_config(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> Vec<Diagnostic> {
        let data_source = match self.data_source(&ctx, type_name).await {
            Ok(data_source) => data_source,
            Err(diags) => return diags,
        };
        let schema_response = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await;

        let mut diagnostics = schema_response.diagnostics;
        diagnostics.extend(validate_config(&schema_response.schema, &config));
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = data_source
            .validate(
                ctx,
                ValidateDataSourceConfigRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        diagnostics
    }

    /// Plan a change: defaults, unknown computed values, then plan modifiers
    pub async fn plan_resource_change(
        &self,
        ctx: Context,
        request: PlanResourceChangeRequest,
    ) -> PlanResourceChangeResponse {
        let mut response = PlanResourceChangeResponse {
            planned_state: DynamicValue::null(),
            requires_replace: Vec::new(),
            diagnostics: Vec::new(),
        };

        // Destroy
        if request.proposed_new_state.is_null() {
            return response;
        }

        let schema = match self.resource_schema(&ctx, &request.type_name).await {
            Ok(schema) => schema,
            Err(diags) => {
                response.diagnostics = diags;
                return response;
            }
        };

        let mut planned = request.proposed_new_state;
        response
            .diagnostics
            .extend(apply_defaults(&schema, &request.config, &mut planned));

        let creating = request.prior_state.is_null();
        if creating || planned != request.prior_state {
            for attr in schema.attributes.iter().filter(|a| a.computed) {
                let path = AttributePath::new(&attr.name);
                if attr.default.is_none() && value_at(&request.config, &path).is_null() {
                    if let Err(e) = planned.mark_unknown(&path) {
                        response.diagnostics.push(
                            Diagnostic::error("Failed to plan computed value", e.to_string())
                                .with_attribute(path),
                        );
                    }
                }
            }
        }

        for attr in schema.attributes.iter() {
            if attr.plan_modifiers.is_empty() {
                continue;
            }
            let path = AttributePath::new(&attr.name);
            let mut value = value_at(&planned, &path);
            for modifier in &attr.plan_modifiers {
                let modified = modifier.modify_plan(PlanModifyRequest {
                    state: value_at(&request.prior_state, &path),
                    plan: value,
                    config: value_at(&request.config, &path),
                    path: path.clone(),
                });
                response.diagnostics.extend(modified.diagnostics);
                if modified.requires_replace && !response.requires_replace.contains(&path) {
                    response.requires_replace.push(path.clone());
                }
                value = modified.plan_value;
            }
            if let Err(e) = planned.set(&path, value) {
                response.diagnostics.push(
                    Diagnostic::error("Failed to apply plan modifier", e.to_string())
                        .with_attribute(path),
                );
            }
        }

        tracing::debug!(
            "Planned {} change, replace on {:?}",
            request.type_name,
            response.requires_replace
        );
        response.planned_state = planned;
        response
    }

    /// Create, update or delete depending on which of prior and planned
    /// state are null
    pub async fn apply_resource_change(
        &self,
        ctx: Context,
        request: ApplyResourceChangeRequest,
    ) -> ApplyResourceChangeResponse {
        if let Err(diags) = self.require_configured() {
            return ApplyResourceChangeResponse {
                new_state: request.prior_state,
                diagnostics: diags,
            };
        }
        let resource = match self.resource(&ctx, &request.type_name).await {
            Ok(resource) => resource,
            Err(diags) => {
                return ApplyResourceChangeResponse {
                    new_state: request.prior_state,
                    diagnostics: diags,
                }
            }
        };

        if request.planned_state.is_null() {
            tracing::debug!("Deleting {}", request.type_name);
            let response = resource
                .delete(
                    ctx,
                    DeleteResourceRequest {
                        type_name: request.type_name,
                        prior_state: request.prior_state.clone(),
                    },
                )
                .await;
            let new_state = if has_errors(&response.diagnostics) {
                request.prior_state
            } else {
                DynamicValue::null()
            };
            return ApplyResourceChangeResponse {
                new_state,
                diagnostics: response.diagnostics,
            };
        }

        let (new_state, mut diagnostics) = if request.prior_state.is_null() {
            tracing::debug!("Creating {}", request.type_name);
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name: request.type_name.clone(),
                        planned_state: request.planned_state,
                        config: request.config,
                    },
                )
                .await;
            (response.new_state, response.diagnostics)
        } else {
            tracing::debug!("Updating {}", request.type_name);
            let response = resource
                .update(
                    ctx,
                    UpdateResourceRequest {
                        type_name: request.type_name.clone(),
                        prior_state: request.prior_state,
                        planned_state: request.planned_state,
                        config: request.config,
                    },
                )
                .await;
            (response.new_state, response.diagnostics)
        };

        if !has_errors(&diagnostics) && contains_unknown(&new_state.value) {
            diagnostics.push(Diagnostic::error(
                "Provider returned invalid result object after apply",
                format!(
                    "{} left unknown values in its new state. This is a bug in the provider.",
                    request.type_name
                ),
            ));
        }

        ApplyResourceChangeResponse {
            new_state,
            diagnostics,
        }
    }

    pub async fn read_resource(
        &self,
        ctx: Context,
        type_name: &str,
        current_state: DynamicValue,
    ) -> ReadResourceResponse {
        if let Err(diagnostics) = self.require_configured() {
            return ReadResourceResponse {
                new_state: Some(current_state),
                diagnostics,
            };
        }
        let resource = match self.resource(&ctx, type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ReadResourceResponse {
                    new_state: Some(current_state),
                    diagnostics,
                }
            }
        };

        resource
            .read(
                ctx,
                ReadResourceRequest {
                    type_name: type_name.to_string(),
                    current_state,
                },
            )
            .await
    }

    pub async fn import_resource_state(
        &self,
        ctx: Context,
        type_name: &str,
        id: &str,
    ) -> ImportResourceStateResponse {
        if let Err(diagnostics) = self.require_configured() {
            return ImportResourceStateResponse {
                imported_resources: Vec::new(),
                diagnostics,
            };
        }
        let resource = match self.resource(&ctx, type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ImportResourceStateResponse {
                    imported_resources: Vec::new(),
                    diagnostics,
                }
            }
        };

        tracing::debug!("Importing {} '{}'", type_name, id);
        resource
            .import_state(
                ctx,
                ImportResourceStateRequest {
                    type_name: type_name.to_string(),
                    id: id.to_string(),
                },
            )
            .await
    }

    pub async fn read_data_source(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> ReadDataSourceResponse {
        if let Err(diagnostics) = self.require_configured() {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics,
            };
        }
        let data_source = match self.data_source(&ctx, type_name).await {
            Ok(data_source) => data_source,
            Err(diagnostics) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                }
            }
        };

        data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await
    }

    fn require_configured(&self) -> Result<(), Vec<Diagnostic>> {
        if self.configured {
            return Ok(());
        }
        Err(vec![Diagnostic::error(
            TfplugError::ProviderNotConfigured.to_string(),
            "configure_provider must succeed before resources or data sources are used",
        )])
    }

    async fn resource(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<Box<dyn ResourceWithConfigure>, Vec<Diagnostic>> {
        let mut resource = self
            .registry
            .create_resource(type_name)
            .map_err(|e| vec![Diagnostic::error("Unknown resource type", e.to_string())])?;

        let response = resource
            .configure(
                ctx.clone(),
                ConfigureResourceRequest {
                    provider_data: self.provider_data.clone(),
                },
            )
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(resource)
    }

    async fn data_source(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>> {
        let mut data_source = self
            .registry
            .create_data_source(type_name)
            .map_err(|e| vec![Diagnostic::error("Unknown data source type", e.to_string())])?;

        let response = data_source
            .configure(
                ctx.clone(),
                ConfigureDataSourceRequest {
                    provider_data: self.provider_data.clone(),
                },
            )
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(data_source)
    }

    async fn resource_schema(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<Schema, Vec<Diagnostic>> {
        let resource = self
            .registry
            .create_resource(type_name)
            .map_err(|e| vec![Diagnostic::error("Unknown resource type", e.to_string())])?;
        let response = resource.schema(ctx.clone(), ResourceSchemaRequest).await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(response.schema)
    }

    async fn data_source_schema(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<Schema, Vec<Diagnostic>> {
        let data_source = self
            .registry
            .create_data_source(type_name)
            .map_err(|e| vec![Diagnostic::error("Unknown data source type", e.to_string())])?;
        let response = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(response.schema)
    }
}

/// Check a configuration against a schema: unsupported attributes, missing
/// required values, values set on read-only attributes, types and validators
///
/// Validators only see known values.
pub fn validate_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Some(fields) = config.value.as_map() {
        let mut names: Vec<&String> = fields
            .keys()
            .filter(|name| schema.attribute(name).is_none())
            .collect();
        names.sort();
        for name in names {
            diagnostics.push(
                Diagnostic::error(
                    "Unsupported argument",
                    format!("An argument named \"{}\" is not expected here.", name),
                )
                .with_attribute(AttributePath::new(name)),
            );
        }
    }

    for attr in &schema.attributes {
        let path = AttributePath::new(&attr.name);
        let value = value_at(config, &path);

        if attr.required && value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing required argument",
                    format!("The argument \"{}\" is required, but no definition was found.", attr.name),
                )
                .with_attribute(path),
            );
            continue;
        }

        if attr.computed && !attr.optional && !attr.required && !value.is_null() {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid configuration for read-only attribute",
                    format!("\"{}\" is computed and cannot be set in configuration.", attr.name),
                )
                .with_attribute(path),
            );
            continue;
        }

        if !value.is_known() {
            continue;
        }

        if !attr.r#type.conforms(&value) {
            diagnostics.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!("\"{}\" must be a {} value.", attr.name, attr.r#type.name()),
                )
                .with_attribute(path),
            );
            continue;
        }

        for validator in &attr.validators {
            validator.validate(&value, &path, &mut diagnostics);
        }
    }

    diagnostics
}

/// Fill null attributes of `target` with schema defaults wherever `config`
/// leaves the attribute null
fn apply_defaults(
    schema: &Schema,
    config: &DynamicValue,
    target: &mut DynamicValue,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for attr in &schema.attributes {
        let Some(default) = &attr.default else {
            continue;
        };
        let path = AttributePath::new(&attr.name);
        if !value_at(config, &path).is_null() {
            continue;
        }
        if let Err(e) = target.set(&path, default.default_value()) {
            diagnostics.push(
                Diagnostic::error("Failed to apply default value", e.to_string())
                    .with_attribute(path),
            );
        }
    }
    diagnostics
}

fn value_at(value: &DynamicValue, path: &AttributePath) -> Dynamic {
    value.get(path).cloned().unwrap_or(Dynamic::Null)
}

fn contains_unknown(value: &Dynamic) -> bool {
    match value {
        Dynamic::Unknown => true,
        Dynamic::List(items) => items.iter().any(contains_unknown),
        Dynamic::Map(fields) => fields.values().any(contains_unknown),
        _ => false,
    }
}
