//! Registration table mapping Terraform type names to factories
//!
//! A registry is built once at startup and handed to
//! [`crate::server::ProviderServer`] by reference. Every request gets a fresh
//! instance from the factory, which is then configured with the provider
//! data, so instances never share mutable state.

use crate::data_source::DataSourceWithConfigure;
use crate::error::{Result, TfplugError};
use crate::resource::ResourceWithConfigure;
use std::collections::BTreeMap;

pub type ResourceFactory = Box<dyn Fn() -> Box<dyn ResourceWithConfigure> + Send + Sync>;
pub type DataSourceFactory = Box<dyn Fn() -> Box<dyn DataSourceWithConfigure> + Send + Sync>;

#[derive(Default)]
pub struct Registry {
    resources: BTreeMap<String, ResourceFactory>,
    data_sources: BTreeMap<String, DataSourceFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails when the name is already registered
    pub fn register_resource<F>(&mut self, type_name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn ResourceWithConfigure> + Send + Sync + 'static,
    {
        if self.resources.contains_key(type_name) {
            return Err(TfplugError::InvalidConfiguration(format!(
                "resource {} registered twice",
                type_name
            )));
        }
        self.resources
            .insert(type_name.to_string(), Box::new(factory));
        Ok(())
    }

    /// Fails when the name is already registered
    pub fn register_data_source<F>(&mut self, type_name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn DataSourceWithConfigure> + Send + Sync + 'static,
    {
        if self.data_sources.contains_key(type_name) {
            return Err(TfplugError::InvalidConfiguration(format!(
                "data source {} registered twice",
                type_name
            )));
        }
        self.data_sources
            .insert(type_name.to_string(), Box::new(factory));
        Ok(())
    }

    pub fn create_resource(&self, type_name: &str) -> Result<Box<dyn ResourceWithConfigure>> {
        self.resources
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()))
    }

    pub fn create_data_source(&self, type_name: &str) -> Result<Box<dyn DataSourceWithConfigure>> {
        self.data_sources
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()))
    }

    pub fn has_resource(&self, type_name: &str) -> bool {
        self.resources.contains_key(type_name)
    }

    pub fn has_data_source(&self, type_name: &str) -> bool {
        self.data_sources.contains_key(type_name)
    }

    /// Sorted resource type names
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Sorted data source type names
    pub fn data_source_names(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::data_source::*;
    use crate::schema::SchemaBuilder;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl DataSource for Echo {
        fn type_name(&self) -> &str {
            "test_echo"
        }

        async fn schema(&self, _: Context, _: DataSourceSchemaRequest) -> DataSourceSchemaResponse {
            DataSourceSchemaResponse {
                schema: SchemaBuilder::new().build(),
                diagnostics: vec![],
            }
        }

        async fn validate(
            &self,
            _: Context,
            _: ValidateDataSourceConfigRequest,
        ) -> ValidateDataSourceConfigResponse {
            ValidateDataSourceConfigResponse {
                diagnostics: vec![],
            }
        }

        async fn read(&self, _: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
            ReadDataSourceResponse {
                state: request.config,
                diagnostics: vec![],
            }
        }
    }

    #[async_trait]
    impl DataSourceWithConfigure for Echo {
        async fn configure(
            &mut self,
            _: Context,
            _: ConfigureDataSourceRequest,
        ) -> ConfigureDataSourceResponse {
            ConfigureDataSourceResponse {
                diagnostics: vec![],
            }
        }
    }

    #[test]
    fn registry_creates_registered_instances() {
        let mut registry = Registry::new();
        registry
            .register_data_source("test_echo", || Box::new(Echo))
            .unwrap();

        assert!(registry.has_data_source("test_echo"));
        assert!(!registry.has_resource("test_echo"));
        let ds = registry.create_data_source("test_echo").unwrap();
        assert_eq!(ds.type_name(), "test_echo");
        assert_eq!(registry.data_source_names().collect::<Vec<_>>(), ["test_echo"]);
    }

    #[test]
    fn registry_rejects_duplicates_and_unknown_names() {
        let mut registry = Registry::new();
        registry
            .register_data_source("test_echo", || Box::new(Echo))
            .unwrap();

        assert!(registry
            .register_data_source("test_echo", || Box::new(Echo))
            .is_err());
        assert!(matches!(
            registry.create_data_source("test_missing"),
            Err(TfplugError::DataSourceNotFound(_))
        ));
        assert!(matches!(
            registry.create_resource("test_echo"),
            Err(TfplugError::ResourceNotFound(_))
        ));
    }
}
