//! tfplug - Terraform Plugin Framework for Rust
//!
//! A framework for building Terraform providers in Rust. Providers implement
//! the async [`Provider`], [`Resource`] and [`DataSource`] traits, register
//! their types in a [`Registry`] and are driven by a [`ProviderServer`].

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod defaults;
pub mod import;
pub mod plan_modifier;
pub mod validator;

// Framework implementation modules
pub mod registry;
pub mod server;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::Provider;
pub use registry::Registry;
pub use resource::{Resource, ResourceWithConfigure};
pub use schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use server::ProviderServer;
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
