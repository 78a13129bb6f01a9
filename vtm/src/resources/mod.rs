//! Resources: one [`ConfigResource`] per configuration object kind

mod config_resource;

pub use config_resource::ConfigResource;
