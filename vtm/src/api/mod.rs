//! vTM REST API client

pub mod client;
pub mod common;
pub mod error;
#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{Client, ClientConfig, ConfigApi, DEFAULT_API_VERSION, DEFAULT_USERNAME};
pub use common::TmInformation;
pub use error::ApiError;
