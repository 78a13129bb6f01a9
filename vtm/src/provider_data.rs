//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;

#[derive(Clone)]
pub struct VtmProviderData {
    pub client: Client,
}

impl VtmProviderData {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Downcast the data handed out by provider configure. None before the
    /// provider is configured; an error when the data has another type.
    pub fn from_any(
        provider_data: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Result<Option<Self>, Diagnostic> {
        let Some(data) = provider_data else {
            return Ok(None);
        };
        match data.downcast_ref::<VtmProviderData>() {
            Some(data) => Ok(Some(data.clone())),
            None => Err(Diagnostic::error(
                "Unexpected provider data type",
                "Expected VtmProviderData",
            )),
        }
    }
}

/// Error returned by operations that need the client before configure ran
pub fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}
