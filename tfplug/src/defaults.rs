//! Default value providers for attributes
//!
//! Defaults are applied during planning (and to provider configuration) when
//! an optional attribute is absent or null. They never replace a value that
//! was set explicitly.
//!
//! ```ignore
//! use tfplug::defaults::{EnvDefault, StaticDefault};
//! use tfplug::schema::{AttributeBuilder, AttributeType};
//!
//! let username = AttributeBuilder::new("username", AttributeType::String)
//!     .optional()
//!     .default(StaticDefault::string("admin"))
//!     .build();
//!
//! let base_url = AttributeBuilder::new("base_url", AttributeType::String)
//!     .optional()
//!     .default(EnvDefault::string("VTM_BASE_URL"))
//!     .build();
//! ```

use crate::types::Dynamic;
use std::env;
use std::sync::Arc;

pub trait AttributeDefault: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;

    fn default_value(&self) -> Dynamic;
}

/// StaticDefault provides a fixed default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Arc<dyn AttributeDefault> {
        Arc::new(Self { value })
    }

    pub fn string(value: &str) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn number(value: f64) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::Number(value))
    }

    pub fn bool(value: bool) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::Bool(value))
    }

    pub fn list(values: Vec<Dynamic>) -> Arc<dyn AttributeDefault> {
        Self::create(Dynamic::List(values))
    }
}

impl AttributeDefault for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self) -> Dynamic {
        self.value.clone()
    }
}

#[derive(Debug, Clone, Copy)]
enum EnvKind {
    String,
    Bool,
}

/// EnvDefault reads the default from an environment variable
///
/// Without a fallback an unset variable yields null, which leaves a required
/// check to the consumer of the value.
pub struct EnvDefault {
    env_var: String,
    kind: EnvKind,
    fallback: Dynamic,
}

impl EnvDefault {
    pub fn string(env_var: &str) -> Arc<dyn AttributeDefault> {
        Arc::new(Self {
            env_var: env_var.to_string(),
            kind: EnvKind::String,
            fallback: Dynamic::Null,
        })
    }

    pub fn string_or(env_var: &str, fallback: &str) -> Arc<dyn AttributeDefault> {
        Arc::new(Self {
            env_var: env_var.to_string(),
            kind: EnvKind::String,
            fallback: Dynamic::String(fallback.to_string()),
        })
    }

    /// Accepts `true`/`false`/`1`/`0` (case-insensitive); anything else uses the fallback
    pub fn bool_or(env_var: &str, fallback: bool) -> Arc<dyn AttributeDefault> {
        Arc::new(Self {
            env_var: env_var.to_string(),
            kind: EnvKind::Bool,
            fallback: Dynamic::Bool(fallback),
        })
    }
}

impl AttributeDefault for EnvDefault {
    fn description(&self) -> String {
        match &self.fallback {
            Dynamic::Null => format!("default from environment variable {}", self.env_var),
            fallback => format!(
                "default from environment variable {} (fallback: {:?})",
                self.env_var, fallback
            ),
        }
    }

    fn default_value(&self) -> Dynamic {
        let Ok(raw) = env::var(&self.env_var) else {
            return self.fallback.clone();
        };

        match self.kind {
            EnvKind::String => Dynamic::String(raw),
            EnvKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Dynamic::Bool(true),
                "false" | "0" => Dynamic::Bool(false),
                _ => {
                    tracing::warn!(
                        "Ignoring non-boolean value '{}' in {}",
                        raw,
                        self.env_var
                    );
                    self.fallback.clone()
                }
            },
        }
    }
}
