//! Common types for the vTM REST API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection listing: `{"children": [{"name": .., "href": ..}]}`
#[derive(Debug, Deserialize)]
pub struct ChildList {
    #[serde(default)]
    pub children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
pub struct Child {
    pub name: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub href: Option<String>,
}

/// Configuration object body: `{"properties": {section: {key: value}}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct PropertiesBody {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct StatisticsBody {
    #[serde(default)]
    pub statistics: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct InformationBody {
    pub information: TmInformation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmInformation {
    pub tm_version: String,
    #[serde(default)]
    pub uuid: String,
}

/// Error body: `{"error_id": .., "error_text": ..}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error_id: String,
    #[serde(default)]
    pub error_text: String,
}

#[derive(Debug, thiserror::Error)]
#[error("{error_id}: {error_text}")]
pub struct ApiErrorDetails {
    pub error_id: String,
    pub error_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_list_keeps_service_order() {
        let list: ChildList = serde_json::from_str(
            r#"{"children":[{"name":"web","href":"/api/tm/7.0/config/active/pools/web"},{"name":"api","href":"/api/tm/7.0/config/active/pools/api"}]}"#,
        )
        .unwrap();
        let names: Vec<_> = list.children.into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["web", "api"]);
    }

    #[test]
    fn error_body_decodes() {
        let body: ApiErrorResponse = serde_json::from_str(
            r#"{"error_id":"resource.not_found","error_text":"Resource 'x' does not exist"}"#,
        )
        .unwrap();
        assert_eq!(body.error_id, "resource.not_found");
        assert!(body.error_text.contains("does not exist"));
    }
}
