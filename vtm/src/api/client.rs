use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::common::{
    ApiErrorDetails, ApiErrorResponse, ChildList, InformationBody, PropertiesBody,
    StatisticsBody, TmInformation,
};
use super::error::ApiError;

pub const DEFAULT_API_VERSION: &str = "7.0";
pub const DEFAULT_USERNAME: &str = "admin";
const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// e.g. `https://vtm.example.com:9070/api`
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub verify_ssl_cert: bool,
    pub api_version: String,
    pub timeout_seconds: u64,
}

impl ClientConfig {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            verify_ssl_cert: true,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// vTM REST API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    api_url: String,
    username: String,
    password: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl_cert)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let api_url = format!("{}/tm/{}", base_url, config.api_version);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                api_url,
                username: config.username,
                password: config.password,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// GET of the API root; fails when the service is unreachable or the
    /// credentials are rejected
    pub async fn check_connection(&self) -> Result<(), ApiError> {
        let _: ChildList = self.get_json("").await?;
        Ok(())
    }

    /// Configuration objects under `config/active/<collection>`
    pub fn config(&self, collection: &'static str) -> ConfigApi<'_> {
        ConfigApi {
            client: self,
            collection,
        }
    }

    /// Counters of one object under `status/local_tm/statistics`
    pub async fn statistics(
        &self,
        collection: &str,
        name: &str,
    ) -> Result<Map<String, Value>, ApiError> {
        let path = format!(
            "/status/local_tm/statistics/{}/{}",
            collection,
            urlencoding::encode(name)
        );
        let body: StatisticsBody = self.get_json(&path).await?;
        Ok(body.statistics)
    }

    pub async fn information(&self) -> Result<TmInformation, ApiError> {
        let body: InformationBody = self.get_json("/status/local_tm/information").await?;
        Ok(body.information)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET request to: {}", url);

        let request = self.inner.http_client.get(&url);
        let response = self.execute(request).await?;
        parse_json(response).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("PUT request to: {}", url);

        let request = self.inner.http_client.put(&url).json(body);
        let response = self.execute(request).await?;
        parse_json(response).await
    }

    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET request to: {}", url);

        let request = self
            .inner
            .http_client
            .get(&url)
            .header("Accept", OCTET_STREAM);
        let response = self.execute(request).await?;
        Ok(response.text().await?)
    }

    async fn put_text(&self, path: &str, content: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!("PUT request to: {}", url);

        let request = self
            .inner
            .http_client
            .put(&url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(content.to_string());
        self.execute(request).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!("DELETE request to: {}", url);

        let request = self.inner.http_client.delete(&url);
        self.execute(request).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.api_url, path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .basic_auth(&self.inner.username, Some(&self.inner.password))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthError);
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }
}

/// Operations on one configuration collection, e.g. `pools`
pub struct ConfigApi<'a> {
    client: &'a Client,
    collection: &'static str,
}

impl ConfigApi<'_> {
    /// Object names in service order
    pub async fn list(&self) -> Result<Vec<String>, ApiError> {
        let path = format!("/config/active/{}", self.collection);
        let list: ChildList = self.client.get_json(&path).await?;
        Ok(list.children.into_iter().map(|child| child.name).collect())
    }

    /// The `properties` of one object
    pub async fn get(&self, name: &str) -> Result<Map<String, Value>, ApiError> {
        let body: PropertiesBody = self.client.get_json(&self.object_path(name)).await?;
        Ok(body.properties)
    }

    /// Create or partially update an object; returns the stored properties
    pub async fn put(
        &self,
        name: &str,
        properties: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ApiError> {
        let request = PropertiesBody {
            properties: properties.clone(),
        };
        let body: PropertiesBody = self
            .client
            .put_json(&self.object_path(name), &request)
            .await?;
        Ok(body.properties)
    }

    /// Text content of a file-like object (rules, scripts, license keys)
    pub async fn get_raw(&self, name: &str) -> Result<String, ApiError> {
        self.client.get_text(&self.object_path(name)).await
    }

    pub async fn put_raw(&self, name: &str, content: &str) -> Result<(), ApiError> {
        self.client
            .put_text(&self.object_path(name), content)
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.client.delete(&self.object_path(name)).await
    }

    fn object_path(&self, name: &str) -> String {
        object_path(self.collection, name)
    }
}

fn object_path(collection: &str, name: &str) -> String {
    format!(
        "/config/active/{}/{}",
        collection,
        urlencoding::encode(name)
    )
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    tracing::debug!("API response body: {}", text);

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
        ApiError::ParseError(format!("Failed to parse response: {}", e))
    })
}

async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::error!("API error response: {}", text);

    match serde_json::from_str::<ApiErrorResponse>(&text) {
        Ok(body) => ApiError::ApiError {
            status,
            message: if body.error_text.is_empty() {
                body.error_id.clone()
            } else {
                body.error_text.clone()
            },
            details: Some(Box::new(ApiErrorDetails {
                error_id: body.error_id,
                error_text: body.error_text,
            })),
        },
        Err(_) => ApiError::ApiError {
            status,
            message: text,
            details: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::create_test_client;
    use crate::error::ErrorKind;
    use mockito::{Matcher, Server};
    use serde_json::json;

    // admin:secret
    const AUTH: &str = "Basic YWRtaW46c2VjcmV0";

    #[tokio::test]
    async fn list_returns_names_in_service_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tm/7.0/config/active/pools")
            .match_header("authorization", AUTH)
            .with_body(
                r#"{"children":[{"name":"web","href":"/api/tm/7.0/config/active/pools/web"},{"name":"api","href":"/api/tm/7.0/config/active/pools/api"}]}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let names = client.config("pools").list().await.unwrap();
        assert_eq!(names, ["web", "api"]);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_returns_properties() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tm/7.0/config/active/pools/web")
            .with_body(r#"{"properties":{"basic":{"monitors":["Ping"]},"load_balancing":{"algorithm":"round_robin"}}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let properties = client.config("pools").get("web").await.unwrap();
        assert_eq!(properties["basic"]["monitors"], json!(["Ping"]));
        assert_eq!(properties["load_balancing"]["algorithm"], "round_robin");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tm/7.0/config/active/pools/gone")
            .with_status(404)
            .with_body(r#"{"error_id":"resource.not_found","error_text":"Resource 'gone' does not exist"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client.config("pools").get("gone").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn other_errors_are_remote_call_failures() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/api/tm/7.0/config/active/pools/web")
            .with_status(400)
            .with_body(r#"{"error_id":"resource.validation_error","error_text":"Invalid monitor"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client
            .config("pools")
            .put("web", &Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCall);
        match err {
            ApiError::ApiError {
                status, details, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(details.unwrap().error_id, "resource.validation_error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unauthorized_is_auth_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tm/7.0")
            .with_status(401)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client.check_connection().await.unwrap_err();
        assert!(matches!(err, ApiError::AuthError));
    }

    #[tokio::test]
    async fn put_sends_properties_body() {
        let mut server = Server::new_async().await;
        let body = json!({"properties": {"basic": {"note": "managed"}}});
        let mock = server
            .mock("PUT", "/api/tm/7.0/config/active/pools/web")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(body.clone()))
            .with_status(201)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let mut basic = Map::new();
        basic.insert("note".to_string(), json!("managed"));
        let mut properties = Map::new();
        properties.insert("basic".to_string(), Value::Object(basic));

        let stored = client.config("pools").put("web", &properties).await.unwrap();
        assert_eq!(stored["basic"]["note"], "managed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn raw_objects_use_octet_stream() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", "/api/tm/7.0/config/active/rules/redirect")
            .match_header("content-type", "application/octet-stream")
            .match_body("http.redirect(\"https://example.com\");")
            .with_status(204)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/api/tm/7.0/config/active/rules/redirect")
            .with_header("content-type", "application/octet-stream")
            .with_body("http.redirect(\"https://example.com\");")
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let rules = client.config("rules");
        rules
            .put_raw("redirect", "http.redirect(\"https://example.com\");")
            .await
            .unwrap();
        let content = rules.get_raw("redirect").await.unwrap();
        assert_eq!(content, "http.redirect(\"https://example.com\");");

        put.assert_async().await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn delete_succeeds_on_no_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/tm/7.0/config/active/monitors/ping-web")
            .with_status(204)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        client.config("monitors").delete("ping-web").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn status_endpoints() {
        let mut server = Server::new_async().await;
        let _stats = server
            .mock("GET", "/api/tm/7.0/status/local_tm/statistics/pools/web")
            .with_body(r#"{"statistics":{"bytes_in":1024,"state":"active"}}"#)
            .create_async()
            .await;
        let _info = server
            .mock("GET", "/api/tm/7.0/status/local_tm/information")
            .with_body(r#"{"information":{"tm_version":"18.2","uuid":"7a1f"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let stats = client.statistics("pools", "web").await.unwrap();
        assert_eq!(stats["bytes_in"], 1024);
        assert_eq!(stats["state"], "active");

        let info = client.information().await.unwrap();
        assert_eq!(info.tm_version, "18.2");
        assert_eq!(info.uuid, "7a1f");
    }

    #[test]
    fn object_names_are_percent_encoded() {
        assert_eq!(
            object_path("pools", "my pool/1"),
            "/config/active/pools/my%20pool%2F1"
        );
        assert_eq!(
            object_path("ssl/server_keys", "site"),
            "/config/active/ssl/server_keys/site"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            Client::new(ClientConfig::new("not a url", "admin", "secret")),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            Client::new(ClientConfig::new("ftp://vtm/api", "admin", "secret")),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
