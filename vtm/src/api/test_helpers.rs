//! Test helpers for the vTM API

#![allow(clippy::disallowed_methods)]

pub fn create_test_client(server_url: &str) -> super::Client {
    let config = super::ClientConfig::new(&format!("{}/api", server_url), "admin", "secret");
    super::Client::new(config).unwrap()
}

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn client_config_defaults() {
        let config = ClientConfig::new("https://vtm:9070/api", DEFAULT_USERNAME, "secret");
        assert_eq!(config.username, "admin");
        assert_eq!(config.api_version, "7.0");
        assert!(config.verify_ssl_cert);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = Client::new(ClientConfig::new("https://vtm:9070/api/", "admin", "secret"))
            .unwrap();
        assert_eq!(client.base_url(), "https://vtm:9070/api");
    }
}
