//! Client configuration.
//!
//! Endpoint, client identification headers and the display offset are passed
//! to [`crate::SessionContextManager::new`] explicitly.

use time::UtcOffset;
use url::Url;

/// Default client name expected by the PEC web API.
pub const DEFAULT_CLIENT_NAME: &str = "PEC Web";

/// Client version string the service pairs with [`DEFAULT_CLIENT_NAME`].
pub const DEFAULT_CLIENT_VERSION: &str = "5.4.13";

/// Consumer id sent with the login mutation.
pub const DEFAULT_CONSUMER_ID: &str = "ESUS_WEB_CLIENT";

/// Configuration for the GraphQL transport and session manager.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint, e.g. `https://pec.example.gov.br/api/graphql`.
    pub endpoint: Url,

    /// Value of the `apollographql-client-name` header.
    pub client_name: String,

    /// Value of the `apollographql-client-version` header.
    pub client_version: String,

    /// Value of the `Api-Consumer-Id` header sent on login.
    pub consumer_id: String,

    /// Offset used to turn a calendar day into UTC bounds and to render slot
    /// times (default: UTC-03:00, America/Fortaleza).
    pub display_offset: UtcOffset,
}

impl ClientConfig {
    /// Creates a configuration for `endpoint` with default client headers.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            consumer_id: DEFAULT_CONSUMER_ID.to_string(),
            display_offset: default_display_offset(),
        }
    }

    /// Parses `endpoint` and creates a configuration for it.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid absolute URL.
    pub fn from_endpoint(endpoint: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(endpoint)?))
    }

    /// Sets the `apollographql-client-name` header value.
    #[must_use]
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Sets the `apollographql-client-version` header value.
    #[must_use]
    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    /// Sets the `Api-Consumer-Id` header value.
    #[must_use]
    pub fn with_consumer_id(mut self, consumer_id: impl Into<String>) -> Self {
        self.consumer_id = consumer_id.into();
        self
    }

    /// Sets the offset used for day bounds and slot display.
    #[must_use]
    pub fn with_display_offset(mut self, offset: UtcOffset) -> Self {
        self.display_offset = offset;
        self
    }
}

fn default_display_offset() -> UtcOffset {
    time::macros::offset!(-3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_web_client() {
        let cfg = ClientConfig::from_endpoint("https://pec.example.gov.br/api/graphql").unwrap();
        assert_eq!(cfg.client_name, "PEC Web");
        assert_eq!(cfg.client_version, "5.4.13");
        assert_eq!(cfg.consumer_id, "ESUS_WEB_CLIENT");
        assert_eq!(cfg.display_offset.whole_hours(), -3);
    }

    #[test]
    fn builder_overrides() {
        let cfg = ClientConfig::from_endpoint("http://localhost:8080/api/graphql")
            .unwrap()
            .with_client_version("5.5.0")
            .with_display_offset(UtcOffset::UTC);
        assert_eq!(cfg.client_version, "5.5.0");
        assert_eq!(cfg.display_offset, UtcOffset::UTC);
    }

    #[test]
    fn rejects_relative_endpoint() {
        assert!(ClientConfig::from_endpoint("/api/graphql").is_err());
    }
}
