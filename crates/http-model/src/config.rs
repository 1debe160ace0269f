use std::fmt::Debug;

/// The route the web app exposes for conversation completions.
pub const DEFAULT_ROUTE: &str = "/api/conversation";

/// Builder for [`HttpConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HttpConfigBuilder {
    base_url: String,
    route: Option<String>,
    bearer_token: Option<String>,
}

impl HttpConfigBuilder {
    /// Creates a builder targeting the given origin, e.g.
    /// `https://example.com`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            route: None,
            bearer_token: None,
        }
    }

    /// Sets a custom route. Defaults to [`DEFAULT_ROUTE`].
    #[inline]
    pub fn with_route<S: Into<String>>(mut self, route: S) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Sets a token sent as `Authorization: Bearer <token>`.
    #[inline]
    pub fn with_bearer_token<S: Into<String>>(mut self, token: S) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpConfig {
        let base_url = self.base_url.trim_end_matches('/').to_owned();
        let route = self.route.unwrap_or_else(|| DEFAULT_ROUTE.to_owned());
        let route = if route.starts_with('/') {
            route
        } else {
            format!("/{route}")
        };
        HttpConfig {
            base_url,
            route,
            bearer_token: self.bearer_token,
        }
    }
}

impl Debug for HttpConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfigBuilder")
            .field("base_url", &self.base_url)
            .field("route", &self.route)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "<deducted>"),
            )
            .finish()
    }
}

/// Configuration for the HTTP completion provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HttpConfig {
    pub(crate) base_url: String,
    pub(crate) route: String,
    pub(crate) bearer_token: Option<String>,
}

impl HttpConfig {
    /// Returns the full URL requests are posted to.
    #[inline]
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.route)
    }
}

impl Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("base_url", &self.base_url)
            .field("route", &self.route)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "<deducted>"),
            )
            .finish()
    }
}
