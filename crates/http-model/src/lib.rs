//! A completion provider that talks to the web app's conversation route.

#[macro_use]
extern crate tracing;

mod config;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use converse_model::{
    CompletionError, CompletionProvider, CompletionRequest, ErrorKind, Message,
};
use reqwest::{Client, StatusCode, header};

pub use config::{DEFAULT_ROUTE, HttpConfig, HttpConfigBuilder};
pub use response::classify_status;

/// Error type for [`HttpProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    status: Option<StatusCode>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            status: None,
        }
    }

    fn with_status(
        message: impl Into<String>,
        kind: ErrorKind,
        status: StatusCode,
    ) -> Self {
        Self {
            message: message.into(),
            kind,
            status: Some(status),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if the backend answered at all.
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl CompletionError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Completion provider backed by an HTTP route.
///
/// Each request posts `{"messages": [...]}` and expects a single message
/// object back.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    client: Client,
    config: Arc<HttpConfig>,
}

impl HttpProvider {
    /// Creates a new `HttpProvider` with the given configuration.
    #[inline]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl CompletionProvider for HttpProvider {
    type Error = Error;

    fn complete(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>> + Send + 'static
    {
        let endpoint = self.config.endpoint();
        debug!(
            "posting {} messages to {endpoint}",
            req.messages.len()
        );
        let mut builder = self
            .client
            .post(endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(req);
        if let Some(token) = &self.config.bearer_token {
            builder =
                builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let resp_fut = builder.send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Other));
                }
            };
            response::read_reply(resp).await
        }
    }
}
