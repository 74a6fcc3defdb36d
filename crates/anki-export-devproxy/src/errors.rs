use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ProxyError {
    /// The route target and request path did not form a valid URL
    #[error("invalid upstream URL {url}: {source}")]
    InvalidUpstream {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The backend could not be reached or dropped the connection
    #[error("upstream request to {url} failed: {source}")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The incoming request body could not be read or is over the limit
    #[error("failed to read request body: {0}")]
    Body(#[from] BytesRejection),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Body(rejection) => rejection.status(),
            Self::InvalidUpstream { .. } | Self::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(error = %self, status = %status, "proxy request failed");
        (status, self.to_string()).into_response()
    }
}
