use reqwest::StatusCode;

/// Everything that can go wrong while building or publishing a report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid period \"{0}\", allowed values are \"month\" and \"year\"")]
    InvalidPeriod(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error {status}: {body}")]
    Server { status: StatusCode, body: String },

    #[error("authentication rejected ({status}): {body}")]
    Auth { status: StatusCode, body: String },

    #[error("api error {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classifies a non-success HTTP response.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Error::Server { status, body }
        } else if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            Error::Auth { status, body }
        } else {
            Error::Api { status, body }
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Server { .. } => true,
            Error::Http(err) => {
                err.is_connect()
                    || err.is_timeout()
                    || err.status().is_some_and(|s| s.is_server_error())
            }
            _ => false,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }
}

/// Turns a response into an error unless its status is a success.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::from_status(status, body))
}
