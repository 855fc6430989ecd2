use http::StatusCode;
use thiserror::Error;

/// Errors reported by a counting collaborator.
#[derive(Debug, Clone, Error)]
pub enum CounterError {
    /// The target URL could not be used for counting
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A network could not produce a count
    #[error("Network {network} unavailable: {message}")]
    Unavailable { network: String, message: String },

    /// The retrieval task stopped before producing a result
    #[error("Count retrieval aborted: {0}")]
    Aborted(String),

    /// The collaborator settings object could not be used
    #[error("Invalid counter settings: {0}")]
    InvalidSettings(String),
}

/// Errors that terminate a share count request.
///
/// Every variant maps to exactly one HTTP status and one public message.
/// The public message is what the caller sees; the `Display` output is for
/// logs and may carry more detail.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The `networks` query parameter is missing or empty (HTTP 422)
    #[error("No networks specified")]
    MissingNetworks,

    /// The collaborator does not know one or more requested networks (HTTP 422)
    #[error("Unknown networks: {0:?}")]
    UnknownNetworks(Vec<String>),

    /// Neither `url` nor a `Referer` header was supplied (HTTP 422)
    #[error("No url and no referrer")]
    MissingUrl,

    /// The collaborator failed to retrieve counts (HTTP 500)
    #[error("Count retrieval failed: {0}")]
    Retrieval(#[from] CounterError),

    /// The request is not something this router answers (HTTP 403)
    #[error("Forbidden")]
    Forbidden,
}

impl RequestError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::MissingNetworks
            | RequestError::UnknownNetworks(_)
            | RequestError::MissingUrl => StatusCode::UNPROCESSABLE_ENTITY,
            RequestError::Retrieval(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RequestError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Message written to the `error` field of the response body.
    ///
    /// Server errors get a generic message so collaborator internals never
    /// reach the caller.
    pub fn public_message(&self) -> String {
        match self {
            RequestError::MissingNetworks => "You have to specify which networks you want stats for (networks=facebook,twitter,googleplus)".to_string(),
            RequestError::UnknownNetworks(names) => {
                format!("Unknown network(s) specified: '{}'", names.join("', '"))
            }
            RequestError::MissingUrl => "You asked for the referring urls stats but there is no referring url, specify one manually (&url=https://example.com/)".to_string(),
            RequestError::Retrieval(_) => "There was an unknown error.".to_string(),
            RequestError::Forbidden => "Forbidden".to_string(),
        }
    }
}
