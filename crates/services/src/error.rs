/// Why coordinate resolution failed. Any structural deviation in the
/// lookup response is an error, never a partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The lookup service could not be reached.
    Transport(String),
    /// Non-success HTTP status from the lookup service.
    Status(u16),
    /// Response body was not parseable JSON.
    Body(String),
    /// `geometry.center` absent, ambiguous, or not two numeric coordinates.
    MissingCenter(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Transport(msg) => write!(f, "lookup request failed: {msg}"),
            LookupError::Status(code) => write!(f, "lookup service returned HTTP {code}"),
            LookupError::Body(msg) => write!(f, "lookup response is not valid JSON: {msg}"),
            LookupError::MissingCenter(msg) => {
                write!(f, "no usable center geometry in lookup response: {msg}")
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Why the risk-feature query failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The feature service could not be reached.
    Transport(String),
    /// Non-success HTTP status from the feature service.
    Status(u16),
    /// Response body was not a parseable feature collection.
    Body(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Transport(msg) => write!(f, "feature query failed: {msg}"),
            QueryError::Status(code) => write!(f, "feature service returned HTTP {code}"),
            QueryError::Body(msg) => write!(f, "feature response is malformed: {msg}"),
        }
    }
}

impl std::error::Error for QueryError {}
