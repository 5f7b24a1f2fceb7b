use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid path rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Unresolved destination: {0}")]
    UnresolvedDestination(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already declared: {0}")]
    DuplicateResource(String),

    #[error("Invalid resource name '{0}'")]
    InvalidResourceName(String),

    #[error("Endpoint '{endpoint}' of resource '{resource}' is already allocated with a different address")]
    EndpointConflict { resource: String, endpoint: String },

    #[error("Unsupported topology apiVersion: {0}")]
    UnsupportedApiVersion(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn invalid_rule(rule: &str, reason: &str) -> Self {
        CoreError::InvalidRule {
            rule: rule.to_string(),
            reason: reason.to_string(),
        }
    }
}
