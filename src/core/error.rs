use thiserror::Error;

/// Errors that can occur during document construction, signing, or exchange.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SifenError {
    /// Bad or missing configuration value (unknown currency, no endpoint, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// One or more schema invariants failed. Carries every violation found.
    #[error("validation failed with {} violation(s)", .0.len())]
    Validation(Vec<ValidationError>),

    /// Malformed identity field for CDC computation (wrong width, non-digit).
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// Operation invoked out of allowed lifecycle order.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Malformed or schema-incompatible XML on input.
    #[error("parse error: {0}")]
    Parse(String),

    /// Signature creation failure (bad key handle, unresolvable reference).
    #[error("signing error: {0}")]
    Signing(String),

    /// Transport-level failure. `cancelled` is set when the in-flight
    /// dispatch was aborted (timeout or cancellation) rather than refused.
    #[error("transport error (cancelled: {cancelled}): {cause}")]
    Transport { cancelled: bool, cause: String },

    /// A well-formed SOAP fault returned by the remote service.
    #[error("remote fault {code}: {message}")]
    RemoteFault { code: String, message: String },
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "recipient.ruc_check_digit").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// SIFEN manual field code if applicable (e.g. "D206").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a SIFEN manual field code.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
