//! Client configuration, threaded explicitly through constructors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Target environment of the SIFEN service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Production,
    Test,
}

impl Environment {
    fn host(&self) -> &'static str {
        match self {
            Self::Production => "sifen.set.gov.py",
            Self::Test => "sifen-test.set.gov.py",
        }
    }
}

/// One remote capability of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SifenOperation {
    SubmitDocument,
    SubmitBatch,
    PollBatch,
    SubmitEvent,
    LookupTaxpayer,
}

impl SifenOperation {
    /// Path of the operation's endpoint under the environment host.
    fn path(&self) -> &'static str {
        match self {
            Self::SubmitDocument => "de/ws/sync/recibe.wsdl",
            Self::SubmitBatch => "de/ws/async/recibe-lote.wsdl",
            Self::PollBatch => "de/ws/consultas/consulta-lote.wsdl",
            Self::SubmitEvent => "de/ws/eventos/evento.wsdl",
            Self::LookupTaxpayer => "de/ws/consultas/consulta-ruc.wsdl",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitDocument => "submit-document",
            Self::SubmitBatch => "submit-batch",
            Self::PollBatch => "poll-batch",
            Self::SubmitEvent => "submit-event",
            Self::LookupTaxpayer => "lookup-taxpayer",
        }
    }
}

/// Configuration consumed by the engine. Opaque to the document model; the
/// caller decides where the values come from.
#[derive(Debug, Clone)]
pub struct SifenConfig {
    pub environment: Environment,
    /// Per-request dispatch timeout. No internal retry.
    pub timeout: Duration,
    pub user_agent: String,
    /// Enables the additional technical-note field set on serialized items.
    pub technical_note_13: bool,
    /// Per-operation endpoint overrides; environment defaults apply
    /// otherwise.
    endpoint_overrides: Vec<(SifenOperation, String)>,
}

impl SifenConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            timeout: Duration::from_secs(45),
            user_agent: concat!("sifen-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            technical_note_13: false,
            endpoint_overrides: Vec::new(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn technical_note_13(mut self, enabled: bool) -> Self {
        self.technical_note_13 = enabled;
        self
    }

    /// Override the endpoint URL for one operation.
    pub fn endpoint_override(mut self, operation: SifenOperation, url: impl Into<String>) -> Self {
        self.endpoint_overrides.retain(|(op, _)| *op != operation);
        self.endpoint_overrides.push((operation, url.into()));
        self
    }

    /// Resolve the endpoint URL for an operation.
    pub fn endpoint(&self, operation: SifenOperation) -> String {
        self.endpoint_overrides
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, url)| url.clone())
            .unwrap_or_else(|| {
                format!("https://{}/{}", self.environment.host(), operation.path())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_follow_environment() {
        let cfg = SifenConfig::new(Environment::Test);
        assert_eq!(
            cfg.endpoint(SifenOperation::LookupTaxpayer),
            "https://sifen-test.set.gov.py/de/ws/consultas/consulta-ruc.wsdl"
        );
        let cfg = SifenConfig::new(Environment::Production);
        assert_eq!(
            cfg.endpoint(SifenOperation::SubmitDocument),
            "https://sifen.set.gov.py/de/ws/sync/recibe.wsdl"
        );
    }

    #[test]
    fn override_wins_over_default() {
        let cfg = SifenConfig::new(Environment::Test)
            .endpoint_override(SifenOperation::PollBatch, "https://localhost:8443/lote");
        assert_eq!(
            cfg.endpoint(SifenOperation::PollBatch),
            "https://localhost:8443/lote"
        );
        assert!(cfg.endpoint(SifenOperation::SubmitBatch).contains("sifen-test"));
    }
}
