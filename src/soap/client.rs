use reqwest::header::CONTENT_TYPE;

use super::envelope;
use super::response::*;
use crate::core::*;
use crate::sign::{SigningKeyHandle, sign_xml};
use crate::xml::{self, SerializeOptions};

/// Client for the five SIFEN operations.
///
/// Each operation is one request/response pair with a bounded timeout and no
/// internal retry: submissions are not idempotent (a resubmission may create
/// a duplicate batch entry at the authority), so retrying is a caller
/// decision. Batch polling loops and backoff likewise belong to the caller.
///
/// The client is stateless across requests and safe to share between tasks;
/// the signing key is read-only.
pub struct SifenClient {
    config: SifenConfig,
    key: SigningKeyHandle,
    http: reqwest::Client,
}

impl SifenClient {
    pub fn new(config: SifenConfig, key: SigningKeyHandle) -> Result<Self, SifenError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SifenError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self { config, key, http })
    }

    fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            technical_note_13: self.config.technical_note_13,
        }
    }

    /// Serialize, sign and submit a single document.
    ///
    /// The document must have totals computed and its CDC assigned.
    pub async fn submit_document(
        &self,
        d_id: u64,
        document: &ElectronicDocument,
    ) -> Result<DocumentReceipt, SifenError> {
        let signed = self.sign_document(document)?;
        let request = envelope::submit_document(d_id, &signed)?;
        let body = self
            .dispatch(SifenOperation::SubmitDocument, request)
            .await?;
        decode_document_receipt(&body)
    }

    /// Serialize, sign and submit a batch of documents. The returned receipt
    /// carries the batch number for polling — unless the batch was not
    /// queued, in which case there is nothing to poll.
    pub async fn submit_batch(
        &self,
        d_id: u64,
        batch: &Batch,
    ) -> Result<BatchReceipt, SifenError> {
        if batch.is_empty() {
            return Err(SifenError::IllegalState(
                "cannot submit an empty batch".into(),
            ));
        }
        let signed: Vec<String> = batch
            .documents
            .iter()
            .map(|document| self.sign_document(document))
            .collect::<Result<_, _>>()?;
        let payload = xml::wrap_batch(signed.iter().map(String::as_str))?;
        let request = envelope::submit_batch(d_id, &payload)?;
        let body = self.dispatch(SifenOperation::SubmitBatch, request).await?;
        decode_batch_receipt(&body)
    }

    /// Poll the status of a previously submitted batch. Unsigned.
    pub async fn poll_batch(
        &self,
        d_id: u64,
        batch_number: &str,
    ) -> Result<BatchStatus, SifenError> {
        let request = envelope::poll_batch(d_id, batch_number)?;
        let body = self.dispatch(SifenOperation::PollBatch, request).await?;
        decode_batch_status(&body)
    }

    /// Sign and submit one or more events (cancellation, naming).
    pub async fn submit_event(
        &self,
        d_id: u64,
        events: &[EventEnvelope],
    ) -> Result<EventReceipt, SifenError> {
        if events.is_empty() {
            return Err(SifenError::IllegalState(
                "cannot submit an empty event list".into(),
            ));
        }
        let signed: Vec<String> = events
            .iter()
            .map(|event| {
                let serialized = xml::to_event_xml(event)?;
                sign_xml(&serialized, &event.id, &self.key)
            })
            .collect::<Result<_, _>>()?;
        let request = envelope::submit_event(d_id, signed.iter().map(String::as_str))?;
        let body = self.dispatch(SifenOperation::SubmitEvent, request).await?;
        decode_event_receipt(&body)
    }

    /// Look up a RUC in the taxpayer registry. Unsigned.
    ///
    /// "Not found" and "not authorized" are domain result codes on the
    /// returned [`TaxpayerInfo`], not errors.
    pub async fn lookup_taxpayer(&self, d_id: u64, ruc: &str) -> Result<TaxpayerInfo, SifenError> {
        let request = envelope::lookup_taxpayer(d_id, ruc)?;
        let body = self
            .dispatch(SifenOperation::LookupTaxpayer, request)
            .await?;
        decode_taxpayer_info(&body)
    }

    fn sign_document(&self, document: &ElectronicDocument) -> Result<String, SifenError> {
        let cdc = document.cdc().ok_or_else(|| {
            SifenError::IllegalState("document has no control code assigned".into())
        })?;
        let serialized = xml::to_xml_with(document, &self.serialize_options())?;
        sign_xml(&serialized, cdc.as_str(), &self.key)
    }

    async fn dispatch(
        &self,
        operation: SifenOperation,
        request: String,
    ) -> Result<String, SifenError> {
        let url = self.config.endpoint(operation);
        tracing::debug!(operation = operation.name(), %url, "dispatching request");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, super::envelope::SOAP_CONTENT_TYPE)
            .body(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        // Faults commonly arrive with a non-success status; let the decoder
        // surface them as RemoteFault before treating the status as fatal.
        if !status.is_success() {
            tracing::warn!(operation = operation.name(), %status, "non-success response");
            check_fault(&body)?;
            return Err(SifenError::Transport {
                cancelled: false,
                cause: format!("HTTP {status}"),
            });
        }
        Ok(body)
    }
}

fn transport_error(e: reqwest::Error) -> SifenError {
    SifenError::Transport {
        cancelled: e.is_timeout(),
        cause: e.to_string(),
    }
}
