//! Typed decoding of the heterogeneous SIFEN response shapes.
//!
//! Remote business-rule outcomes (a RUC that does not exist, a batch that
//! was not queued) are successful decodes carrying a domain result code —
//! only SOAP faults and structural failures are errors. Unknown elements
//! are skipped for forward compatibility; unrecognized result codes pass
//! through as-is.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::SifenError;

/// dCodRes indicating a batch was received and queued.
pub const BATCH_QUEUED: &str = "0300";
/// dCodRes indicating a batch was rejected before queueing.
pub const BATCH_NOT_QUEUED: &str = "0301";

/// dCodRes indicating the queried RUC does not exist.
pub const RUC_NOT_FOUND: &str = "0500";
/// dCodRes indicating the querying RUC may not use the service.
pub const RUC_NOT_AUTHORIZED: &str = "0501";
/// dCodRes indicating the queried RUC exists and a record follows.
pub const RUC_FOUND: &str = "0502";

/// gResProc — one processing result code/message pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingResult {
    /// dCodRes.
    pub code: String,
    /// dMsgRes.
    pub message: String,
}

/// Result of a single-document submission (rRetEnviDe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReceipt {
    /// dFecProc: remote processing timestamp, verbatim.
    pub processed_at: Option<String>,
    /// dEstRes: result state ("Aprobado", "Rechazado").
    pub state: String,
    /// dProtAut: authorization protocol number, when approved.
    pub protocol: Option<String>,
    pub results: Vec<ProcessingResult>,
}

/// Result of a batch submission (rResEnviLoteDe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReceipt {
    pub processed_at: Option<String>,
    /// dCodRes.
    pub code: String,
    /// dMsgRes.
    pub message: String,
    /// dProtConsLote: batch number for later polling; absent when not
    /// queued.
    pub batch_number: Option<String>,
}

impl BatchReceipt {
    /// False when the batch was rejected before queueing — in that case
    /// there is nothing to poll.
    pub fn is_queued(&self) -> bool {
        self.code == BATCH_QUEUED && self.batch_number.is_some()
    }
}

/// Per-document sub-result of a batch poll (gResProcLote).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchItemResult {
    /// id: CDC of the document this sub-result refers to.
    pub cdc: String,
    /// dEstRes.
    pub state: String,
    pub results: Vec<ProcessingResult>,
}

/// Result of a batch status poll (rResEnviConsLoteDe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatus {
    pub processed_at: Option<String>,
    /// dCodResLot.
    pub code: String,
    /// dMsgResLot.
    pub message: String,
    pub items: Vec<BatchItemResult>,
}

/// Per-event sub-result of an event submission (gResProcEVe).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventResult {
    /// Id of the submitted event envelope.
    pub id: String,
    /// dEstRes.
    pub state: String,
    pub results: Vec<ProcessingResult>,
}

/// Result of an event submission (rRetEnviEventoDe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReceipt {
    pub results: Vec<EventResult>,
}

/// xContRUC — taxpayer registry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxpayerRecord {
    /// dRUCCons.
    pub ruc: String,
    /// dRazCons.
    pub legal_name: String,
    /// dCodEstCons: registry status code.
    pub status: String,
    /// dRUCFactElec: whether the taxpayer is an electronic invoicer.
    pub einvoice_enabled: bool,
}

/// Result of a taxpayer lookup (rResEnviConsRUC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxpayerInfo {
    pub processed_at: Option<String>,
    /// dCodRes.
    pub code: String,
    /// dMsgRes.
    pub message: String,
    /// Present when the lookup succeeded (code 0502).
    pub record: Option<TaxpayerRecord>,
}

impl TaxpayerInfo {
    /// The queried RUC does not exist.
    pub fn not_found(&self) -> bool {
        self.code == RUC_NOT_FOUND
    }

    /// The caller is not authorized for this service — distinct from the
    /// RUC not existing.
    pub fn not_authorized(&self) -> bool {
        self.code == RUC_NOT_AUTHORIZED
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Detect a SOAP fault (1.1 or 1.2 vocabulary). Surfaced as
/// `SifenError::RemoteFault` so callers see the remote diagnosis instead of
/// a generic decode failure.
pub fn check_fault(xml: &str) -> Result<(), SifenError> {
    let mut in_fault = false;
    let mut code: Option<String> = None;
    let mut message: Option<String> = None;

    walk(xml, |node| match node {
        Node::Text { path, leaf, text } => {
            if !path.iter().any(|p| p == "Fault") {
                return;
            }
            in_fault = true;
            match leaf {
                "Value" | "faultcode" if code.is_none() => code = Some(text.to_string()),
                "Text" | "faultstring" => message = Some(text.to_string()),
                _ => {}
            }
        }
        Node::Start { name: "Fault", .. } => in_fault = true,
        _ => {}
    })?;

    if in_fault {
        Err(SifenError::RemoteFault {
            code: code.unwrap_or_else(|| "Unknown".into()),
            message: message.unwrap_or_else(|| "unspecified SOAP fault".into()),
        })
    } else {
        Ok(())
    }
}

/// Decode the response to a single-document submission.
pub fn decode_document_receipt(xml: &str) -> Result<DocumentReceipt, SifenError> {
    check_fault(xml)?;

    let mut processed_at = None;
    let mut state = None;
    let mut protocol = None;
    let mut results: Vec<ProcessingResult> = Vec::new();
    let mut current: Option<ProcessingResult> = None;

    walk(xml, |node| match node {
        Node::Text { path, leaf, text } => {
            if path.iter().any(|p| p == "gResProc") {
                let result = current.get_or_insert_with(Default::default);
                match leaf {
                    "dCodRes" => result.code = text.to_string(),
                    "dMsgRes" => result.message = text.to_string(),
                    _ => {}
                }
                return;
            }
            match leaf {
                "dFecProc" => processed_at = Some(text.to_string()),
                "dEstRes" => state = Some(text.to_string()),
                "dProtAut" => protocol = Some(text.to_string()),
                _ => {}
            }
        }
        Node::End("gResProc") => {
            if let Some(result) = current.take() {
                results.push(result);
            }
        }
        _ => {}
    })?;

    Ok(DocumentReceipt {
        processed_at,
        state: state
            .ok_or_else(|| SifenError::Parse("required element dEstRes is missing".into()))?,
        protocol,
        results,
    })
}

/// Decode the response to a batch submission.
pub fn decode_batch_receipt(xml: &str) -> Result<BatchReceipt, SifenError> {
    check_fault(xml)?;

    let mut processed_at = None;
    let mut code = None;
    let mut message = None;
    let mut batch_number: Option<String> = None;

    walk(xml, |node| {
        if let Node::Text { leaf, text, .. } = node {
            match leaf {
                "dFecProc" => processed_at = Some(text.to_string()),
                "dCodRes" => code = Some(text.to_string()),
                "dMsgRes" => message = Some(text.to_string()),
                "dProtConsLote" => batch_number = Some(text.to_string()),
                _ => {}
            }
        }
    })?;

    Ok(BatchReceipt {
        processed_at,
        code: code
            .ok_or_else(|| SifenError::Parse("required element dCodRes is missing".into()))?,
        message: message.unwrap_or_default(),
        batch_number: batch_number.filter(|n| !n.is_empty()),
    })
}

/// Decode the response to a batch status poll.
pub fn decode_batch_status(xml: &str) -> Result<BatchStatus, SifenError> {
    check_fault(xml)?;

    let mut processed_at = None;
    let mut code = None;
    let mut message = None;
    let mut items: Vec<BatchItemResult> = Vec::new();
    let mut current_item: Option<BatchItemResult> = None;
    let mut current_result: Option<ProcessingResult> = None;

    walk(xml, |node| match node {
        Node::Text { path, leaf, text } => {
            if path.iter().any(|p| p == "gResProcLote") {
                if path.iter().any(|p| p == "gResProc") {
                    let result = current_result.get_or_insert_with(Default::default);
                    match leaf {
                        "dCodRes" => result.code = text.to_string(),
                        "dMsgRes" => result.message = text.to_string(),
                        _ => {}
                    }
                    return;
                }
                let item = current_item.get_or_insert_with(Default::default);
                match leaf {
                    "id" | "Id" => item.cdc = text.to_string(),
                    "dEstRes" => item.state = text.to_string(),
                    _ => {}
                }
                return;
            }
            match leaf {
                "dFecProc" => processed_at = Some(text.to_string()),
                "dCodResLot" => code = Some(text.to_string()),
                "dMsgResLot" => message = Some(text.to_string()),
                _ => {}
            }
        }
        Node::End("gResProc") => {
            if let (Some(result), Some(item)) = (current_result.take(), current_item.as_mut()) {
                item.results.push(result);
            }
        }
        Node::End("gResProcLote") => {
            if let Some(item) = current_item.take() {
                items.push(item);
            }
        }
        _ => {}
    })?;

    Ok(BatchStatus {
        processed_at,
        code: code
            .ok_or_else(|| SifenError::Parse("required element dCodResLot is missing".into()))?,
        message: message.unwrap_or_default(),
        items,
    })
}

/// Decode the response to an event submission.
pub fn decode_event_receipt(xml: &str) -> Result<EventReceipt, SifenError> {
    check_fault(xml)?;

    let mut results: Vec<EventResult> = Vec::new();
    let mut current_event: Option<EventResult> = None;
    let mut current_result: Option<ProcessingResult> = None;

    walk(xml, |node| match node {
        Node::Start { name, id } => {
            if name == "gResProcEVe" {
                let event = current_event.get_or_insert_with(Default::default);
                if let Some(id) = id {
                    event.id = id;
                }
            }
        }
        Node::Text { path, leaf, text } => {
            if !path.iter().any(|p| p == "gResProcEVe") {
                return;
            }
            if path.iter().any(|p| p == "gResProc") {
                let result = current_result.get_or_insert_with(Default::default);
                match leaf {
                    "dCodRes" => result.code = text.to_string(),
                    "dMsgRes" => result.message = text.to_string(),
                    _ => {}
                }
                return;
            }
            let event = current_event.get_or_insert_with(Default::default);
            match leaf {
                "id" | "Id" => event.id = text.to_string(),
                "dEstRes" => event.state = text.to_string(),
                _ => {}
            }
        }
        Node::End("gResProc") => {
            if let (Some(result), Some(event)) = (current_result.take(), current_event.as_mut()) {
                event.results.push(result);
            }
        }
        Node::End("gResProcEVe") => {
            if let Some(event) = current_event.take() {
                results.push(event);
            }
        }
        _ => {}
    })?;

    Ok(EventReceipt { results })
}

/// Decode the response to a taxpayer lookup.
pub fn decode_taxpayer_info(xml: &str) -> Result<TaxpayerInfo, SifenError> {
    check_fault(xml)?;

    let mut processed_at = None;
    let mut code = None;
    let mut message = None;
    let mut ruc = None;
    let mut legal_name = None;
    let mut status = None;
    let mut einvoice = None;

    walk(xml, |node| {
        if let Node::Text { path, leaf, text } = node {
            if path.iter().any(|p| p == "xContRUC") {
                match leaf {
                    "dRUCCons" => ruc = Some(text.to_string()),
                    "dRazCons" => legal_name = Some(text.to_string()),
                    "dCodEstCons" => status = Some(text.to_string()),
                    "dRUCFactElec" => einvoice = Some(text.eq_ignore_ascii_case("S")),
                    _ => {}
                }
                return;
            }
            match leaf {
                "dFecProc" => processed_at = Some(text.to_string()),
                "dCodRes" => code = Some(text.to_string()),
                "dMsgRes" => message = Some(text.to_string()),
                _ => {}
            }
        }
    })?;

    let record = match (ruc, legal_name) {
        (Some(ruc), Some(legal_name)) => Some(TaxpayerRecord {
            ruc,
            legal_name,
            status: status.unwrap_or_default(),
            einvoice_enabled: einvoice.unwrap_or(false),
        }),
        _ => None,
    };

    Ok(TaxpayerInfo {
        processed_at,
        code: code
            .ok_or_else(|| SifenError::Parse("required element dCodRes is missing".into()))?,
        message: message.unwrap_or_default(),
        record,
    })
}

// ---------------------------------------------------------------------------
// Streaming helper
// ---------------------------------------------------------------------------

/// One event surfaced while streaming a response document.
enum Node<'a> {
    Start { name: &'a str, id: Option<String> },
    Text {
        path: &'a [String],
        leaf: &'a str,
        text: &'a str,
    },
    End(&'a str),
}

/// Stream the document by local element names, prefix-agnostic. Unknown
/// elements simply flow through, which keeps decoding forward-compatible.
fn walk(xml: &str, mut f: impl FnMut(Node<'_>)) -> Result<(), SifenError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref())
                    .unwrap_or("")
                    .to_string();
                let id = e.attributes().flatten().find_map(|attr| {
                    (attr.key.as_ref() == b"Id")
                        .then(|| String::from_utf8_lossy(&attr.value).into_owned())
                });
                f(Node::Start { name: &name, id });
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    let leaf = path.last().cloned().unwrap_or_default();
                    f(Node::Text {
                        path: &path,
                        leaf: &leaf,
                        text: &text,
                    });
                }
            }
            Ok(Event::End(_)) => {
                if let Some(ended) = path.pop() {
                    f(Node::End(&ended));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SifenError::Parse(format!("malformed XML: {e}"))),
            _ => {}
        }
    }
    Ok(())
}
