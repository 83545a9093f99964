use crate::core::SifenError;
use crate::xml::{SIFEN_NS, XmlWriter, strip_declaration};

/// SOAP 1.2 envelope namespace.
pub const SOAP_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Content type for SOAP 1.2 dispatches.
pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";

/// Wrap an operation body into a SOAP 1.2 envelope.
fn envelope(body: impl FnOnce(&mut XmlWriter) -> Result<(), SifenError>) -> Result<String, SifenError> {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("env:Envelope", &[("xmlns:env", SOAP_ENV_NS)])?;
    w.start_element("env:Header")?;
    w.end_element("env:Header")?;
    w.start_element("env:Body")?;
    body(&mut w)?;
    w.end_element("env:Body")?;
    w.end_element("env:Envelope")?;
    w.into_string()
}

/// rEnviDe — single-document submission. `signed_de` is the signed rDE tree.
pub fn submit_document(d_id: u64, signed_de: &str) -> Result<String, SifenError> {
    envelope(|w| {
        w.start_element_with_attrs("rEnviDe", &[("xmlns", SIFEN_NS)])?;
        w.text_element("dId", &d_id.to_string())?;
        w.start_element("xDE")?;
        w.raw(strip_declaration(signed_de))?;
        w.end_element("xDE")?;
        w.end_element("rEnviDe")?;
        Ok(())
    })
}

/// rEnvioLote — batch submission. `batch_payload` is the rLoteDE tree of
/// signed documents.
pub fn submit_batch(d_id: u64, batch_payload: &str) -> Result<String, SifenError> {
    envelope(|w| {
        w.start_element_with_attrs("rEnvioLote", &[("xmlns", SIFEN_NS)])?;
        w.text_element("dId", &d_id.to_string())?;
        w.start_element("xDE")?;
        w.raw(strip_declaration(batch_payload))?;
        w.end_element("xDE")?;
        w.end_element("rEnvioLote")?;
        Ok(())
    })
}

/// rEnviConsLoteDe — batch status poll by batch number.
pub fn poll_batch(d_id: u64, batch_number: &str) -> Result<String, SifenError> {
    envelope(|w| {
        w.start_element_with_attrs("rEnviConsLoteDe", &[("xmlns", SIFEN_NS)])?;
        w.text_element("dId", &d_id.to_string())?;
        w.text_element("dProtConsLote", batch_number)?;
        w.end_element("rEnviConsLoteDe")?;
        Ok(())
    })
}

/// rEnviEventoDe — event submission. `signed_events` are signed rGesEve
/// trees, embedded in order.
pub fn submit_event<'a>(
    d_id: u64,
    signed_events: impl IntoIterator<Item = &'a str>,
) -> Result<String, SifenError> {
    envelope(|w| {
        w.start_element_with_attrs("rEnviEventoDe", &[("xmlns", SIFEN_NS)])?;
        w.text_element("dId", &d_id.to_string())?;
        w.start_element("dEvReg")?;
        for event in signed_events {
            w.raw(strip_declaration(event))?;
        }
        w.end_element("dEvReg")?;
        w.end_element("rEnviEventoDe")?;
        Ok(())
    })
}

/// rEnviConsRUC — taxpayer registry lookup.
pub fn lookup_taxpayer(d_id: u64, ruc: &str) -> Result<String, SifenError> {
    envelope(|w| {
        w.start_element_with_attrs("rEnviConsRUC", &[("xmlns", SIFEN_NS)])?;
        w.text_element("dId", &d_id.to_string())?;
        w.text_element("dRUCCons", ruc)?;
        w.end_element("rEnviConsRUC")?;
        Ok(())
    })
}
