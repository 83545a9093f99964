//! Envelope construction and response decoding tests.
//!
//! Run with: `cargo test --features all --test soap_tests`

#![cfg(feature = "client")]

use sifen::core::*;
use sifen::soap::*;

fn soap_body(inner: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <env:Envelope xmlns:env=\"http://www.w3.org/2003/05/soap-envelope\">\
         <env:Body>{inner}</env:Body></env:Envelope>"
    )
}

// --- Envelopes ---

#[test]
fn submit_document_envelope_structure() {
    let signed = "<?xml version=\"1.0\"?><rDE><DE Id=\"x\">content</DE></rDE>";
    let request = envelope::submit_document(7, signed).unwrap();
    assert!(request.contains("<env:Envelope"));
    assert!(request.contains("<env:Header></env:Header>"));
    assert!(request.contains("<rEnviDe xmlns=\"http://ekuatia.set.gov.py/sifen/xsd\">"));
    assert!(request.contains("<dId>7</dId>"));
    // embedded tree keeps its content but loses its declaration
    assert!(request.contains("<xDE><rDE>"));
    assert_eq!(request.matches("<?xml").count(), 1);
}

#[test]
fn poll_batch_envelope_carries_the_batch_number() {
    let request = envelope::poll_batch(2, "12345678901234").unwrap();
    assert!(request.contains("<rEnviConsLoteDe"));
    assert!(request.contains("<dProtConsLote>12345678901234</dProtConsLote>"));
}

#[test]
fn lookup_envelope_carries_the_ruc() {
    let request = envelope::lookup_taxpayer(3, "80089752").unwrap();
    assert!(request.contains("<rEnviConsRUC"));
    assert!(request.contains("<dRUCCons>80089752</dRUCCons>"));
}

// --- Fault decoding ---

#[test]
fn soap12_fault_decodes_to_remote_fault() {
    let body = soap_body(
        "<env:Fault>\
         <env:Code><env:Value>env:Receiver</env:Value></env:Code>\
         <env:Reason><env:Text xml:lang=\"es\">Error interno del servidor</env:Text></env:Reason>\
         </env:Fault>",
    );
    let err = decode_document_receipt(&body).unwrap_err();
    let SifenError::RemoteFault { code, message } = err else {
        panic!("expected a remote fault");
    };
    assert_eq!(code, "env:Receiver");
    assert_eq!(message, "Error interno del servidor");
}

#[test]
fn soap11_fault_vocabulary_is_also_understood() {
    let body = "<?xml version=\"1.0\"?>\
        <soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
        <soapenv:Body><soapenv:Fault>\
        <faultcode>soapenv:Server</faultcode>\
        <faultstring>Servicio no disponible</faultstring>\
        </soapenv:Fault></soapenv:Body></soapenv:Envelope>";
    let err = decode_taxpayer_info(body).unwrap_err();
    assert!(matches!(err, SifenError::RemoteFault { .. }));
}

// --- Document receipt ---

#[test]
fn document_receipt_decodes_nested_results() {
    let body = soap_body(
        "<ns2:rRetEnviDe xmlns:ns2=\"http://ekuatia.set.gov.py/sifen/xsd\">\
         <ns2:rProtDe>\
         <ns2:dFecProc>2024-06-15T10:31:05</ns2:dFecProc>\
         <ns2:dEstRes>Aprobado</ns2:dEstRes>\
         <ns2:dProtAut>760000000001</ns2:dProtAut>\
         <ns2:gResProc><ns2:dCodRes>0260</ns2:dCodRes>\
         <ns2:dMsgRes>Autorizado el DE</ns2:dMsgRes></ns2:gResProc>\
         </ns2:rProtDe></ns2:rRetEnviDe>",
    );
    let receipt = decode_document_receipt(&body).unwrap();
    assert_eq!(receipt.state, "Aprobado");
    assert_eq!(receipt.protocol.as_deref(), Some("760000000001"));
    assert_eq!(receipt.results.len(), 1);
    assert_eq!(receipt.results[0].code, "0260");
    assert_eq!(receipt.results[0].message, "Autorizado el DE");
}

#[test]
fn document_receipt_requires_a_result_state() {
    let body = soap_body("<rRetEnviDe><rProtDe></rProtDe></rRetEnviDe>");
    assert!(matches!(
        decode_document_receipt(&body),
        Err(SifenError::Parse(_))
    ));
}

// --- Batch submission + poll ---

#[test]
fn queued_batch_carries_its_number() {
    let body = soap_body(
        "<rResEnviLoteDe>\
         <dFecProc>2024-06-15T10:31:05</dFecProc>\
         <dCodRes>0300</dCodRes><dMsgRes>Lote recibido con éxito</dMsgRes>\
         <dProtConsLote>12345678901234</dProtConsLote>\
         </rResEnviLoteDe>",
    );
    let receipt = decode_batch_receipt(&body).unwrap();
    assert!(receipt.is_queued());
    assert_eq!(receipt.batch_number.as_deref(), Some("12345678901234"));
}

#[test]
fn not_queued_batch_short_circuits_polling() {
    let body = soap_body(
        "<rResEnviLoteDe>\
         <dCodRes>0301</dCodRes><dMsgRes>Lote no encolado para procesamiento</dMsgRes>\
         </rResEnviLoteDe>",
    );
    let receipt = decode_batch_receipt(&body).unwrap();
    // unrecognized-by-us codes pass through; 0301 means nothing to poll
    assert_eq!(receipt.code, BATCH_NOT_QUEUED);
    assert!(!receipt.is_queued());
    assert!(receipt.batch_number.is_none());
}

#[test]
fn batch_status_decodes_per_document_sub_results() {
    let body = soap_body(
        "<rResEnviConsLoteDe>\
         <dFecProc>2024-06-15T11:00:00</dFecProc>\
         <dCodResLot>0362</dCodResLot><dMsgResLot>Procesado</dMsgResLot>\
         <gResProcLote>\
         <id>01800897521001002000002112024061510000001236</id>\
         <dEstRes>Aprobado</dEstRes>\
         <gResProc><dCodRes>0260</dCodRes><dMsgRes>Autorizado el DE</dMsgRes></gResProc>\
         </gResProcLote>\
         <gResProcLote>\
         <id>01800897521001002000002212024061510000004567</id>\
         <dEstRes>Rechazado</dEstRes>\
         <gResProc><dCodRes>0412</dCodRes><dMsgRes>CDC duplicado</dMsgRes></gResProc>\
         <gResProc><dCodRes>1001</dCodRes><dMsgRes>Timbrado vencido</dMsgRes></gResProc>\
         </gResProcLote>\
         </rResEnviConsLoteDe>",
    );
    let status = decode_batch_status(&body).unwrap();
    assert_eq!(status.code, "0362");
    assert_eq!(status.items.len(), 2);
    assert_eq!(status.items[0].state, "Aprobado");
    assert_eq!(status.items[1].state, "Rechazado");
    assert_eq!(status.items[1].results.len(), 2);
    assert_eq!(status.items[1].results[1].code, "1001");
}

// --- Events ---

#[test]
fn event_receipt_decodes_per_event_results() {
    let body = soap_body(
        "<rRetEnviEventoDe>\
         <gResProcEVe>\
         <id>1</id><dEstRes>Aprobado</dEstRes>\
         <gResProc><dCodRes>0600</dCodRes><dMsgRes>Evento registrado</dMsgRes></gResProc>\
         </gResProcEVe>\
         <gResProcEVe>\
         <id>2</id><dEstRes>Rechazado</dEstRes>\
         <gResProc><dCodRes>4001</dCodRes><dMsgRes>CDC inexistente</dMsgRes></gResProc>\
         </gResProcEVe>\
         </rRetEnviEventoDe>",
    );
    let receipt = decode_event_receipt(&body).unwrap();
    assert_eq!(receipt.results.len(), 2);
    assert_eq!(receipt.results[0].id, "1");
    assert_eq!(receipt.results[0].state, "Aprobado");
    assert_eq!(receipt.results[1].results[0].code, "4001");
}

// --- Taxpayer lookup ---

fn ruc_response(code: &str, message: &str, record: &str) -> String {
    soap_body(&format!(
        "<rResEnviConsRUC>\
         <dFecProc>2024-06-15T10:31:00</dFecProc>\
         <dCodRes>{code}</dCodRes><dMsgRes>{message}</dMsgRes>{record}\
         </rResEnviConsRUC>"
    ))
}

#[test]
fn found_ruc_carries_a_record() {
    let body = ruc_response(
        "0502",
        "RUC encontrado",
        "<xContRUC>\
         <dRUCCons>80089752</dRUCCons>\
         <dRazCons>ACME S.A.</dRazCons>\
         <dCodEstCons>ACT</dCodEstCons>\
         <dRUCFactElec>S</dRUCFactElec>\
         </xContRUC>",
    );
    let info = decode_taxpayer_info(&body).unwrap();
    assert!(!info.not_found());
    assert!(!info.not_authorized());
    let record = info.record.as_ref().unwrap();
    assert_eq!(record.ruc, "80089752");
    assert_eq!(record.legal_name, "ACME S.A.");
    assert!(record.einvoice_enabled);
}

#[test]
fn not_found_and_not_authorized_stay_distinguishable() {
    let not_found = decode_taxpayer_info(&ruc_response("0500", "RUC no existe", "")).unwrap();
    assert!(not_found.not_found());
    assert!(!not_found.not_authorized());
    assert!(not_found.record.is_none());

    let not_authorized = decode_taxpayer_info(&ruc_response(
        "0501",
        "RUC sin permiso para el servicio",
        "",
    ))
    .unwrap();
    assert!(not_authorized.not_authorized());
    assert!(!not_authorized.not_found());
    assert!(not_authorized.record.is_none());

    // both are domain outcomes, not errors, and their messages differ
    assert_ne!(not_found.message, not_authorized.message);
    assert_ne!(not_found.code, not_authorized.code);
}

#[test]
fn unrecognized_result_codes_pass_through() {
    let info = decode_taxpayer_info(&ruc_response("9999", "Código futuro", "")).unwrap();
    assert_eq!(info.code, "9999");
    assert_eq!(info.message, "Código futuro");
}

// --- Client construction ---

#[test]
fn client_applies_endpoint_overrides() {
    let config = SifenConfig::new(Environment::Test)
        .endpoint_override(SifenOperation::LookupTaxpayer, "https://localhost:9443/ruc");
    assert_eq!(
        config.endpoint(SifenOperation::LookupTaxpayer),
        "https://localhost:9443/ruc"
    );
    assert_eq!(
        config.endpoint(SifenOperation::SubmitDocument),
        "https://sifen-test.set.gov.py/de/ws/sync/recibe.wsdl"
    );
}
