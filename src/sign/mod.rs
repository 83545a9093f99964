//! Enveloped XML digital signature over canonical document trees.
//!
//! The signature references the signed element by its Id attribute — a
//! document's CDC, or an event envelope's id. The digest is SHA-256 over the
//! element's canonical bytes (any embedded Signature removed), and the
//! signature value is RSA PKCS#1 v1.5 over the canonical SignedInfo.
//!
//! Verification returns a structured [`SignatureValidity`] rather than a
//! bare boolean, so callers can distinguish tampering from expired or
//! untrusted credentials.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDateTime;
use quick_xml::Reader;
use quick_xml::events::Event;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::core::SifenError;
use crate::xml::XmlWriter;

/// XML-DSig namespace.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

const C14N_ALGORITHM: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
const SIGNATURE_ALGORITHM: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
const ENVELOPED_TRANSFORM: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
const DIGEST_ALGORITHM: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

/// Signing key material supplied by the caller. The engine never mutates it;
/// load once, use many.
#[derive(Clone)]
pub struct SigningKeyHandle {
    private_key: RsaPrivateKey,
    certificate_der: Vec<u8>,
    subject: String,
}

impl SigningKeyHandle {
    pub fn new(
        private_key: RsaPrivateKey,
        certificate_der: Vec<u8>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            private_key,
            certificate_der,
            subject: subject.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// SHA-256 fingerprint of the certificate, base64-encoded.
    pub fn fingerprint(&self) -> String {
        BASE64.encode(Sha256::digest(&self.certificate_der))
    }
}

impl std::fmt::Debug for SigningKeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // key material stays out of debug output
        f.debug_struct("SigningKeyHandle")
            .field("subject", &self.subject)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// A certificate the verifier is willing to accept, with its validity
/// window. Fingerprints are base64 SHA-256 over the certificate DER.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    pub subject: String,
    pub fingerprint: String,
    pub not_before: NaiveDateTime,
    pub not_after: NaiveDateTime,
}

impl TrustAnchor {
    /// Anchor trusting the certificate of a key handle for a validity
    /// window.
    pub fn for_handle(
        handle: &SigningKeyHandle,
        not_before: NaiveDateTime,
        not_after: NaiveDateTime,
    ) -> Self {
        Self {
            subject: handle.subject.clone(),
            fingerprint: handle.fingerprint(),
            not_before,
            not_after,
        }
    }
}

/// Why a signature failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidityReason {
    DigestMismatch,
    SignatureMismatch,
    CertificateExpired,
    CertificateUntrusted,
    MalformedSignature(String),
}

impl std::fmt::Display for InvalidityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DigestMismatch => write!(f, "digest mismatch"),
            Self::SignatureMismatch => write!(f, "signature mismatch"),
            Self::CertificateExpired => write!(f, "certificate expired"),
            Self::CertificateUntrusted => write!(f, "certificate untrusted"),
            Self::MalformedSignature(detail) => write!(f, "malformed signature: {detail}"),
        }
    }
}

/// Outcome of signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureValidity {
    pub valid: bool,
    pub reason: Option<InvalidityReason>,
}

impl SignatureValidity {
    fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn invalid(reason: InvalidityReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Sign the element referenced by `reference_id` and embed the signature
/// block as the final child of the document root.
///
/// # Errors
///
/// `SifenError::Signing` when the reference cannot be resolved or the key
/// rejects the operation.
pub fn sign_xml(
    xml: &str,
    reference_id: &str,
    handle: &SigningKeyHandle,
) -> Result<String, SifenError> {
    let element = referenced_element(xml, reference_id).ok_or_else(|| {
        SifenError::Signing(format!(
            "reference target Id={reference_id:?} cannot be resolved"
        ))
    })?;
    let digest = BASE64.encode(Sha256::digest(strip_signature(element).as_bytes()));

    let signed_info = build_signed_info(reference_id, &digest)?;
    let signing_key = SigningKey::<Sha256>::new(handle.private_key.clone());
    let signature = signing_key
        .try_sign(signed_info.as_bytes())
        .map_err(|e| SifenError::Signing(format!("key rejected signing operation: {e}")))?;
    let signature_b64 = BASE64.encode(signature.to_bytes());

    let public_key = handle.private_key.to_public_key();
    let modulus_b64 = BASE64.encode(public_key.n().to_bytes_be());
    let exponent_b64 = BASE64.encode(public_key.e().to_bytes_be());
    let certificate_b64 = BASE64.encode(&handle.certificate_der);

    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs("Signature", &[("xmlns", XMLDSIG_NS)])?;
    w.raw(&signed_info)?;
    w.text_element("SignatureValue", &signature_b64)?;
    w.start_element("KeyInfo")?;
    w.start_element("KeyValue")?;
    w.start_element("RSAKeyValue")?;
    w.text_element("Modulus", &modulus_b64)?;
    w.text_element("Exponent", &exponent_b64)?;
    w.end_element("RSAKeyValue")?;
    w.end_element("KeyValue")?;
    w.start_element("X509Data")?;
    w.text_element("X509Certificate", &certificate_b64)?;
    w.end_element("X509Data")?;
    w.end_element("KeyInfo")?;
    w.end_element("Signature")?;
    let signature_block = w.into_string()?;

    // final child of the document root
    let insert_at = xml.rfind("</").ok_or_else(|| {
        SifenError::Signing("document has no root element to envelope into".into())
    })?;
    let mut signed = String::with_capacity(xml.len() + signature_block.len());
    signed.push_str(&xml[..insert_at]);
    signed.push_str(&signature_block);
    signed.push_str(&xml[insert_at..]);
    Ok(signed)
}

/// Verify an enveloped signature: digest, signature value, then certificate
/// trust and validity against the supplied anchors at time `now`.
pub fn verify_xml(
    signed_xml: &str,
    anchors: &[TrustAnchor],
    now: NaiveDateTime,
) -> SignatureValidity {
    let parts = match extract_signature_parts(signed_xml) {
        Ok(parts) => parts,
        Err(detail) => {
            return SignatureValidity::invalid(InvalidityReason::MalformedSignature(detail));
        }
    };

    let Some(element) = referenced_element(signed_xml, &parts.reference_id) else {
        return SignatureValidity::invalid(InvalidityReason::MalformedSignature(format!(
            "reference target Id={:?} not found",
            parts.reference_id
        )));
    };
    let digest = BASE64.encode(Sha256::digest(strip_signature(element).as_bytes()));
    if digest != parts.digest_value {
        return SignatureValidity::invalid(InvalidityReason::DigestMismatch);
    }

    let signed_info = match build_signed_info(&parts.reference_id, &parts.digest_value) {
        Ok(si) => si,
        Err(e) => {
            return SignatureValidity::invalid(InvalidityReason::MalformedSignature(e.to_string()));
        }
    };
    let public_key = match decode_public_key(&parts.modulus, &parts.exponent) {
        Ok(key) => key,
        Err(detail) => {
            return SignatureValidity::invalid(InvalidityReason::MalformedSignature(detail));
        }
    };
    let signature_bytes = match BASE64.decode(parts.signature_value.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            return SignatureValidity::invalid(InvalidityReason::MalformedSignature(format!(
                "signature value is not base64: {e}"
            )));
        }
    };
    let signature = match Signature::try_from(signature_bytes.as_slice()) {
        Ok(sig) => sig,
        Err(e) => {
            return SignatureValidity::invalid(InvalidityReason::MalformedSignature(format!(
                "signature value is not a valid RSA signature: {e}"
            )));
        }
    };
    let verifying_key = VerifyingKey::<Sha256>::new(public_key);
    if verifying_key
        .verify(signed_info.as_bytes(), &signature)
        .is_err()
    {
        return SignatureValidity::invalid(InvalidityReason::SignatureMismatch);
    }

    let certificate_der = match BASE64.decode(parts.certificate.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            return SignatureValidity::invalid(InvalidityReason::MalformedSignature(format!(
                "certificate is not base64: {e}"
            )));
        }
    };
    let fingerprint = BASE64.encode(Sha256::digest(&certificate_der));
    let Some(anchor) = anchors.iter().find(|a| a.fingerprint == fingerprint) else {
        return SignatureValidity::invalid(InvalidityReason::CertificateUntrusted);
    };
    if now < anchor.not_before || now > anchor.not_after {
        return SignatureValidity::invalid(InvalidityReason::CertificateExpired);
    }

    SignatureValidity::valid()
}

/// Canonical SignedInfo bytes for a reference id and digest. Signer and
/// verifier must produce identical output.
fn build_signed_info(reference_id: &str, digest_b64: &str) -> Result<String, SifenError> {
    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs("SignedInfo", &[("xmlns", XMLDSIG_NS)])?;
    w.empty_element_with_attrs("CanonicalizationMethod", &[("Algorithm", C14N_ALGORITHM)])?;
    w.empty_element_with_attrs("SignatureMethod", &[("Algorithm", SIGNATURE_ALGORITHM)])?;
    w.start_element_with_attrs("Reference", &[("URI", &format!("#{reference_id}"))])?;
    w.start_element("Transforms")?;
    w.empty_element_with_attrs("Transform", &[("Algorithm", ENVELOPED_TRANSFORM)])?;
    w.empty_element_with_attrs("Transform", &[("Algorithm", C14N_ALGORITHM)])?;
    w.end_element("Transforms")?;
    w.empty_element_with_attrs("DigestMethod", &[("Algorithm", DIGEST_ALGORITHM)])?;
    w.text_element("DigestValue", digest_b64)?;
    w.end_element("Reference")?;
    w.end_element("SignedInfo")?;
    w.into_string()
}

/// Locate the full element whose opening tag carries `Id="reference_id"`.
fn referenced_element<'a>(xml: &'a str, reference_id: &str) -> Option<&'a str> {
    let marker = format!("Id=\"{reference_id}\"");
    let marker_at = xml.find(&marker)?;
    let start = xml[..marker_at].rfind('<')?;
    let name_end = xml[start + 1..]
        .find(|c: char| c.is_whitespace() || c == '>')
        .map(|i| start + 1 + i)?;
    let name = &xml[start + 1..name_end];
    let close = format!("</{name}>");
    let close_at = xml[start..].find(&close).map(|i| start + i)?;
    Some(&xml[start..close_at + close.len()])
}

/// Remove an embedded Signature element, realizing the enveloped-signature
/// transform.
fn strip_signature(element: &str) -> String {
    if let Some(start) = element.find("<Signature") {
        if let Some(end) = element[start..].find("</Signature>") {
            let mut stripped = String::with_capacity(element.len());
            stripped.push_str(&element[..start]);
            stripped.push_str(&element[start + end + "</Signature>".len()..]);
            return stripped;
        }
    }
    element.to_string()
}

struct SignatureParts {
    reference_id: String,
    digest_value: String,
    signature_value: String,
    modulus: String,
    exponent: String,
    certificate: String,
}

fn extract_signature_parts(signed_xml: &str) -> Result<SignatureParts, String> {
    let mut reader = Reader::from_str(signed_xml);
    reader.config_mut().trim_text(true);

    let mut reference_id = None;
    let mut digest_value = None;
    let mut signature_value = None;
    let mut modulus = None;
    let mut exponent = None;
    let mut certificate = None;
    let mut in_signature = false;
    let mut current: Option<&mut Option<String>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref()).unwrap_or("");
                match name {
                    "Signature" => in_signature = true,
                    "Reference" if in_signature => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"URI" {
                                let uri = std::str::from_utf8(&attr.value).unwrap_or("");
                                reference_id =
                                    Some(uri.strip_prefix('#').unwrap_or(uri).to_string());
                            }
                        }
                    }
                    "DigestValue" if in_signature => current = Some(&mut digest_value),
                    "SignatureValue" if in_signature => current = Some(&mut signature_value),
                    "Modulus" if in_signature => current = Some(&mut modulus),
                    "Exponent" if in_signature => current = Some(&mut exponent),
                    "X509Certificate" if in_signature => current = Some(&mut certificate),
                    _ => current = None,
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(slot) = current.take() {
                    *slot = Some(e.unescape().unwrap_or_default().to_string());
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("malformed XML: {e}")),
            _ => {}
        }
    }

    if !in_signature {
        return Err("no Signature element present".into());
    }
    Ok(SignatureParts {
        reference_id: reference_id.ok_or("Reference URI is missing")?,
        digest_value: digest_value.ok_or("DigestValue is missing")?,
        signature_value: signature_value.ok_or("SignatureValue is missing")?,
        modulus: modulus.ok_or("RSAKeyValue Modulus is missing")?,
        exponent: exponent.ok_or("RSAKeyValue Exponent is missing")?,
        certificate: certificate.ok_or("X509Certificate is missing")?,
    })
}

fn decode_public_key(modulus_b64: &str, exponent_b64: &str) -> Result<RsaPublicKey, String> {
    let n = BASE64
        .decode(modulus_b64.as_bytes())
        .map_err(|e| format!("modulus is not base64: {e}"))?;
    let e = BASE64
        .decode(exponent_b64.as_bytes())
        .map_err(|e| format!("exponent is not base64: {e}"))?;
    RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
        .map_err(|e| format!("embedded public key is invalid: {e}"))
}
