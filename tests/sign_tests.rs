//! Enveloped signature creation and verification tests.
//!
//! Run with: `cargo test --features all --test sign_tests`

#![cfg(feature = "sign")]

use chrono::{NaiveDate, NaiveDateTime};
use rsa::RsaPrivateKey;
use rust_decimal_macros::dec;
use sifen::core::*;
use sifen::sign::*;
use sifen::xml;

fn ts(s: &str) -> NaiveDateTime {
    s.parse().unwrap()
}

fn key_handle() -> SigningKeyHandle {
    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
    // the certificate is opaque to the engine; any DER blob identifies it
    let certificate_der = b"test-certificate-der".to_vec();
    SigningKeyHandle::new(private_key, certificate_der, "CN=Test Signer")
}

fn anchors_for(handle: &SigningKeyHandle) -> Vec<TrustAnchor> {
    vec![TrustAnchor::for_handle(
        handle,
        ts("2024-01-01T00:00:00"),
        ts("2026-01-01T00:00:00"),
    )]
}

fn signed_document(handle: &SigningKeyHandle) -> (ElectronicDocument, String) {
    let mut de = DocumentBuilder::new(ts("2024-06-15T10:30:00"), ts("2024-06-15T10:30:00"))
        .security_code("000000123")
        .stamp(StampInfo {
            document_type: DocumentType::Invoice,
            stamp_number: 12557605,
            establishment: "001".into(),
            issuance_point: "002".into(),
            document_number: "0000021".into(),
            validity_start: NaiveDate::from_ymd_opt(2019, 7, 24).unwrap(),
        })
        .issuer(
            IssuerBuilder::new("80089752", 1, ContributorType::LegalEntity, "ACME S.A.")
                .activity("62010", "Actividades de programación informática")
                .build(),
        )
        .recipient(
            RecipientBuilder::non_taxpayer(OperationKind::B2C, Country::PRY)
                .identity(IdentityDocType::ParaguayanId, "4184256", "Juan Pérez")
                .build(),
        )
        .add_item(
            ItemBuilder::new(
                "001",
                "Servicios profesionales",
                MeasureUnit::Unit,
                dec!(1),
                dec!(1100000),
            )
            .tax(IvaAffectation::Taxed, dec!(100), dec!(10))
            .build(),
        )
        .build()
        .unwrap();
    de.compute_totals(&OfficialRounding::default()).unwrap();
    de.assign_cdc().unwrap();

    let serialized = xml::to_xml(&de).unwrap();
    let signed = sign_xml(&serialized, de.cdc().unwrap().as_str(), handle).unwrap();
    (de, signed)
}

#[test]
fn fresh_signature_verifies() {
    let handle = key_handle();
    let (_, signed) = signed_document(&handle);

    let validity = verify_xml(&signed, &anchors_for(&handle), ts("2024-06-15T12:00:00"));
    assert!(validity.valid, "reason: {:?}", validity.reason);
    assert!(validity.reason.is_none());
}

#[test]
fn signature_is_the_final_child_of_the_root() {
    let handle = key_handle();
    let (_, signed) = signed_document(&handle);
    let signature_at = signed.find("<Signature").unwrap();
    let de_close_at = signed.find("</DE>").unwrap();
    let root_close_at = signed.rfind("</rDE>").unwrap();
    assert!(de_close_at < signature_at && signature_at < root_close_at);
}

#[test]
fn tampered_content_fails_with_digest_mismatch() {
    let handle = key_handle();
    let (_, signed) = signed_document(&handle);
    let tampered = signed.replace(
        "<dNomEmi>ACME S.A.</dNomEmi>",
        "<dNomEmi>EVIL S.A.</dNomEmi>",
    );
    assert_ne!(signed, tampered);

    let validity = verify_xml(&tampered, &anchors_for(&handle), ts("2024-06-15T12:00:00"));
    assert!(!validity.valid);
    assert_eq!(validity.reason, Some(InvalidityReason::DigestMismatch));
}

#[test]
fn forged_digest_fails_with_signature_mismatch() {
    let handle = key_handle();
    let (_, signed) = signed_document(&handle);
    // recompute-able tamper: change content and the digest to match it would
    // require re-signing; swapping the digest alone must break the signature
    let digest_start = signed.find("<DigestValue>").unwrap() + "<DigestValue>".len();
    let digest_end = signed.find("</DigestValue>").unwrap();
    let mut forged = String::new();
    forged.push_str(&signed[..digest_start]);
    // a digest of different content
    forged.push_str(&{
        use base64::Engine;
        use sha2::Digest;
        base64::engine::general_purpose::STANDARD.encode(sha2::Sha256::digest(b"other content"))
    });
    forged.push_str(&signed[digest_end..]);

    let validity = verify_xml(&forged, &anchors_for(&handle), ts("2024-06-15T12:00:00"));
    assert!(!validity.valid);
    // the recomputed digest no longer matches the embedded one
    assert_eq!(validity.reason, Some(InvalidityReason::DigestMismatch));
}

#[test]
fn unknown_certificate_is_untrusted() {
    let handle = key_handle();
    let (_, signed) = signed_document(&handle);
    let other = key_handle();

    let validity = verify_xml(&signed, &anchors_for(&other), ts("2024-06-15T12:00:00"));
    assert!(!validity.valid);
    assert_eq!(validity.reason, Some(InvalidityReason::CertificateUntrusted));
}

#[test]
fn anchor_window_bounds_certificate_validity() {
    let handle = key_handle();
    let (_, signed) = signed_document(&handle);
    let anchors = anchors_for(&handle);

    let validity = verify_xml(&signed, &anchors, ts("2027-01-01T00:00:00"));
    assert!(!validity.valid);
    assert_eq!(validity.reason, Some(InvalidityReason::CertificateExpired));

    let validity = verify_xml(&signed, &anchors, ts("2023-01-01T00:00:00"));
    assert_eq!(validity.reason, Some(InvalidityReason::CertificateExpired));
}

#[test]
fn unsigned_document_is_malformed() {
    let handle = key_handle();
    let (de, _) = signed_document(&handle);
    let unsigned = xml::to_xml(&de).unwrap();

    let validity = verify_xml(&unsigned, &anchors_for(&handle), ts("2024-06-15T12:00:00"));
    assert!(!validity.valid);
    assert!(matches!(
        validity.reason,
        Some(InvalidityReason::MalformedSignature(_))
    ));
}

#[test]
fn unresolvable_reference_is_a_signing_error() {
    let handle = key_handle();
    let err = sign_xml("<rDE><DE>no id here</DE></rDE>", "0123", &handle).unwrap_err();
    assert!(matches!(err, SifenError::Signing(_)));
}

#[test]
fn event_envelopes_sign_and_verify_by_their_id() {
    let handle = key_handle();
    let (de, _) = signed_document(&handle);

    let envelope = EventEnvelope {
        id: "1".into(),
        signing_date: ts("2024-06-16T09:00:00"),
        event: DocumentEvent::Cancellation(CancellationEvent {
            cdc: de.cdc().unwrap().clone(),
            motive: "Anulación por error de emisión".into(),
        }),
    };
    let serialized = sifen::xml::to_event_xml(&envelope).unwrap();
    let signed = sign_xml(&serialized, "1", &handle).unwrap();

    let validity = verify_xml(&signed, &anchors_for(&handle), ts("2024-06-16T10:00:00"));
    assert!(validity.valid, "reason: {:?}", validity.reason);

    let tampered = signed.replace("Anulación", "Modificación");
    let validity = verify_xml(&tampered, &anchors_for(&handle), ts("2024-06-16T10:00:00"));
    assert_eq!(validity.reason, Some(InvalidityReason::DigestMismatch));
}
