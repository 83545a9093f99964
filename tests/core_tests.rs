use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use sifen::core::*;

fn ts(s: &str) -> NaiveDateTime {
    s.parse().unwrap()
}

fn stamp() -> StampInfo {
    StampInfo {
        document_type: DocumentType::Invoice,
        stamp_number: 12557605,
        establishment: "001".into(),
        issuance_point: "002".into(),
        document_number: "0000021".into(),
        validity_start: NaiveDate::from_ymd_opt(2019, 7, 24).unwrap(),
    }
}

fn issuer() -> Issuer {
    IssuerBuilder::new("80089752", 1, ContributorType::LegalEntity, "ACME S.A.")
        .address(Address {
            street: "Calle 1".into(),
            house_number: "1234".into(),
            department: Some(Department::Capital),
            district: None,
            city: Some((1, "ASUNCION (DISTRITO)".into())),
        })
        .phone("021555000")
        .email("billing@acme.com.py")
        .activity("62010", "Actividades de programación informática")
        .build()
}

fn recipient() -> Recipient {
    RecipientBuilder::non_taxpayer(OperationKind::B2C, Country::PRY)
        .identity(IdentityDocType::ParaguayanId, "4184256", "Juan Pérez")
        .build()
}

fn builder() -> DocumentBuilder {
    DocumentBuilder::new(ts("2024-06-15T10:30:00"), ts("2024-06-15T10:30:00"))
        .security_code("000000123")
        .stamp(stamp())
        .issuer(issuer())
        .recipient(recipient())
        .condition(ConditionInfo {
            condition: OperationCondition::Cash,
            payments: vec![PaymentEntry {
                kind: PaymentType::Cash,
                description: "Efectivo".into(),
                amount: dec!(1100000),
                currency: Currency::PYG,
            }],
        })
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
}

// --- Build + validation ---

#[test]
fn valid_document_builds() {
    assert!(builder().build().is_ok());
}

#[test]
fn validation_reports_every_violation_at_once() {
    // broken security code, no activities, taxpayer recipient missing its
    // RUC fields — all must be reported in one call
    let result = DocumentBuilder::new(ts("2024-06-15T10:30:00"), ts("2024-06-15T10:30:00"))
        .security_code("12")
        .stamp(stamp())
        .issuer(IssuerBuilder::new("80089752", 1, ContributorType::LegalEntity, "ACME S.A.").build())
        .recipient(Recipient {
            nature: RecipientNature::Taxpayer,
            operation_kind: OperationKind::B2B,
            country: Country::PRY,
            contributor_type: Some(ContributorType::LegalEntity),
            ruc: Some("80017850".into()),
            ruc_check_digit: None,
            id_doc_type: None,
            id_doc_number: None,
            name: Some("Cliente S.A.".into()),
            fantasy_name: None,
            address: None,
            phone: None,
            email: None,
            client_code: None,
        })
        .add_item(
            ItemBuilder::new("001", "Servicio", MeasureUnit::Unit, dec!(1), dec!(100000)).build(),
        )
        .build();

    let Err(SifenError::Validation(violations)) = result else {
        panic!("expected a validation error");
    };
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert!(fields.contains(&"operation.security_code"));
    assert!(fields.contains(&"issuer.activities"));
    assert!(fields.contains(&"recipient.ruc_check_digit"));
    assert!(violations.len() >= 3);
}

#[test]
fn unnamed_recipient_must_not_carry_a_name() {
    let mut recipient = RecipientBuilder::non_taxpayer(OperationKind::B2C, Country::PRY)
        .unnamed()
        .build();
    recipient.name = Some("should not be here".into());

    let result = builder().recipient(recipient).build();
    let Err(SifenError::Validation(violations)) = result else {
        panic!("expected a validation error");
    };
    assert!(violations.iter().any(|v| v.field == "recipient.name"));
}

#[test]
fn issuer_check_digit_is_verified() {
    let mut bad_issuer = issuer();
    bad_issuer.check_digit = 3; // mod-11 over 80089752 does not give 3
    let result = builder().issuer(bad_issuer).build();
    let Err(SifenError::Validation(violations)) = result else {
        panic!("expected a validation error");
    };
    assert!(violations.iter().any(|v| v.field == "issuer.check_digit"));
}

#[test]
fn cash_settlement_requires_payment_entries() {
    let result = builder()
        .condition(ConditionInfo {
            condition: OperationCondition::Cash,
            payments: vec![],
        })
        .build();
    let Err(SifenError::Validation(violations)) = result else {
        panic!("expected a validation error");
    };
    assert!(
        violations
            .iter()
            .any(|v| v.field == "type_specific.condition.payments")
    );
}

// --- Totals ---

#[test]
fn totals_for_iva_inclusive_prices() {
    let mut de = builder().build().unwrap();
    de.compute_totals(&OfficialRounding::default()).unwrap();

    let totals = de.totals.as_ref().unwrap();
    // 1,100,000 IVA-inclusive at 10% = 1,000,000 base + 100,000 IVA
    assert_eq!(totals.subtotal_10, dec!(1100000));
    assert_eq!(totals.base_10, dec!(1000000));
    assert_eq!(totals.iva_10, dec!(100000));
    assert_eq!(totals.iva_total, dec!(100000));
    assert_eq!(totals.operation_total, dec!(1100000));
    assert_eq!(totals.grand_total, dec!(1100000));
    assert_eq!(totals.rounding_adjustment, dec!(0));
}

#[test]
fn grand_total_is_officially_rounded() {
    let mut de = builder()
        .add_item(
            // odd amount to force a rounding adjustment
            ItemBuilder::new("002", "Insumo", MeasureUnit::Unit, dec!(1), dec!(107437))
                .tax(IvaAffectation::Exempt, dec!(0), dec!(0))
                .build(),
        )
        .build()
        .unwrap();
    de.compute_totals(&OfficialRounding::default()).unwrap();

    let totals = de.totals.as_ref().unwrap();
    assert_eq!(totals.operation_total, dec!(1207437));
    assert_eq!(totals.grand_total, dec!(1207400));
    assert_eq!(totals.rounding_adjustment, dec!(37));
    assert_eq!(totals.exempt_subtotal, dec!(107437));
}

#[test]
fn compute_totals_is_idempotent() {
    let mut de = builder().build().unwrap();
    de.compute_totals(&OfficialRounding::default()).unwrap();
    let first = de.totals.clone();
    de.compute_totals(&OfficialRounding::default()).unwrap();
    assert_eq!(first, de.totals);
}

#[test]
fn mixed_rates_split_into_their_groups() {
    let mut de = builder()
        .add_item(
            ItemBuilder::new("002", "Canasta básica", MeasureUnit::Unit, dec!(2), dec!(10500))
                .tax(IvaAffectation::Taxed, dec!(100), dec!(5))
                .build(),
        )
        .build()
        .unwrap();
    de.compute_totals(&OfficialRounding::default()).unwrap();

    let totals = de.totals.as_ref().unwrap();
    // 21,000 IVA-inclusive at 5% = 20,000 base + 1,000 IVA
    assert_eq!(totals.subtotal_5, dec!(21000));
    assert_eq!(totals.base_5, dec!(20000));
    assert_eq!(totals.iva_5, dec!(1000));
    assert_eq!(totals.subtotal_10, dec!(1100000));
    assert_eq!(totals.iva_total, dec!(101000));
}

// --- CDC lifecycle ---

#[test]
fn assign_cdc_twice_is_an_illegal_state() {
    let mut de = builder().build().unwrap();
    de.compute_totals(&OfficialRounding::default()).unwrap();
    de.assign_cdc().unwrap();
    assert!(matches!(
        de.assign_cdc(),
        Err(SifenError::IllegalState(_))
    ));
}

#[test]
fn cdc_is_deterministic_for_a_document() {
    let mut a = builder().build().unwrap();
    let mut b = builder().build().unwrap();
    a.compute_totals(&OfficialRounding::default()).unwrap();
    b.compute_totals(&OfficialRounding::default()).unwrap();
    let cdc_a = a.assign_cdc().unwrap().clone();
    let cdc_b = b.assign_cdc().unwrap().clone();
    assert_eq!(cdc_a, cdc_b);
    assert_eq!(cdc_a.as_str().len(), CDC_LEN);
}

#[test]
fn cdc_embeds_identity_fields_zero_padded() {
    let mut de = builder().build().unwrap();
    de.compute_totals(&OfficialRounding::default()).unwrap();
    let cdc = de.assign_cdc().unwrap();
    let s = cdc.as_str();
    assert_eq!(&s[0..2], "01"); // document type
    assert_eq!(&s[2..10], "80089752"); // RUC
    assert_eq!(&s[11..14], "001"); // establishment
    assert_eq!(&s[14..17], "002"); // issuance point
    assert_eq!(&s[17..24], "0000021"); // document number
    assert_eq!(&s[25..33], "20240615"); // emission date
    assert_eq!(&s[34..43], "000000123"); // security code
}
