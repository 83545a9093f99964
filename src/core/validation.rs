use rust_decimal::Decimal;

use super::check_digit::check_digit_mod11;
use super::document::*;
use super::error::ValidationError;
use super::types::*;

/// Validate a document against the schema's conditional-presence invariants.
/// Returns all validation errors found (not just the first).
pub fn validate_document(document: &ElectronicDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // dCodSeg is a fixed 9-digit field
    let sec = &document.operation.security_code;
    if sec.len() != 9 || !sec.bytes().all(|b| b.is_ascii_digit()) {
        errors.push(ValidationError::with_rule(
            "operation.security_code",
            "security code must be exactly 9 digits",
            "B004",
        ));
    }

    validate_stamp(&document.stamp, &mut errors);
    validate_issuer(&document.issuer, &mut errors);
    validate_recipient(&document.recipient, &mut errors);

    // Invoices require the gCamFE group
    if document.stamp.document_type == DocumentType::Invoice
        && document.type_specific.invoice.is_none()
    {
        errors.push(ValidationError::with_rule(
            "type_specific.invoice",
            "invoice documents require the invoice field group (gCamFE)",
            "E010",
        ));
    }

    // Cash settlements must name how they were paid
    if let Some(condition) = &document.type_specific.condition {
        if condition.condition == OperationCondition::Cash && condition.payments.is_empty() {
            errors.push(ValidationError::with_rule(
                "type_specific.condition.payments",
                "cash settlement requires at least one payment entry (gPaConEIni)",
                "E606",
            ));
        }
    }

    if document.items.is_empty() {
        errors.push(ValidationError::with_rule(
            "items",
            "document must have at least one item",
            "E700",
        ));
    }
    for (i, item) in document.items.iter().enumerate() {
        validate_item(item, i, &mut errors);
    }

    errors
}

fn validate_stamp(stamp: &StampInfo, errors: &mut Vec<ValidationError>) {
    for (field, value, width, rule) in [
        ("stamp.establishment", &stamp.establishment, 3, "C005"),
        ("stamp.issuance_point", &stamp.issuance_point, 3, "C006"),
        ("stamp.document_number", &stamp.document_number, 7, "C007"),
    ] {
        if value.len() != width || !value.bytes().all(|b| b.is_ascii_digit()) {
            errors.push(ValidationError::with_rule(
                field,
                format!("must be exactly {width} digits"),
                rule,
            ));
        }
    }
}

fn validate_issuer(issuer: &Issuer, errors: &mut Vec<ValidationError>) {
    if issuer.ruc.is_empty()
        || issuer.ruc.len() > 8
        || !issuer.ruc.bytes().all(|b| b.is_ascii_digit())
    {
        errors.push(ValidationError::with_rule(
            "issuer.ruc",
            "issuer RUC must be 1–8 digits",
            "D101",
        ));
    } else if check_digit_mod11(&issuer.ruc).ok() != Some(issuer.check_digit) {
        errors.push(ValidationError::with_rule(
            "issuer.check_digit",
            "RUC check digit does not match the modulus-11 computation",
            "D102",
        ));
    }

    if issuer.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "issuer.name",
            "issuer legal name must not be empty",
            "D105",
        ));
    }

    if issuer.activities.is_empty() {
        errors.push(ValidationError::with_rule(
            "issuer.activities",
            "issuer must declare at least one economic activity (gActEco)",
            "D130",
        ));
    }
}

fn validate_recipient(recipient: &Recipient, errors: &mut Vec<ValidationError>) {
    match recipient.nature {
        RecipientNature::Taxpayer => {
            // the RUC identification set is all-or-nothing
            if recipient.contributor_type.is_none() {
                errors.push(ValidationError::with_rule(
                    "recipient.contributor_type",
                    "taxpayer recipient requires a contributor type (iTiContRec)",
                    "D205",
                ));
            }
            match &recipient.ruc {
                None => errors.push(ValidationError::with_rule(
                    "recipient.ruc",
                    "taxpayer recipient requires a RUC (dRucRec)",
                    "D206",
                )),
                Some(ruc) if !ruc.bytes().all(|b| b.is_ascii_digit()) || ruc.is_empty() => {
                    errors.push(ValidationError::with_rule(
                        "recipient.ruc",
                        "recipient RUC must be numeric",
                        "D206",
                    ));
                }
                Some(_) => {}
            }
            if recipient.ruc_check_digit.is_none() {
                errors.push(ValidationError::with_rule(
                    "recipient.ruc_check_digit",
                    "taxpayer recipient requires a RUC check digit (dDVRec)",
                    "D207",
                ));
            }
            if recipient.id_doc_type.is_some() || recipient.id_doc_number.is_some() {
                errors.push(ValidationError::with_rule(
                    "recipient.id_doc_type",
                    "taxpayer recipient must not carry identity document fields",
                    "D208",
                ));
            }
        }
        RecipientNature::NonTaxpayer => {
            if recipient.ruc.is_some()
                || recipient.ruc_check_digit.is_some()
                || recipient.contributor_type.is_some()
            {
                errors.push(ValidationError::with_rule(
                    "recipient.ruc",
                    "non-taxpayer recipient must not carry RUC fields",
                    "D206",
                ));
            }
            match recipient.id_doc_type {
                None => errors.push(ValidationError::with_rule(
                    "recipient.id_doc_type",
                    "non-taxpayer recipient requires an identity document type (iTipIDRec)",
                    "D208",
                )),
                Some(doc_type) if doc_type.is_unnamed() => {
                    if recipient.id_doc_number.is_some() || recipient.name.is_some() {
                        errors.push(ValidationError::with_rule(
                            "recipient.name",
                            "unnamed recipient must not carry an identity number or name",
                            "D210",
                        ));
                    }
                }
                Some(_) => {
                    if recipient.id_doc_number.is_none() {
                        errors.push(ValidationError::with_rule(
                            "recipient.id_doc_number",
                            "identified recipient requires an identity document number (dNumIDRec)",
                            "D210",
                        ));
                    }
                    if recipient.name.is_none() {
                        errors.push(ValidationError::with_rule(
                            "recipient.name",
                            "identified recipient requires a name (dNomRec)",
                            "D211",
                        ));
                    }
                }
            }
        }
    }
}

fn validate_item(item: &Item, index: usize, errors: &mut Vec<ValidationError>) {
    let path = |suffix: &str| format!("items[{index}].{suffix}");

    if item.description.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            path("description"),
            "item description must not be empty",
            "E708",
        ));
    }
    if item.quantity <= Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            path("quantity"),
            "item quantity must be positive",
            "E711",
        ));
    }
    if item.unit_price < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            path("unit_price"),
            "item unit price must not be negative",
            "E721",
        ));
    }
    if item.discount < Decimal::ZERO || item.discount > item.unit_price {
        errors.push(ValidationError::with_rule(
            path("discount"),
            "item discount must be between zero and the unit price",
            "EA002",
        ));
    }

    let tax = &item.tax;
    if tax.proportion < Decimal::ZERO || tax.proportion > Decimal::from(100) {
        errors.push(ValidationError::with_rule(
            path("tax.proportion"),
            "IVA proportion must be between 0 and 100",
            "E733",
        ));
    }
    match tax.affectation {
        IvaAffectation::Taxed | IvaAffectation::PartiallyTaxed => {
            if tax.rate != Decimal::from(5) && tax.rate != Decimal::from(10) {
                errors.push(ValidationError::with_rule(
                    path("tax.rate"),
                    "taxed items must use an IVA rate of 5 or 10",
                    "E734",
                ));
            }
        }
        IvaAffectation::Exonerated | IvaAffectation::Exempt => {
            if tax.rate != Decimal::ZERO {
                errors.push(ValidationError::with_rule(
                    path("tax.rate"),
                    "exempt items must use an IVA rate of 0",
                    "E734",
                ));
            }
        }
    }
}
