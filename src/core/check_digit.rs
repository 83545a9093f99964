//! Modulus-11 check digit and control code (CDC) computation.
//!
//! The CDC is the 44-digit identifier that names a DE: 43 digits of
//! fixed-width identity fields followed by one modulus-11 check digit. The
//! same check-digit primitive verifies RUC check digits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::SifenError;
use super::types::{ContributorType, DocumentType, EmissionType};

/// The fixed-length control code of a DE. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCode(String);

impl ControlCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing modulus-11 check digit.
    pub fn check_digit(&self) -> u8 {
        // construction guarantees a non-empty ASCII digit string
        self.0.as_bytes()[self.0.len() - 1] - b'0'
    }

    /// Reconstruct a control code parsed from XML. Validates shape only.
    pub fn parse(value: &str) -> Result<Self, SifenError> {
        if value.len() != CDC_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SifenError::Parse(format!(
                "control code must be {CDC_LEN} digits, got {value:?}"
            )));
        }
        Ok(Self(value.to_string()))
    }
}

impl std::fmt::Display for ControlCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Total CDC length including the trailing check digit.
pub const CDC_LEN: usize = 44;

/// Identity fields from which the CDC is derived, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIdentity {
    pub document_type: DocumentType,
    /// Issuer RUC, up to 8 digits (left-zero-padded).
    pub ruc: String,
    pub ruc_check_digit: u8,
    /// Establishment code, 3 digits.
    pub establishment: String,
    /// Issuance point code, 3 digits.
    pub issuance_point: String,
    /// Document number, 7 digits.
    pub document_number: String,
    pub contributor_type: ContributorType,
    pub emission_date: NaiveDate,
    pub emission_type: EmissionType,
    /// Security code, 9 digits.
    pub security_code: String,
}

/// Compute a modulus-11 check digit over a digit string.
///
/// Weights cycle 2..=7 from the rightmost digit leftward. The weighted sum's
/// remainder r yields `11 - r`, collapsed to 0 when above 9 (so r of 0 or 1
/// gives 0, and r of 10 gives 1).
pub fn check_digit_mod11(digits: &str) -> Result<u8, SifenError> {
    if digits.is_empty() {
        return Err(SifenError::InvalidField {
            field: "digits",
            reason: "empty input".into(),
        });
    }
    let mut sum: u64 = 0;
    let mut weight: u64 = 2;
    for b in digits.bytes().rev() {
        if !b.is_ascii_digit() {
            return Err(SifenError::InvalidField {
                field: "digits",
                reason: format!("non-numeric character {:?}", b as char),
            });
        }
        sum += u64::from(b - b'0') * weight;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }
    let v = 11 - (sum % 11);
    Ok(if v > 9 { 0 } else { v as u8 })
}

/// Compute the CDC for a document's identity fields.
///
/// Deterministic: the same identity always yields the same code. Fails with
/// `SifenError::InvalidField` when a field exceeds its fixed width or
/// contains non-numeric characters.
pub fn compute_cdc(identity: &DocumentIdentity) -> Result<ControlCode, SifenError> {
    let mut body = String::with_capacity(CDC_LEN);
    body.push_str(&zero_pad("document_type", &identity.document_type.code().to_string(), 2)?);
    body.push_str(&zero_pad("ruc", &identity.ruc, 8)?);
    body.push_str(&zero_pad("ruc_check_digit", &identity.ruc_check_digit.to_string(), 1)?);
    body.push_str(&zero_pad("establishment", &identity.establishment, 3)?);
    body.push_str(&zero_pad("issuance_point", &identity.issuance_point, 3)?);
    body.push_str(&zero_pad("document_number", &identity.document_number, 7)?);
    body.push_str(&zero_pad("contributor_type", &identity.contributor_type.code().to_string(), 1)?);
    body.push_str(&identity.emission_date.format("%Y%m%d").to_string());
    body.push_str(&zero_pad("emission_type", &identity.emission_type.code().to_string(), 1)?);
    body.push_str(&zero_pad("security_code", &identity.security_code, 9)?);

    debug_assert_eq!(body.len(), CDC_LEN - 1);
    let dv = check_digit_mod11(&body)?;
    body.push((b'0' + dv) as char);
    Ok(ControlCode(body))
}

/// Left-zero-pad a numeric field to its fixed width.
fn zero_pad(field: &'static str, value: &str, width: usize) -> Result<String, SifenError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SifenError::InvalidField {
            field,
            reason: format!("expected numeric value, got {value:?}"),
        });
    }
    if value.len() > width {
        return Err(SifenError::InvalidField {
            field,
            reason: format!("value {value:?} exceeds fixed width {width}"),
        });
    }
    Ok(format!("{value:0>width$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DocumentIdentity {
        DocumentIdentity {
            document_type: DocumentType::Invoice,
            ruc: "80089752".into(),
            ruc_check_digit: 8,
            establishment: "001".into(),
            issuance_point: "002".into(),
            document_number: "0000021".into(),
            contributor_type: ContributorType::LegalEntity,
            emission_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            emission_type: EmissionType::Normal,
            security_code: "000000123".into(),
        }
    }

    #[test]
    fn cdc_is_44_digits_and_deterministic() {
        let a = compute_cdc(&identity()).unwrap();
        let b = compute_cdc(&identity()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), CDC_LEN);
        assert!(a.as_str().bytes().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn cdc_trailing_digit_satisfies_mod11() {
        let cdc = compute_cdc(&identity()).unwrap();
        let (body, _) = cdc.as_str().split_at(CDC_LEN - 1);
        assert_eq!(check_digit_mod11(body).unwrap(), cdc.check_digit());
    }

    #[test]
    fn short_fields_are_zero_padded() {
        let mut id = identity();
        id.ruc = "89752".into();
        id.document_number = "21".into();
        let cdc = compute_cdc(&id).unwrap();
        assert_eq!(&cdc.as_str()[2..10], "00089752");
        assert_eq!(&cdc.as_str()[17..24], "0000021");
    }

    #[test]
    fn oversized_field_is_rejected() {
        let mut id = identity();
        id.security_code = "1234567890".into();
        assert!(matches!(
            compute_cdc(&id),
            Err(SifenError::InvalidField { field: "security_code", .. })
        ));
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let mut id = identity();
        id.establishment = "0A1".into();
        assert!(matches!(
            compute_cdc(&id),
            Err(SifenError::InvalidField { field: "establishment", .. })
        ));
    }

    #[test]
    fn mod11_known_vectors() {
        // weights right-to-left: 2,3,4 → 1*4 + 2*3 + 3*2 = 16, r = 5, dv = 6
        assert_eq!(check_digit_mod11("123").unwrap(), 6);
        // 8*2 = 16, r = 5, dv = 6
        assert_eq!(check_digit_mod11("8").unwrap(), 6);
        // remainder 0 or 1 collapses to 0
        assert_eq!(check_digit_mod11("0").unwrap(), 0);
    }
}
