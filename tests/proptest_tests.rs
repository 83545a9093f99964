//! Property-based tests for the rounding and control code invariants.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sifen::core::*;

fn rounding() -> OfficialRounding {
    OfficialRounding::default()
}

proptest! {
    // For all guaraní amounts A: round(A) is a multiple of 50 and never
    // exceeds A (floor semantics).
    #[test]
    fn pyg_rounding_floors_to_fifty(units in 0u64..1_000_000_000) {
        let amount = Decimal::from(units);
        let rounded = rounding().round(Currency::PYG, amount).unwrap();
        prop_assert_eq!(rounded % dec!(50), dec!(0));
        prop_assert!(rounded <= amount);
        prop_assert!(amount - rounded < dec!(50));
    }

    // For all dollar amounts A: round(A) is a multiple of 0.50 and within
    // a quarter of A (ties resolve upward).
    #[test]
    fn usd_rounding_snaps_to_half_dollar(cents in 0u64..100_000_000) {
        let amount = Decimal::new(cents as i64, 2);
        let rounded = rounding().round(Currency::USD, amount).unwrap();
        prop_assert_eq!(rounded % dec!(0.50), dec!(0));
        let diff = (rounded - amount).abs();
        prop_assert!(diff <= dec!(0.25));
        if diff == dec!(0.25) {
            prop_assert!(rounded > amount, "ties must round toward the higher multiple");
        }
    }

    // CDC is deterministic and its trailing digit satisfies the modulus-11
    // relation over the preceding digits.
    #[test]
    fn cdc_check_digit_relation_holds(
        ruc in 1u32..99_999_999,
        number in 1u32..9_999_999,
        security in 0u32..999_999_999,
        day in 1u32..28,
    ) {
        let identity = DocumentIdentity {
            document_type: DocumentType::Invoice,
            ruc: ruc.to_string(),
            ruc_check_digit: check_digit_mod11(&ruc.to_string()).unwrap(),
            establishment: "001".into(),
            issuance_point: "002".into(),
            document_number: number.to_string(),
            contributor_type: ContributorType::LegalEntity,
            emission_date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            emission_type: EmissionType::Normal,
            security_code: security.to_string(),
        };

        let first = compute_cdc(&identity).unwrap();
        let second = compute_cdc(&identity).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.as_str().len(), CDC_LEN);

        let (body, _) = first.as_str().split_at(CDC_LEN - 1);
        prop_assert_eq!(check_digit_mod11(body).unwrap(), first.check_digit());
    }

    // The check digit itself is always a single digit, whatever the input.
    #[test]
    fn mod11_output_is_a_digit(digits in "[0-9]{1,44}") {
        let dv = check_digit_mod11(&digits).unwrap();
        prop_assert!(dv <= 9);
    }
}
