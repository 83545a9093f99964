use rust_decimal_macros::dec;
use sifen::core::*;

// Literal cases from the authority's published rounding behavior.

#[test]
fn official_rounding_guaranies() {
    let rounding = OfficialRounding::default();
    assert_eq!(
        rounding.round(Currency::PYG, dec!(107437)).unwrap(),
        dec!(107400)
    );
    assert_eq!(
        rounding.round(Currency::PYG, dec!(47789)).unwrap(),
        dec!(47750)
    );
    assert_eq!(
        rounding.round(Currency::PYG, dec!(99999)).unwrap(),
        dec!(99950)
    );
}

#[test]
fn official_rounding_dollars() {
    let rounding = OfficialRounding::default();
    assert_eq!(
        rounding.round(Currency::USD, dec!(1000)).unwrap(),
        dec!(1000.00)
    );
    assert_eq!(
        rounding.round(Currency::USD, dec!(1000.23)).unwrap(),
        dec!(1000.00)
    );
    assert_eq!(
        rounding.round(Currency::USD, dec!(1000.26)).unwrap(),
        dec!(1000.50)
    );
    assert_eq!(
        rounding.round(Currency::USD, dec!(1000.56)).unwrap(),
        dec!(1000.50)
    );
    assert_eq!(
        rounding.round(Currency::USD, dec!(1000.76)).unwrap(),
        dec!(1001.00)
    );
}

#[test]
fn unregistered_currency_fails_with_configuration_error() {
    let rounding = OfficialRounding::default();
    let err = rounding.round(Currency::BRL, dec!(10)).unwrap_err();
    assert!(matches!(err, SifenError::Configuration(_)));
}

#[test]
fn additional_currency_rules_are_configuration() {
    let rounding = OfficialRounding::default()
        .with_rule(Currency::BRL, RoundingRule::HalfUpToStep(dec!(0.05)));
    assert_eq!(
        rounding.round(Currency::BRL, dec!(10.07)).unwrap(),
        dec!(10.05)
    );
    assert_eq!(
        rounding.round(Currency::BRL, dec!(10.08)).unwrap(),
        dec!(10.10)
    );
}
