//! Official SET rounding of monetary amounts.
//!
//! The grand total of a document must be expressible in circulating
//! denominations: guaraníes round down to the nearest 50, dollar amounts
//! round to the nearest 50 cents. Rules for further currencies are not
//! published uniformly, so the table is caller-extensible.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::SifenError;
use super::types::Currency;

/// How amounts in one currency are snapped to a denomination grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingRule {
    /// Truncate toward zero to the lower multiple of the step.
    FloorToStep(Decimal),
    /// Round to the nearest multiple of the step, ties away from zero.
    HalfUpToStep(Decimal),
}

/// Currency-aware official rounding.
///
/// Ships with the two published rules (PYG, USD); any other currency must be
/// registered with [`OfficialRounding::with_rule`] before use.
#[derive(Debug, Clone)]
pub struct OfficialRounding {
    rules: HashMap<Currency, RoundingRule>,
}

impl Default for OfficialRounding {
    fn default() -> Self {
        let mut rules = HashMap::new();
        rules.insert(Currency::PYG, RoundingRule::FloorToStep(dec!(50)));
        rules.insert(Currency::USD, RoundingRule::HalfUpToStep(dec!(0.50)));
        Self { rules }
    }
}

impl OfficialRounding {
    /// Register or replace the rule for a currency.
    pub fn with_rule(mut self, currency: Currency, rule: RoundingRule) -> Self {
        self.rules.insert(currency, rule);
        self
    }

    /// Apply the official rounding for `currency` to `amount`.
    ///
    /// # Errors
    ///
    /// `SifenError::Configuration` when no rule is registered for the
    /// currency.
    pub fn round(&self, currency: Currency, amount: Decimal) -> Result<Decimal, SifenError> {
        let rule = self.rules.get(&currency).ok_or_else(|| {
            SifenError::Configuration(format!(
                "no official rounding rule registered for currency {}",
                currency.code()
            ))
        })?;
        Ok(match rule {
            RoundingRule::FloorToStep(step) => (amount / step).trunc() * step,
            RoundingRule::HalfUpToStep(step) => {
                (amount / step)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    * step
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guaranies_floor_to_fifty() {
        let r = OfficialRounding::default();
        assert_eq!(r.round(Currency::PYG, dec!(107437)).unwrap(), dec!(107400));
        assert_eq!(r.round(Currency::PYG, dec!(47789)).unwrap(), dec!(47750));
        assert_eq!(r.round(Currency::PYG, dec!(99999)).unwrap(), dec!(99950));
        assert_eq!(r.round(Currency::PYG, dec!(100)).unwrap(), dec!(100));
    }

    #[test]
    fn dollars_half_up_to_fifty_cents() {
        let r = OfficialRounding::default();
        assert_eq!(r.round(Currency::USD, dec!(1000)).unwrap(), dec!(1000.00));
        assert_eq!(r.round(Currency::USD, dec!(1000.23)).unwrap(), dec!(1000.00));
        assert_eq!(r.round(Currency::USD, dec!(1000.26)).unwrap(), dec!(1000.50));
        assert_eq!(r.round(Currency::USD, dec!(1000.56)).unwrap(), dec!(1000.50));
        assert_eq!(r.round(Currency::USD, dec!(1000.76)).unwrap(), dec!(1001.00));
    }

    #[test]
    fn dollar_ties_round_up() {
        let r = OfficialRounding::default();
        assert_eq!(r.round(Currency::USD, dec!(1000.25)).unwrap(), dec!(1000.50));
        assert_eq!(r.round(Currency::USD, dec!(1000.75)).unwrap(), dec!(1001.00));
    }

    #[test]
    fn unknown_currency_is_a_configuration_error() {
        let r = OfficialRounding::default();
        assert!(matches!(
            r.round(Currency::EUR, dec!(10)),
            Err(SifenError::Configuration(_))
        ));
    }

    #[test]
    fn extra_rule_can_be_registered() {
        let r = OfficialRounding::default()
            .with_rule(Currency::EUR, RoundingRule::HalfUpToStep(dec!(0.50)));
        assert_eq!(r.round(Currency::EUR, dec!(9.74)).unwrap(), dec!(9.50));
    }
}
