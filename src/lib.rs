//! # sifen
//!
//! Client library for Paraguay's SIFEN electronic invoicing web service:
//! builds electronic documents (DE), computes their control code (CDC),
//! signs and verifies them, and exchanges them with the SET over SOAP.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Element names and field widths follow the SIFEN technical manual (v150).
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, NaiveDateTime};
//! use rust_decimal_macros::dec;
//! use sifen::core::*;
//!
//! let signed_at: NaiveDateTime = "2024-06-15T10:30:00".parse().unwrap();
//!
//! let mut de = DocumentBuilder::new(signed_at, signed_at)
//!     .security_code("000000123")
//!     .stamp(StampInfo {
//!         document_type: DocumentType::Invoice,
//!         stamp_number: 12557605,
//!         establishment: "001".into(),
//!         issuance_point: "002".into(),
//!         document_number: "0000021".into(),
//!         validity_start: NaiveDate::from_ymd_opt(2019, 7, 24).unwrap(),
//!     })
//!     .issuer(IssuerBuilder::new("80089752", 1, ContributorType::LegalEntity, "ACME S.A.")
//!         .activity("62010", "Computer programming")
//!         .build())
//!     .recipient(RecipientBuilder::non_taxpayer(OperationKind::B2C, Country::PRY)
//!         .identity(IdentityDocType::ParaguayanId, "4184256", "Juan Pérez")
//!         .build())
//!     .add_item(ItemBuilder::new("001", "Professional services", MeasureUnit::Unit, dec!(1), dec!(1100000))
//!         .tax(IvaAffectation::Taxed, dec!(100), dec!(10))
//!         .build())
//!     .build()
//!     .unwrap();
//!
//! de.compute_totals(&OfficialRounding::default()).unwrap();
//! let cdc = de.assign_cdc().unwrap();
//! assert_eq!(cdc.as_str().len(), 44);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document model, validation, rounding, CDC |
//! | `xml` | Canonical XML generation & parsing |
//! | `sign` | Enveloped XML digital signature (RSA-SHA256) |
//! | `client` | SOAP client for the five SIFEN operations |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "sign")]
pub mod sign;

#[cfg(feature = "client")]
pub mod soap;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
