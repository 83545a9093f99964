//! SOAP protocol layer: envelope construction, dispatch, and typed decoding
//! of the five SIFEN operations.
//!
//! # Example
//!
//! ```ignore
//! use sifen::core::{Environment, SifenConfig};
//! use sifen::soap::SifenClient;
//!
//! let config = SifenConfig::new(Environment::Test);
//! let client = SifenClient::new(config, key_handle)?;
//!
//! let info = client.lookup_taxpayer(1, "80089752").await?;
//! if info.not_found() {
//!     println!("RUC does not exist");
//! } else if info.not_authorized() {
//!     println!("not authorized for this service");
//! } else if let Some(record) = &info.record {
//!     println!("{}: {}", record.ruc, record.legal_name);
//! }
//! ```

mod client;
pub mod envelope;
mod response;

pub use client::SifenClient;
pub use envelope::{SOAP_CONTENT_TYPE, SOAP_ENV_NS};
pub use response::*;
