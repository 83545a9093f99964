//! Canonical XML generation and parsing for DE, event, and batch trees.
//!
//! Serialization order of sibling elements is schema-fixed and reproduced
//! exactly: signature validation by the remote service depends on the
//! byte-exact canonical form. Optional elements are emitted only when their
//! governing condition holds.
//!
//! # Example
//!
//! ```no_run
//! use sifen::core::ElectronicDocument;
//! use sifen::xml;
//!
//! let de: ElectronicDocument = todo!(); // build via DocumentBuilder
//! let canonical = xml::to_xml(&de).unwrap();
//! let restored = xml::from_xml(&canonical).unwrap();
//! assert_eq!(de, restored);
//! ```

mod de;
mod event;
mod parse;
pub(crate) mod writer;

pub use de::{
    FORMAT_VERSION, SIFEN_NS, SerializeOptions, to_batch_xml, to_xml, to_xml_with, wrap_batch,
};
pub use event::to_event_xml;
pub use parse::from_xml;
pub use writer::{XmlWriter, format_amount, format_number, strip_declaration};
