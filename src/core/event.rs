//! Post-submission events referencing a DE by its control code, and the
//! batch wrapper for grouped submissions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::check_digit::ControlCode;
use super::document::{Address, ElectronicDocument};
use super::types::{
    ContributorType, Country, IdentityDocType, RecipientNature,
};

/// rGeVeCan — cancellation of a previously submitted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationEvent {
    /// Id: CDC of the document to cancel.
    pub cdc: ControlCode,
    /// mOtEve: motive, 5–500 characters.
    pub motive: String,
}

/// rGEveNom — naming of a previously unnamed recipient.
///
/// Carries the same conditional recipient sets as the document itself: RUC
/// fields for taxpayers, identity document fields otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingEvent {
    /// Id: CDC of the document to name.
    pub cdc: ControlCode,
    /// mOtEve: motive.
    pub motive: String,
    /// iNatRec.
    pub nature: RecipientNature,
    /// cPaisRec.
    pub country: Country,
    /// iTiContRec — taxpayer recipients only.
    pub contributor_type: Option<ContributorType>,
    /// dRucRec — taxpayer recipients only.
    pub ruc: Option<String>,
    /// dDVRec — taxpayer recipients only.
    pub ruc_check_digit: Option<u8>,
    /// iTipIDRec — non-taxpayer recipients only.
    pub id_doc_type: Option<IdentityDocType>,
    /// dNumIDRec.
    pub id_doc_number: Option<String>,
    /// dNomRec.
    pub name: Option<String>,
    /// dNomFanRec.
    pub fantasy_name: Option<String>,
    pub address: Option<Address>,
    /// dTelRec.
    pub phone: Option<String>,
    /// dEmailRec.
    pub email: Option<String>,
}

/// The event payload variants accepted by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentEvent {
    Cancellation(CancellationEvent),
    Naming(NamingEvent),
}

impl DocumentEvent {
    /// CDC of the document the event refers to.
    pub fn cdc(&self) -> &ControlCode {
        match self {
            Self::Cancellation(e) => &e.cdc,
            Self::Naming(e) => &e.cdc,
        }
    }
}

/// rGesEve — one signed, dated event submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Id: submission-scoped event identifier.
    pub id: String,
    /// dFecFirma: signing timestamp.
    pub signing_date: NaiveDateTime,
    pub event: DocumentEvent,
}

/// rLoteDE — an ordered collection of documents submitted together.
///
/// Owned transiently for the duration of one submission; the service assigns
/// the batch number used for later polling. Duplicate CDCs are not rejected
/// here — the authority reports them item-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub documents: Vec<ElectronicDocument>,
}

impl Batch {
    pub fn new(documents: Vec<ElectronicDocument>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
