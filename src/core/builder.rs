use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::document::*;
use super::error::SifenError;
use super::types::*;
use super::validation;

/// Builder for constructing valid electronic documents.
///
/// ```
/// use chrono::{NaiveDate, NaiveDateTime};
/// use rust_decimal_macros::dec;
/// use sifen::core::*;
///
/// let ts: NaiveDateTime = "2024-06-15T10:30:00".parse().unwrap();
/// let de = DocumentBuilder::new(ts, ts)
///     .security_code("000000123")
///     .stamp(StampInfo {
///         document_type: DocumentType::Invoice,
///         stamp_number: 12557605,
///         establishment: "001".into(),
///         issuance_point: "002".into(),
///         document_number: "0000021".into(),
///         validity_start: NaiveDate::from_ymd_opt(2019, 7, 24).unwrap(),
///     })
///     .issuer(IssuerBuilder::new("80089752", 1, ContributorType::LegalEntity, "ACME S.A.")
///         .activity("62010", "Computer programming")
///         .build())
///     .recipient(RecipientBuilder::non_taxpayer(OperationKind::B2C, Country::PRY)
///         .identity(IdentityDocType::ParaguayanId, "4184256", "Juan Pérez")
///         .build())
///     .add_item(ItemBuilder::new("001", "Services", MeasureUnit::Unit, dec!(1), dec!(1100000))
///         .tax(IvaAffectation::Taxed, dec!(100), dec!(10))
///         .build())
///     .build();
/// assert!(de.is_ok());
/// ```
pub struct DocumentBuilder {
    signing_date: NaiveDateTime,
    emission_date: NaiveDateTime,
    system_type: u8,
    emission_type: EmissionType,
    security_code: String,
    stamp: Option<StampInfo>,
    commercial: CommercialInfo,
    issuer: Option<Issuer>,
    recipient: Option<Recipient>,
    invoice: Option<InvoiceInfo>,
    condition: Option<ConditionInfo>,
    items: Vec<Item>,
}

impl DocumentBuilder {
    pub fn new(signing_date: NaiveDateTime, emission_date: NaiveDateTime) -> Self {
        Self {
            signing_date,
            emission_date,
            system_type: 1,
            emission_type: EmissionType::Normal,
            security_code: String::new(),
            stamp: None,
            commercial: CommercialInfo {
                transaction_type: TransactionType::ServiceProvision,
                tax_type: TaxType::Iva,
                currency: Currency::PYG,
            },
            issuer: None,
            recipient: None,
            invoice: Some(InvoiceInfo {
                presence: PresenceIndicator::Electronic,
            }),
            condition: None,
            items: Vec::new(),
        }
    }

    pub fn emission_type(mut self, emission_type: EmissionType) -> Self {
        self.emission_type = emission_type;
        self
    }

    /// dCodSeg: 9-digit security code feeding the CDC.
    pub fn security_code(mut self, code: impl Into<String>) -> Self {
        self.security_code = code.into();
        self
    }

    pub fn system_type(mut self, system_type: u8) -> Self {
        self.system_type = system_type;
        self
    }

    pub fn stamp(mut self, stamp: StampInfo) -> Self {
        self.stamp = Some(stamp);
        self
    }

    pub fn commercial(mut self, commercial: CommercialInfo) -> Self {
        self.commercial = commercial;
        self
    }

    pub fn issuer(mut self, issuer: Issuer) -> Self {
        self.issuer = Some(issuer);
        self
    }

    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn invoice_info(mut self, invoice: InvoiceInfo) -> Self {
        self.invoice = Some(invoice);
        self
    }

    pub fn condition(mut self, condition: ConditionInfo) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn add_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Assemble the document and validate every schema invariant.
    ///
    /// # Errors
    ///
    /// `SifenError::Validation` carrying the full list of violations —
    /// not just the first — so the caller can report all defects at once.
    pub fn build(self) -> Result<ElectronicDocument, SifenError> {
        let mut errors = Vec::new();
        if self.stamp.is_none() {
            errors.push(super::ValidationError::new("stamp", "stamp group (gTimb) is required"));
        }
        if self.issuer.is_none() {
            errors.push(super::ValidationError::new("issuer", "issuer group (gEmis) is required"));
        }
        if self.recipient.is_none() {
            errors.push(super::ValidationError::new(
                "recipient",
                "recipient group (gDatRec) is required",
            ));
        }
        let (Some(stamp), Some(issuer), Some(recipient)) =
            (self.stamp, self.issuer, self.recipient)
        else {
            return Err(SifenError::Validation(errors));
        };

        let document = ElectronicDocument::from_parts(
            self.signing_date,
            self.system_type,
            OperationInfo {
                emission_type: self.emission_type,
                security_code: self.security_code,
            },
            stamp,
            self.emission_date,
            self.commercial,
            issuer,
            recipient,
            TypeSpecific {
                invoice: self.invoice,
                condition: self.condition,
            },
            self.items,
        );

        errors.extend(validation::validate_document(&document));
        if errors.is_empty() {
            Ok(document)
        } else {
            Err(SifenError::Validation(errors))
        }
    }
}

/// Builder for the issuer group.
pub struct IssuerBuilder {
    issuer: Issuer,
}

impl IssuerBuilder {
    pub fn new(
        ruc: impl Into<String>,
        check_digit: u8,
        contributor_type: ContributorType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            issuer: Issuer {
                ruc: ruc.into(),
                check_digit,
                contributor_type,
                name: name.into(),
                fantasy_name: None,
                address: None,
                phone: None,
                email: None,
                activities: Vec::new(),
            },
        }
    }

    pub fn fantasy_name(mut self, name: impl Into<String>) -> Self {
        self.issuer.fantasy_name = Some(name.into());
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.issuer.address = Some(address);
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.issuer.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.issuer.email = Some(email.into());
        self
    }

    /// Add one economic activity (at least one is required).
    pub fn activity(mut self, code: impl Into<String>, description: impl Into<String>) -> Self {
        self.issuer.activities.push(EconomicActivity {
            code: code.into(),
            description: description.into(),
        });
        self
    }

    pub fn build(self) -> Issuer {
        self.issuer
    }
}

/// Builder for the recipient group. The two entry points fix the recipient
/// nature so the conditional field sets stay consistent by construction.
pub struct RecipientBuilder {
    recipient: Recipient,
}

impl RecipientBuilder {
    /// A taxpayer recipient, identified by RUC.
    pub fn taxpayer(
        operation_kind: OperationKind,
        country: Country,
        contributor_type: ContributorType,
        ruc: impl Into<String>,
        ruc_check_digit: u8,
        name: impl Into<String>,
    ) -> Self {
        Self {
            recipient: Recipient {
                nature: RecipientNature::Taxpayer,
                operation_kind,
                country,
                contributor_type: Some(contributor_type),
                ruc: Some(ruc.into()),
                ruc_check_digit: Some(ruc_check_digit),
                id_doc_type: None,
                id_doc_number: None,
                name: Some(name.into()),
                fantasy_name: None,
                address: None,
                phone: None,
                email: None,
                client_code: None,
            },
        }
    }

    /// A non-taxpayer recipient. Identify it with [`Self::identity`] or leave
    /// it unnamed with [`Self::unnamed`].
    pub fn non_taxpayer(operation_kind: OperationKind, country: Country) -> Self {
        Self {
            recipient: Recipient {
                nature: RecipientNature::NonTaxpayer,
                operation_kind,
                country,
                contributor_type: None,
                ruc: None,
                ruc_check_digit: None,
                id_doc_type: None,
                id_doc_number: None,
                name: None,
                fantasy_name: None,
                address: None,
                phone: None,
                email: None,
                client_code: None,
            },
        }
    }

    /// Identity document of a non-taxpayer recipient.
    pub fn identity(
        mut self,
        doc_type: IdentityDocType,
        number: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.recipient.id_doc_type = Some(doc_type);
        self.recipient.id_doc_number = Some(number.into());
        self.recipient.name = Some(name.into());
        self
    }

    /// Mark the recipient as unnamed (innominado).
    pub fn unnamed(mut self) -> Self {
        self.recipient.id_doc_type = Some(IdentityDocType::Unnamed);
        self.recipient.id_doc_number = None;
        self.recipient.name = None;
        self
    }

    pub fn fantasy_name(mut self, name: impl Into<String>) -> Self {
        self.recipient.fantasy_name = Some(name.into());
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.recipient.address = Some(address);
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.recipient.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.recipient.email = Some(email.into());
        self
    }

    /// dCodCliente, left-zero-padded to 3 digits.
    pub fn client_code(mut self, code: impl Into<String>) -> Self {
        self.recipient.client_code = Some(format!("{:0>3}", code.into()));
        self
    }

    pub fn build(self) -> Recipient {
        self.recipient
    }
}

/// Builder for operation items.
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn new(
        internal_code: impl Into<String>,
        description: impl Into<String>,
        unit: MeasureUnit,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            item: Item {
                internal_code: internal_code.into(),
                description: description.into(),
                unit,
                quantity,
                unit_price,
                discount: Decimal::ZERO,
                tax: ItemTax {
                    affectation: IvaAffectation::Taxed,
                    proportion: Decimal::from(100),
                    rate: Decimal::from(10),
                },
            },
        }
    }

    /// Per-unit discount.
    pub fn discount(mut self, discount: Decimal) -> Self {
        self.item.discount = discount;
        self
    }

    pub fn tax(mut self, affectation: IvaAffectation, proportion: Decimal, rate: Decimal) -> Self {
        self.item.tax = ItemTax {
            affectation,
            proportion,
            rate,
        };
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}
