use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::check_digit::{ControlCode, DocumentIdentity, compute_cdc};
use super::error::SifenError;
use super::rounding::OfficialRounding;
use super::types::*;

/// gOpeDE — operation field group of the DE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationInfo {
    /// iTipEmi: emission type.
    pub emission_type: EmissionType,
    /// dCodSeg: 9-digit security code, supplied by the caller so the CDC
    /// stays deterministic.
    pub security_code: String,
}

/// gTimb — stamp (timbrado) field group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampInfo {
    /// iTiDE: document type.
    pub document_type: DocumentType,
    /// dNumTim: stamp number (8 digits).
    pub stamp_number: u32,
    /// dEst: establishment code (3 digits).
    pub establishment: String,
    /// dPunExp: issuance point code (3 digits).
    pub issuance_point: String,
    /// dNumDoc: document number (7 digits).
    pub document_number: String,
    /// dFeIniT: stamp validity start date.
    pub validity_start: NaiveDate,
}

/// gOpeCom — commercial operation field group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialInfo {
    /// iTipTra: transaction type.
    pub transaction_type: TransactionType,
    /// iTImp: tax type.
    pub tax_type: TaxType,
    /// cMoneOpe: operation currency.
    pub currency: Currency,
}

/// gActEco — one economic activity of the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicActivity {
    /// cActEco: activity code.
    pub code: String,
    /// dDesActEco: activity description.
    pub description: String,
}

/// Postal address sub-group shared by issuer and recipient.
///
/// The street always travels together with the house number; locality codes
/// are emitted pairwise with their descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// dDirEmi / dDirRec: street address.
    pub street: String,
    /// dNumCas / dNumCasRec: house number.
    pub house_number: String,
    /// cDepEmi / cDepRec: department.
    pub department: Option<Department>,
    /// cDisEmi / cDisRec + dDesDisEmi / dDesDisRec: district code and name.
    pub district: Option<(u16, String)>,
    /// cCiuEmi / cCiuRec + dDesCiuEmi / dDesCiuRec: city code and name.
    pub city: Option<(u32, String)>,
}

/// gEmis — issuer field group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    /// dRucEm: issuer RUC (without check digit).
    pub ruc: String,
    /// dDVEmi: RUC check digit.
    pub check_digit: u8,
    /// iTipCont: contributor type.
    pub contributor_type: ContributorType,
    /// dNomEmi: legal name.
    pub name: String,
    /// dNomFanEmi: fantasy (trade) name, emitted only when supplied.
    pub fantasy_name: Option<String>,
    pub address: Option<Address>,
    /// dTelEmi.
    pub phone: Option<String>,
    /// dEmailE.
    pub email: Option<String>,
    /// gActEco: at least one economic activity.
    pub activities: Vec<EconomicActivity>,
}

/// gDatRec — recipient field group with its conditional sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// iNatRec: recipient nature.
    pub nature: RecipientNature,
    /// iTiOpe: operation kind.
    pub operation_kind: OperationKind,
    /// cPaisRec: recipient country.
    pub country: Country,
    /// iTiContRec: present only for taxpayer recipients.
    pub contributor_type: Option<ContributorType>,
    /// dRucRec: present only for taxpayer recipients.
    pub ruc: Option<String>,
    /// dDVRec: present only for taxpayer recipients.
    pub ruc_check_digit: Option<u8>,
    /// iTipIDRec: present only for non-taxpayer recipients.
    pub id_doc_type: Option<IdentityDocType>,
    /// dNumIDRec: forbidden for unnamed recipients.
    pub id_doc_number: Option<String>,
    /// dNomRec: forbidden for unnamed recipients.
    pub name: Option<String>,
    /// dNomFanRec.
    pub fantasy_name: Option<String>,
    pub address: Option<Address>,
    /// dTelRec.
    pub phone: Option<String>,
    /// dEmailRec.
    pub email: Option<String>,
    /// dCodCliente: issuer-side client code, zero-padded to 3.
    pub client_code: Option<String>,
}

/// gCamFE — invoice-specific field group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceInfo {
    /// iIndPres: presence indicator.
    pub presence: PresenceIndicator,
}

/// gPaConEIni — one payment entry of a cash settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// iTiPago.
    pub kind: PaymentType,
    /// dDesTiPag.
    pub description: String,
    /// dMonTiPag.
    pub amount: Decimal,
    /// cMoneTiPag.
    pub currency: Currency,
}

/// gCamCond — settlement condition field group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionInfo {
    /// iCondOpe.
    pub condition: OperationCondition,
    /// gPaConEIni: required when the condition is cash.
    pub payments: Vec<PaymentEntry>,
}

/// gCamIVA — IVA fields of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTax {
    /// iAfecIVA.
    pub affectation: IvaAffectation,
    /// dPropIVA: taxed proportion in percent (0–100).
    pub proportion: Decimal,
    /// dTasaIVA: IVA rate in percent (0, 5 or 10).
    pub rate: Decimal,
}

/// gCamItem — one operation item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// dCodInt: internal item code.
    pub internal_code: String,
    /// dDesProSer: item description.
    pub description: String,
    /// cUniMed.
    pub unit: MeasureUnit,
    /// dCantProSer: quantity.
    pub quantity: Decimal,
    /// dPUniProSer: unit price, IVA inclusive.
    pub unit_price: Decimal,
    /// dDescItem: per-unit discount.
    pub discount: Decimal,
    pub tax: ItemTax,
}

impl Item {
    /// dTotBruOpeItem: gross amount before discount.
    pub fn gross_amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// dTotOpeItem: net item amount after discount.
    pub fn net_amount(&self) -> Decimal {
        (self.unit_price - self.discount) * self.quantity
    }

    /// dBasGravIVA: taxed base of the (IVA-inclusive) net amount.
    pub fn iva_base(&self) -> Decimal {
        match self.tax.affectation {
            IvaAffectation::Taxed | IvaAffectation::PartiallyTaxed => {
                let net = self.net_amount();
                (Decimal::from(100) * net * self.tax.proportion)
                    / (Decimal::from(10000) + self.tax.rate * self.tax.proportion)
            }
            IvaAffectation::Exonerated | IvaAffectation::Exempt => Decimal::ZERO,
        }
    }

    /// dLiqIVAItem: IVA amount settled by this item.
    pub fn iva_amount(&self) -> Decimal {
        self.iva_base() * self.tax.rate / Decimal::from(100)
    }
}

/// gDtipDE — fields specific to the document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpecific {
    /// gCamFE: required for invoices.
    pub invoice: Option<InvoiceInfo>,
    /// gCamCond: settlement condition.
    pub condition: Option<ConditionInfo>,
}

/// gTotSub — computed subtotal/total field group. Set by
/// [`ElectronicDocument::compute_totals`], never by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// dSubExe: exempt/exonerated subtotal.
    pub exempt_subtotal: Decimal,
    /// dSub5: subtotal at 5%.
    pub subtotal_5: Decimal,
    /// dSub10: subtotal at 10%.
    pub subtotal_10: Decimal,
    /// dTotOpe: operation total.
    pub operation_total: Decimal,
    /// dTotDesc: discount total.
    pub discount_total: Decimal,
    /// dRedon: official rounding adjustment.
    pub rounding_adjustment: Decimal,
    /// dTotGralOpe: grand total after official rounding.
    pub grand_total: Decimal,
    /// dIVA5.
    pub iva_5: Decimal,
    /// dIVA10.
    pub iva_10: Decimal,
    /// dTotIVA.
    pub iva_total: Decimal,
    /// dBaseGrav5.
    pub base_5: Decimal,
    /// dBaseGrav10.
    pub base_10: Decimal,
    /// dTBasGraIVA.
    pub base_total: Decimal,
}

/// A SIFEN electronic document (DE).
///
/// Built via [`super::DocumentBuilder`], totalled with [`Self::compute_totals`],
/// then frozen by [`Self::assign_cdc`]. Mutation after signing is detected by
/// signature verification, not prevented here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectronicDocument {
    /// dFecFirma: signing timestamp.
    pub signing_date: NaiveDateTime,
    /// dSisFact: invoicing system type (1 = taxpayer's own system).
    pub system_type: u8,
    pub operation: OperationInfo,
    pub stamp: StampInfo,
    /// dFeEmiDE: emission timestamp.
    pub emission_date: NaiveDateTime,
    pub commercial: CommercialInfo,
    pub issuer: Issuer,
    pub recipient: Recipient,
    pub type_specific: TypeSpecific,
    pub items: Vec<Item>,
    pub totals: Option<Totals>,
    cdc: Option<ControlCode>,
}

impl ElectronicDocument {
    pub(crate) fn from_parts(
        signing_date: NaiveDateTime,
        system_type: u8,
        operation: OperationInfo,
        stamp: StampInfo,
        emission_date: NaiveDateTime,
        commercial: CommercialInfo,
        issuer: Issuer,
        recipient: Recipient,
        type_specific: TypeSpecific,
        items: Vec<Item>,
    ) -> Self {
        Self {
            signing_date,
            system_type,
            operation,
            stamp,
            emission_date,
            commercial,
            issuer,
            recipient,
            type_specific,
            items,
            totals: None,
            cdc: None,
        }
    }

    /// Used by the XML parser to restore a previously assigned control code.
    pub(crate) fn restore_cdc(&mut self, cdc: ControlCode) {
        self.cdc = Some(cdc);
    }

    /// The control code, if already assigned.
    pub fn cdc(&self) -> Option<&ControlCode> {
        self.cdc.as_ref()
    }

    /// Walk the items and aggregate the gTotSub group, applying the official
    /// rounding of the operation currency to the grand total.
    ///
    /// Idempotent: recomputation with unchanged items yields identical
    /// totals.
    pub fn compute_totals(&mut self, rounding: &OfficialRounding) -> Result<(), SifenError> {
        let currency = self.commercial.currency;
        let dp = currency.decimals();
        let money =
            |d: Decimal| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);

        let mut exempt = Decimal::ZERO;
        let mut sub5 = Decimal::ZERO;
        let mut sub10 = Decimal::ZERO;
        let mut discount = Decimal::ZERO;
        let mut iva5 = Decimal::ZERO;
        let mut iva10 = Decimal::ZERO;
        let mut base5 = Decimal::ZERO;
        let mut base10 = Decimal::ZERO;

        for item in &self.items {
            let net = item.net_amount();
            discount += item.discount * item.quantity;
            match item.tax.affectation {
                IvaAffectation::Exonerated | IvaAffectation::Exempt => exempt += net,
                IvaAffectation::Taxed | IvaAffectation::PartiallyTaxed => {
                    if item.tax.rate == Decimal::from(5) {
                        sub5 += net;
                        base5 += item.iva_base();
                        iva5 += item.iva_amount();
                    } else {
                        sub10 += net;
                        base10 += item.iva_base();
                        iva10 += item.iva_amount();
                    }
                }
            }
        }

        let operation_total = exempt + sub5 + sub10;
        let grand_total = rounding.round(currency, operation_total)?;

        self.totals = Some(Totals {
            exempt_subtotal: money(exempt),
            subtotal_5: money(sub5),
            subtotal_10: money(sub10),
            operation_total: money(operation_total),
            discount_total: money(discount),
            rounding_adjustment: money(operation_total - grand_total),
            grand_total: money(grand_total),
            iva_5: money(iva5),
            iva_10: money(iva10),
            iva_total: money(iva5 + iva10),
            base_5: money(base5),
            base_10: money(base10),
            base_total: money(base5 + base10),
        });
        Ok(())
    }

    /// Compute and assign the control code. The CDC is immutable once set:
    /// a second call fails with `SifenError::IllegalState`.
    pub fn assign_cdc(&mut self) -> Result<&ControlCode, SifenError> {
        if self.cdc.is_some() {
            return Err(SifenError::IllegalState(
                "control code already assigned to this document".into(),
            ));
        }
        let cdc = compute_cdc(&self.identity())?;
        Ok(self.cdc.insert(cdc))
    }

    /// The identity fields feeding CDC computation.
    pub fn identity(&self) -> DocumentIdentity {
        DocumentIdentity {
            document_type: self.stamp.document_type,
            ruc: self.issuer.ruc.clone(),
            ruc_check_digit: self.issuer.check_digit,
            establishment: self.stamp.establishment.clone(),
            issuance_point: self.stamp.issuance_point.clone(),
            document_number: self.stamp.document_number.clone(),
            contributor_type: self.issuer.contributor_type,
            emission_date: self.emission_date.date(),
            emission_type: self.operation.emission_type,
            security_code: self.operation.security_code.clone(),
        }
    }
}
