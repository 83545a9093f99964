use rust_decimal::Decimal;

use super::writer::{XmlResult, XmlWriter, format_amount, format_number, strip_declaration};
use crate::core::*;

/// Schema version serialized as dVerFor.
pub const FORMAT_VERSION: &str = "150";

/// SIFEN XSD namespace of the rDE document.
pub const SIFEN_NS: &str = "http://ekuatia.set.gov.py/sifen/xsd";

/// Options affecting optional schema elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Emit the technical-note 13 field set (dBasExe on item IVA groups).
    pub technical_note_13: bool,
}

/// Generate the canonical rDE XML for a document.
///
/// Sibling order is schema-fixed and reproduced exactly; optional elements
/// are emitted only when their governing condition holds. The document must
/// have totals computed and its CDC assigned.
pub fn to_xml(document: &ElectronicDocument) -> XmlResult {
    to_xml_with(document, &SerializeOptions::default())
}

/// [`to_xml`] with explicit serialization options.
pub fn to_xml_with(document: &ElectronicDocument, options: &SerializeOptions) -> XmlResult {
    let totals = document.totals.as_ref().ok_or_else(|| {
        SifenError::IllegalState("totals must be computed before XML generation".into())
    })?;
    let cdc = document.cdc().ok_or_else(|| {
        SifenError::IllegalState("control code must be assigned before XML generation".into())
    })?;

    let currency = document.commercial.currency;
    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        "rDE",
        &[
            ("xmlns", SIFEN_NS),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    w.text_element("dVerFor", FORMAT_VERSION)?;

    w.start_element_with_attrs("DE", &[("Id", cdc.as_str())])?;
    w.text_element("dDVId", &cdc.check_digit().to_string())?;
    w.text_element(
        "dFecFirma",
        &document.signing_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
    )?;
    w.text_element("dSisFact", &document.system_type.to_string())?;

    // gOpeDE: operation group
    w.start_element("gOpeDE")?;
    w.text_element("iTipEmi", &document.operation.emission_type.code().to_string())?;
    w.text_element("dDesTipEmi", document.operation.emission_type.description())?;
    w.text_element("dCodSeg", &document.operation.security_code)?;
    w.end_element("gOpeDE")?;

    // gTimb: stamp group
    let stamp = &document.stamp;
    w.start_element("gTimb")?;
    w.text_element("iTiDE", &stamp.document_type.code().to_string())?;
    w.text_element("dDesTiDE", stamp.document_type.description())?;
    w.text_element("dNumTim", &stamp.stamp_number.to_string())?;
    w.text_element("dEst", &stamp.establishment)?;
    w.text_element("dPunExp", &stamp.issuance_point)?;
    w.text_element("dNumDoc", &stamp.document_number)?;
    w.text_element("dFeIniT", &stamp.validity_start.to_string())?;
    w.end_element("gTimb")?;

    // gDatGralOpe: general operation data
    w.start_element("gDatGralOpe")?;
    w.text_element(
        "dFeEmiDE",
        &document.emission_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
    )?;
    write_commercial(&mut w, &document.commercial)?;
    write_issuer(&mut w, &document.issuer)?;
    write_recipient(&mut w, &document.recipient)?;
    w.end_element("gDatGralOpe")?;

    // gDtipDE: type-specific data
    w.start_element("gDtipDE")?;
    if let Some(invoice) = &document.type_specific.invoice {
        w.start_element("gCamFE")?;
        w.text_element("iIndPres", &invoice.presence.code().to_string())?;
        w.text_element("dDesIndPres", invoice.presence.description())?;
        w.end_element("gCamFE")?;
    }
    if let Some(condition) = &document.type_specific.condition {
        write_condition(&mut w, condition)?;
    }
    for item in &document.items {
        write_item(&mut w, item, currency, options)?;
    }
    w.end_element("gDtipDE")?;

    write_totals(&mut w, totals, currency)?;

    w.end_element("DE")?;
    w.end_element("rDE")?;

    w.into_string()
}

fn write_commercial(w: &mut XmlWriter, commercial: &CommercialInfo) -> Result<(), SifenError> {
    w.start_element("gOpeCom")?;
    w.text_element("iTipTra", &commercial.transaction_type.code().to_string())?;
    w.text_element("dDesTipTra", commercial.transaction_type.description())?;
    w.text_element("iTImp", &commercial.tax_type.code().to_string())?;
    w.text_element("dDesImp", commercial.tax_type.description())?;
    w.text_element("cMoneOpe", commercial.currency.code())?;
    w.text_element("dDesMoneOpe", commercial.currency.description())?;
    w.end_element("gOpeCom")?;
    Ok(())
}

fn write_issuer(w: &mut XmlWriter, issuer: &Issuer) -> Result<(), SifenError> {
    w.start_element("gEmis")?;
    w.text_element("dRucEm", &issuer.ruc)?;
    w.text_element("dDVEmi", &issuer.check_digit.to_string())?;
    w.text_element("iTipCont", &issuer.contributor_type.code().to_string())?;
    w.text_element("dNomEmi", &issuer.name)?;
    if let Some(fantasy) = &issuer.fantasy_name {
        w.text_element("dNomFanEmi", fantasy)?;
    }
    if let Some(address) = &issuer.address {
        write_address(w, address, AddressRole::Issuer)?;
    }
    if let Some(phone) = &issuer.phone {
        w.text_element("dTelEmi", phone)?;
    }
    if let Some(email) = &issuer.email {
        w.text_element("dEmailE", email)?;
    }
    for activity in &issuer.activities {
        w.start_element("gActEco")?;
        w.text_element("cActEco", &activity.code)?;
        w.text_element("dDesActEco", &activity.description)?;
        w.end_element("gActEco")?;
    }
    w.end_element("gEmis")?;
    Ok(())
}

fn write_recipient(w: &mut XmlWriter, recipient: &Recipient) -> Result<(), SifenError> {
    w.start_element("gDatRec")?;
    w.text_element("iNatRec", &recipient.nature.code().to_string())?;
    w.text_element("iTiOpe", &recipient.operation_kind.code().to_string())?;
    w.text_element("cPaisRec", recipient.country.code())?;
    w.text_element("dDesPaisRe", recipient.country.name())?;

    if recipient.nature == RecipientNature::Taxpayer {
        if let (Some(contributor), Some(ruc), Some(dv)) = (
            recipient.contributor_type,
            &recipient.ruc,
            recipient.ruc_check_digit,
        ) {
            w.text_element("iTiContRec", &contributor.code().to_string())?;
            w.text_element("dRucRec", ruc)?;
            w.text_element("dDVRec", &dv.to_string())?;
        }
    }
    if recipient.nature == RecipientNature::NonTaxpayer {
        if let Some(doc_type) = recipient.id_doc_type {
            w.text_element("iTipIDRec", &doc_type.code().to_string())?;
            w.text_element("dDTipIDRec", doc_type.description())?;
            if !doc_type.is_unnamed() {
                w.text_element(
                    "dNumIDRec",
                    recipient.id_doc_number.as_deref().unwrap_or("0"),
                )?;
            }
        }
    }
    if let Some(name) = &recipient.name {
        w.text_element("dNomRec", name)?;
    }
    if let Some(fantasy) = &recipient.fantasy_name {
        w.text_element("dNomFanRec", fantasy)?;
    }
    if let Some(address) = &recipient.address {
        write_address(w, address, AddressRole::Recipient)?;
    }
    if let Some(phone) = &recipient.phone {
        w.text_element("dTelRec", phone)?;
    }
    if let Some(email) = &recipient.email {
        w.text_element("dEmailRec", email)?;
    }
    if let Some(client_code) = &recipient.client_code {
        w.text_element("dCodCliente", client_code)?;
    }
    w.end_element("gDatRec")?;
    Ok(())
}

enum AddressRole {
    Issuer,
    Recipient,
}

fn write_address(
    w: &mut XmlWriter,
    address: &Address,
    role: AddressRole,
) -> Result<(), SifenError> {
    // element names differ per role, structure does not
    let (street, house, dep, dep_desc, dis, dis_desc, city, city_desc) = match role {
        AddressRole::Issuer => (
            "dDirEmi", "dNumCas", "cDepEmi", "dDesDepEmi", "cDisEmi", "dDesDisEmi", "cCiuEmi",
            "dDesCiuEmi",
        ),
        AddressRole::Recipient => (
            "dDirRec",
            "dNumCasRec",
            "cDepRec",
            "dDesDepRec",
            "cDisRec",
            "dDesDisRec",
            "cCiuRec",
            "dDesCiuRec",
        ),
    };
    w.text_element(street, &address.street)?;
    w.text_element(house, &address.house_number)?;
    if let Some(department) = address.department {
        w.text_element(dep, &department.code().to_string())?;
        w.text_element(dep_desc, department.description())?;
    }
    if let Some((code, name)) = &address.district {
        w.text_element(dis, &code.to_string())?;
        w.text_element(dis_desc, name)?;
    }
    if let Some((code, name)) = &address.city {
        w.text_element(city, &code.to_string())?;
        w.text_element(city_desc, name)?;
    }
    Ok(())
}

fn write_condition(w: &mut XmlWriter, condition: &ConditionInfo) -> Result<(), SifenError> {
    w.start_element("gCamCond")?;
    w.text_element("iCondOpe", &condition.condition.code().to_string())?;
    w.text_element("dDCondOpe", condition.condition.description())?;
    for payment in &condition.payments {
        w.start_element("gPaConEIni")?;
        w.text_element("iTiPago", &payment.kind.code().to_string())?;
        w.text_element("dDesTiPag", &payment.description)?;
        w.text_element(
            "dMonTiPag",
            &format_amount(payment.amount, payment.currency.decimals()),
        )?;
        w.text_element("cMoneTiPag", payment.currency.code())?;
        w.end_element("gPaConEIni")?;
    }
    w.end_element("gCamCond")?;
    Ok(())
}

fn write_item(
    w: &mut XmlWriter,
    item: &Item,
    currency: Currency,
    options: &SerializeOptions,
) -> Result<(), SifenError> {
    let dp = currency.decimals();
    w.start_element("gCamItem")?;
    w.text_element("dCodInt", &item.internal_code)?;
    w.text_element("dDesProSer", &item.description)?;
    w.text_element("cUniMed", &item.unit.code().to_string())?;
    w.text_element("dDesUniMed", item.unit.symbol())?;
    w.text_element("dCantProSer", &format_number(item.quantity))?;

    w.start_element("gValorItem")?;
    w.text_element("dPUniProSer", &format_amount(item.unit_price, dp))?;
    w.text_element("dTotBruOpeItem", &format_amount(item.gross_amount(), dp))?;
    w.start_element("gValorRestaItem")?;
    w.text_element("dDescItem", &format_amount(item.discount, dp))?;
    w.text_element("dTotOpeItem", &format_amount(item.net_amount(), dp))?;
    w.end_element("gValorRestaItem")?;
    w.end_element("gValorItem")?;

    let tax = &item.tax;
    w.start_element("gCamIVA")?;
    w.text_element("iAfecIVA", &tax.affectation.code().to_string())?;
    w.text_element("dDesAfecIVA", tax.affectation.description())?;
    w.text_element("dPropIVA", &format_number(tax.proportion))?;
    w.text_element("dTasaIVA", &format_number(tax.rate))?;
    w.text_element("dBasGravIVA", &format_amount(item.iva_base(), dp))?;
    w.text_element("dLiqIVAItem", &format_amount(item.iva_amount(), dp))?;
    if options.technical_note_13 {
        // exempt remainder of a partially taxed amount
        let exempt_base = item.net_amount() - item.iva_base() - item.iva_amount();
        w.text_element("dBasExe", &format_amount(exempt_base, dp))?;
    }
    w.end_element("gCamIVA")?;

    w.end_element("gCamItem")?;
    Ok(())
}

fn write_totals(w: &mut XmlWriter, totals: &Totals, currency: Currency) -> Result<(), SifenError> {
    let dp = currency.decimals();
    let amount = |d: Decimal| format_amount(d, dp);
    w.start_element("gTotSub")?;
    w.text_element("dSubExe", &amount(totals.exempt_subtotal))?;
    w.text_element("dSub5", &amount(totals.subtotal_5))?;
    w.text_element("dSub10", &amount(totals.subtotal_10))?;
    w.text_element("dTotOpe", &amount(totals.operation_total))?;
    w.text_element("dTotDesc", &amount(totals.discount_total))?;
    w.text_element("dRedon", &amount(totals.rounding_adjustment))?;
    w.text_element("dTotGralOpe", &amount(totals.grand_total))?;
    w.text_element("dIVA5", &amount(totals.iva_5))?;
    w.text_element("dIVA10", &amount(totals.iva_10))?;
    w.text_element("dTotIVA", &amount(totals.iva_total))?;
    w.text_element("dBaseGrav5", &amount(totals.base_5))?;
    w.text_element("dBaseGrav10", &amount(totals.base_10))?;
    w.text_element("dTBasGraIVA", &amount(totals.base_total))?;
    w.end_element("gTotSub")?;
    Ok(())
}

/// Wrap already-serialized (typically signed) rDE trees into an rLoteDE
/// batch payload. Declarations are stripped from each part.
pub fn wrap_batch<'a>(parts: impl IntoIterator<Item = &'a str>) -> XmlResult {
    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs("rLoteDE", &[("xmlns", SIFEN_NS)])?;
    for part in parts {
        w.raw(strip_declaration(part))?;
    }
    w.end_element("rLoteDE")?;
    w.into_string()
}

/// Serialize an unsigned batch. Each document must already have totals and a
/// control code.
pub fn to_batch_xml(batch: &Batch) -> XmlResult {
    let serialized: Vec<String> = batch
        .documents
        .iter()
        .map(to_xml)
        .collect::<Result<_, _>>()?;
    wrap_batch(serialized.iter().map(String::as_str))
}
