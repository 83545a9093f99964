use super::de::{FORMAT_VERSION, SIFEN_NS};
use super::writer::{XmlResult, XmlWriter};
use crate::core::*;

/// Serialize one event envelope as an rGesEve tree.
///
/// The envelope id becomes the Id attribute referenced by the enveloped
/// signature, the same way a document's CDC names its DE element.
pub fn to_event_xml(envelope: &EventEnvelope) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("rGesEve", &[("xmlns", SIFEN_NS), ("Id", &envelope.id)])?;
    w.text_element(
        "dFecFirma",
        &envelope.signing_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
    )?;
    w.text_element("dVerFor", FORMAT_VERSION)?;
    w.start_element("gGroupTiEvt")?;
    match &envelope.event {
        DocumentEvent::Cancellation(event) => write_cancellation(&mut w, event)?,
        DocumentEvent::Naming(event) => write_naming(&mut w, event)?,
    }
    w.end_element("gGroupTiEvt")?;
    w.end_element("rGesEve")?;
    w.into_string()
}

fn write_cancellation(w: &mut XmlWriter, event: &CancellationEvent) -> Result<(), SifenError> {
    w.start_element("rGeVeCan")?;
    w.text_element("Id", event.cdc.as_str())?;
    w.text_element("mOtEve", &event.motive)?;
    w.end_element("rGeVeCan")?;
    Ok(())
}

fn write_naming(w: &mut XmlWriter, event: &NamingEvent) -> Result<(), SifenError> {
    w.start_element("rGEveNom")?;
    w.text_element("Id", event.cdc.as_str())?;
    w.text_element("mOtEve", &event.motive)?;
    w.text_element("iNatRec", &event.nature.code().to_string())?;
    w.text_element("cPaisRec", event.country.code())?;
    w.text_element("dDesPaisRe", event.country.name())?;

    if event.nature == RecipientNature::Taxpayer {
        if let (Some(contributor), Some(ruc), Some(dv)) =
            (event.contributor_type, &event.ruc, event.ruc_check_digit)
        {
            w.text_element("iTiContRec", &contributor.code().to_string())?;
            w.text_element("dRucRec", ruc)?;
            w.text_element("dDVRec", &dv.to_string())?;
        }
    }
    if event.nature == RecipientNature::NonTaxpayer {
        if let Some(doc_type) = event.id_doc_type {
            w.text_element("iTipIDRec", &doc_type.code().to_string())?;
            w.text_element("dDTipIDRec", doc_type.description())?;
            w.text_element("dNumIDRec", event.id_doc_number.as_deref().unwrap_or("0"))?;
        }
    }
    w.text_element("dNomRec", event.name.as_deref().unwrap_or("Sin Nombre"))?;
    if let Some(fantasy) = &event.fantasy_name {
        w.text_element("dNomFanRec", fantasy)?;
    }
    if let Some(address) = &event.address {
        w.text_element("dDirRec", &address.street)?;
        w.text_element("dNumCasRec", &address.house_number)?;
        if let Some(department) = address.department {
            w.text_element("cDepRec", &department.code().to_string())?;
            w.text_element("dDesDepRec", department.description())?;
        }
        if let Some((code, name)) = &address.district {
            w.text_element("cDisRec", &code.to_string())?;
            w.text_element("dDesDisRec", name)?;
        }
        if let Some((code, name)) = &address.city {
            w.text_element("cCiuRec", &code.to_string())?;
            w.text_element("dDesCiuRec", name)?;
        }
    }
    if let Some(phone) = &event.phone {
        w.text_element("dTelRec", phone)?;
    }
    if let Some(email) = &event.email {
        w.text_element("dEmailRec", email)?;
    }
    w.end_element("rGEveNom")?;
    Ok(())
}
