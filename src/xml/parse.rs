use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::core::*;

/// Parse a previously generated rDE XML string back into a document.
///
/// Tolerant of unknown elements (they are skipped, not fatal), but fails
/// with `SifenError::Parse` when a structurally required element is absent
/// or a coded value is outside the schema's domain.
pub fn from_xml(xml: &str) -> Result<ElectronicDocument, SifenError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedDe::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "DE" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"Id" {
                            let value = std::str::from_utf8(&attr.value).unwrap_or("");
                            parsed.cdc = Some(value.to_string());
                        }
                    }
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    parsed.handle_text(&path, &text)?;
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                match ended.as_str() {
                    "gCamItem" => {
                        if let Some(item) = parsed.current_item.take() {
                            parsed.items.push(item);
                        }
                    }
                    "gActEco" => {
                        if let Some(activity) = parsed.current_activity.take() {
                            parsed.activities.push(activity);
                        }
                    }
                    "gPaConEIni" => {
                        if let Some(payment) = parsed.current_payment.take() {
                            parsed.payments.push(payment);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SifenError::Parse(format!("malformed XML: {e}"))),
            _ => {}
        }
    }

    parsed.into_document()
}

fn parse_decimal(element: &str, text: &str) -> Result<Decimal, SifenError> {
    Decimal::from_str(text)
        .map_err(|e| SifenError::Parse(format!("invalid decimal in {element}: {e}")))
}

fn parse_int<T: FromStr>(element: &str, text: &str) -> Result<T, SifenError> {
    text.parse()
        .map_err(|_| SifenError::Parse(format!("invalid number in {element}: {text:?}")))
}

fn parse_datetime(element: &str, text: &str) -> Result<NaiveDateTime, SifenError> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| SifenError::Parse(format!("invalid timestamp in {element}: {e}")))
}

fn parse_date(element: &str, text: &str) -> Result<NaiveDate, SifenError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| SifenError::Parse(format!("invalid date in {element}: {e}")))
}

fn coded<T>(element: &str, parsed: Option<T>) -> Result<T, SifenError> {
    parsed.ok_or_else(|| SifenError::Parse(format!("unknown code in {element}")))
}

fn required<T>(element: &str, value: Option<T>) -> Result<T, SifenError> {
    value.ok_or_else(|| SifenError::Parse(format!("required element {element} is missing")))
}

#[derive(Default)]
struct ParsedDe {
    cdc: Option<String>,
    signing_date: Option<NaiveDateTime>,
    system_type: Option<u8>,

    // gOpeDE
    emission_type: Option<EmissionType>,
    security_code: Option<String>,

    // gTimb
    document_type: Option<DocumentType>,
    stamp_number: Option<u32>,
    establishment: Option<String>,
    issuance_point: Option<String>,
    document_number: Option<String>,
    validity_start: Option<NaiveDate>,

    // gDatGralOpe / gOpeCom
    emission_date: Option<NaiveDateTime>,
    transaction_type: Option<TransactionType>,
    tax_type: Option<TaxType>,
    currency: Option<Currency>,

    // gEmis
    issuer_ruc: Option<String>,
    issuer_dv: Option<u8>,
    issuer_contributor: Option<ContributorType>,
    issuer_name: Option<String>,
    issuer_fantasy: Option<String>,
    issuer_street: Option<String>,
    issuer_house: Option<String>,
    issuer_department: Option<Department>,
    issuer_district_code: Option<u16>,
    issuer_district_name: Option<String>,
    issuer_city_code: Option<u32>,
    issuer_city_name: Option<String>,
    issuer_phone: Option<String>,
    issuer_email: Option<String>,
    activities: Vec<EconomicActivity>,
    current_activity: Option<EconomicActivity>,

    // gDatRec
    recipient_nature: Option<RecipientNature>,
    recipient_operation: Option<OperationKind>,
    recipient_country: Option<Country>,
    recipient_contributor: Option<ContributorType>,
    recipient_ruc: Option<String>,
    recipient_dv: Option<u8>,
    recipient_doc_type: Option<IdentityDocType>,
    recipient_doc_number: Option<String>,
    recipient_name: Option<String>,
    recipient_fantasy: Option<String>,
    recipient_street: Option<String>,
    recipient_house: Option<String>,
    recipient_department: Option<Department>,
    recipient_district_code: Option<u16>,
    recipient_district_name: Option<String>,
    recipient_city_code: Option<u32>,
    recipient_city_name: Option<String>,
    recipient_phone: Option<String>,
    recipient_email: Option<String>,
    recipient_client_code: Option<String>,

    // gDtipDE
    saw_invoice_group: bool,
    presence: Option<PresenceIndicator>,
    saw_condition_group: bool,
    condition: Option<OperationCondition>,
    payments: Vec<ParsedPayment>,
    current_payment: Option<ParsedPayment>,
    items: Vec<ParsedItem>,
    current_item: Option<ParsedItem>,

    // gTotSub
    saw_totals: bool,
    totals: ParsedTotals,
}

#[derive(Default)]
struct ParsedPayment {
    kind: Option<PaymentType>,
    description: Option<String>,
    amount: Option<Decimal>,
    currency: Option<Currency>,
}

impl ParsedPayment {
    fn into_entry(self) -> Result<PaymentEntry, SifenError> {
        Ok(PaymentEntry {
            kind: required("iTiPago", self.kind)?,
            description: self.description.unwrap_or_default(),
            amount: required("dMonTiPag", self.amount)?,
            currency: required("cMoneTiPag", self.currency)?,
        })
    }
}

#[derive(Default)]
struct ParsedItem {
    internal_code: Option<String>,
    description: Option<String>,
    unit: Option<MeasureUnit>,
    quantity: Option<Decimal>,
    unit_price: Option<Decimal>,
    discount: Option<Decimal>,
    affectation: Option<IvaAffectation>,
    proportion: Option<Decimal>,
    rate: Option<Decimal>,
}

impl ParsedItem {
    fn into_item(self) -> Result<Item, SifenError> {
        Ok(Item {
            internal_code: self.internal_code.unwrap_or_default(),
            description: required("dDesProSer", self.description)?,
            unit: required("cUniMed", self.unit)?,
            quantity: required("dCantProSer", self.quantity)?,
            unit_price: required("dPUniProSer", self.unit_price)?,
            discount: self.discount.unwrap_or_default(),
            tax: ItemTax {
                affectation: required("iAfecIVA", self.affectation)?,
                proportion: self.proportion.unwrap_or_else(|| Decimal::from(100)),
                rate: self.rate.unwrap_or_default(),
            },
        })
    }
}

#[derive(Default)]
struct ParsedTotals {
    exempt_subtotal: Option<Decimal>,
    subtotal_5: Option<Decimal>,
    subtotal_10: Option<Decimal>,
    operation_total: Option<Decimal>,
    discount_total: Option<Decimal>,
    rounding_adjustment: Option<Decimal>,
    grand_total: Option<Decimal>,
    iva_5: Option<Decimal>,
    iva_10: Option<Decimal>,
    iva_total: Option<Decimal>,
    base_5: Option<Decimal>,
    base_10: Option<Decimal>,
    base_total: Option<Decimal>,
}

impl ParsedDe {
    fn handle_text(&mut self, path: &[String], text: &str) -> Result<(), SifenError> {
        let leaf = path.last().map(|s| s.as_str()).unwrap_or("");
        let in_group = |group: &str| path.iter().any(|p| p == group);

        if in_group("gCamItem") {
            let item = self.current_item.get_or_insert_with(Default::default);
            match leaf {
                "dCodInt" => item.internal_code = Some(text.to_string()),
                "dDesProSer" => item.description = Some(text.to_string()),
                "cUniMed" => {
                    item.unit = Some(coded(leaf, MeasureUnit::from_code(parse_int(leaf, text)?))?)
                }
                "dCantProSer" => item.quantity = Some(parse_decimal(leaf, text)?),
                "dPUniProSer" => item.unit_price = Some(parse_decimal(leaf, text)?),
                "dDescItem" => item.discount = Some(parse_decimal(leaf, text)?),
                "iAfecIVA" => {
                    item.affectation =
                        Some(coded(leaf, IvaAffectation::from_code(parse_int(leaf, text)?))?)
                }
                "dPropIVA" => item.proportion = Some(parse_decimal(leaf, text)?),
                "dTasaIVA" => item.rate = Some(parse_decimal(leaf, text)?),
                // derived amounts are recomputed, descriptions restored from codes
                _ => {}
            }
            return Ok(());
        }

        if in_group("gPaConEIni") {
            let payment = self.current_payment.get_or_insert_with(Default::default);
            match leaf {
                "iTiPago" => {
                    payment.kind =
                        Some(coded(leaf, PaymentType::from_code(parse_int(leaf, text)?))?)
                }
                "dDesTiPag" => payment.description = Some(text.to_string()),
                "dMonTiPag" => payment.amount = Some(parse_decimal(leaf, text)?),
                "cMoneTiPag" => {
                    payment.currency = Some(coded(leaf, Currency::from_code(text))?)
                }
                _ => {}
            }
            return Ok(());
        }

        if in_group("gActEco") {
            let activity = self.current_activity.get_or_insert_with(|| EconomicActivity {
                code: String::new(),
                description: String::new(),
            });
            match leaf {
                "cActEco" => activity.code = text.to_string(),
                "dDesActEco" => activity.description = text.to_string(),
                _ => {}
            }
            return Ok(());
        }

        if in_group("gEmis") {
            match leaf {
                "dRucEm" => self.issuer_ruc = Some(text.to_string()),
                "dDVEmi" => self.issuer_dv = Some(parse_int(leaf, text)?),
                "iTipCont" => {
                    self.issuer_contributor =
                        Some(coded(leaf, ContributorType::from_code(parse_int(leaf, text)?))?)
                }
                "dNomEmi" => self.issuer_name = Some(text.to_string()),
                "dNomFanEmi" => self.issuer_fantasy = Some(text.to_string()),
                "dDirEmi" => self.issuer_street = Some(text.to_string()),
                "dNumCas" => self.issuer_house = Some(text.to_string()),
                "cDepEmi" => {
                    self.issuer_department =
                        Some(coded(leaf, Department::from_code(parse_int(leaf, text)?))?)
                }
                "cDisEmi" => self.issuer_district_code = Some(parse_int(leaf, text)?),
                "dDesDisEmi" => self.issuer_district_name = Some(text.to_string()),
                "cCiuEmi" => self.issuer_city_code = Some(parse_int(leaf, text)?),
                "dDesCiuEmi" => self.issuer_city_name = Some(text.to_string()),
                "dTelEmi" => self.issuer_phone = Some(text.to_string()),
                "dEmailE" => self.issuer_email = Some(text.to_string()),
                _ => {}
            }
            return Ok(());
        }

        if in_group("gDatRec") {
            match leaf {
                "iNatRec" => {
                    self.recipient_nature =
                        Some(coded(leaf, RecipientNature::from_code(parse_int(leaf, text)?))?)
                }
                "iTiOpe" => {
                    self.recipient_operation =
                        Some(coded(leaf, OperationKind::from_code(parse_int(leaf, text)?))?)
                }
                "cPaisRec" => {
                    self.recipient_country = Some(coded(leaf, Country::from_code(text))?)
                }
                "iTiContRec" => {
                    self.recipient_contributor =
                        Some(coded(leaf, ContributorType::from_code(parse_int(leaf, text)?))?)
                }
                "dRucRec" => self.recipient_ruc = Some(text.to_string()),
                "dDVRec" => self.recipient_dv = Some(parse_int(leaf, text)?),
                "iTipIDRec" => {
                    self.recipient_doc_type =
                        Some(coded(leaf, IdentityDocType::from_code(parse_int(leaf, text)?))?)
                }
                "dNumIDRec" => self.recipient_doc_number = Some(text.to_string()),
                "dNomRec" => self.recipient_name = Some(text.to_string()),
                "dNomFanRec" => self.recipient_fantasy = Some(text.to_string()),
                "dDirRec" => self.recipient_street = Some(text.to_string()),
                "dNumCasRec" => self.recipient_house = Some(text.to_string()),
                "cDepRec" => {
                    self.recipient_department =
                        Some(coded(leaf, Department::from_code(parse_int(leaf, text)?))?)
                }
                "cDisRec" => self.recipient_district_code = Some(parse_int(leaf, text)?),
                "dDesDisRec" => self.recipient_district_name = Some(text.to_string()),
                "cCiuRec" => self.recipient_city_code = Some(parse_int(leaf, text)?),
                "dDesCiuRec" => self.recipient_city_name = Some(text.to_string()),
                "dTelRec" => self.recipient_phone = Some(text.to_string()),
                "dEmailRec" => self.recipient_email = Some(text.to_string()),
                "dCodCliente" => self.recipient_client_code = Some(text.to_string()),
                _ => {}
            }
            return Ok(());
        }

        if in_group("gOpeDE") {
            match leaf {
                "iTipEmi" => {
                    self.emission_type =
                        Some(coded(leaf, EmissionType::from_code(parse_int(leaf, text)?))?)
                }
                "dCodSeg" => self.security_code = Some(text.to_string()),
                _ => {}
            }
            return Ok(());
        }

        if in_group("gTimb") {
            match leaf {
                "iTiDE" => {
                    self.document_type =
                        Some(coded(leaf, DocumentType::from_code(parse_int(leaf, text)?))?)
                }
                "dNumTim" => self.stamp_number = Some(parse_int(leaf, text)?),
                "dEst" => self.establishment = Some(text.to_string()),
                "dPunExp" => self.issuance_point = Some(text.to_string()),
                "dNumDoc" => self.document_number = Some(text.to_string()),
                "dFeIniT" => self.validity_start = Some(parse_date(leaf, text)?),
                _ => {}
            }
            return Ok(());
        }

        if in_group("gOpeCom") {
            match leaf {
                "iTipTra" => {
                    self.transaction_type =
                        Some(coded(leaf, TransactionType::from_code(parse_int(leaf, text)?))?)
                }
                "iTImp" => {
                    self.tax_type = Some(coded(leaf, TaxType::from_code(parse_int(leaf, text)?))?)
                }
                "cMoneOpe" => self.currency = Some(coded(leaf, Currency::from_code(text))?),
                _ => {}
            }
            return Ok(());
        }

        if in_group("gCamFE") {
            self.saw_invoice_group = true;
            if leaf == "iIndPres" {
                self.presence =
                    Some(coded(leaf, PresenceIndicator::from_code(parse_int(leaf, text)?))?);
            }
            return Ok(());
        }

        if in_group("gCamCond") {
            self.saw_condition_group = true;
            if leaf == "iCondOpe" {
                self.condition =
                    Some(coded(leaf, OperationCondition::from_code(parse_int(leaf, text)?))?);
            }
            return Ok(());
        }

        if in_group("gTotSub") {
            self.saw_totals = true;
            let t = &mut self.totals;
            match leaf {
                "dSubExe" => t.exempt_subtotal = Some(parse_decimal(leaf, text)?),
                "dSub5" => t.subtotal_5 = Some(parse_decimal(leaf, text)?),
                "dSub10" => t.subtotal_10 = Some(parse_decimal(leaf, text)?),
                "dTotOpe" => t.operation_total = Some(parse_decimal(leaf, text)?),
                "dTotDesc" => t.discount_total = Some(parse_decimal(leaf, text)?),
                "dRedon" => t.rounding_adjustment = Some(parse_decimal(leaf, text)?),
                "dTotGralOpe" => t.grand_total = Some(parse_decimal(leaf, text)?),
                "dIVA5" => t.iva_5 = Some(parse_decimal(leaf, text)?),
                "dIVA10" => t.iva_10 = Some(parse_decimal(leaf, text)?),
                "dTotIVA" => t.iva_total = Some(parse_decimal(leaf, text)?),
                "dBaseGrav5" => t.base_5 = Some(parse_decimal(leaf, text)?),
                "dBaseGrav10" => t.base_10 = Some(parse_decimal(leaf, text)?),
                "dTBasGraIVA" => t.base_total = Some(parse_decimal(leaf, text)?),
                _ => {}
            }
            return Ok(());
        }

        // DE-level fields
        match leaf {
            "dFecFirma" => self.signing_date = Some(parse_datetime(leaf, text)?),
            "dSisFact" => self.system_type = Some(parse_int(leaf, text)?),
            "dFeEmiDE" => self.emission_date = Some(parse_datetime(leaf, text)?),
            _ => {}
        }
        Ok(())
    }

    fn into_document(mut self) -> Result<ElectronicDocument, SifenError> {
        let issuer_address = match (self.issuer_street.take(), self.issuer_house.take()) {
            (Some(street), Some(house_number)) => Some(Address {
                street,
                house_number,
                department: self.issuer_department,
                district: self
                    .issuer_district_code
                    .zip(self.issuer_district_name.take()),
                city: self.issuer_city_code.zip(self.issuer_city_name.take()),
            }),
            _ => None,
        };
        let issuer = Issuer {
            ruc: required("dRucEm", self.issuer_ruc)?,
            check_digit: required("dDVEmi", self.issuer_dv)?,
            contributor_type: required("iTipCont", self.issuer_contributor)?,
            name: required("dNomEmi", self.issuer_name)?,
            fantasy_name: self.issuer_fantasy,
            address: issuer_address,
            phone: self.issuer_phone,
            email: self.issuer_email,
            activities: self.activities,
        };

        let recipient_address = match (self.recipient_street.take(), self.recipient_house.take()) {
            (Some(street), Some(house_number)) => Some(Address {
                street,
                house_number,
                department: self.recipient_department,
                district: self
                    .recipient_district_code
                    .zip(self.recipient_district_name.take()),
                city: self.recipient_city_code.zip(self.recipient_city_name.take()),
            }),
            _ => None,
        };
        let recipient = Recipient {
            nature: required("iNatRec", self.recipient_nature)?,
            operation_kind: required("iTiOpe", self.recipient_operation)?,
            country: required("cPaisRec", self.recipient_country)?,
            contributor_type: self.recipient_contributor,
            ruc: self.recipient_ruc,
            ruc_check_digit: self.recipient_dv,
            id_doc_type: self.recipient_doc_type,
            id_doc_number: self.recipient_doc_number,
            name: self.recipient_name,
            fantasy_name: self.recipient_fantasy,
            address: recipient_address,
            phone: self.recipient_phone,
            email: self.recipient_email,
            client_code: self.recipient_client_code,
        };

        let items = self
            .items
            .into_iter()
            .map(ParsedItem::into_item)
            .collect::<Result<Vec<_>, _>>()?;
        if items.is_empty() {
            return Err(SifenError::Parse(
                "required element gCamItem is missing".into(),
            ));
        }

        let payments = self
            .payments
            .into_iter()
            .map(ParsedPayment::into_entry)
            .collect::<Result<Vec<_>, _>>()?;

        if !self.saw_totals {
            return Err(SifenError::Parse(
                "required element gTotSub is missing".into(),
            ));
        }
        let t = self.totals;
        let totals = Totals {
            exempt_subtotal: t.exempt_subtotal.unwrap_or_default(),
            subtotal_5: t.subtotal_5.unwrap_or_default(),
            subtotal_10: t.subtotal_10.unwrap_or_default(),
            operation_total: t.operation_total.unwrap_or_default(),
            discount_total: t.discount_total.unwrap_or_default(),
            rounding_adjustment: t.rounding_adjustment.unwrap_or_default(),
            grand_total: t.grand_total.unwrap_or_default(),
            iva_5: t.iva_5.unwrap_or_default(),
            iva_10: t.iva_10.unwrap_or_default(),
            iva_total: t.iva_total.unwrap_or_default(),
            base_5: t.base_5.unwrap_or_default(),
            base_10: t.base_10.unwrap_or_default(),
            base_total: t.base_total.unwrap_or_default(),
        };

        let mut document = ElectronicDocument::from_parts(
            required("dFecFirma", self.signing_date)?,
            self.system_type.unwrap_or(1),
            OperationInfo {
                emission_type: required("iTipEmi", self.emission_type)?,
                security_code: required("dCodSeg", self.security_code)?,
            },
            StampInfo {
                document_type: required("iTiDE", self.document_type)?,
                stamp_number: required("dNumTim", self.stamp_number)?,
                establishment: required("dEst", self.establishment)?,
                issuance_point: required("dPunExp", self.issuance_point)?,
                document_number: required("dNumDoc", self.document_number)?,
                validity_start: required("dFeIniT", self.validity_start)?,
            },
            required("dFeEmiDE", self.emission_date)?,
            CommercialInfo {
                transaction_type: required("iTipTra", self.transaction_type)?,
                tax_type: required("iTImp", self.tax_type)?,
                currency: required("cMoneOpe", self.currency)?,
            },
            issuer,
            recipient,
            TypeSpecific {
                invoice: if self.saw_invoice_group {
                    Some(InvoiceInfo {
                        presence: required("iIndPres", self.presence)?,
                    })
                } else {
                    None
                },
                condition: if self.saw_condition_group {
                    Some(ConditionInfo {
                        condition: required("iCondOpe", self.condition)?,
                        payments,
                    })
                } else {
                    None
                },
            },
            items,
        );
        document.totals = Some(totals);
        document.restore_cdc(ControlCode::parse(&required("DE@Id", self.cdc)?)?);
        Ok(document)
    }
}
