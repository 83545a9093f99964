use serde::{Deserialize, Serialize};

/// iTiDE — electronic document type (subset used by the exchange engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    /// 1 — Factura electrónica.
    Invoice,
    /// 4 — Autofactura electrónica.
    SelfInvoice,
    /// 5 — Nota de crédito electrónica.
    CreditNote,
    /// 6 — Nota de débito electrónica.
    DebitNote,
    /// 7 — Nota de remisión electrónica.
    RemissionNote,
}

impl DocumentType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Invoice => 1,
            Self::SelfInvoice => 4,
            Self::CreditNote => 5,
            Self::DebitNote => 6,
            Self::RemissionNote => 7,
        }
    }

    /// dDesTiDE — official description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Invoice => "Factura electrónica",
            Self::SelfInvoice => "Autofactura electrónica",
            Self::CreditNote => "Nota de crédito electrónica",
            Self::DebitNote => "Nota de débito electrónica",
            Self::RemissionNote => "Nota de remisión electrónica",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Invoice),
            4 => Some(Self::SelfInvoice),
            5 => Some(Self::CreditNote),
            6 => Some(Self::DebitNote),
            7 => Some(Self::RemissionNote),
            _ => None,
        }
    }
}

/// iTipEmi — emission type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmissionType {
    /// 1 — Normal.
    Normal,
    /// 2 — Contingencia.
    Contingency,
}

impl EmissionType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Contingency => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Contingency => "Contingencia",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::Contingency),
            _ => None,
        }
    }
}

/// iTipTra — transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// 1 — Venta de mercadería.
    GoodsSale,
    /// 2 — Prestación de servicios.
    ServiceProvision,
    /// 3 — Mixto (venta de mercadería y servicios).
    Mixed,
}

impl TransactionType {
    pub fn code(&self) -> u8 {
        match self {
            Self::GoodsSale => 1,
            Self::ServiceProvision => 2,
            Self::Mixed => 3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::GoodsSale => "Venta de mercadería",
            Self::ServiceProvision => "Prestación de servicios",
            Self::Mixed => "Mixto (venta de mercadería y servicio)",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::GoodsSale),
            2 => Some(Self::ServiceProvision),
            3 => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// iTImp — tax type affecting the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxType {
    /// 1 — IVA.
    Iva,
    /// 2 — ISC.
    Isc,
    /// 3 — Renta.
    Income,
    /// 4 — Ninguno.
    None,
    /// 5 — IVA - Renta.
    IvaIncome,
}

impl TaxType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Iva => 1,
            Self::Isc => 2,
            Self::Income => 3,
            Self::None => 4,
            Self::IvaIncome => 5,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Iva => "IVA",
            Self::Isc => "ISC",
            Self::Income => "Renta",
            Self::None => "Ninguno",
            Self::IvaIncome => "IVA - Renta",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Iva),
            2 => Some(Self::Isc),
            3 => Some(Self::Income),
            4 => Some(Self::None),
            5 => Some(Self::IvaIncome),
            _ => None,
        }
    }
}

/// cMoneOpe — operation currency (ISO 4217 subset with official SET rounding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Guaraní — whole-unit denomination, no minor unit below 50 in circulation.
    PYG,
    /// US Dollar.
    USD,
    /// Euro.
    EUR,
    /// Brazilian Real.
    BRL,
    /// Argentine Peso.
    ARS,
}

impl Currency {
    /// ISO 4217 alphabetic code as serialized on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PYG => "PYG",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::BRL => "BRL",
            Self::ARS => "ARS",
        }
    }

    /// dDesMoneOpe — official description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PYG => "Guarani",
            Self::USD => "US Dollar",
            Self::EUR => "Euro",
            Self::BRL => "Real brasileño",
            Self::ARS => "Peso argentino",
        }
    }

    /// Decimal places used when rendering amounts in this currency.
    pub fn decimals(&self) -> u32 {
        match self {
            Self::PYG => 0,
            _ => 2,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PYG" => Some(Self::PYG),
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "BRL" => Some(Self::BRL),
            "ARS" => Some(Self::ARS),
            _ => None,
        }
    }
}

/// iTipCont / iTiContRec — contributor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributorType {
    /// 1 — Persona Física.
    NaturalPerson,
    /// 2 — Persona Jurídica.
    LegalEntity,
}

impl ContributorType {
    pub fn code(&self) -> u8 {
        match self {
            Self::NaturalPerson => 1,
            Self::LegalEntity => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::NaturalPerson),
            2 => Some(Self::LegalEntity),
            _ => None,
        }
    }
}

/// iNatRec — recipient nature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientNature {
    /// 1 — Contribuyente.
    Taxpayer,
    /// 2 — No contribuyente.
    NonTaxpayer,
}

impl RecipientNature {
    pub fn code(&self) -> u8 {
        match self {
            Self::Taxpayer => 1,
            Self::NonTaxpayer => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Taxpayer),
            2 => Some(Self::NonTaxpayer),
            _ => None,
        }
    }
}

/// iTiOpe — operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// 1 — B2B.
    B2B,
    /// 2 — B2C.
    B2C,
    /// 3 — B2G.
    B2G,
    /// 4 — B2F.
    B2F,
}

impl OperationKind {
    pub fn code(&self) -> u8 {
        match self {
            Self::B2B => 1,
            Self::B2C => 2,
            Self::B2G => 3,
            Self::B2F => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::B2B),
            2 => Some(Self::B2C),
            3 => Some(Self::B2G),
            4 => Some(Self::B2F),
            _ => None,
        }
    }
}

/// cPaisRec — country (ISO 3166-1 alpha-3 subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Country {
    PRY,
    ARG,
    BRA,
    URY,
    USA,
    ESP,
}

impl Country {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PRY => "PRY",
            Self::ARG => "ARG",
            Self::BRA => "BRA",
            Self::URY => "URY",
            Self::USA => "USA",
            Self::ESP => "ESP",
        }
    }

    /// dDesPaisRe — official country name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PRY => "Paraguay",
            Self::ARG => "Argentina",
            Self::BRA => "Brasil",
            Self::URY => "Uruguay",
            Self::USA => "Estados Unidos",
            Self::ESP => "España",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PRY" => Some(Self::PRY),
            "ARG" => Some(Self::ARG),
            "BRA" => Some(Self::BRA),
            "URY" => Some(Self::URY),
            "USA" => Some(Self::USA),
            "ESP" => Some(Self::ESP),
            _ => None,
        }
    }
}

/// iTipIDRec — recipient identity document type (non-taxpayers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityDocType {
    /// 1 — Cédula paraguaya.
    ParaguayanId,
    /// 2 — Pasaporte.
    Passport,
    /// 3 — Cédula extranjera.
    ForeignId,
    /// 4 — Carnet de residencia.
    ResidenceCard,
    /// 5 — Innominado.
    Unnamed,
    /// 9 — Otro.
    Other,
}

impl IdentityDocType {
    pub fn code(&self) -> u8 {
        match self {
            Self::ParaguayanId => 1,
            Self::Passport => 2,
            Self::ForeignId => 3,
            Self::ResidenceCard => 4,
            Self::Unnamed => 5,
            Self::Other => 9,
        }
    }

    /// dDTipIDRec — official description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ParaguayanId => "Cédula paraguaya",
            Self::Passport => "Pasaporte",
            Self::ForeignId => "Cédula extranjera",
            Self::ResidenceCard => "Carnet de residencia",
            Self::Unnamed => "Innominado",
            Self::Other => "Otro",
        }
    }

    /// An unnamed recipient carries no identity number or name.
    pub fn is_unnamed(&self) -> bool {
        matches!(self, Self::Unnamed)
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::ParaguayanId),
            2 => Some(Self::Passport),
            3 => Some(Self::ForeignId),
            4 => Some(Self::ResidenceCard),
            5 => Some(Self::Unnamed),
            9 => Some(Self::Other),
            _ => None,
        }
    }
}

/// iIndPres — presence indicator for the invoice fields group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceIndicator {
    /// 1 — Operación presencial.
    InPerson,
    /// 2 — Operación electrónica.
    Electronic,
    /// 3 — Operación telemercadeo.
    Telemarketing,
    /// 4 — Venta a domicilio.
    HomeSale,
    /// 9 — Otro.
    Other,
}

impl PresenceIndicator {
    pub fn code(&self) -> u8 {
        match self {
            Self::InPerson => 1,
            Self::Electronic => 2,
            Self::Telemarketing => 3,
            Self::HomeSale => 4,
            Self::Other => 9,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::InPerson => "Operación presencial",
            Self::Electronic => "Operación electrónica",
            Self::Telemarketing => "Operación telemercadeo",
            Self::HomeSale => "Venta a domicilio",
            Self::Other => "Otro",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::InPerson),
            2 => Some(Self::Electronic),
            3 => Some(Self::Telemarketing),
            4 => Some(Self::HomeSale),
            9 => Some(Self::Other),
            _ => None,
        }
    }
}

/// iCondOpe — operation settlement condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationCondition {
    /// 1 — Contado.
    Cash,
    /// 2 — Crédito.
    Credit,
}

impl OperationCondition {
    pub fn code(&self) -> u8 {
        match self {
            Self::Cash => 1,
            Self::Credit => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Cash => "Contado",
            Self::Credit => "Crédito",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Cash),
            2 => Some(Self::Credit),
            _ => None,
        }
    }
}

/// iTiPago — payment type for cash settlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    /// 1 — Efectivo.
    Cash,
    /// 2 — Cheque.
    Cheque,
    /// 3 — Tarjeta de crédito.
    CreditCard,
    /// 4 — Tarjeta de débito.
    DebitCard,
    /// 5 — Transferencia.
    Transfer,
    /// 99 — Otro.
    Other,
}

impl PaymentType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Cash => 1,
            Self::Cheque => 2,
            Self::CreditCard => 3,
            Self::DebitCard => 4,
            Self::Transfer => 5,
            Self::Other => 99,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Cash),
            2 => Some(Self::Cheque),
            3 => Some(Self::CreditCard),
            4 => Some(Self::DebitCard),
            5 => Some(Self::Transfer),
            99 => Some(Self::Other),
            _ => None,
        }
    }
}

/// iAfecIVA — IVA affectation of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IvaAffectation {
    /// 1 — Gravado IVA.
    Taxed,
    /// 2 — Exonerado (Art. 100 Ley 6380/2019).
    Exonerated,
    /// 3 — Exento.
    Exempt,
    /// 4 — Gravado parcial (grav-exento).
    PartiallyTaxed,
}

impl IvaAffectation {
    pub fn code(&self) -> u8 {
        match self {
            Self::Taxed => 1,
            Self::Exonerated => 2,
            Self::Exempt => 3,
            Self::PartiallyTaxed => 4,
        }
    }

    /// dDesAfecIVA — official description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Taxed => "Gravado IVA",
            Self::Exonerated => "Exonerado",
            Self::Exempt => "Exento",
            Self::PartiallyTaxed => "Gravado parcial",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Taxed),
            2 => Some(Self::Exonerated),
            3 => Some(Self::Exempt),
            4 => Some(Self::PartiallyTaxed),
            _ => None,
        }
    }
}

/// cUniMed — measure unit (subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureUnit {
    /// 77 — Unidad.
    Unit,
    /// 83 — Kilogramo.
    Kilogram,
    /// 88 — Litro.
    Litre,
    /// 79 — Metro.
    Metre,
    /// 110 — Metro cuadrado.
    SquareMetre,
}

impl MeasureUnit {
    pub fn code(&self) -> u16 {
        match self {
            Self::Unit => 77,
            Self::Kilogram => 83,
            Self::Litre => 88,
            Self::Metre => 79,
            Self::SquareMetre => 110,
        }
    }

    /// dDesUniMed — unit symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Unit => "UNI",
            Self::Kilogram => "kg",
            Self::Litre => "LT",
            Self::Metre => "M",
            Self::SquareMetre => "M2",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            77 => Some(Self::Unit),
            83 => Some(Self::Kilogram),
            88 => Some(Self::Litre),
            79 => Some(Self::Metre),
            110 => Some(Self::SquareMetre),
            _ => None,
        }
    }
}

/// cDepEmi / cDepRec — department (subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    /// 1 — Capital.
    Capital,
    /// 2 — San Pedro.
    SanPedro,
    /// 7 — Itapúa.
    Itapua,
    /// 10 — Alto Paraná.
    AltoParana,
    /// 11 — Central.
    Central,
}

impl Department {
    pub fn code(&self) -> u8 {
        match self {
            Self::Capital => 1,
            Self::SanPedro => 2,
            Self::Itapua => 7,
            Self::AltoParana => 10,
            Self::Central => 11,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Capital => "Capital",
            Self::SanPedro => "San Pedro",
            Self::Itapua => "Itapúa",
            Self::AltoParana => "Alto Paraná",
            Self::Central => "Central",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Capital),
            2 => Some(Self::SanPedro),
            7 => Some(Self::Itapua),
            10 => Some(Self::AltoParana),
            11 => Some(Self::Central),
            _ => None,
        }
    }
}
