use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::SifenError;

pub type XmlResult = Result<String, SifenError>;

fn xml_io(e: std::io::Error) -> SifenError {
    SifenError::Parse(format!("XML write error: {e}"))
}

/// Canonical XML writer.
///
/// Output carries no indentation: the serialized byte form is the canonical
/// form the signature digest is computed over, so sibling order and spacing
/// must be reproducible exactly.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// A full document writer, starting with the XML declaration.
    pub fn new() -> Result<Self, SifenError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    /// A fragment writer without the declaration, for embedded trees
    /// (signature blocks, envelope payloads).
    pub fn fragment() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    pub fn into_string(self) -> XmlResult {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| SifenError::Parse(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, SifenError> {
        let elem = BytesStart::new(name);
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, SifenError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, SifenError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    /// Self-closing element with attributes.
    pub fn empty_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, SifenError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Empty(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, SifenError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, SifenError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Embed an already-serialized XML subtree verbatim.
    pub fn raw(&mut self, xml: &str) -> Result<&mut Self, SifenError> {
        use std::io::Write;
        self.writer
            .get_mut()
            .write_all(xml.as_bytes())
            .map_err(xml_io)?;
        Ok(self)
    }
}

/// Strip a leading XML declaration so the tree can be embedded in another
/// document.
pub fn strip_declaration(xml: &str) -> &str {
    let trimmed = xml.trim_start();
    if let Some(rest) = trimmed.strip_prefix("<?xml") {
        if let Some(end) = rest.find("?>") {
            return rest[end + 2..].trim_start();
        }
    }
    trimmed
}

/// Format a decimal without superfluous digits: trailing zeros stripped,
/// no trailing dot.
pub fn format_number(d: Decimal) -> String {
    d.normalize().to_string()
}

/// Format a monetary amount with the fixed decimal places of its currency.
pub fn format_amount(d: Decimal, decimals: u32) -> String {
    let mut scaled = d;
    scaled.rescale(decimals);
    scaled.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn format_number_cases() {
        assert_eq!(format_number(dec!(100)), "100");
        assert_eq!(format_number(dec!(1500.0)), "1500");
        assert_eq!(format_number(dec!(49.90)), "49.9");
        assert_eq!(format_number(dec!(0.005)), "0.005");
    }

    #[test]
    fn format_amount_cases() {
        assert_eq!(format_amount(dec!(107400), 0), "107400");
        assert_eq!(format_amount(dec!(1000.5), 2), "1000.50");
        assert_eq!(format_amount(dec!(1000), 2), "1000.00");
    }

    #[test]
    fn strip_declaration_cases() {
        assert_eq!(strip_declaration("<?xml version=\"1.0\"?><a/>"), "<a/>");
        assert_eq!(strip_declaration("<a/>"), "<a/>");
    }
}
