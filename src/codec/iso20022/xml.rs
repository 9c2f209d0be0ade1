//! The one XML writer every ISO 20022 document goes through, plus the
//! substring helpers the parsers use.
//!
//! Escaping is minimal: `&`, `<` and `>` only. Attribute quotes are not
//! escaped.

use crate::error::{PaymentError, Result};
use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

pub const ISO_NAMESPACE_PREFIX: &str = "urn:iso:std:iso:20022:tech:xsd:";

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Inverse of [`escape`]. `&amp;` goes last so `&amp;lt;` stays `&lt;`.
pub fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Trimmed text between the first `start` and the first `end` after it.
pub fn extract_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let to = text[from..].find(end)? + from;
    Some(text[from..to].trim())
}

/// Removes every `<...>` tag and trims what is left.
pub fn strip_tags(value: &str) -> String {
    TAG.replace_all(value, "").trim().to_string()
}

/// Indented ISO 20022 document builder over a `quick_xml::Writer`.
///
/// Text and attribute values go through [`escape`] and are handed to the
/// writer pre-escaped. Elements are closed in reverse order of opening, so a
/// finished document is always well nested. The first write error is kept
/// and returned by [`XmlWriter::finish`].
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
    open: Vec<&'static str>,
    error: Option<quick_xml::Error>,
}

impl XmlWriter {
    /// Starts `<Document xmlns="urn:iso:std:iso:20022:tech:xsd:{message_type}">`.
    pub fn document(message_type: &str) -> Self {
        let mut w = Self {
            writer: Writer::new_with_indent(Vec::with_capacity(2048), b' ', 2),
            open: Vec::new(),
            error: None,
        };
        w.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)));

        let namespace = format!("{}{}", ISO_NAMESPACE_PREFIX, message_type);
        let mut root = BytesStart::new("Document");
        root.push_attribute(escaped_attribute("xmlns", &namespace));
        w.emit(Event::Start(root));
        w.open.push("Document");
        w
    }

    fn emit(&mut self, event: Event<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.writer.write_event(event) {
            self.error = Some(e);
        }
    }

    pub fn open(&mut self, tag: &'static str) -> &mut Self {
        self.emit(Event::Start(BytesStart::new(tag)));
        self.open.push(tag);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        if let Some(tag) = self.open.pop() {
            self.emit(Event::End(BytesEnd::new(tag)));
        }
        self
    }

    fn text_element(&mut self, start: BytesStart<'_>, tag: &str, value: &str) {
        self.emit(Event::Start(start));
        self.emit(Event::Text(BytesText::from_escaped(escape(value))));
        self.emit(Event::End(BytesEnd::new(tag)));
    }

    /// `<tag>escaped value</tag>` on one line.
    pub fn leaf(&mut self, tag: &str, value: &str) -> &mut Self {
        self.text_element(BytesStart::new(tag), tag, value);
        self
    }

    pub fn leaf_opt(&mut self, tag: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.leaf(tag, value);
        }
        self
    }

    /// `<tag Ccy="EUR">1000.00</tag>`.
    pub fn amount(&mut self, tag: &str, currency: &str, value: &str) -> &mut Self {
        let mut start = BytesStart::new(tag);
        start.push_attribute(escaped_attribute("Ccy", currency));
        self.text_element(start, tag, value);
        self
    }

    /// Closes every element still open, `Document` included, and returns the
    /// document with a trailing newline.
    pub fn finish(mut self) -> Result<String> {
        while !self.open.is_empty() {
            self.close();
        }
        if let Some(e) = self.error {
            return Err(e.into());
        }
        let mut xml = String::from_utf8(self.writer.into_inner())
            .map_err(|e| PaymentError::internal(format!("XML output is not UTF-8: {}", e)))?;
        xml.push('\n');
        Ok(xml)
    }
}

/// Attribute whose value is escaped by [`escape`] rather than by the writer.
fn escaped_attribute<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escape(value).into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_only_three_characters() {
        assert_eq!(escape(r#"A & B <C> "q" 'a'"#), r#"A &amp; B &lt;C&gt; "q" 'a'"#);
        assert_eq!(unescape(&escape("x<&>y")), "x<&>y");
        assert_eq!(unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_extract_between_first_match() {
        let xml = "<A> one </A><A>two</A>";
        assert_eq!(extract_between(xml, "<A>", "</A>"), Some("one"));
        assert_eq!(extract_between(xml, "<B>", "</B>"), None);
        assert_eq!(extract_between("<A>open", "<A>", "</A>"), None);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<Othr>\n  <Id>ACC-1"), "ACC-1");
    }

    #[test]
    fn test_writer_nesting_and_indent() {
        let mut w = XmlWriter::document("pacs.002.001.12");
        w.open("Root").leaf("Name", "A&B").amount("Amt", "EUR", "1.00");
        let xml = w.finish().unwrap();

        let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<Document xmlns=\"urn:iso:std:iso:20022:tech:xsd:pacs.002.001.12\">
  <Root>
    <Name>A&amp;B</Name>
    <Amt Ccy=\"EUR\">1.00</Amt>
  </Root>
</Document>
";
        assert_eq!(xml, expected);
    }
}
