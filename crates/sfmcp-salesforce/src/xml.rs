//! Minimal XML tree for SOAP responses.
//!
//! SOAP payloads are parsed into a small owned tree keyed by local names
//! (namespace prefixes are dropped), which can then be searched and
//! converted to JSON the way Salesforce clients conventionally present
//! metadata records:
//!
//! - child elements become object keys
//! - repeated child elements become arrays
//! - leaf elements become strings
//! - `xsi:nil="true"` becomes `null`

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use sfmcp_core::{SalesforceError, SalesforceResult};

/// An element with its attributes, children and text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> SalesforceResult<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(malformed)?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = String::from_utf8_lossy(&attribute.value).into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    /// Attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Text of the first direct child with the given local name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|child| child.text.as_str())
    }

    /// First element with the given local name, depth first, including `self`.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Every element with the given local name, in document order.
    ///
    /// Matches are not searched for nested matches of the same name.
    pub fn find_all(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            found.push(self);
            return;
        }
        for child in &self.children {
            child.collect(name, found);
        }
    }

    fn is_nil(&self) -> bool {
        self.attribute("nil") == Some("true")
    }

    /// Convert this element's content to JSON.
    pub fn to_json(&self) -> Value {
        if self.is_nil() {
            return Value::Null;
        }
        if self.children.is_empty() {
            return Value::String(self.text.clone());
        }

        let mut object = Map::new();
        for child in &self.children {
            let value = child.to_json();
            match object.get_mut(&child.name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    object.insert(child.name.clone(), value);
                }
            }
        }
        Value::Object(object)
    }
}

/// Parse a document into a synthetic root whose children are the top-level
/// elements.
pub fn parse(xml: &str) -> SalesforceResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![XmlElement::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(XmlElement::from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let element = XmlElement::from_start(&start)?;
                append_child(&mut stack, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("unbalanced closing tag"))?;
                append_child(&mut stack, element)?;
            }
            Ok(Event::Text(text)) => {
                let text = text.decode().map_err(malformed)?;
                current(&mut stack)?.text.push_str(&text);
            }
            Ok(Event::CData(data)) => {
                let data = String::from_utf8_lossy(&data).into_owned();
                current(&mut stack)?.text.push_str(&data);
            }
            Ok(Event::GeneralRef(reference)) => {
                let resolved = match reference.resolve_char_ref().map_err(malformed)? {
                    Some(ch) => ch.to_string(),
                    None => {
                        let name = reference.decode().map_err(malformed)?;
                        match quick_xml::escape::resolve_predefined_entity(&name) {
                            Some(value) => value.to_string(),
                            None => format!("&{name};"),
                        }
                    }
                };
                current(&mut stack)?.text.push_str(&resolved);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "{e} at position {}",
                    reader.error_position()
                )));
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(malformed("unexpected end of document")),
    }
}

fn current(stack: &mut [XmlElement]) -> SalesforceResult<&mut XmlElement> {
    stack
        .last_mut()
        .ok_or_else(|| malformed("content outside of the document"))
}

fn append_child(stack: &mut [XmlElement], element: XmlElement) -> SalesforceResult<()> {
    current(stack)?.children.push(element);
    Ok(())
}

fn malformed(error: impl std::fmt::Display) -> SalesforceError {
    SalesforceError::InvalidResponse(format!("malformed XML: {error}"))
}
