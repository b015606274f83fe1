//! Flattening of XML CLI replies into key/value records.
//!
//! With XML output enabled the CLI emits a stream containing one or more
//! `<reply>` blocks:
//!
//! ```xml
//! <reply>
//!   <message>
//!     <show_ipstats>
//!       <vlanName>v10</vlanName>
//!       <inReceives>1042</inReceives>
//!     </show_ipstats>
//!   </message>
//! </reply>
//! ```
//!
//! Each child of a `<message>` element becomes one [`ReplyRecord`] named after
//! the child, with the child's own children as fields.

use std::fmt;

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use exos_cli_common::{CliError, CliResult};

/// Matches a complete `<reply>` block, across newlines.
static REPLY_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<reply>.+?</reply>").expect("Invalid regex pattern"));

/// Element whose children are turned into records.
const MESSAGE_TAG: &str = "message";

/// Field value taken from element text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyValue {
    /// Text made only of digits.
    Integer(i64),
    /// Any other text, verbatim.
    Text(String),
    /// Element with no text.
    Empty,
}

impl ReplyValue {
    /// Classifies element text: all-digit text that fits an `i64` is an
    /// integer, missing text is empty, anything else stays text.
    pub fn classify(text: Option<&str>) -> Self {
        match text {
            None => ReplyValue::Empty,
            Some(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
                .parse::<i64>()
                .map(ReplyValue::Integer)
                .unwrap_or_else(|_| ReplyValue::Text(s.to_string())),
            Some(s) => ReplyValue::Text(s.to_string()),
        }
    }

    /// Returns the integer value, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ReplyValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReplyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ReplyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyValue::Integer(n) => write!(f, "{}", n),
            ReplyValue::Text(s) => write!(f, "{}", s),
            ReplyValue::Empty => Ok(()),
        }
    }
}

/// One flattened reply element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRecord {
    /// Tag of the element under `<message>`.
    pub element: String,
    /// Child tag to value, in document order.
    pub fields: Vec<(String, ReplyValue)>,
}

impl ReplyRecord {
    /// Creates a record with no fields.
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            fields: Vec::new(),
        }
    }

    /// Sets a field; a repeated tag overwrites the earlier value in place.
    pub fn insert(&mut self, field: impl Into<String>, value: ReplyValue) {
        let field = field.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Gets the value for a field, if present.
    pub fn get(&self, field: &str) -> Option<&ReplyValue> {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }
}

struct FieldsMap<'a>(&'a [(String, ReplyValue)]);

impl Serialize for FieldsMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, value) in self.0 {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// Serializes as `{"<element>": {"<field>": value, ...}}`.
impl Serialize for ReplyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.element, &FieldsMap(&self.fields))?;
        map.end()
    }
}

#[derive(Debug, Default)]
struct XmlNode {
    tag: String,
    /// Text before the first child element.
    text: Option<String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(tag: String) -> Self {
        Self {
            tag,
            ..Default::default()
        }
    }

    /// Visits this node and all descendants in document order.
    fn walk<'a>(&'a self, out: &mut Vec<&'a XmlNode>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

fn append_text(stack: &mut [XmlNode], text: &str) {
    if let Some(node) = stack.last_mut() {
        if node.children.is_empty() {
            node.text.get_or_insert_with(String::new).push_str(text);
        }
    }
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

fn parse_tree(xml: &str) -> CliResult<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(XmlNode::new(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ));
            }
            Ok(Event::Empty(e)) => {
                let node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| CliError::xml("unexpected closing tag"))?;
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| CliError::xml(e.to_string()))?;
                append_text(&mut stack, &text);
            }
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                append_text(&mut stack, &text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CliError::xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(CliError::xml(format!("unclosed element <{}>", open.tag)));
    }
    root.ok_or_else(|| CliError::xml("reply block has no root element"))
}

/// Flattens every `<reply>` block in an XML CLI reply stream.
///
/// Text outside `<reply>` blocks is ignored. Returns an error if a block is
/// not well-formed XML.
pub fn parse_reply_records(xml: &str) -> CliResult<Vec<ReplyRecord>> {
    let mut records = Vec::new();

    for block in REPLY_BLOCK_RE.find_iter(xml) {
        let root = parse_tree(block.as_str())?;

        let mut nodes = Vec::new();
        root.walk(&mut nodes);

        for message in nodes.into_iter().filter(|n| n.tag == MESSAGE_TAG) {
            for element in &message.children {
                let mut record = ReplyRecord::new(element.tag.clone());
                for field in &element.children {
                    record.insert(field.tag.clone(), ReplyValue::classify(field.text.as_deref()));
                }
                records.push(record);
            }
        }
    }

    debug!(records = records.len(), "Flattened XML reply");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify() {
        assert_eq!(ReplyValue::classify(Some("42")), ReplyValue::Integer(42));
        assert_eq!(ReplyValue::classify(Some("007")), ReplyValue::Integer(7));
        assert_eq!(
            ReplyValue::classify(Some("4a")),
            ReplyValue::Text("4a".to_string())
        );
        assert_eq!(
            ReplyValue::classify(Some("-3")),
            ReplyValue::Text("-3".to_string())
        );
        assert_eq!(
            ReplyValue::classify(Some("")),
            ReplyValue::Text(String::new())
        );
        assert_eq!(ReplyValue::classify(None), ReplyValue::Empty);
    }

    #[test]
    fn test_classify_overflow_stays_text() {
        let big = "99999999999999999999999";
        assert_eq!(
            ReplyValue::classify(Some(big)),
            ReplyValue::Text(big.to_string())
        );
    }

    #[test]
    fn test_parse_single_reply() {
        let xml = "<reply><message><show_ipstats>\
                   <vlanName>v10</vlanName><inReceives>1042</inReceives><note/>\
                   </show_ipstats></message></reply>";

        let records = parse_reply_records(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].element, "show_ipstats");
        assert_eq!(
            records[0].fields,
            vec![
                ("vlanName".to_string(), ReplyValue::Text("v10".to_string())),
                ("inReceives".to_string(), ReplyValue::Integer(1042)),
                ("note".to_string(), ReplyValue::Empty),
            ]
        );
    }

    #[test]
    fn test_parse_multiple_replies_and_noise() {
        let xml = "\
junk before
<reply>
<message><vlan><name>Default</name><tag>1</tag></vlan></message>
</reply>
<status>ok</status>
<reply>
<message><vlan><name>v10</name><tag>10</tag></vlan></message>
<message><vlan><name>v20</name><tag>20</tag></vlan></message>
</reply>
";
        let records = parse_reply_records(xml).unwrap();
        let names: Vec<_> = records
            .iter()
            .map(|r| r.get("name").and_then(|v| v.as_str()).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Default", "v10", "v20"]);
        assert_eq!(records[2].get("tag"), Some(&ReplyValue::Integer(20)));
    }

    #[test]
    fn test_nested_message_found() {
        let xml = "<reply><wrapper><message><port><id>1:1</id></port></message></wrapper></reply>";
        let records = parse_reply_records(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("id"),
            Some(&ReplyValue::Text("1:1".to_string()))
        );
    }

    #[test]
    fn test_repeated_field_overwrites() {
        let xml = "<reply><message><e><a>1</a><b>x</b><a>2</a></e></message></reply>";
        let records = parse_reply_records(xml).unwrap();
        assert_eq!(
            records[0].fields,
            vec![
                ("a".to_string(), ReplyValue::Integer(2)),
                ("b".to_string(), ReplyValue::Text("x".to_string())),
            ]
        );
    }

    #[test]
    fn test_entities_unescaped() {
        let xml = "<reply><message><e><descr>a &amp; b</descr></e></message></reply>";
        let records = parse_reply_records(xml).unwrap();
        assert_eq!(
            records[0].get("descr"),
            Some(&ReplyValue::Text("a & b".to_string()))
        );
    }

    #[test]
    fn test_no_reply_blocks() {
        assert!(parse_reply_records("").unwrap().is_empty());
        assert!(parse_reply_records("<status>ok</status>").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_block_is_error() {
        let xml = "<reply><message><e><a>1</b></e></message></reply>";
        assert!(matches!(
            parse_reply_records(xml),
            Err(CliError::Xml { .. })
        ));
    }

    #[test]
    fn test_record_serializes_as_nested_map() {
        let mut record = ReplyRecord::new("show_ipstats");
        record.insert("vlanName", ReplyValue::Text("v10".to_string()));
        record.insert("inReceives", ReplyValue::Integer(5));
        record.insert("note", ReplyValue::Empty);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"show_ipstats":{"vlanName":"v10","inReceives":5,"note":null}}"#
        );
    }
}
