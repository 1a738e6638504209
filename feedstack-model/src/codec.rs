//! Element-per-property document codec.
//!
//! A document is a tree of elements where every element is one property:
//!
//! ```xml
//! <entity>
//!   <title>Hello</title>
//!   <tags repeatable="true">a</tags>
//!   <tags>b</tags>
//!   <author><name>Ada</name></author>
//!   <note/>
//! </entity>
//! ```
//!
//! decodes to `title = Scalar`, `tags = Repeated([a, b])`,
//! `author = Group{name}` and `note = Empty`, in that order. Attributes
//! other than the `repeatable` marker carry no meaning and are dropped.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::entity::{Entity, PropertyValue};
use crate::error::{CodecError, CodecResult};

/// Root element name written by [`encode`].
pub const ENTITY_ROOT: &str = "entity";

/// Attribute marking the first element of a repeated group.
pub const REPEATABLE_ATTR: &str = "repeatable";

/// Decodes a document with a single root element into the entity formed
/// by the root's children. The root's own name is not checked.
pub fn decode(document: &str) -> CodecResult<Entity> {
    decode_element(document).map(|(_, entity)| entity)
}

/// Like [`decode`], but also returns the name of the root element.
pub fn decode_element(document: &str) -> CodecResult<(String, Entity)> {
    let mut roots = parse(document)?;
    if roots.len() != 1 {
        return Err(CodecError::RootCount(roots.len()));
    }
    let Some(root) = roots.pop() else {
        return Err(CodecError::RootCount(0));
    };
    match root.value {
        PropertyValue::Group(entity) => Ok((root.name, entity)),
        PropertyValue::Empty => Ok((root.name, Entity::new())),
        _ => Err(CodecError::TextRoot(root.name)),
    }
}

/// Decodes a sequence of sibling property elements that has no
/// enclosing root, e.g. `<a>1</a><a>2</a><b/>`.
pub fn decode_fragment(fragment: &str) -> CodecResult<Entity> {
    parse(fragment).map(collapse)
}

/// Encodes `entity` under an `<entity>` root.
pub fn encode(entity: &Entity) -> String {
    encode_with_root(entity, ENTITY_ROOT)
}

/// Encodes `entity` under a root element named `root`.
pub fn encode_with_root(entity: &Entity, root: &str) -> String {
    let mut out = String::new();
    write_group(&mut out, root, entity, false);
    out
}

/// Encodes the properties of `entity` as bare siblings.
pub fn encode_fragment(entity: &Entity) -> String {
    let mut out = String::new();
    write_properties(&mut out, entity);
    out
}

// ── Decoding ────────────────────────────────────────────────────

/// A fully parsed element, before siblings are collapsed.
struct Node {
    name: String,
    repeatable: bool,
    value: PropertyValue,
}

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    repeatable: bool,
    text: String,
    /// Byte range within `text` spanned by CDATA sections.
    cdata: Option<(usize, usize)>,
    children: Vec<Node>,
}

impl Frame {
    fn open(start: &BytesStart<'_>, position: u64) -> CodecResult<Self> {
        Ok(Self {
            name: element_name(start, position)?,
            repeatable: is_repeatable(start, position)?,
            text: String::new(),
            cdata: None,
            children: Vec::new(),
        })
    }

    fn push_cdata(&mut self, raw: &str) {
        let start = self.text.len();
        self.text.push_str(raw);
        let end = self.text.len();
        self.cdata = Some(match self.cdata {
            Some((first, _)) => (first, end),
            None => (start, end),
        });
    }

    fn close(self) -> CodecResult<Node> {
        let value = if !self.children.is_empty() {
            if !self.text.trim().is_empty() {
                return Err(CodecError::MixedContent(self.name));
            }
            PropertyValue::Group(collapse(self.children))
        } else if let Some((start, end)) = self.cdata {
            // CDATA content is kept as-is; only the text around it is trimmed.
            let prefix = &self.text[..start];
            let lead = prefix.len() - prefix.trim_start().len();
            let trail = end + self.text[end..].trim_end().len();
            PropertyValue::Scalar(self.text[lead..trail].to_string())
        } else {
            let trimmed = self.text.trim();
            if trimmed.is_empty() {
                PropertyValue::Empty
            } else {
                PropertyValue::Scalar(trimmed.to_string())
            }
        };
        Ok(Node {
            name: self.name,
            repeatable: self.repeatable,
            value,
        })
    }
}

/// Parses every top-level element of `input`.
fn parse(input: &str) -> CodecResult<Vec<Node>> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Frame> = Vec::new();
    let mut top: Vec<Node> = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| CodecError::Malformed {
            position,
            message: e.to_string(),
        })?;
        match event {
            Event::Start(start) => stack.push(Frame::open(&start, position)?),
            Event::Empty(start) => {
                let node = Node {
                    name: element_name(&start, position)?,
                    repeatable: is_repeatable(&start, position)?,
                    value: PropertyValue::Empty,
                };
                attach(&mut stack, &mut top, node);
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| CodecError::Malformed {
                    position,
                    message: "end tag without a matching start tag".to_string(),
                })?;
                let node = frame.close()?;
                attach(&mut stack, &mut top, node);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| CodecError::InvalidText {
                    position,
                    message: e.to_string(),
                })?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(CodecError::StrayText),
                }
            }
            Event::CData(cdata) => {
                let raw = std::str::from_utf8(&cdata).map_err(|e| CodecError::InvalidText {
                    position,
                    message: e.to_string(),
                })?;
                match stack.last_mut() {
                    Some(frame) => frame.push_cdata(raw),
                    None if raw.trim().is_empty() => {}
                    None => return Err(CodecError::StrayText),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, DOCTYPE.
            _ => {}
        }
    }

    match stack.pop() {
        Some(open) => Err(CodecError::Unclosed(open.name)),
        None => Ok(top),
    }
}

fn attach(stack: &mut [Frame], top: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top.push(node),
    }
}

/// Folds sibling nodes into an entity, merging same-named siblings into a
/// single `Repeated` at the position of the first occurrence.
fn collapse(nodes: Vec<Node>) -> Entity {
    let mut entity = Entity::new();
    for node in nodes {
        match entity.get_mut(&node.name) {
            Some(PropertyValue::Repeated(items)) => items.push(node.value),
            Some(existing) => {
                let first = std::mem::replace(existing, PropertyValue::Empty);
                *existing = PropertyValue::Repeated(vec![first, node.value]);
            }
            None if node.repeatable => {
                entity.insert(node.name, PropertyValue::Repeated(vec![node.value]));
            }
            None => {
                entity.insert(node.name, node.value);
            }
        }
    }
    entity
}

fn element_name(start: &BytesStart<'_>, position: u64) -> CodecResult<String> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|e| CodecError::InvalidText {
            position,
            message: e.to_string(),
        })
}

fn is_repeatable(start: &BytesStart<'_>, position: u64) -> CodecResult<bool> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CodecError::Malformed {
            position,
            message: e.to_string(),
        })?;
        if attr.key.as_ref() == REPEATABLE_ATTR.as_bytes() {
            let value = attr.unescape_value().map_err(|e| CodecError::InvalidText {
                position,
                message: e.to_string(),
            })?;
            return Ok(value.trim().eq_ignore_ascii_case("true"));
        }
    }
    Ok(false)
}

// ── Encoding ────────────────────────────────────────────────────

fn write_properties(out: &mut String, entity: &Entity) {
    for (name, value) in entity.iter() {
        write_value(out, name, value, false);
    }
}

fn write_value(out: &mut String, name: &str, value: &PropertyValue, marked: bool) {
    match value {
        PropertyValue::Scalar(text) => {
            open_tag(out, name, marked);
            write_text(out, text);
            close_tag(out, name);
        }
        PropertyValue::Empty => empty_tag(out, name, marked),
        PropertyValue::Group(entity) => write_group(out, name, entity, marked),
        PropertyValue::Repeated(items) if items.is_empty() => empty_tag(out, name, true),
        PropertyValue::Repeated(items) => {
            for (idx, item) in items.iter().enumerate() {
                write_value(out, name, item, idx == 0);
            }
        }
    }
}

fn write_group(out: &mut String, name: &str, entity: &Entity, marked: bool) {
    if entity.is_empty() {
        empty_tag(out, name, marked);
        return;
    }
    open_tag(out, name, marked);
    write_properties(out, entity);
    close_tag(out, name);
}

/// Text that decode would trim, or read back as `Empty`, is written as
/// CDATA. A `]]>` inside it splits the section in two.
fn write_text(out: &mut String, text: &str) {
    if !text.is_empty() && text.trim() == text {
        out.push_str(&escape(text));
        return;
    }
    out.push_str("<![CDATA[");
    out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

fn open_tag(out: &mut String, name: &str, marked: bool) {
    out.push('<');
    out.push_str(name);
    if marked {
        push_marker(out);
    }
    out.push('>');
}

fn close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn empty_tag(out: &mut String, name: &str, marked: bool) {
    out.push('<');
    out.push_str(name);
    if marked {
        push_marker(out);
    }
    out.push_str("/>");
}

fn push_marker(out: &mut String) {
    out.push(' ');
    out.push_str(REPEATABLE_ATTR);
    out.push_str("=\"true\"");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdata_keeps_inner_whitespace_and_drops_outer() {
        let entity = decode_fragment("<a>\n  <![CDATA[  <x/> ]]>\n</a>").unwrap();
        assert_eq!(entity.get_str("a"), Some("  <x/> "));
    }

    #[test]
    fn padded_text_is_written_as_cdata() {
        let entity = Entity::new().with("a", " spaced ");
        assert_eq!(encode_fragment(&entity), "<a><![CDATA[ spaced ]]></a>");
    }

    #[test]
    fn empty_text_stays_scalar() {
        let entity = Entity::new().with("a", "");
        let encoded = encode_fragment(&entity);
        assert_eq!(encoded, "<a><![CDATA[]]></a>");
        assert_eq!(decode_fragment(&encoded).unwrap(), entity);
    }

    #[test]
    fn cdata_terminator_in_padded_text_is_split() {
        let entity = Entity::new().with("a", " x]]>y ");
        let encoded = encode_fragment(&entity);
        assert_eq!(encoded, "<a><![CDATA[ x]]]]><![CDATA[>y ]]></a>");
        assert_eq!(decode_fragment(&encoded).unwrap(), entity);
    }

    #[test]
    fn collapse_keeps_first_occurrence_position() {
        let entity = decode_fragment("<a>1</a><b>x</b><a>2</a>").unwrap();
        let names: Vec<_> = entity.names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
