//! Minimal element tree built from quick-xml events.
//!
//! Only what the extraction rules need: qualified names, attributes and
//! mixed text content in document order. Entity references in text and
//! attributes are decoded leniently so that HTML entities such as `&nbsp;`
//! do not fail an otherwise usable feed.

use std::borrow::Cow;

use html_escape::decode_html_entities;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::app::FetchError;

/// Real feeds nest a handful of levels; anything past this is rejected
/// before the tree gets deep enough to exhaust the stack when walked or dropped.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written, e.g. `media:content`.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let attributes = start
            .attributes()
            .with_checks(false)
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let raw = String::from_utf8_lossy(&attr.value);
                (key, decode_html_entities(&raw).into_owned())
            })
            .collect();

        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// All elements below this one in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut pending: Vec<&Element> = self.child_elements().collect();
        pending.reverse();

        while let Some(el) = pending.pop() {
            out.push(el);
            let start = pending.len();
            pending.extend(el.child_elements());
            pending[start..].reverse();
        }
        out
    }

    /// This element and its descendants named `name`, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        if self.name == name {
            out.push(self);
        }
        out.extend(self.descendants().into_iter().filter(|el| el.name == name));
        out
    }

    /// Concatenated text of the element and everything beneath it.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut pending: Vec<&Node> = self.children.iter().rev().collect();

        while let Some(node) = pending.pop() {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => pending.extend(el.children.iter().rev()),
            }
        }
        out
    }
}

/// Parse `input` into its root element.
///
/// Anything a browser's XML parser would reject as not well-formed is a
/// [`FetchError::Parse`]: reader errors, unclosed or mismatched tags, no
/// root element, stray text or a second element outside the root. Bodies
/// nested deeper than [`MAX_DEPTH`] are rejected the same way.
pub fn parse_document(input: &str) -> Result<Element, FetchError> {
    let input = input.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(FetchError::Parse(format!(
                        "nesting deeper than {} elements",
                        MAX_DEPTH
                    )));
                }
                stack.push(Element::from_start(&start));
            }
            Ok(Event::Empty(start)) => {
                attach(&mut stack, &mut root, Element::from_start(&start))?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FetchError::Parse("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let raw = String::from_utf8_lossy(&text);
                push_text(&mut stack, decode_html_entities(&raw))?;
            }
            Ok(Event::CData(data)) => {
                push_text(&mut stack, String::from_utf8_lossy(&data))?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(FetchError::Parse(format!(
                    "{} at byte {}",
                    e,
                    reader.buffer_position()
                )))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(FetchError::Parse(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| FetchError::Parse("document has no root element".into()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FetchError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }

    if root.is_some() {
        return Err(FetchError::Parse(format!(
            "unexpected second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: Cow<'_, str>) -> Result<(), FetchError> {
    match stack.last_mut() {
        Some(parent) => {
            if !text.is_empty() {
                parent.children.push(Node::Text(text.into_owned()));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(FetchError::Parse("text outside the root element".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let root = parse_document(
            r#"<?xml version="1.0"?><rss><channel><item><title>A</title></item></channel></rss>"#,
        )
        .unwrap();
        assert_eq!(root.name, "rss");
        let items = root.find_all("item");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].find_all("title")[0].text_content(), "A");
    }

    #[test]
    fn test_entities_and_cdata_decoded() {
        let root = parse_document(
            "<d><a>&lt;p&gt;Tom &amp; Jerry&nbsp;&#33;</a><b><![CDATA[<img src=\"x.png\">]]></b></d>",
        )
        .unwrap();
        let a = root.find_all("a")[0].text_content();
        assert_eq!(a, "<p>Tom & Jerry\u{a0}!");
        assert_eq!(root.find_all("b")[0].text_content(), "<img src=\"x.png\">");
    }

    #[test]
    fn test_attributes_and_prefixed_names() {
        let root = parse_document(
            r#"<item xmlns:media="http://search.yahoo.com/mrss/"><media:content url="a?x=1&amp;y=2" medium="image"/></item>"#,
        )
        .unwrap();
        let content = root.find_all("media:content");
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].attr("url"), Some("a?x=1&y=2"));
        assert_eq!(content[0].attr("missing"), None);
    }

    #[test]
    fn test_find_all_includes_self_in_document_order() {
        let root = parse_document("<item><item>inner</item></item>").unwrap();
        let items = root.find_all("item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text_content(), "inner");
    }

    #[test]
    fn test_mixed_content_text_order() {
        let root = parse_document("<p>Hello <b>big</b> world</p>").unwrap();
        assert_eq!(root.text_content(), "Hello big world");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            parse_document("this is not xml at all"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(parse_document(""), Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_mismatched_and_unclosed_rejected() {
        assert!(matches!(
            parse_document("<a><b></a></b>"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(parse_document("<a><b>"), Err(FetchError::Parse(_))));
        assert!(matches!(parse_document("</a>"), Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_second_root_rejected() {
        assert!(matches!(
            parse_document("<a/><b/>"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_document("<a></a>trailing"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_byte_order_mark_ignored() {
        let root = parse_document("\u{feff}<rss/>").unwrap();
        assert_eq!(root.name, "rss");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = parse_document("<r><a><b/></a><c><d/></c></r>").unwrap();
        let names: Vec<&str> = root.descendants().iter().map(|el| el.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    fn nested(depth: usize) -> String {
        "<a>".repeat(depth) + "deep" + &"</a>".repeat(depth)
    }

    #[test]
    fn test_nesting_at_limit_accepted() {
        let root = parse_document(&nested(MAX_DEPTH)).unwrap();
        assert_eq!(root.descendants().len(), MAX_DEPTH - 1);
        assert_eq!(root.text_content(), "deep");
    }

    #[test]
    fn test_nesting_past_limit_rejected() {
        assert!(matches!(
            parse_document(&nested(MAX_DEPTH + 1)),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_document(&nested(20_000)),
            Err(FetchError::Parse(_))
        ));
    }
}
