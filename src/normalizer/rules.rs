//! Declarative field extraction rules.
//!
//! Feeds in the wild disagree on where things live, so each article field
//! has an ordered list of `(element, condition, text | attribute)` rules and
//! the first rule producing a non-empty value wins.

use crate::normalizer::document::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Link,
    Description,
    PublishedAt,
    Thumbnail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    Text,
    Attr(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    /// Attribute must be present with exactly this value.
    AttrEquals(&'static str, &'static str),
    /// Attribute is missing, or present with exactly this value.
    AttrAbsentOrEquals(&'static str, &'static str),
    /// Attribute is missing, or its value starts with this prefix.
    AttrAbsentOrPrefix(&'static str, &'static str),
}

impl Condition {
    fn holds(&self, element: &Element) -> bool {
        match *self {
            Condition::Always => true,
            Condition::AttrEquals(name, value) => element.attr(name) == Some(value),
            Condition::AttrAbsentOrEquals(name, value) => {
                element.attr(name).map_or(true, |v| v == value)
            }
            Condition::AttrAbsentOrPrefix(name, prefix) => {
                element.attr(name).map_or(true, |v| v.starts_with(prefix))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub element: &'static str,
    pub when: Condition,
    pub extract: Extract,
}

const fn text(element: &'static str) -> Rule {
    Rule {
        element,
        when: Condition::Always,
        extract: Extract::Text,
    }
}

const fn attr(element: &'static str, name: &'static str) -> Rule {
    Rule {
        element,
        when: Condition::Always,
        extract: Extract::Attr(name),
    }
}

const fn attr_when(element: &'static str, name: &'static str, when: Condition) -> Rule {
    Rule {
        element,
        when,
        extract: Extract::Attr(name),
    }
}

pub struct FieldRules {
    pub field: Field,
    pub rules: &'static [Rule],
}

pub const EXTRACTION_RULES: &[FieldRules] = &[
    FieldRules {
        field: Field::Title,
        rules: &[text("title"), text("dc:title")],
    },
    FieldRules {
        field: Field::Link,
        rules: &[
            text("link"),
            attr_when("link", "href", Condition::AttrAbsentOrEquals("rel", "alternate")),
            attr("link", "url"),
            attr_when("link", "href", Condition::AttrEquals("rel", "alternate")),
        ],
    },
    FieldRules {
        field: Field::Description,
        rules: &[
            text("description"),
            text("summary"),
            text("content"),
            text("content:encoded"),
        ],
    },
    FieldRules {
        field: Field::PublishedAt,
        rules: &[
            text("pubDate"),
            text("updated"),
            text("published"),
            text("dc:date"),
        ],
    },
    FieldRules {
        field: Field::Thumbnail,
        rules: &[
            attr("media:thumbnail", "url"),
            attr_when(
                "media:content",
                "url",
                Condition::AttrAbsentOrEquals("medium", "image"),
            ),
            attr_when(
                "enclosure",
                "url",
                Condition::AttrAbsentOrPrefix("type", "image/"),
            ),
            attr("media:thumbnail", "href"),
            attr("thumbnail", "url"),
            attr("thumbnail", "src"),
            attr("thumbnail", "href"),
            attr("image", "url"),
            attr("image", "src"),
            attr("image", "href"),
            attr("itunes:image", "href"),
        ],
    },
];

pub fn rules_for(field: Field) -> &'static [Rule] {
    EXTRACTION_RULES
        .iter()
        .find(|entry| entry.field == field)
        .map(|entry| entry.rules)
        .unwrap_or(&[])
}

/// Raw value of the first rule that yields non-blank content beneath `item`.
pub fn first_match(item: &Element, field: Field) -> Option<String> {
    let descendants = item.descendants();

    rules_for(field).iter().find_map(|rule| {
        descendants
            .iter()
            .filter(|el| el.name == rule.element && rule.when.holds(el))
            .find_map(|el| {
                let value = match rule.extract {
                    Extract::Text => el.text_content(),
                    Extract::Attr(name) => el.attr(name)?.to_string(),
                };
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::document::parse_document;

    fn item(xml: &str) -> Element {
        parse_document(xml).unwrap()
    }

    #[test]
    fn test_every_field_has_rules() {
        for field in [
            Field::Title,
            Field::Link,
            Field::Description,
            Field::PublishedAt,
            Field::Thumbnail,
        ] {
            assert!(!rules_for(field).is_empty(), "{:?} has no rules", field);
        }
    }

    #[test]
    fn test_rss_link_text_wins() {
        let el = item(r#"<item><link>http://x/1</link><link href="http://x/2"/></item>"#);
        assert_eq!(first_match(&el, Field::Link), Some("http://x/1".into()));
    }

    #[test]
    fn test_atom_link_skips_non_alternate_rel() {
        let el = item(
            r#"<entry><link rel="replies" href="http://y/comments"/><link rel="alternate" href="http://y/2"/></entry>"#,
        );
        assert_eq!(first_match(&el, Field::Link), Some("http://y/2".into()));
    }

    #[test]
    fn test_link_url_attribute() {
        let el = item(r#"<item><link url="http://z/3"/></item>"#);
        assert_eq!(first_match(&el, Field::Link), Some("http://z/3".into()));
    }

    #[test]
    fn test_blank_values_fall_through() {
        let el = item("<entry><summary>  </summary><content>Body</content></entry>");
        assert_eq!(first_match(&el, Field::Description), Some("Body".into()));
    }

    #[test]
    fn test_enclosure_must_be_image() {
        let el = item(
            r#"<item><enclosure url="http://a/ep.mp3" type="audio/mpeg"/><enclosure url="http://a/pic.jpg" type="image/jpeg"/></item>"#,
        );
        assert_eq!(
            first_match(&el, Field::Thumbnail),
            Some("http://a/pic.jpg".into())
        );
    }

    #[test]
    fn test_media_thumbnail_preferred() {
        let el = item(
            r#"<item><media:content url="http://a/big.jpg" medium="image"/><media:thumbnail url="http://a/small.jpg"/></item>"#,
        );
        assert_eq!(
            first_match(&el, Field::Thumbnail),
            Some("http://a/small.jpg".into())
        );
    }

    #[test]
    fn test_no_match() {
        let el = item("<item><title>t</title></item>");
        assert_eq!(first_match(&el, Field::PublishedAt), None);
        assert_eq!(first_match(&el, Field::Thumbnail), None);
    }
}
