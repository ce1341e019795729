use serde::{Deserialize, Serialize};

use crate::domain::ArticleRecord;

/// A user-persisted copy of an article, deduplicated by `link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl From<&ArticleRecord> for Bookmark {
    fn from(article: &ArticleRecord) -> Self {
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            desc: article.description.clone(),
            thumb: non_empty(&article.thumbnail_url),
            date: non_empty(&article.published_at),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_article_drops_empty_optionals() {
        let article = ArticleRecord {
            title: "Hello".into(),
            link: "http://x/1".into(),
            description: "World".into(),
            ..Default::default()
        };
        let bookmark = Bookmark::from(&article);
        assert_eq!(bookmark.desc, "World");
        assert_eq!(bookmark.thumb, None);
        assert_eq!(bookmark.date, None);

        let json = serde_json::to_string(&bookmark).unwrap();
        assert!(!json.contains("thumb"));
        assert!(!json.contains("date"));
    }

    #[test]
    fn test_bookmark_list_json_roundtrip() {
        let bookmarks = vec![
            Bookmark {
                title: "A".into(),
                link: "https://a.example/1".into(),
                desc: "first".into(),
                thumb: Some("https://a.example/1.jpg".into()),
                date: Some("1/2/2024".into()),
            },
            Bookmark {
                title: "B".into(),
                link: "https://b.example/2".into(),
                desc: String::new(),
                thumb: None,
                date: None,
            },
        ];
        let json = serde_json::to_string(&bookmarks).unwrap();
        let back: Vec<Bookmark> = serde_json::from_str(&json).unwrap();
        assert_eq!(bookmarks, back);
    }

    #[test]
    fn test_bookmark_without_desc_deserializes() {
        let back: Vec<Bookmark> =
            serde_json::from_str(r#"[{"title":"T","link":"https://t.example"}]"#).unwrap();
        assert_eq!(back[0].desc, "");
    }
}
