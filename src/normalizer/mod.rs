//! Turns raw RSS/Atom bytes into [`ArticleRecord`]s.

pub mod document;
pub mod rules;
pub mod text;

use crate::app::FetchError;
use crate::config::ReaderConfig;
use crate::domain::article::{NO_LINK, NO_TITLE};
use crate::domain::ArticleRecord;

use self::document::{parse_document, Element};
use self::rules::{first_match, Field};

#[derive(Debug, Clone)]
pub struct Normalizer {
    item_limit: usize,
    description_limit: usize,
    date_format: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&ReaderConfig::default())
    }
}

impl Normalizer {
    pub fn new(item_limit: usize, description_limit: usize, date_format: &str) -> Self {
        let date_format = if text::is_valid_date_format(date_format) {
            date_format.to_string()
        } else {
            let fallback = ReaderConfig::default().date_format;
            tracing::warn!(
                "Invalid date_format {:?}, using {:?}",
                date_format,
                fallback
            );
            fallback
        };

        Self {
            item_limit,
            description_limit,
            date_format,
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(
            config.item_limit,
            config.description_limit,
            &config.date_format,
        )
    }

    pub fn normalize(&self, body: &[u8]) -> Result<Vec<ArticleRecord>, FetchError> {
        let body = String::from_utf8_lossy(body);
        let root = parse_document(&body)?;

        let items = select_items(&root);
        if items.is_empty() {
            return Err(FetchError::Empty);
        }

        let limit = if self.item_limit == 0 {
            items.len()
        } else {
            self.item_limit
        };

        let articles: Vec<ArticleRecord> = items
            .into_iter()
            .take(limit)
            .map(|item| self.extract(item))
            .collect();

        tracing::debug!("Normalized {} articles from <{}>", articles.len(), root.name);
        Ok(articles)
    }

    fn extract(&self, item: &Element) -> ArticleRecord {
        let title = first_match(item, Field::Title)
            .map(|t| text::strip_html(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());

        let link = first_match(item, Field::Link).unwrap_or_else(|| NO_LINK.to_string());

        let raw_description = first_match(item, Field::Description).unwrap_or_default();
        let description = text::truncate(
            &text::strip_html(&raw_description),
            self.description_limit,
        );

        let published_at = first_match(item, Field::PublishedAt)
            .map(|raw| text::format_date(&raw, &self.date_format))
            .unwrap_or_default();

        let thumbnail_url = first_match(item, Field::Thumbnail)
            .or_else(|| text::sniff_image(&raw_description))
            .unwrap_or_default();

        ArticleRecord {
            title,
            link,
            description,
            published_at,
            thumbnail_url,
        }
    }
}

/// RSS `item` elements in document order, or Atom `entry` elements when a
/// document has no items.
fn select_items(root: &Element) -> Vec<&Element> {
    let items = root.find_all("item");
    if !items.is_empty() {
        return items;
    }
    root.find_all("entry")
}
