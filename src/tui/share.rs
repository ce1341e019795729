//! Best-effort sharing. Nothing here may fail the UI: every error turns into
//! a status line.

use anyhow::{anyhow, Context, Result};

use crate::tui::card::ArticleCard;

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

pub trait Launcher {
    fn open(&self, url: &str) -> Result<()>;
}

/// The desktop clipboard. Without the `clipboard` feature every copy fails.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    #[cfg(feature = "clipboard")]
    fn copy(&mut self, text: &str) -> Result<()> {
        use copypasta::{ClipboardContext, ClipboardProvider};

        let mut clipboard =
            ClipboardContext::new().map_err(|err| anyhow!("create clipboard context: {}", err))?;
        clipboard
            .set_contents(text.to_string())
            .map_err(|err| anyhow!("copy link: {}", err))?;
        Ok(())
    }

    #[cfg(not(feature = "clipboard"))]
    fn copy(&mut self, _text: &str) -> Result<()> {
        Err(anyhow!("clipboard support not built in"))
    }
}

#[derive(Debug, Default)]
pub struct BrowserLauncher;

impl Launcher for BrowserLauncher {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url).with_context(|| format!("open {}", url))
    }
}

pub struct Sharer {
    clipboard: Box<dyn Clipboard>,
    launcher: Box<dyn Launcher>,
    intent_url: String,
}

impl Sharer {
    pub fn new(
        clipboard: Box<dyn Clipboard>,
        launcher: Box<dyn Launcher>,
        intent_url: impl Into<String>,
    ) -> Self {
        Self {
            clipboard,
            launcher,
            intent_url: intent_url.into(),
        }
    }

    pub fn system(intent_url: impl Into<String>) -> Self {
        Self::new(
            Box::new(SystemClipboard),
            Box::new(BrowserLauncher),
            intent_url,
        )
    }

    pub fn intent_for(&self, card: &ArticleCard) -> String {
        let text = format!("Check this out: {} {}", card.title, card.link);
        let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
        format!("{}{}", self.intent_url, encoded)
    }

    /// Copy the link and open a prefilled share page. Returns the status
    /// line to show.
    pub fn share(&mut self, card: &ArticleCard) -> String {
        if !card.has_link() {
            return "This article has no link to share".to_string();
        }

        let copied = self.clipboard.copy(&card.link);
        if let Err(e) = &copied {
            tracing::warn!("Clipboard copy failed: {:#}", e);
        }

        let opened = if self.intent_url.is_empty() {
            Err(anyhow!("no share intent configured"))
        } else {
            self.launcher.open(&self.intent_for(card))
        };
        if let Err(e) = &opened {
            tracing::warn!("Opening share intent failed: {:#}", e);
        }

        match (copied.is_ok(), opened.is_ok()) {
            (true, true) => "Link copied to clipboard".to_string(),
            (true, false) => "Link copied to clipboard (share page unavailable)".to_string(),
            (false, true) => "Opened share page".to_string(),
            (false, false) => format!("Share this link: {}", card.link),
        }
    }

    pub fn open_link(&self, card: &ArticleCard) -> String {
        if !card.has_link() {
            return "This article has no link".to_string();
        }
        match self.launcher.open(&card.link) {
            Ok(()) => format!("Opened {}", card.link),
            Err(e) => {
                tracing::warn!("Opening link failed: {:#}", e);
                format!("Failed to open browser: {}", card.link)
            }
        }
    }
}
