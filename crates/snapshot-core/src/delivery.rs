//! Rendering and sending a compiled snapshot.
//!
//! The core only knows [`DeliveryGateway`]. The default gateway renders an
//! HTML card with the theme stylesheet inlined and posts it to the chat
//! platform adapter, which owns rasterization and the actual direct message.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Serialize;
use snapshot_types::UserId;
use snapshot_types::models::{SnapshotData, Theme};

use crate::DeliveryError;

#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    async fn deliver(&self, user_id: UserId, snapshot: &SnapshotData) -> Result<(), DeliveryError>;
}

/// Rendered card bytes plus how to label them.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub trait Renderer: Send + Sync {
    fn render(&self, snapshot: &SnapshotData) -> Result<RenderedCard, DeliveryError>;
}

#[async_trait]
pub trait DirectMessageSink: Send + Sync {
    async fn send_direct_message(
        &self,
        user_id: UserId,
        card: RenderedCard,
    ) -> Result<(), DeliveryError>;
}

/// Render then send.
pub struct CardDelivery<R, S> {
    renderer: R,
    sink: S,
}

impl<R: Renderer, S: DirectMessageSink> CardDelivery<R, S> {
    pub fn new(renderer: R, sink: S) -> Self {
        Self { renderer, sink }
    }
}

#[async_trait]
impl<R: Renderer, S: DirectMessageSink> DeliveryGateway for CardDelivery<R, S> {
    async fn deliver(&self, user_id: UserId, snapshot: &SnapshotData) -> Result<(), DeliveryError> {
        let card = self.renderer.render(snapshot)?;
        self.sink.send_direct_message(user_id, card).await
    }
}

// -- HTML card --

const CARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
{{css}}
</style>
</head>
<body class="theme-{{theme}}">
<div class="card">
  <header>
    <h1>{{username}}</h1>
    <p class="date">{{date}}</p>
  </header>
  <section class="stats">
    <div class="stat">
      <span class="label">Messages sent</span><span class="value">{{messages_sent}}</span>
    </div>
    <div class="stat">
      <span class="label">Top emoji</span><span class="value">{{top_emoji}}</span>
    </div>
    <div class="stat">
      <span class="label">Mood</span><span class="value">{{mood}} {{mood_description}}</span>
    </div>
  </section>
  <section class="words">
    <h2>Top words</h2>
    <ul>{{top_words}}</ul>
  </section>
  <section class="note">
    <p>{{note}}</p>
  </section>
</div>
</body>
</html>
"#;

/// Renders the card as a standalone HTML document.
///
/// Each theme needs `<stylesheet_dir>/<theme>.css`. A missing stylesheet fails
/// the render; there is no fallback theme.
pub struct HtmlCardRenderer {
    stylesheet_dir: PathBuf,
}

impl HtmlCardRenderer {
    pub fn new(stylesheet_dir: impl Into<PathBuf>) -> Self {
        Self {
            stylesheet_dir: stylesheet_dir.into(),
        }
    }

    pub fn stylesheet_path(&self, theme: Theme) -> PathBuf {
        self.stylesheet_dir.join(format!("{}.css", theme.as_str()))
    }

    fn load_stylesheet(&self, theme: Theme) -> Result<String, DeliveryError> {
        let path = self.stylesheet_path(theme);
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DeliveryError::MissingStylesheet { theme, path },
            _ => DeliveryError::Render(format!("reading {}: {}", path.display(), e)),
        })
    }
}

impl Renderer for HtmlCardRenderer {
    fn render(&self, snapshot: &SnapshotData) -> Result<RenderedCard, DeliveryError> {
        let css = self.load_stylesheet(snapshot.theme)?;

        let top_words: String = snapshot
            .top_words
            .iter()
            .map(|w| format!("<li>{}</li>", escape_html(w)))
            .collect();

        // css goes in last so template markers inside user text are never expanded
        let html = CARD_TEMPLATE
            .replace("{{theme}}", snapshot.theme.as_str())
            .replace("{{username}}", &escape_html(&snapshot.username))
            .replace("{{date}}", &escape_html(&snapshot.display_date))
            .replace("{{messages_sent}}", &snapshot.messages_sent.to_string())
            .replace("{{top_emoji}}", &escape_html(&snapshot.top_emoji))
            .replace("{{mood_description}}", &escape_html(&snapshot.mood_description))
            .replace("{{mood}}", &escape_html(&snapshot.mood))
            .replace("{{top_words}}", &top_words)
            .replace("{{note}}", &escape_html(&snapshot.note))
            .replace("{{css}}", &css);

        Ok(RenderedCard {
            filename: "snapshot.html".into(),
            content_type: "text/html; charset=utf-8",
            bytes: html.into_bytes(),
        })
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

// -- Webhook sink --

#[derive(Serialize)]
struct DirectMessageBody<'a> {
    user_id: UserId,
    filename: &'a str,
    content_type: &'a str,
    content_base64: String,
}

/// Posts direct messages to the chat platform adapter at
/// `<base_url>/direct-messages`.
pub struct WebhookSink {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookSink {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Send(format!("building HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/direct-messages", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl DirectMessageSink for WebhookSink {
    async fn send_direct_message(
        &self,
        user_id: UserId,
        card: RenderedCard,
    ) -> Result<(), DeliveryError> {
        let body = DirectMessageBody {
            user_id,
            filename: &card.filename,
            content_type: card.content_type,
            content_base64: B64.encode(&card.bytes),
        };
        let payload = serde_json::to_vec(&body).map_err(|e| DeliveryError::Send(e.to_string()))?;

        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Send(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DeliveryError::Send(format!("{} returned {}", self.endpoint, status)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(theme: Theme) -> SnapshotData {
        SnapshotData {
            username: "<ada>".into(),
            display_date: "19 October 2026".into(),
            theme,
            messages_sent: 12,
            top_words: vec!["rust".into(), "{{css}}".into()],
            top_emoji: "🚀".into(),
            mood: "😃".into(),
            mood_description: "Positive".into(),
            note: "fish & chips".into(),
        }
    }

    #[test]
    fn renders_with_inlined_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dark.css"), "body { background: #111; }").unwrap();

        let card = HtmlCardRenderer::new(dir.path()).render(&snapshot(Theme::Dark)).unwrap();
        let html = String::from_utf8(card.bytes).unwrap();

        assert!(html.contains("body { background: #111; }"));
        assert!(html.contains("theme-dark"));
        assert!(html.contains("&lt;ada&gt;"));
        assert!(html.contains("fish &amp; chips"));
        assert!(html.contains("<li>rust</li>"));
        assert!(html.contains("<li>&#123;&#123;css&#125;&#125;</li>"));
        assert!(html.contains("Positive"));
    }

    #[test]
    fn missing_stylesheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HtmlCardRenderer::new(dir.path()).render(&snapshot(Theme::Neon)).unwrap_err();

        match err {
            DeliveryError::MissingStylesheet { theme, path } => {
                assert_eq!(theme, Theme::Neon);
                assert!(path.ends_with("neon.css"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn webhook_endpoint_is_normalised() {
        let sink = WebhookSink::new("http://localhost:9000/", Duration::from_secs(5)).unwrap();
        assert_eq!(sink.endpoint, "http://localhost:9000/direct-messages");
    }
}
