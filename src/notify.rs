//! Outbound Telegram notifications for hook events.
//!
//! Best-effort by design: missing credentials mean the notifier is never
//! constructed, and transport failures are logged by the caller rather
//! than propagated into the hook response.

use secrecy::{ExposeSecret, SecretString};

use crate::error::NotifyError;

/// Telegram caps sendMessage at 4096 chars; stay under it with headroom
/// for the chunk prefix.
const MAX_MESSAGE_LENGTH: usize = 3500;

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable holding the destination chat id.
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Notifier credentials and destination.
pub struct NotifyConfig {
    pub bot_token: SecretString,
    pub chat_id: String,
}

impl NotifyConfig {
    /// Read credentials from the environment; `None` means notifications
    /// are disabled and the hook should skip silently.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var(BOT_TOKEN_ENV).ok().filter(|t| !t.is_empty())?;
        let chat_id = std::env::var(CHAT_ID_ENV).ok().filter(|c| !c.is_empty())?;
        Some(Self {
            bot_token: SecretString::from(bot_token),
            chat_id,
        })
    }
}

/// Telegram notifier — posts HTML messages to the Bot API.
pub struct TelegramNotifier {
    config: NotifyConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.config.bot_token.expose_secret()
        )
    }

    /// Send an event notification: kind, project, and the prompt that
    /// started the work. All three are escaped for HTML parse mode.
    pub async fn notify(
        &self,
        kind: &str,
        project: &str,
        prompt: &str,
    ) -> Result<(), NotifyError> {
        let text = format!(
            "<b>Event:</b> {}\n<b>Project:</b> {}\n<b>Prompt:</b> {}",
            escape_html(kind),
            escape_html(project),
            escape_html(prompt),
        );
        self.send_chunked(&text).await
    }

    /// Send a message, splitting into `(i/n)`-prefixed chunks when it
    /// exceeds the length cap.
    async fn send_chunked(&self, text: &str) -> Result<(), NotifyError> {
        let chunks = split_chunks(text, MAX_MESSAGE_LENGTH);
        if chunks.len() == 1 {
            return self.send_message(&chunks[0]).await;
        }

        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            self.send_message(&format!("({}/{})\n{}", i + 1, total, chunk))
                .await?;
        }
        Ok(())
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Send {
                endpoint: "sendMessage".into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api { status, body });
        }
        Ok(())
    }
}

/// Escape text for Telegram HTML parse mode.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Split into character-bounded chunks (never inside a UTF-8 sequence).
fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return vec![text.to_string()];
    }
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_specials() {
        assert_eq!(
            escape_html("a <b> & c"),
            "a &lt;b&gt; &amp; c"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = split_chunks("hello", 10);
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn long_text_splits_at_char_boundary() {
        let text = "ab".repeat(8);
        let chunks = split_chunks(&text, 5);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].chars().count(), 5);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn multibyte_text_never_splits_inside_a_char() {
        let text = "héllo wörld ".repeat(100);
        let chunks = split_chunks(&text, 7);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn config_absent_without_env() {
        // Guard against ambient credentials on dev machines.
        if std::env::var(BOT_TOKEN_ENV).is_err() || std::env::var(CHAT_ID_ENV).is_err() {
            assert!(NotifyConfig::from_env().is_none());
        }
    }
}
