// In crates/notifier/src/lib.rs

use async_trait::async_trait;
use tokio::sync::Mutex;

pub mod error;
pub mod telegram;

// Re-export public types
pub use error::{Error, Result};
pub use telegram::TelegramNotifier;

/// Delivers rendered reports to a human.
///
/// Messages use Telegram's legacy Markdown (`*bold*`, `_italic_`).
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &str) -> Result<()>;
}

/// Writes every message to the log instead of sending it anywhere.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "LogNotifier"
    }

    async fn send(&self, message: &str) -> Result<()> {
        tracing::info!(target: "notifier", "\n{}", message);
        Ok(())
    }
}

/// Keeps messages in memory. Useful for tests and for printing a run's output.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    fn name(&self) -> &'static str {
        "MemoryNotifier"
    }

    async fn send(&self, message: &str) -> Result<()> {
        self.sent.lock().await.push(message.to_string());
        Ok(())
    }
}
