//! Side-effect boundary for built-in actions
//!
//! Actions never touch the desktop directly. Opening links, raising
//! notifications and playing alert sounds go through [`ActionEffects`], so the
//! host decides how they happen.

use crate::Result;
use tracing::info;

pub trait ActionEffects: Send + Sync {
    /// Open a URL in the user's browser
    fn open_url(&self, url: &str) -> Result<()>;

    /// Raise a notification
    fn notify(&self, title: &str, body: &str);

    /// Play an audible alert
    fn play_alert(&self);
}

/// Effects that only log what would happen
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEffects;

impl ActionEffects for LogEffects {
    fn open_url(&self, url: &str) -> Result<()> {
        info!("Open URL: {}", url);
        Ok(())
    }

    fn notify(&self, title: &str, body: &str) {
        info!("Notification: {} - {}", title, body);
    }

    fn play_alert(&self) {
        info!("Alert sound");
    }
}
