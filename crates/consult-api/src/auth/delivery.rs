//! Out-of-band delivery of password-reset links
//!
//! Email sending is not part of this service. The default [`LogDelivery`]
//! writes the link to the log; [`OutboxDelivery`] keeps notices in memory so
//! tests can pick the token up.

use async_trait::async_trait;
use tokio::sync::Mutex;

/// A reset link addressed to a user
#[derive(Debug, Clone)]
pub struct ResetNotice {
    pub user_id: String,
    pub email: String,
    pub token: String,
    pub link: String,
}

/// Side channel that hands reset links to their owner
#[async_trait]
pub trait ResetDelivery: Send + Sync {
    async fn deliver(&self, notice: ResetNotice) -> anyhow::Result<()>;
}

/// Logs the reset link at info level
#[derive(Debug, Default)]
pub struct LogDelivery;

#[async_trait]
impl ResetDelivery for LogDelivery {
    async fn deliver(&self, notice: ResetNotice) -> anyhow::Result<()> {
        tracing::info!(
            user_id = %notice.user_id,
            email = %notice.email,
            link = %notice.link,
            "Password reset link issued"
        );
        Ok(())
    }
}

/// Records every notice in memory
#[derive(Debug, Default)]
pub struct OutboxDelivery {
    sent: Mutex<Vec<ResetNotice>>,
}

impl OutboxDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notices(&self) -> Vec<ResetNotice> {
        self.sent.lock().await.clone()
    }

    /// Most recent notice sent to `email`
    pub async fn latest_for(&self, email: &str) -> Option<ResetNotice> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|n| n.email == email)
            .cloned()
    }
}

#[async_trait]
impl ResetDelivery for OutboxDelivery {
    async fn deliver(&self, notice: ResetNotice) -> anyhow::Result<()> {
        self.sent.lock().await.push(notice);
        Ok(())
    }
}
