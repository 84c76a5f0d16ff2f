//! Webhook 通知出口

use async_trait::async_trait;

use super::{NotificationSink, OrderNotification};

/// 单次通知请求的超时
const WEBHOOK_TIMEOUT_SECS: u64 = 5;

/// 向外部系统 POST JSON 的通知出口
#[derive(Debug)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn order_placed(&self, notification: &OrderNotification) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .timeout(std::time::Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .json(notification)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Webhook rejected notification: {} - {}", status, text);
        }

        tracing::debug!(
            order_id = notification.order_id,
            url = %self.url,
            "Order notification delivered"
        );
        Ok(())
    }
}
