use async_trait::async_trait;

use crate::application::{AppResult, Notifier};
use crate::domain::RaidMessage;

/// Sends to every channel; reports failure if any channel failed.
pub struct MultiNotifier {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl MultiNotifier {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    async fn notify(&self, message: &RaidMessage) -> AppResult<()> {
        let mut last_err = None;

        for (channel, n) in self.notifiers.iter().enumerate() {
            if let Err(e) = n.notify(message).await {
                tracing::warn!(channel, raid = %message.raid, "notifier failed: {e}");
                last_err = Some(e);
            }
        }

        last_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::application::AppError;
    use crate::domain::{RaidReport, RaidType};

    struct Channel {
        hits: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Channel {
        async fn notify(&self, _message: &RaidMessage) -> AppResult<()> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Notifier("down".into()));
            }
            Ok(())
        }
    }

    fn message() -> RaidMessage {
        let report = RaidReport {
            raid_type: "The Canyon Colossus".into(),
            players: vec![],
            reporter_uuid: "u".into(),
            gxp_gained: None,
            sr_gained: None,
        };
        RaidMessage::from_report(RaidType::TheCanyonColossus, &report, "G")
    }

    #[tokio::test]
    async fn failing_channel_does_not_skip_the_rest() {
        let hits = Arc::new(AtomicUsize::new(0));
        let multi = MultiNotifier::new(vec![
            Box::new(Channel { hits: hits.clone(), fail: true }),
            Box::new(Channel { hits: hits.clone(), fail: false }),
        ]);

        assert!(multi.notify(&message()).await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn all_channels_ok_is_ok() {
        let hits = Arc::new(AtomicUsize::new(0));
        let multi = MultiNotifier::new(vec![Box::new(Channel { hits: hits.clone(), fail: false })]);
        assert!(multi.notify(&message()).await.is_ok());
        assert_eq!(multi.len(), 1);
    }
}
