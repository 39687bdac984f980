// services/bank-dash/src/poll.rs
//
// Periodic refresh of the active page's primary list
//

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::loader::AppEvent;
use crate::state::Page;

/// Sends `AppEvent::Poll(page)` every `period` until dropped.
/// The first poll fires one full period after start; entering a page
/// already triggers its initial load.
pub struct Poller {
    page: Page,
    task: JoinHandle<()>,
}

impl Poller {
    pub fn start(handle: &Handle, page: Page, period: Duration, tx: UnboundedSender<AppEvent>) -> Self {
        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                debug!("Polling {}", page);
                if tx.send(AppEvent::Poll(page)).is_err() {
                    break;
                }
            }
        });
        Self { page, task }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_poller_ticks_then_stops_on_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = Poller::start(&Handle::current(), Page::Stock, Duration::from_secs(30), tx);
        assert_eq!(poller.page(), Page::Stock);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(rx.try_recv(), Ok(AppEvent::Poll(Page::Stock))));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(matches!(rx.try_recv(), Ok(AppEvent::Poll(Page::Stock))));

        drop(poller);
        // aborted task drops its sender
        assert!(rx.recv().await.is_none());
    }
}
