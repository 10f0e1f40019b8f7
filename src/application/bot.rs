//! Long polling loop
//!
//! Pulls updates, advances the offset past each one and hands every text
//! message to the orchestrator on its own task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::orchestrator::MessageOrchestrator;
use crate::core::transport::{PolledUpdate, UpdateSource};
use crate::domain::Inbound;

/// Pause after a failed poll before trying again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct Bot {
    updates: Arc<dyn UpdateSource>,
    orchestrator: Arc<MessageOrchestrator>,
    poll_timeout: Duration,
}

impl Bot {
    pub fn new(
        updates: Arc<dyn UpdateSource>,
        orchestrator: Arc<MessageOrchestrator>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            updates,
            orchestrator,
            poll_timeout,
        }
    }

    /// Poll until Ctrl-C
    pub async fn run(&self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("bot stopped by user");
        })
        .await
    }

    /// Poll until `shutdown` resolves.
    ///
    /// Messages already handed off keep running; they are not awaited.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset = 0_i64;

        info!(poll_timeout_secs = self.poll_timeout.as_secs(), "polling for updates");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                polled = self.updates.poll(offset, self.poll_timeout) => {
                    match polled {
                        Ok(updates) => {
                            for update in updates {
                                offset = offset.max(update.update_id + 1);
                                self.dispatch(update);
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "polling failed, retrying in {:?}", POLL_RETRY_DELAY);
                            tokio::select! {
                                _ = &mut shutdown => break,
                                _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                            }
                        }
                    }
                }
            }
        }

        info!("polling stopped");
    }

    fn dispatch(&self, update: PolledUpdate) {
        let Some(message) = update.message else {
            debug!(update_id = update.update_id, "skipping update without text");
            return;
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            orchestrator.handle(Inbound::classify(message)).await;
        });
    }
}
