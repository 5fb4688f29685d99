//! Serialized event queue in front of the controller.
//!
//! The readiness source and the telephony source each hold a cloned
//! [`CountryCodeHandle`]; one task applies their events in arrival order.

use regdomain_core::CoreError;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::controller::CountryCodeController;
use crate::snapshot::CountryCodeSnapshot;

const EVENT_QUEUE_DEPTH: usize = 64;

/// Input accepted by the event loop
#[derive(Debug)]
pub enum CountryCodeEvent {
    /// Subsystem readiness changed
    ReadyForChange(bool),
    /// Telephony supplied a code; empty means withdrawal
    TelephonyCountry(String),
    /// Request a diagnostic snapshot
    Dump(oneshot::Sender<CountryCodeSnapshot>),
}

/// Cloneable sender side of the event loop
#[derive(Debug, Clone)]
pub struct CountryCodeHandle {
    tx: mpsc::Sender<CountryCodeEvent>,
}

impl CountryCodeHandle {
    /// Queue a readiness change
    pub async fn set_ready_for_change(&self, ready: bool) -> Result<(), CoreError> {
        self.send(CountryCodeEvent::ReadyForChange(ready)).await
    }

    /// Queue a telephony code; empty means withdrawal
    pub async fn set_country_code(&self, code: impl Into<String>) -> Result<(), CoreError> {
        self.send(CountryCodeEvent::TelephonyCountry(code.into())).await
    }

    /// Snapshot taken after every previously sent event has been applied
    pub async fn dump(&self) -> Result<CountryCodeSnapshot, CoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(CountryCodeEvent::Dump(reply_tx)).await?;
        reply_rx.await.map_err(|_| CoreError::ChannelClosed)
    }

    async fn send(&self, event: CountryCodeEvent) -> Result<(), CoreError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| CoreError::ChannelClosed)
    }
}

/// Spawn the task that owns event ordering for `controller`.
///
/// The loop ends once every handle has been dropped.
pub fn spawn_event_loop(
    controller: Arc<CountryCodeController>,
) -> (CountryCodeHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

    let task = tokio::spawn(async move {
        info!("Country code event loop started");
        while let Some(event) = rx.recv().await {
            debug!(?event, "Country code event received");
            match event {
                CountryCodeEvent::ReadyForChange(ready) => controller.set_ready_for_change(ready),
                CountryCodeEvent::TelephonyCountry(code) => {
                    controller.set_country_code_and_update(&code);
                }
                CountryCodeEvent::Dump(reply) => {
                    let _ = reply.send(controller.dump());
                }
            }
        }
        info!("Country code event loop stopped");
    });

    (CountryCodeHandle { tx }, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::CountryCodeConfig;
    use crate::interface::StaticRegistry;

    fn controller() -> Arc<CountryCodeController> {
        Arc::new(
            CountryCodeController::new(
                CountryCodeConfig {
                    default_country_code: "US".to_string(),
                    revert_on_loss: true,
                },
                Arc::new(StaticRegistry::new()),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_events_applied_in_order() {
        let controller = controller();
        let (handle, _task) = spawn_event_loop(controller.clone());

        handle.set_country_code("jp").await.unwrap();
        handle.set_ready_for_change(true).await.unwrap();
        handle.set_ready_for_change(false).await.unwrap();
        handle.set_country_code("de").await.unwrap();

        let snapshot = handle.dump().await.unwrap();
        assert_eq!(snapshot.active_country_code, "DE");
        assert_eq!(snapshot.driver_country_code.unwrap(), "JP");
        assert!(!snapshot.ready);
        assert_eq!(controller.country_code(), "DE");
    }

    #[tokio::test]
    async fn test_loop_stops_when_handles_dropped() {
        let (handle, task) = spawn_event_loop(controller());
        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_after_stop_reports_closed() {
        let (handle, task) = spawn_event_loop(controller());
        task.abort();
        let _ = task.await;

        let result = handle.set_ready_for_change(true).await;
        assert!(matches!(result, Err(CoreError::ChannelClosed)));
    }
}
