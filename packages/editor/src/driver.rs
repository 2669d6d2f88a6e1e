//! Runs a [`FocusCoordinator`] against real time.
//!
//! The driver sleeps until the coordinator's next deadline, ticks it, and
//! repeats until nothing is pending. A shutdown signal (the editor being
//! closed) cancels the request and ends the loop.

use crate::{ControlHost, FocusCoordinator};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The coordinator has no more deadlines.
    Settled,
    /// Shutdown was requested before it settled.
    Cancelled,
}

pub struct FocusDriver<H> {
    coordinator: Arc<Mutex<FocusCoordinator>>,
    host: Arc<Mutex<H>>,
    shutdown: watch::Receiver<bool>,
}

impl<H: ControlHost + Send> FocusDriver<H> {
    pub fn new(
        coordinator: Arc<Mutex<FocusCoordinator>>,
        host: Arc<Mutex<H>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            coordinator,
            host,
            shutdown,
        }
    }

    /// Tick until settled or shut down.
    pub async fn run(mut self) -> DriveOutcome {
        loop {
            if *self.shutdown.borrow() {
                return self.cancel();
            }

            let Some(deadline) = self.tick() else {
                return DriveOutcome::Settled;
            };

            tokio::select! {
                _ = tokio::time::sleep_until(Instant::from_std(deadline)) => {}
                changed = self.shutdown.changed() => {
                    // A dropped sender also means the editor went away
                    if changed.is_err() || *self.shutdown.borrow() {
                        return self.cancel();
                    }
                }
            }
        }
    }

    fn tick(&self) -> Option<std::time::Instant> {
        let now = Instant::now().into_std();
        let mut coordinator = self.coordinator.lock().unwrap_or_else(PoisonError::into_inner);
        let mut host = self.host.lock().unwrap_or_else(PoisonError::into_inner);
        coordinator.tick(now, &mut *host)
    }

    fn cancel(&self) -> DriveOutcome {
        tracing::debug!("Focus driver shutting down");
        self.coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .shutdown();
        DriveOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FocusOutcome, HeadlessHost};
    use folio_model::FieldAddress;
    use std::time::Duration;

    fn shared() -> (Arc<Mutex<FocusCoordinator>>, Arc<Mutex<HeadlessHost>>) {
        (
            Arc::new(Mutex::new(FocusCoordinator::default())),
            Arc::new(Mutex::new(HeadlessHost::new())),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_focuses_and_clears_highlight() {
        let (coordinator, host) = shared();
        let address = FieldAddress::scalar("coverSection", "title");
        host.lock().unwrap().mount(address.control_key());
        coordinator
            .lock()
            .unwrap()
            .activate(address.clone(), Instant::now().into_std());

        let (_tx, rx) = watch::channel(false);
        let started = Instant::now();
        let outcome = FocusDriver::new(coordinator.clone(), host.clone(), rx).run().await;

        assert_eq!(outcome, DriveOutcome::Settled);
        assert_eq!(
            coordinator.lock().unwrap().last_outcome(),
            Some(&FocusOutcome::Focused(address.clone()))
        );
        assert_eq!(host.lock().unwrap().focused, Some(address.control_key()));
        assert!(host.lock().unwrap().highlighted.is_empty());
        // Timer ticks are millisecond-granular
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2100) && elapsed < Duration::from_millis(2120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_gives_up_when_control_never_mounts() {
        let (coordinator, host) = shared();
        let address = FieldAddress::element("eventDetails", "eventName", 4);
        coordinator
            .lock()
            .unwrap()
            .activate(address.clone(), Instant::now().into_std());

        let (_tx, rx) = watch::channel(false);
        let started = Instant::now();
        let outcome = FocusDriver::new(coordinator.clone(), host, rx).run().await;

        assert_eq!(outcome, DriveOutcome::Settled);
        assert!(started.elapsed() < Duration::from_millis(1050));
        assert_eq!(
            coordinator.lock().unwrap().last_outcome(),
            Some(&FocusOutcome::Dropped(address))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_request() {
        let (coordinator, host) = shared();
        let address = FieldAddress::scalar("coverSection", "title");
        coordinator
            .lock()
            .unwrap()
            .activate(address.clone(), Instant::now().into_std());

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(FocusDriver::new(coordinator.clone(), host, rx).run());

        tokio::time::sleep(Duration::from_millis(250)).await;
        tx.send(true).unwrap();

        assert_eq!(task.await.unwrap(), DriveOutcome::Cancelled);
        let coordinator = coordinator.lock().unwrap();
        assert!(coordinator.is_settled());
        assert_eq!(coordinator.last_outcome(), Some(&FocusOutcome::Cancelled(address)));
    }
}
