//! Focus requests settle within `max_attempts * poll_delay`

use folio_editor::{ControlHost, FieldAddress, FocusConfig, FocusCoordinator, FocusOutcome, FocusState};
use folio_model::ControlKey;
use proptest::prelude::*;
use std::time::{Duration, Instant};

/// Mounts the target after a fixed delay, or never.
struct DelayedHost {
    start: Instant,
    now: Instant,
    key: ControlKey,
    mount_after: Option<Duration>,
    focused: bool,
}

impl ControlHost for DelayedHost {
    fn is_mounted(&self, key: &ControlKey) -> bool {
        *key == self.key
            && self
                .mount_after
                .map(|delay| self.now >= self.start + delay)
                .unwrap_or(false)
    }

    fn focus(&mut self, _key: &ControlKey) {
        self.focused = true;
    }

    fn scroll_into_view(&mut self, _key: &ControlKey) {}

    fn set_highlight(&mut self, _key: &ControlKey, _on: bool) {}
}

proptest! {
    #[test]
    fn prop_request_settles_within_budget(
        max_attempts in 1u32..20,
        delay_ms in 1u64..250,
        mount_after_ms in proptest::option::of(0u64..5000),
        settle_early in any::<bool>(),
    ) {
        let config = FocusConfig {
            max_attempts,
            poll_delay: Duration::from_millis(delay_ms),
            highlight: Duration::from_millis(0),
        };
        let start = Instant::now();
        let address = FieldAddress::element("eventDetails", "eventLocation", 1);
        let mut host = DelayedHost {
            start,
            now: start,
            key: address.control_key(),
            mount_after: mount_after_ms.map(Duration::from_millis),
            focused: false,
        };

        let mut coordinator = FocusCoordinator::new(config);
        coordinator.activate(address.clone(), start);
        if settle_early {
            coordinator.render_settled(start);
        }

        let budget = config.poll_delay * max_attempts;
        let mut now = start;
        while !coordinator.is_settled() {
            host.now = now;
            match coordinator.tick(now, &mut host) {
                Some(next) => {
                    prop_assert!(next > now || coordinator.is_settled());
                    now = next;
                }
                None => break,
            }
        }

        prop_assert!(coordinator.is_settled());
        prop_assert!(now - start <= budget);
        match coordinator.last_outcome() {
            Some(FocusOutcome::Focused(a)) => {
                prop_assert_eq!(a, &address);
                prop_assert!(host.focused);
            }
            Some(FocusOutcome::Dropped(a)) => {
                prop_assert_eq!(a, &address);
                prop_assert!(!host.focused);
                prop_assert_eq!(coordinator.state(), &FocusState::Idle);
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }
}
