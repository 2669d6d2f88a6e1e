//! # Focus Coordinator
//!
//! Moves keyboard focus to the editing control for an address activated in
//! the preview. The control may not exist yet (its section is collapsed or
//! the panel is closed), so the coordinator expands what is needed, waits,
//! and probes the host a bounded number of times.
//!
//! ```text
//!          activate                settle / delay
//! Idle ───────────────→ Awaiting ─────────────────→ Polling ──found──→ Focused
//!  ↑                     Expansion                  │  │                 │
//!  │                                  not found,    │  │ not found,      │ highlight
//!  │                                  attempts left └──┘ none left       │ expires
//!  └────────────────────────────────────────────────────┴────────────────┘
//! ```
//!
//! The coordinator is a pure state machine: callers pass the current time
//! to [`FocusCoordinator::tick`] and get back the next instant at which it
//! wants to be ticked. [`crate::FocusDriver`] runs that loop on tokio.
//!
//! A request always settles. With `max_attempts = n` and
//! `poll_delay = d` it reaches `Focused` or `Idle` no later than `n * d`
//! after activation.

use folio_model::{ControlKey, FieldAddress};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusConfig {
    /// Probes before a request is dropped
    pub max_attempts: u32,

    /// Delay between probes, and before the first one
    pub poll_delay: Duration,

    /// How long the focused control stays highlighted
    pub highlight: Duration,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            poll_delay: Duration::from_millis(100),
            highlight: Duration::from_millis(2000),
        }
    }
}

/// The editing surface as seen by the coordinator.
pub trait ControlHost {
    fn is_mounted(&self, key: &ControlKey) -> bool;
    fn focus(&mut self, key: &ControlKey);
    fn scroll_into_view(&mut self, key: &ControlKey);
    fn set_highlight(&mut self, key: &ControlKey, on: bool);
}

/// Which parts of the editing panel are open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    panel_open: bool,
    expanded: BTreeSet<String>,
}

impl Expansion {
    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn is_expanded(&self, section_id: &str) -> bool {
        self.expanded.contains(section_id)
    }

    pub fn expanded_sections(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusState {
    Idle,
    AwaitingExpansion {
        address: FieldAddress,
        settle_at: Instant,
    },
    Polling {
        address: FieldAddress,
        attempts_left: u32,
        next_probe: Instant,
    },
    Focused {
        address: FieldAddress,
    },
}

/// How the most recent request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    Focused(FieldAddress),
    Dropped(FieldAddress),
    Cancelled(FieldAddress),
    Superseded(FieldAddress),
}

/// The request currently in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFocus {
    pub address: FieldAddress,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct FocusCoordinator {
    config: FocusConfig,
    state: FocusState,
    expansion: Expansion,
    highlight: Option<(ControlKey, Instant)>,
    generation: u64,
    last_outcome: Option<FocusOutcome>,
}

impl Default for FocusCoordinator {
    fn default() -> Self {
        Self::new(FocusConfig::default())
    }
}

impl FocusCoordinator {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            config,
            state: FocusState::Idle,
            expansion: Expansion::default(),
            highlight: None,
            generation: 0,
            last_outcome: None,
        }
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    pub fn last_outcome(&self) -> Option<&FocusOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn highlighted(&self) -> Option<&ControlKey> {
        self.highlight.as_ref().map(|(key, _)| key)
    }

    pub fn pending(&self) -> Option<PendingFocus> {
        match &self.state {
            FocusState::AwaitingExpansion { address, .. } | FocusState::Polling { address, .. } => {
                Some(PendingFocus {
                    address: address.clone(),
                    generation: self.generation,
                })
            }
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.pending().is_none()
    }

    pub fn open_panel(&mut self) {
        self.expansion.panel_open = true;
    }

    /// Close the panel, cancelling any pending request.
    pub fn close_panel(&mut self) {
        self.expansion.panel_open = false;
        self.cancel_pending();
    }

    pub fn expand_section(&mut self, section_id: &str) {
        self.expansion.expanded.insert(section_id.to_string());
    }

    /// Returns whether the section is expanded afterwards.
    pub fn toggle_section(&mut self, section_id: &str) -> bool {
        if self.expansion.expanded.remove(section_id) {
            false
        } else {
            self.expansion.expanded.insert(section_id.to_string());
            true
        }
    }

    /// Start a focus request, superseding any pending one.
    ///
    /// Opens the panel and expands the target section; the first probe
    /// happens once the host reports the render settled, or after one
    /// poll delay.
    pub fn activate(&mut self, address: FieldAddress, now: Instant) -> u64 {
        if let Some(pending) = self.pending() {
            tracing::debug!("Focus request for {} superseded by {}", pending.address, address);
            self.last_outcome = Some(FocusOutcome::Superseded(pending.address));
        }

        self.generation += 1;
        self.expansion.panel_open = true;
        self.expansion.expanded.insert(address.section_id.clone());
        self.state = FocusState::AwaitingExpansion {
            address,
            settle_at: now + self.config.poll_delay,
        };
        self.generation
    }

    /// The host finished rendering the expanded panel.
    pub fn render_settled(&mut self, now: Instant) {
        if let FocusState::AwaitingExpansion { address, .. } = &self.state {
            self.state = FocusState::Polling {
                address: address.clone(),
                attempts_left: self.config.max_attempts.max(1),
                next_probe: now,
            };
        }
    }

    /// Advance to `now`. Returns when the coordinator next needs a tick.
    pub fn tick<H: ControlHost + ?Sized>(&mut self, now: Instant, host: &mut H) -> Option<Instant> {
        if let Some((key, until)) = &self.highlight {
            if now >= *until {
                host.set_highlight(key, false);
                self.highlight = None;
                if matches!(self.state, FocusState::Focused { .. }) {
                    self.state = FocusState::Idle;
                }
            }
        }

        if let FocusState::AwaitingExpansion { settle_at, .. } = &self.state {
            if now >= *settle_at {
                self.render_settled(now);
            }
        }

        if let FocusState::Polling { next_probe, .. } = &self.state {
            if now >= *next_probe {
                self.probe(now, host);
            }
        }

        self.next_deadline()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let state_deadline = match &self.state {
            FocusState::AwaitingExpansion { settle_at, .. } => Some(*settle_at),
            FocusState::Polling { next_probe, .. } => Some(*next_probe),
            FocusState::Idle | FocusState::Focused { .. } => None,
        };
        let highlight_deadline = self.highlight.as_ref().map(|(_, until)| *until);

        match (state_deadline, highlight_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Editor closed: cancel everything. The host is gone, so the
    /// highlight is dropped without being cleared.
    pub fn shutdown(&mut self) {
        self.cancel_pending();
        self.expansion.panel_open = false;
        self.highlight = None;
        if matches!(self.state, FocusState::Focused { .. }) {
            self.state = FocusState::Idle;
        }
    }

    fn cancel_pending(&mut self) {
        match std::mem::replace(&mut self.state, FocusState::Idle) {
            FocusState::AwaitingExpansion { address, .. } | FocusState::Polling { address, .. } => {
                tracing::debug!("Cancelled focus request for {}", address);
                self.last_outcome = Some(FocusOutcome::Cancelled(address));
            }
            other => self.state = other,
        }
    }

    fn probe<H: ControlHost + ?Sized>(&mut self, now: Instant, host: &mut H) {
        let FocusState::Polling {
            address,
            attempts_left,
            ..
        } = std::mem::replace(&mut self.state, FocusState::Idle)
        else {
            return;
        };

        let key = address.control_key();
        if host.is_mounted(&key) {
            host.focus(&key);
            host.scroll_into_view(&key);
            if let Some((previous, _)) = self.highlight.take() {
                if previous != key {
                    host.set_highlight(&previous, false);
                }
            }
            host.set_highlight(&key, true);
            self.highlight = Some((key, now + self.config.highlight));

            tracing::debug!("Focused control for {}", address);
            self.last_outcome = Some(FocusOutcome::Focused(address.clone()));
            self.state = FocusState::Focused { address };
        } else if attempts_left > 1 {
            tracing::trace!("Control {} not mounted, {} attempts left", key, attempts_left - 1);
            self.state = FocusState::Polling {
                address,
                attempts_left: attempts_left - 1,
                next_probe: now + self.config.poll_delay,
            };
        } else {
            tracing::warn!("Control for {} never appeared, dropping focus request", address);
            self.last_outcome = Some(FocusOutcome::Dropped(address));
        }
    }
}

/// A control host without a UI: tracks mounted keys and what was done to
/// them.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    pub mounted: BTreeSet<ControlKey>,
    pub focused: Option<ControlKey>,
    pub highlighted: BTreeSet<ControlKey>,
    pub scrolled: Vec<ControlKey>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, key: ControlKey) {
        self.mounted.insert(key);
    }

    /// Replace the set of mounted controls, as after a re-render.
    pub fn remount(&mut self, keys: impl IntoIterator<Item = ControlKey>) {
        self.mounted = keys.into_iter().collect();
    }
}

impl ControlHost for HeadlessHost {
    fn is_mounted(&self, key: &ControlKey) -> bool {
        self.mounted.contains(key)
    }

    fn focus(&mut self, key: &ControlKey) {
        self.focused = Some(key.clone());
    }

    fn scroll_into_view(&mut self, key: &ControlKey) {
        self.scrolled.push(key.clone());
    }

    fn set_highlight(&mut self, key: &ControlKey, on: bool) {
        if on {
            self.highlighted.insert(key.clone());
        } else {
            self.highlighted.remove(key);
        }
    }
}
