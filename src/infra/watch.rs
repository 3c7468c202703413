use notify::event::EventKind;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{Receiver, channel};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Clone, Debug)]
pub enum WatchSignal {
    Changed,
    Error(String),
}

#[derive(Debug)]
pub struct TelemetryWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<WatchSignal>,
}

impl TelemetryWatcher {
    pub fn try_recv(&self) -> Option<WatchSignal> {
        self.rx.try_recv().ok()
    }
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error("no watchable roots exist")]
    NoRoots,
}

/// Watch the telemetry roots recursively. Roots that do not exist yet are
/// skipped; at least one must exist.
pub fn watch_telemetry_roots(roots: &[&Path]) -> Result<TelemetryWatcher, WatchError> {
    let (tx, rx) = channel::<WatchSignal>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if should_trigger_refresh(&event) {
                    let _ = tx.send(WatchSignal::Changed);
                }
            }
            Err(error) => {
                let _ = tx.send(WatchSignal::Error(error.to_string()));
            }
        },
        Config::default(),
    )?;

    let mut watched = 0usize;
    for root in roots {
        if root.exists() {
            watcher.watch(root, RecursiveMode::Recursive)?;
            watched += 1;
        }
    }
    if watched == 0 {
        return Err(WatchError::NoRoots);
    }

    Ok(TelemetryWatcher {
        _watcher: watcher,
        rx,
    })
}

fn should_trigger_refresh(event: &notify::Event) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    if event.paths.is_empty() {
        return true;
    }

    event.paths.iter().any(|path| {
        matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("jsonl") | Some("json")
        )
    })
}

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

/// Trailing-edge debounce over watch signals.
///
/// Every signal pushes the deadline out by the full window; `fire` reports
/// true exactly once per settled burst. Pure state over instants so the
/// host's event loop can poll it.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// True when a settled burst is pending and the window has elapsed.
    /// Clears the pending state.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_to_one_trailing_fire() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_secs(1));

        debounce.signal(start);
        debounce.signal(start + Duration::from_millis(200));

        // Inside the window of the last signal: nothing fires.
        assert!(!debounce.fire(start + Duration::from_millis(900)));
        // Trailing edge is measured from the last signal.
        assert!(debounce.fire(start + Duration::from_millis(1200)));
        // The burst is spent.
        assert!(!debounce.fire(start + Duration::from_secs(10)));
    }

    #[test]
    fn idle_debounce_never_fires() {
        let mut debounce = Debounce::new(DEFAULT_DEBOUNCE_WINDOW);
        assert!(!debounce.is_pending());
        assert!(!debounce.fire(Instant::now()));
    }

    #[test]
    fn new_signal_after_fire_rearms() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(100));

        debounce.signal(start);
        assert!(debounce.fire(start + Duration::from_millis(150)));

        debounce.signal(start + Duration::from_millis(200));
        assert!(debounce.is_pending());
        assert!(debounce.fire(start + Duration::from_millis(350)));
    }

    #[test]
    fn ignores_access_events_and_unrelated_extensions() {
        use notify::event::{AccessKind, CreateKind};

        let access = notify::Event {
            kind: EventKind::Access(AccessKind::Any),
            paths: vec!["/tmp/x.jsonl".into()],
            attrs: Default::default(),
        };
        assert!(!should_trigger_refresh(&access));

        let unrelated = notify::Event {
            kind: EventKind::Create(CreateKind::File),
            paths: vec!["/tmp/x.tmp".into()],
            attrs: Default::default(),
        };
        assert!(!should_trigger_refresh(&unrelated));

        let index = notify::Event {
            kind: EventKind::Create(CreateKind::File),
            paths: vec!["/tmp/sessions-index.json".into()],
            attrs: Default::default(),
        };
        assert!(should_trigger_refresh(&index));
    }
}
