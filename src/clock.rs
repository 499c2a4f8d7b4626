use std::sync::Arc;
use std::sync::atomic::{ AtomicU64, Ordering };
use std::time::{ Duration, SystemTime, UNIX_EPOCH };

/// Source of wall clock readings for the switch gate.
pub trait Clock: Send {
    /// Time elapsed since a fixed epoch.
    fn now(&self) -> Duration;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ManualClock {
    pub fn new(start: Duration) -> ManualClock {
        ManualClock { millis: Arc::new(AtomicU64::new(as_millis(start))) }
    }

    /// Saturates at the largest representable time.
    pub fn advance(&self, by: Duration) {
        let by = as_millis(by);
        let _ = self.millis.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |millis| Some(millis.saturating_add(by)));
    }

    pub fn set(&self, to: Duration) {
        self.millis.store(as_millis(to), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
