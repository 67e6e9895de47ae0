use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::{Builder, Uuid};

/// A source of fresh object identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a new hyphenated, lowercase uuid.
    fn next_uuid(&self) -> String;
}

/// A source of export timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time as an RFC 3339 string with millisecond precision.
    fn now(&self) -> String;
}

/// Random version 4 uuids.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_uuid(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic, v4-shaped uuids drawn from a counter. Useful for reproducible exports.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_uuid(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Builder::from_random_bytes(u128::from(n).to_be_bytes())
            .into_uuid()
            .to_string()
    }
}

/// The wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        format_timestamp(Utc::now())
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> String {
        format_timestamp(self.0)
    }
}

fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The non-deterministic inputs of one export: identifiers and time.
#[derive(Clone)]
pub struct ExportContext {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl ExportContext {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { ids, clock }
    }

    pub fn next_uuid(&self) -> String {
        self.ids.next_uuid()
    }

    pub fn now(&self) -> String {
        self.clock.now()
    }

    /// Formats `<prefix>--<uuid>` with a fresh uuid.
    pub fn typed_id(&self, prefix: &str) -> String {
        format!("{}--{}", prefix, self.next_uuid())
    }
}

impl Default for ExportContext {
    fn default() -> Self {
        Self::new(Arc::new(RandomIds), Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for ExportContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportContext").finish_non_exhaustive()
    }
}
