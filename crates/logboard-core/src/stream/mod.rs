//! Bounded live-log stream store.
//!
//! Holds the most recent records of each log kind, newest first, and notifies
//! listeners synchronously on every change. Listeners run after the buffer
//! lock is released, so they may read the store from inside the callback.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::domain::{LogKind, LogRecord};
use crate::events::BoardEvent;

/// Records kept per kind unless configured otherwise.
pub const DEFAULT_STREAM_CAPACITY: usize = 50;

type Listener = Arc<dyn Fn(&BoardEvent) + Send + Sync>;

/// Counters for buffer monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMetrics {
    pub total_appended: u64,
    pub total_evicted: u64,
    pub app_len: usize,
    pub web_len: usize,
    pub capacity: usize,
    pub listeners: usize,
}

#[derive(Debug, Default)]
struct Buffers {
    app: VecDeque<LogRecord>,
    web: VecDeque<LogRecord>,
}

impl Buffers {
    const fn get(&self, kind: LogKind) -> &VecDeque<LogRecord> {
        match kind {
            LogKind::App => &self.app,
            LogKind::Web => &self.web,
        }
    }

    const fn get_mut(&mut self, kind: LogKind) -> &mut VecDeque<LogRecord> {
        match kind {
            LogKind::App => &mut self.app,
            LogKind::Web => &mut self.web,
        }
    }
}

struct Inner {
    capacity: usize,
    buffers: RwLock<Buffers>,
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_listener_id: AtomicU64,
    total_appended: AtomicU64,
    total_evicted: AtomicU64,
}

/// Shared handle to the two bounded buffers.
///
/// Cloning is cheap; all clones address the same buffers.
#[derive(Clone)]
pub struct LogStreamStore {
    inner: Arc<Inner>,
}

impl LogStreamStore {
    /// Create a store keeping at most `capacity` records per kind.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Inner {
                capacity,
                buffers: RwLock::new(Buffers {
                    app: VecDeque::with_capacity(capacity + 1),
                    web: VecDeque::with_capacity(capacity + 1),
                }),
                listeners: Mutex::new(BTreeMap::new()),
                next_listener_id: AtomicU64::new(0),
                total_appended: AtomicU64::new(0),
                total_evicted: AtomicU64::new(0),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Prepend a record to its kind's buffer, evicting the oldest at capacity.
    ///
    /// Every listener has been called by the time this returns.
    pub fn append(&self, record: impl Into<LogRecord>) {
        let record = record.into();
        let kind = record.kind();

        let evicted = {
            let mut buffers = self.write_buffers();
            let buffer = buffers.get_mut(kind);
            buffer.push_front(record);
            let mut evicted = 0;
            while buffer.len() > self.inner.capacity {
                buffer.pop_back();
                evicted += 1;
            }
            evicted
        };

        self.inner.total_appended.fetch_add(1, Ordering::Relaxed);
        if evicted > 0 {
            self.inner
                .total_evicted
                .fetch_add(evicted, Ordering::Relaxed);
            trace!(%kind, evicted, "Evicted oldest records");
        }

        self.notify(&BoardEvent::RecordAppended { kind });
    }

    /// Decode a raw ingestion payload and append it.
    pub fn append_raw(&self, kind: LogKind, raw: &Value) {
        self.append(LogRecord::from_json(kind, raw));
    }

    /// Snapshot of a kind's buffer, newest first.
    pub fn read_all(&self, kind: LogKind) -> Vec<LogRecord> {
        self.read_buffers().get(kind).iter().cloned().collect()
    }

    pub fn len(&self, kind: LogKind) -> usize {
        self.read_buffers().get(kind).len()
    }

    pub fn is_empty(&self, kind: LogKind) -> bool {
        self.len(kind) == 0
    }

    /// Clear both buffers (logout / board switch).
    pub fn reset(&self) {
        {
            let mut buffers = self.write_buffers();
            buffers.app.clear();
            buffers.web.clear();
        }
        self.notify(&BoardEvent::StreamReset);
    }

    /// Register a listener called synchronously on every append and reset.
    ///
    /// The listener stays registered until the returned guard is dropped.
    pub fn subscribe<F>(&self, listener: F) -> StreamSubscription
    where
        F: Fn(&BoardEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));

        StreamSubscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Current counters.
    pub fn metrics(&self) -> StreamMetrics {
        let buffers = self.read_buffers();
        StreamMetrics {
            total_appended: self.inner.total_appended.load(Ordering::Relaxed),
            total_evicted: self.inner.total_evicted.load(Ordering::Relaxed),
            app_len: buffers.app.len(),
            web_len: buffers.web.len(),
            capacity: self.inner.capacity,
            listeners: self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        }
    }

    fn notify(&self, event: &BoardEvent) {
        // Snapshot so listeners can (un)subscribe from inside the callback
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    fn read_buffers(&self) -> std::sync::RwLockReadGuard<'_, Buffers> {
        self.inner
            .buffers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_buffers(&self) -> std::sync::RwLockWriteGuard<'_, Buffers> {
        self.inner
            .buffers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogStreamStore {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_CAPACITY)
    }
}

/// Registration guard returned by [`LogStreamStore::subscribe`].
///
/// Dropping it removes the listener.
#[must_use = "dropping the subscription unregisters the listener"]
pub struct StreamSubscription {
    id: u64,
    inner: Weak<Inner>,
}

impl StreamSubscription {
    /// Remove the listener now.
    pub fn unsubscribe(self) {}
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}
