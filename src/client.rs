//! Consumer sessions attached to a source.
//!
//! A [`Client`] owns a bounded [`EventQueue`] guarded by its own lock, so
//! delivering to one client never serializes against grab changes or reads
//! on another. Readers block on [`Client::wait_readable`] or, with the
//! `tokio` feature, await [`Client::readable`].

use crate::error::{Error, Result};
use crate::event::InputEvent;
use crate::methods::ClientNotify;
use crate::queue::{EventQueue, PushOutcome, QueueStats};
use crate::source::Source;
use crate::sync::{lock, read, write};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;

/// Process-unique client identifier.
pub type ClientId = u64;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// One consumer session with its own event queue.
pub struct Client {
    id: ClientId,
    source: Weak<Source>,
    queue: Mutex<EventQueue>,
    ready: Condvar,
    enabled: AtomicBool,
    attached: AtomicBool,
    notify: RwLock<Option<Arc<dyn ClientNotify>>>,
    #[cfg(feature = "tokio")]
    waker: tokio::sync::Notify,
}

impl Client {
    pub(crate) fn new(source: Weak<Source>, capacity: usize) -> Self {
        Self {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            source,
            queue: Mutex::new(EventQueue::with_capacity(capacity)),
            ready: Condvar::new(),
            enabled: AtomicBool::new(true),
            attached: AtomicBool::new(true),
            notify: RwLock::new(None),
            #[cfg(feature = "tokio")]
            waker: tokio::sync::Notify::new(),
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The source this client reads from, while it is alive.
    pub fn source(&self) -> Option<Arc<Source>> {
        self.source.upgrade()
    }

    /// False while another client holds the grab.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// False once the client has been disposed.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Install the callback run after every delivery to this client.
    pub fn set_notify<N: ClientNotify + 'static>(&self, notify: N) {
        *write(&self.notify) = Some(Arc::new(notify));
    }

    pub fn clear_notify(&self) {
        *write(&self.notify) = None;
    }

    /// Queue `event` unless the client is muted by another client's grab.
    ///
    /// Returns `None` when the event was dropped because the client is
    /// disabled. Waiters are woken in every other case, including overflow.
    pub(crate) fn push(&self, event: InputEvent) -> Option<PushOutcome> {
        if !self.is_enabled() {
            return None;
        }

        let outcome = lock(&self.queue).try_push(event);
        match outcome {
            PushOutcome::DropMarkerInserted => {
                log::debug!("client {}: buffer overflow, queued SYN_DROPPED", self.id)
            }
            PushOutcome::Coalesced => {
                log::debug!("client {}: buffer overflow, SYN_DROPPED pending", self.id)
            }
            PushOutcome::Inserted => {}
        }
        self.wake();
        Some(outcome)
    }

    /// Push `event` and then run the notify callback, if any.
    pub(crate) fn deliver(&self, event: InputEvent) {
        self.push(event);
        let notify = read(&self.notify).clone();
        if let Some(notify) = notify {
            notify.notify(self);
        }
    }

    /// Remove and return the oldest queued event.
    pub fn pop(&self) -> Option<InputEvent> {
        lock(&self.queue).pop()
    }

    /// Remove up to `max` events, oldest first.
    pub fn read(&self, max: usize) -> Vec<InputEvent> {
        lock(&self.queue).drain(max)
    }

    /// Copy of the queued events in order.
    pub fn snapshot(&self) -> Vec<InputEvent> {
        lock(&self.queue).snapshot()
    }

    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.queue).is_empty()
    }

    pub fn capacity(&self) -> usize {
        lock(&self.queue).capacity()
    }

    /// Overflow and insertion counters.
    pub fn stats(&self) -> QueueStats {
        lock(&self.queue).stats()
    }

    /// Discard everything queued.
    pub fn clear(&self) {
        lock(&self.queue).clear();
    }

    /// Drop every queued event of `event_type` (all types for `EV_CNT`) and
    /// any `SYN_REPORT` left directly behind another one. Returns how many
    /// events were removed.
    pub fn filter_queue(&self, event_type: u16) -> usize {
        let removed = lock(&self.queue).filter(event_type);
        log::debug!(
            "client {}: filtered {} events of type {:#x}",
            self.id,
            removed,
            event_type
        );
        removed
    }

    /// Render the queue contents with head and tail positions.
    pub fn dump_queue(&self) -> String {
        let source = self
            .source()
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        let dump = format!(
            "evdev client: {}\nevdev provider name: {}\nevent queue contents:\n{}",
            self.id,
            source,
            lock(&self.queue).dump()
        );
        log::debug!("{}", dump);
        dump
    }

    /// Block until an event is queued, the client is disposed, or `timeout`
    /// elapses. Returns whether events are available.
    pub fn wait_readable(&self, timeout: Option<Duration>) -> bool {
        let queue = lock(&self.queue);
        let pending = |q: &mut EventQueue| q.is_empty() && self.is_attached();
        let queue = match timeout {
            None => self
                .ready
                .wait_while(queue, pending)
                .unwrap_or_else(PoisonError::into_inner),
            Some(timeout) => {
                self.ready
                    .wait_timeout_while(queue, timeout, pending)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
        };
        !queue.is_empty()
    }

    /// Wait until an event is queued or the client is disposed. Returns
    /// whether events are available.
    #[cfg(feature = "tokio")]
    pub async fn readable(&self) -> bool {
        loop {
            let notified = self.waker.notified();
            if !self.is_empty() {
                return true;
            }
            if !self.is_attached() {
                return false;
            }
            notified.await;
        }
    }

    /// Take the exclusive grab on this client's source.
    pub fn grab(&self) -> Result<()> {
        self.source().ok_or(Error::Unregistered)?.grab(self)
    }

    /// Give up the exclusive grab.
    pub fn release(&self) -> Result<()> {
        self.source().ok_or(Error::Unregistered)?.release(self)
    }

    /// Detach from the source.
    pub fn dispose(&self) -> Result<()> {
        self.source().ok_or(Error::Unregistered)?.dispose_client(self)
    }

    /// Mark the client detached, free its events and wake every waiter.
    pub(crate) fn detach(&self) {
        {
            let mut queue = lock(&self.queue);
            self.attached.store(false, Ordering::Release);
            queue.clear();
        }
        self.clear_notify();
        self.wake();
    }

    fn wake(&self) {
        self.ready.notify_all();
        #[cfg(feature = "tokio")]
        self.waker.notify_waiters();
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("enabled", &self.is_enabled())
            .field("attached", &self.is_attached())
            .field("queued", &self.len())
            .finish()
    }
}
