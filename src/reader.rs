//! RAII reader over a client session.
//!
//! A [`ClientReader`] attaches a client on creation and disposes it when
//! dropped, so a consumer cannot leak a session (or a grab) on an early
//! return.
//!
//! # Example
//!
//! ```
//! use evmux::codes::{EV_KEY, KEY_A};
//! use evmux::{ClientReader, NodeRegistry, SourceBuilder};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let mut builder = SourceBuilder::new("keyboard");
//! builder.support_event(EV_KEY).unwrap();
//! builder.support_key(KEY_A).unwrap();
//! let source = builder.register(Arc::new(NodeRegistry::new())).unwrap();
//!
//! let reader = ClientReader::open(&source).unwrap();
//! source.push_event(EV_KEY, KEY_A, 1).unwrap();
//! source.sync().unwrap();
//!
//! while let Some(event) = reader.recv_timeout(Duration::from_millis(10)) {
//!     println!("{}", event);
//! }
//! ```

use crate::client::Client;
use crate::error::Result;
use crate::event::InputEvent;
use crate::source::Source;
use std::sync::Arc;
use std::time::Duration;

/// Owns a client for as long as it lives.
pub struct ClientReader {
    client: Arc<Client>,
    closed: bool,
}

impl ClientReader {
    /// Attach a client with the source's default queue size.
    pub fn open(source: &Arc<Source>) -> Result<Self> {
        Ok(Self::from_client(source.register_client()?))
    }

    /// Attach a client whose queue holds `capacity` events.
    pub fn with_capacity(source: &Arc<Source>, capacity: usize) -> Result<Self> {
        Ok(Self::from_client(
            source.register_client_with_capacity(capacity)?,
        ))
    }

    fn from_client(client: Arc<Client>) -> Self {
        Self {
            client,
            closed: false,
        }
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Take the oldest queued event without blocking.
    pub fn try_recv(&self) -> Option<InputEvent> {
        self.client.pop()
    }

    /// Wait up to `timeout` for an event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<InputEvent> {
        if self.client.wait_readable(Some(timeout)) {
            self.client.pop()
        } else {
            None
        }
    }

    /// Block until an event arrives. Returns `None` once the client has been
    /// disposed and its queue is empty.
    pub fn recv(&self) -> Option<InputEvent> {
        loop {
            if let Some(event) = self.client.pop() {
                return Some(event);
            }
            if !self.client.wait_readable(None) {
                return None;
            }
        }
    }

    /// Blocking iterator over incoming events, ending when the client is
    /// disposed.
    pub fn iter(&self) -> impl Iterator<Item = InputEvent> + '_ {
        std::iter::from_fn(move || self.recv())
    }

    /// Await the next event. Returns `None` once the client has been
    /// disposed and its queue is empty.
    #[cfg(feature = "tokio")]
    pub async fn recv_async(&self) -> Option<InputEvent> {
        loop {
            if let Some(event) = self.client.pop() {
                return Some(event);
            }
            if !self.client.readable().await {
                return None;
            }
        }
    }

    /// Take the exclusive grab on the source.
    pub fn grab(&self) -> Result<()> {
        self.client.grab()
    }

    /// Give up the exclusive grab.
    pub fn release(&self) -> Result<()> {
        self.client.release()
    }

    /// Dispose the client now instead of on drop.
    pub fn close(mut self) -> Result<()> {
        self.close_inner()
    }

    fn close_inner(&mut self) -> Result<()> {
        if std::mem::replace(&mut self.closed, true) || !self.client.is_attached() {
            return Ok(());
        }

        // A source that is already gone has nothing left to detach from.
        match self.client.source() {
            Some(source) => source.dispose_client(&self.client),
            None => Ok(()),
        }
    }
}

impl Drop for ClientReader {
    fn drop(&mut self) {
        if let Err(e) = self.close_inner() {
            log::warn!("client {}: dispose on drop failed: {}", self.client.id(), e);
        }
    }
}

impl std::fmt::Debug for ClientReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientReader")
            .field("client", &self.client)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{EV_KEY, EV_REL, KEY_A, REL_X, SYN_REPORT};
    use crate::node::NodeRegistry;
    use crate::source::SourceBuilder;
    use std::thread;

    fn source() -> Arc<Source> {
        SourceBuilder::new("reader test")
            .register(Arc::new(NodeRegistry::new()))
            .unwrap()
    }

    #[test]
    fn test_drop_disposes_client() {
        let source = source();
        {
            let reader = ClientReader::open(&source).unwrap();
            assert_eq!(source.client_count(), 1);
            assert!(reader.client().is_attached());
        }
        assert_eq!(source.client_count(), 0);
    }

    #[test]
    fn test_drop_releases_grab() {
        let source = source();
        let other = source.register_client().unwrap();
        {
            let reader = ClientReader::open(&source).unwrap();
            reader.grab().unwrap();
            assert!(!other.is_enabled());
        }
        assert!(!source.is_grabbed());
        assert!(other.is_enabled());
    }

    #[test]
    fn test_close_is_explicit_dispose() {
        let source = source();
        let reader = ClientReader::with_capacity(&source, 4).unwrap();
        let client = reader.client().clone();
        reader.close().unwrap();
        assert!(!client.is_attached());
        assert_eq!(source.client_count(), 0);
    }

    #[test]
    fn test_try_recv_in_order() {
        let source = source();
        let reader = ClientReader::open(&source).unwrap();
        assert!(reader.try_recv().is_none());

        source.push_event(EV_KEY, KEY_A, 1).unwrap();
        source.sync().unwrap();
        assert_eq!(reader.try_recv().unwrap().to_raw(), (EV_KEY, KEY_A, 1));
        assert_eq!(reader.try_recv().unwrap().code, SYN_REPORT);
        assert!(reader.try_recv().is_none());
    }

    #[test]
    fn test_recv_timeout_expires() {
        let source = source();
        let reader = ClientReader::open(&source).unwrap();
        assert!(reader.recv_timeout(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn test_recv_blocks_until_push() {
        let source = source();
        let reader = ClientReader::open(&source).unwrap();

        let producer = source.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.push_event(EV_REL, REL_X, 7).unwrap();
        });

        let event = reader.recv().unwrap();
        assert_eq!(event.to_raw(), (EV_REL, REL_X, 7));
        handle.join().unwrap();
    }

    #[test]
    fn test_iter_ends_on_dispose() {
        let source = source();
        let reader = ClientReader::open(&source).unwrap();
        for v in 0..3 {
            source.push_event(EV_REL, REL_X, v).unwrap();
        }
        let events: Vec<_> = reader.iter().take(3).map(|e| e.value).collect();
        assert_eq!(events, vec![0, 1, 2]);

        let client = reader.client().clone();
        let disposer = source.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            disposer.dispose_client(&client).unwrap();
        });
        assert_eq!(reader.iter().count(), 0);
        handle.join().unwrap();
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn test_recv_async() {
        let source = source();
        let reader = ClientReader::open(&source).unwrap();

        let producer = source.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.push_event(EV_KEY, KEY_A, 1).unwrap();
        });

        let event = reader.recv_async().await.unwrap();
        assert_eq!(event.to_raw(), (EV_KEY, KEY_A, 1));
    }
}
