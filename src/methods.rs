//! Driver hooks and client notification callbacks.

use crate::client::Client;
use crate::error::Result;
use crate::source::Source;

/// Hooks a hardware driver supplies for its source.
///
/// Every method has a no-op default, so a driver implements only the hooks
/// it needs.
///
/// # Example
///
/// ```
/// use evmux::{DeviceMethods, Result, Source};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Sampler {
///     powered: AtomicBool,
/// }
///
/// impl DeviceMethods for Sampler {
///     fn open(&self, _source: &Source) -> Result<()> {
///         self.powered.store(true, Ordering::SeqCst);
///         Ok(())
///     }
///
///     fn close(&self, _source: &Source) {
///         self.powered.store(false, Ordering::SeqCst);
///     }
/// }
/// ```
pub trait DeviceMethods: Send + Sync {
    /// Called when the first client attaches. An error aborts that client's
    /// registration.
    fn open(&self, _source: &Source) -> Result<()> {
        Ok(())
    }

    /// Called when the last client is disposed.
    fn close(&self, _source: &Source) {}

    /// Receives events injected from the consumer side (LED changes, bell
    /// requests and the like).
    fn event(&self, _source: &Source, _event_type: u16, _code: u16, _value: i32) {}
}

/// Callback invoked after every event delivered to a client.
///
/// Runs on the producer's thread while the source's fan-out lock is held, so
/// it must not push into the same source. Querying the source's state and
/// draining the client are fine.
pub trait ClientNotify: Send + Sync {
    fn notify(&self, client: &Client);
}

/// Implement ClientNotify for closures.
impl<F> ClientNotify for F
where
    F: Fn(&Client) + Send + Sync,
{
    fn notify(&self, client: &Client) {
        self(client);
    }
}
