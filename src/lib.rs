//! # evmux
//!
//! An input event multiplexer in the style of evdev: drivers describe a
//! device once, register it, and push events; every consumer session gets
//! its own bounded queue.
//!
//! ## Features
//!
//! - Capability bitmaps per event category, frozen at registration
//! - Key/LED/sound/switch state and absolute axis tracking
//! - Per-client ring buffers that collapse overflow into a single
//!   `SYN_DROPPED` marker instead of blocking the producer
//! - Exclusive grab, queue filtering and queue dumps
//! - Blocking and (with the `tokio` feature) async readers
//! - Trace recording and replay (with the `recorder` feature)
//!
//! ## Quick Start
//!
//! ```
//! use evmux::codes::{EV_KEY, EV_SYN, KEY_A};
//! use evmux::{NodeRegistry, SourceBuilder};
//! use std::sync::Arc;
//!
//! let mut builder = SourceBuilder::new("example keyboard");
//! builder.support_event(EV_SYN).unwrap();
//! builder.support_event(EV_KEY).unwrap();
//! builder.support_key(KEY_A).unwrap();
//!
//! let source = builder.register(Arc::new(NodeRegistry::new())).unwrap();
//! let client = source.register_client().unwrap();
//!
//! source.push_event(EV_KEY, KEY_A, 1).unwrap();
//! source.sync().unwrap();
//!
//! assert!(source.key_state(KEY_A));
//! for event in client.read(usize::MAX) {
//!     println!("{}", event);
//! }
//!
//! client.dispose().unwrap();
//! source.unregister().unwrap();
//! ```
//!
//! ### Exclusive Access
//!
//! ```
//! use evmux::codes::{EV_REL, REL_X};
//! use evmux::{Error, NodeRegistry, SourceBuilder};
//! use std::sync::Arc;
//!
//! let source = SourceBuilder::new("mouse")
//!     .register(Arc::new(NodeRegistry::new()))
//!     .unwrap();
//! let owner = source.register_client().unwrap();
//! let other = source.register_client().unwrap();
//!
//! owner.grab().unwrap();
//! assert!(matches!(other.grab(), Err(Error::Busy)));
//!
//! source.push_event(EV_REL, REL_X, 5).unwrap();
//! assert_eq!(owner.len(), 1);
//! assert!(other.is_empty());
//!
//! owner.release().unwrap();
//! ```
//!
//! ## Architecture
//!
//! A [`Source`] holds its device state behind one lock that `push_event`
//! keeps across the state update and the fan-out, so concurrent producers
//! are serialized and every [`Client`] sees the same order. Each client's
//! queue has its own lock; readers never block producers for longer than a
//! single queue operation.

pub mod bitset;
pub mod bus;
pub mod caps;
pub mod client;
pub mod codes;
pub mod error;
pub mod event;
pub mod methods;
pub mod node;
pub mod queue;
pub mod reader;
#[cfg(feature = "recorder")]
pub mod recorder;
pub mod source;
pub mod state;

mod sync;

// Re-exports
pub use bitset::BitSet;
pub use bus::{AttachInfo, BusId, ParentBus};
pub use caps::{Capabilities, RepeatConfig, RepeatMode};
pub use client::{Client, ClientId};
pub use codes::Category;
pub use error::{Error, Result};
pub use event::{EventKind, InputEvent};
pub use methods::{ClientNotify, DeviceMethods};
pub use node::{DeviceNode, NodeProvider, NodeRegistry};
pub use queue::{EventQueue, PushOutcome, QueueStats};
pub use reader::ClientReader;
#[cfg(feature = "recorder")]
pub use recorder::{EventRecorder, RecordedEvent, Recording};
pub use source::{Source, SourceBuilder};
pub use state::{AbsInfo, DeviceState};
