//! Event recording and replay.
//!
//! An [`EventRecorder`] attaches a client to a source and captures everything
//! it receives with timestamps relative to the start of the recording.
//! Recordings are saved as JSON and can be replayed into any source, which
//! is handy for reproducing device traces in tests.
//!
//! # Example
//!
//! ```no_run
//! use evmux::recorder::{EventRecorder, Recording};
//! use evmux::{NodeRegistry, SourceBuilder};
//! use std::sync::Arc;
//!
//! let nodes = Arc::new(NodeRegistry::new());
//! let source = SourceBuilder::new("keyboard").register(nodes.clone()).unwrap();
//!
//! let mut recorder = EventRecorder::new();
//! recorder.start(&source).unwrap();
//!
//! // ... the driver pushes events ...
//!
//! let recording = recorder.stop().unwrap();
//! recording.save("trace.json").unwrap();
//!
//! // Replay later into another device
//! let target = SourceBuilder::new("replay").register(nodes).unwrap();
//! Recording::load("trace.json").unwrap().replay(&target).unwrap();
//! ```

use crate::client::Client;
use crate::error::{Error, Result};
use crate::event::InputEvent;
use crate::source::Source;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

/// A recorded event with its timestamp relative to recording start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Time elapsed since recording start.
    pub elapsed: Duration,
    /// The event as delivered.
    pub event: InputEvent,
}

/// A captured event trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Recorded events, oldest first.
    pub events: Vec<RecordedEvent>,
    /// When the recording was created.
    pub created_at: SystemTime,
    /// Name of the source the trace was captured from.
    pub source_name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

impl Recording {
    /// Create a new empty recording.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            created_at: SystemTime::now(),
            source_name: None,
            description: None,
        }
    }

    /// Set a description for this recording.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Offset of the last event.
    pub fn duration(&self) -> Duration {
        self.events
            .last()
            .map(|e| e.elapsed)
            .unwrap_or(Duration::ZERO)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of `SYN_DROPPED` markers captured, i.e. how often the
    /// recording client overflowed.
    pub fn dropped_count(&self) -> usize {
        self.events.iter().filter(|e| e.event.is_dropped()).count()
    }

    /// Save the recording to a file (JSON format).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("failed to serialize recording: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a recording from a file (JSON format).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Serialization(format!("failed to deserialize recording: {}", e)))
    }

    /// Push every event into `source` with its original spacing.
    pub fn replay(&self, source: &Source) -> Result<()> {
        self.replay_with_speed(source, 1.0)
    }

    /// Replay with a speed multiplier (2.0 is twice as fast).
    ///
    /// Overflow markers are skipped; the target produces its own if its
    /// clients cannot keep up.
    pub fn replay_with_speed(&self, source: &Source, speed: f64) -> Result<()> {
        if speed <= 0.0 || !speed.is_finite() {
            return Err(Error::Other("replay speed must be positive".into()));
        }

        let start = Instant::now();
        for recorded in self.events.iter().filter(|e| !e.event.is_dropped()) {
            let target = Duration::from_secs_f64(recorded.elapsed.as_secs_f64() / speed);
            let elapsed = start.elapsed();
            if target > elapsed {
                std::thread::sleep(target - elapsed);
            }
            push(source, &recorded.event)?;
        }
        log::debug!(
            "replayed {} events into '{}' at {}x",
            self.event_count(),
            source.name(),
            speed
        );
        Ok(())
    }

    /// Replay without timing (as fast as possible).
    pub fn replay_fast(&self, source: &Source) -> Result<()> {
        self.events
            .iter()
            .filter(|e| !e.event.is_dropped())
            .try_for_each(|e| push(source, &e.event))
    }
}

fn push(source: &Source, event: &InputEvent) -> Result<()> {
    source.push_event(event.event_type, event.code, event.value)
}

impl Default for Recording {
    fn default() -> Self {
        Self::new()
    }
}

/// Captures the events a source delivers.
pub struct EventRecorder {
    recording: Arc<Mutex<Option<Recording>>>,
    client: Option<Arc<Client>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self {
            recording: Arc::new(Mutex::new(None)),
            client: None,
        }
    }

    /// Attach a client to `source` and start capturing.
    ///
    /// The client's queue is drained into the recording after every
    /// delivery, so it only overflows if the recording lock is contended.
    pub fn start(&mut self, source: &Arc<Source>) -> Result<()> {
        if self.client.is_some() {
            return Err(Error::AlreadyRunning);
        }

        {
            let mut rec = self
                .recording
                .lock()
                .map_err(|_| Error::ThreadError("recording mutex poisoned".into()))?;
            let mut recording = Recording::new();
            recording.source_name = Some(source.name().to_string());
            *rec = Some(recording);
        }

        let started = SystemTime::now();
        let recording = self.recording.clone();
        let client = source.register_client()?;
        client.set_notify(move |c: &Client| {
            let events = c.read(usize::MAX);
            if let Ok(mut r) = recording.lock()
                && let Some(rec) = r.as_mut()
            {
                rec.events.extend(events.into_iter().map(|event| RecordedEvent {
                    elapsed: event.time.duration_since(started).unwrap_or_default(),
                    event,
                }));
            }
        });

        log::debug!(
            "recording '{}' through client {}",
            source.name(),
            client.id()
        );
        self.client = Some(client);
        Ok(())
    }

    /// Stop capturing, detach the client and return the recording.
    pub fn stop(&mut self) -> Result<Recording> {
        let client = self.client.take().ok_or(Error::NotRunning)?;
        client.clear_notify();
        if let Some(source) = client.source() {
            source.dispose_client(&client)?;
        }

        let mut rec = self
            .recording
            .lock()
            .map_err(|_| Error::ThreadError("recording mutex poisoned".into()))?;
        rec.take()
            .ok_or_else(|| Error::Other("no recording available".into()))
    }

    /// Check if currently recording.
    pub fn is_recording(&self) -> bool {
        self.client.is_some()
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventRecorder {
    fn drop(&mut self) {
        if self.client.is_some() {
            let _ = self.stop();
        }
    }
}
