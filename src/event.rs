//! Input event value type.

use crate::codes::{
    EV_ABS, EV_FF, EV_FF_STATUS, EV_KEY, EV_LED, EV_MSC, EV_PWR, EV_REL, EV_REP, EV_SND, EV_SW,
    EV_SYN, SYN_DROPPED, SYN_MT_REPORT, SYN_REPORT, event_type_name,
};
use std::fmt;
use std::time::SystemTime;

#[cfg(feature = "recorder")]
use serde::{Deserialize, Serialize};

/// Classification of a raw event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub enum EventKind {
    /// Synchronization markers (`EV_SYN`).
    Syn,
    /// Key and button transitions.
    Key,
    /// Relative axis motion.
    Rel,
    /// Absolute axis position.
    Abs,
    /// Miscellaneous data such as scan codes.
    Msc,
    /// Binary switches.
    Sw,
    /// LED state.
    Led,
    /// Sound output.
    Snd,
    /// Autorepeat parameters.
    Rep,
    /// Force feedback.
    Ff,
    /// Power management.
    Pwr,
    /// Force feedback status.
    FfStatus,
    /// Any other type value.
    Unknown(u16),
}

impl EventKind {
    /// Classify a raw type value.
    pub fn from_raw(event_type: u16) -> Self {
        match event_type {
            EV_SYN => EventKind::Syn,
            EV_KEY => EventKind::Key,
            EV_REL => EventKind::Rel,
            EV_ABS => EventKind::Abs,
            EV_MSC => EventKind::Msc,
            EV_SW => EventKind::Sw,
            EV_LED => EventKind::Led,
            EV_SND => EventKind::Snd,
            EV_REP => EventKind::Rep,
            EV_FF => EventKind::Ff,
            EV_PWR => EventKind::Pwr,
            EV_FF_STATUS => EventKind::FfStatus,
            other => EventKind::Unknown(other),
        }
    }

    /// The raw type value.
    pub fn raw(&self) -> u16 {
        match self {
            EventKind::Syn => EV_SYN,
            EventKind::Key => EV_KEY,
            EventKind::Rel => EV_REL,
            EventKind::Abs => EV_ABS,
            EventKind::Msc => EV_MSC,
            EventKind::Sw => EV_SW,
            EventKind::Led => EV_LED,
            EventKind::Snd => EV_SND,
            EventKind::Rep => EV_REP,
            EventKind::Ff => EV_FF,
            EventKind::Pwr => EV_PWR,
            EventKind::FfStatus => EV_FF_STATUS,
            EventKind::Unknown(raw) => *raw,
        }
    }

    /// Whether the source keeps per-code state for this kind.
    pub fn is_stateful(&self) -> bool {
        matches!(
            self,
            EventKind::Key | EventKind::Abs | EventKind::Led | EventKind::Snd | EventKind::Sw
        )
    }
}

/// One timestamped input notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct InputEvent {
    /// When the event entered the multiplexer.
    pub time: SystemTime,
    /// Raw event type (`EV_*`).
    pub event_type: u16,
    /// Type-specific code.
    pub code: u16,
    /// Type-specific value.
    pub value: i32,
}

impl InputEvent {
    /// Create an event stamped with the current time.
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self::at(SystemTime::now(), event_type, code, value)
    }

    /// Create an event with an explicit timestamp.
    pub fn at(time: SystemTime, event_type: u16, code: u16, value: i32) -> Self {
        Self {
            time,
            event_type,
            code,
            value,
        }
    }

    /// `(EV_SYN, SYN_REPORT, 1)`.
    pub fn sync_report(time: SystemTime) -> Self {
        Self::at(time, EV_SYN, SYN_REPORT, 1)
    }

    /// `(EV_SYN, SYN_MT_REPORT, 1)`.
    pub fn mt_report(time: SystemTime) -> Self {
        Self::at(time, EV_SYN, SYN_MT_REPORT, 1)
    }

    /// `(EV_SYN, SYN_DROPPED, 0)`.
    pub fn dropped(time: SystemTime) -> Self {
        Self::at(time, EV_SYN, SYN_DROPPED, 0)
    }

    /// Classified event type.
    pub fn kind(&self) -> EventKind {
        EventKind::from_raw(self.event_type)
    }

    /// The raw `(type, code, value)` triple.
    pub fn to_raw(&self) -> (u16, u16, i32) {
        (self.event_type, self.code, self.value)
    }

    /// Whether this is a `SYN_REPORT` marker.
    pub fn is_sync_report(&self) -> bool {
        self.event_type == EV_SYN && self.code == SYN_REPORT
    }

    /// Whether this is a `SYN_DROPPED` overflow marker.
    pub fn is_dropped(&self) -> bool {
        self.event_type == EV_SYN && self.code == SYN_DROPPED
    }
}

impl Default for InputEvent {
    fn default() -> Self {
        Self::at(SystemTime::UNIX_EPOCH, EV_SYN, SYN_REPORT, 0)
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={} ({}) code={} value={}",
            self.event_type,
            event_type_name(self.event_type),
            self.code,
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{KEY_A, SYN_CONFIG};

    #[test]
    fn test_kind_roundtrip() {
        for raw in 0..0x20 {
            assert_eq!(EventKind::from_raw(raw).raw(), raw);
        }
        assert_eq!(EventKind::from_raw(0x1f), EventKind::Unknown(0x1f));
    }

    #[test]
    fn test_markers() {
        let now = SystemTime::now();
        assert!(InputEvent::sync_report(now).is_sync_report());
        assert!(InputEvent::dropped(now).is_dropped());
        assert!(!InputEvent::mt_report(now).is_sync_report());
        assert!(!InputEvent::at(now, EV_SYN, SYN_CONFIG, 0).is_dropped());
        assert!(!InputEvent::at(now, EV_KEY, SYN_DROPPED, 0).is_dropped());
    }

    #[test]
    fn test_stateful_kinds() {
        assert!(EventKind::Key.is_stateful());
        assert!(EventKind::Abs.is_stateful());
        assert!(!EventKind::Rel.is_stateful());
        assert!(!EventKind::Syn.is_stateful());
    }

    #[test]
    fn test_display() {
        let event = InputEvent::new(EV_KEY, KEY_A, 1);
        assert_eq!(event.to_string(), "type=1 (EV_KEY) code=30 value=1");
        assert_eq!(event.to_raw(), (EV_KEY, KEY_A, 1));
    }
}
