//! Event type and code constants.
//!
//! Values follow the Linux/BSD `input-event-codes.h` numbering so that raw
//! codes produced by real drivers can be pushed unchanged. Only the category
//! maxima are load-bearing for the core; the individual codes are provided
//! for drivers and tests.

use std::fmt;

// Event types
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const EV_SW: u16 = 0x05;
pub const EV_LED: u16 = 0x11;
pub const EV_SND: u16 = 0x12;
pub const EV_REP: u16 = 0x14;
pub const EV_FF: u16 = 0x15;
pub const EV_PWR: u16 = 0x16;
pub const EV_FF_STATUS: u16 = 0x17;
pub const EV_MAX: u16 = 0x1f;
pub const EV_CNT: u16 = EV_MAX + 1;

// Synchronization events
pub const SYN_REPORT: u16 = 0;
pub const SYN_CONFIG: u16 = 1;
pub const SYN_MT_REPORT: u16 = 2;
pub const SYN_DROPPED: u16 = 3;
pub const SYN_MAX: u16 = 0x0f;
pub const SYN_CNT: u16 = SYN_MAX + 1;

// Keys and buttons (subset)
pub const KEY_RESERVED: u16 = 0;
pub const KEY_ESC: u16 = 1;
pub const KEY_1: u16 = 2;
pub const KEY_Q: u16 = 16;
pub const KEY_W: u16 = 17;
pub const KEY_A: u16 = 30;
pub const KEY_S: u16 = 31;
pub const KEY_LEFTSHIFT: u16 = 42;
pub const KEY_CAPSLOCK: u16 = 58;
pub const KEY_NUMLOCK: u16 = 69;
pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;
pub const BTN_MIDDLE: u16 = 0x112;
pub const BTN_TOUCH: u16 = 0x14a;
pub const KEY_MAX: u16 = 0x2ff;
pub const KEY_CNT: u16 = KEY_MAX + 1;

// Relative axes
pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_HWHEEL: u16 = 0x06;
pub const REL_WHEEL: u16 = 0x08;
pub const REL_MAX: u16 = 0x0f;
pub const REL_CNT: u16 = REL_MAX + 1;

// Absolute axes
pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_PRESSURE: u16 = 0x18;
pub const ABS_MT_SLOT: u16 = 0x2f;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;
pub const ABS_MAX: u16 = 0x3f;
pub const ABS_CNT: u16 = ABS_MAX + 1;

// Misc events
pub const MSC_SERIAL: u16 = 0x00;
pub const MSC_SCAN: u16 = 0x04;
pub const MSC_TIMESTAMP: u16 = 0x05;
pub const MSC_MAX: u16 = 0x07;
pub const MSC_CNT: u16 = MSC_MAX + 1;

// Switches
pub const SW_LID: u16 = 0x00;
pub const SW_TABLET_MODE: u16 = 0x01;
pub const SW_HEADPHONE_INSERT: u16 = 0x02;
pub const SW_MAX: u16 = 0x10;
pub const SW_CNT: u16 = SW_MAX + 1;

// LEDs
pub const LED_NUML: u16 = 0x00;
pub const LED_CAPSL: u16 = 0x01;
pub const LED_SCROLLL: u16 = 0x02;
pub const LED_MAX: u16 = 0x0f;
pub const LED_CNT: u16 = LED_MAX + 1;

// Sounds
pub const SND_CLICK: u16 = 0x00;
pub const SND_BELL: u16 = 0x01;
pub const SND_TONE: u16 = 0x02;
pub const SND_MAX: u16 = 0x07;
pub const SND_CNT: u16 = SND_MAX + 1;

// Autorepeat values
pub const REP_DELAY: u16 = 0x00;
pub const REP_PERIOD: u16 = 0x01;
pub const REP_MAX: u16 = 0x01;
pub const REP_CNT: u16 = REP_MAX + 1;

// Device properties
pub const INPUT_PROP_POINTER: u16 = 0x00;
pub const INPUT_PROP_DIRECT: u16 = 0x01;
pub const INPUT_PROP_BUTTONPAD: u16 = 0x02;
pub const INPUT_PROP_MAX: u16 = 0x1f;
pub const INPUT_PROP_CNT: u16 = INPUT_PROP_MAX + 1;

// Bus types
pub const BUS_PCI: u16 = 0x01;
pub const BUS_USB: u16 = 0x03;
pub const BUS_VIRTUAL: u16 = 0x06;
pub const BUS_I8042: u16 = 0x11;
pub const BUS_HOST: u16 = 0x19;

/// A family of codes sharing one maximum.
///
/// Capability bitmaps, state bitmaps and push validation are all keyed by
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Event types themselves (`EV_*`).
    Type,
    Syn,
    Key,
    Rel,
    Abs,
    Msc,
    Sw,
    Led,
    Snd,
    Rep,
    /// Input device properties (`INPUT_PROP_*`).
    Prop,
}

impl Category {
    /// Exclusive upper bound for codes in this category.
    pub const fn limit(self) -> u16 {
        match self {
            Category::Type => EV_CNT,
            Category::Syn => SYN_CNT,
            Category::Key => KEY_CNT,
            Category::Rel => REL_CNT,
            Category::Abs => ABS_CNT,
            Category::Msc => MSC_CNT,
            Category::Sw => SW_CNT,
            Category::Led => LED_CNT,
            Category::Snd => SND_CNT,
            Category::Rep => REP_CNT,
            Category::Prop => INPUT_PROP_CNT,
        }
    }

    /// Whether `code` is below this category's maximum.
    #[inline]
    pub const fn contains(self, code: u16) -> bool {
        code < self.limit()
    }

    /// The category whose codes an event of type `event_type` carries,
    /// restricted to the types accepted by the push path.
    pub const fn for_pushed_type(event_type: u16) -> Option<Category> {
        match event_type {
            EV_SYN => Some(Category::Syn),
            EV_KEY => Some(Category::Key),
            EV_REL => Some(Category::Rel),
            EV_ABS => Some(Category::Abs),
            EV_MSC => Some(Category::Msc),
            EV_SW => Some(Category::Sw),
            EV_LED => Some(Category::Led),
            EV_SND => Some(Category::Snd),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Category::Type => "event type",
            Category::Syn => "syn",
            Category::Key => "key",
            Category::Rel => "rel",
            Category::Abs => "abs",
            Category::Msc => "msc",
            Category::Sw => "sw",
            Category::Led => "led",
            Category::Snd => "snd",
            Category::Rep => "rep",
            Category::Prop => "prop",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Short symbolic name for an event type, used in queue dumps.
pub fn event_type_name(event_type: u16) -> &'static str {
    match event_type {
        EV_SYN => "EV_SYN",
        EV_KEY => "EV_KEY",
        EV_REL => "EV_REL",
        EV_ABS => "EV_ABS",
        EV_MSC => "EV_MSC",
        EV_SW => "EV_SW",
        EV_LED => "EV_LED",
        EV_SND => "EV_SND",
        EV_REP => "EV_REP",
        EV_FF => "EV_FF",
        EV_PWR => "EV_PWR",
        EV_FF_STATUS => "EV_FF_STATUS",
        _ => "EV_UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_match_header_values() {
        assert_eq!(Category::Type.limit(), 0x20);
        assert_eq!(Category::Key.limit(), 0x300);
        assert_eq!(Category::Abs.limit(), 0x40);
        assert_eq!(Category::Sw.limit(), 0x11);
        assert_eq!(Category::Prop.limit(), 0x20);
    }

    #[test]
    fn test_pushed_types() {
        assert_eq!(Category::for_pushed_type(EV_KEY), Some(Category::Key));
        assert_eq!(Category::for_pushed_type(EV_SYN), Some(Category::Syn));
        assert_eq!(Category::for_pushed_type(EV_REP), None);
        assert_eq!(Category::for_pushed_type(EV_FF), None);
        assert_eq!(Category::for_pushed_type(EV_CNT), None);
    }

    #[test]
    fn test_contains_is_exclusive() {
        assert!(Category::Led.contains(LED_MAX));
        assert!(!Category::Led.contains(LED_CNT));
    }
}
