//! Capability bitmaps and autorepeat configuration.

use crate::bitset::BitSet;
use crate::codes::Category;
use crate::error::{Error, Result};

/// Default delay before autorepeat starts, in milliseconds.
pub const DEFAULT_REPEAT_DELAY_MS: u32 = 300;
/// Default autorepeat period, in milliseconds.
pub const DEFAULT_REPEAT_PERIOD_MS: u32 = 50;

/// What a device can report, one bitmap per category.
///
/// Categories without a capability bitmap (`Syn`, `Rep`) are never
/// supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    types: BitSet,
    keys: BitSet,
    rel: BitSet,
    abs: BitSet,
    msc: BitSet,
    sw: BitSet,
    leds: BitSet,
    sounds: BitSet,
    props: BitSet,
}

impl Capabilities {
    /// Create an empty capability set.
    pub fn new() -> Self {
        let bits = |category: Category| BitSet::new(category.limit() as usize);
        Self {
            types: bits(Category::Type),
            keys: bits(Category::Key),
            rel: bits(Category::Rel),
            abs: bits(Category::Abs),
            msc: bits(Category::Msc),
            sw: bits(Category::Sw),
            leds: bits(Category::Led),
            sounds: bits(Category::Snd),
            props: bits(Category::Prop),
        }
    }

    /// Declare `code` as supported in `category`.
    pub(crate) fn support(&mut self, category: Category, code: u16) -> Result<()> {
        self.bits_mut(category)
            .and_then(|bits| bits.insert(code as usize).ok())
            .ok_or_else(|| Error::out_of_range(category, code))
    }

    /// Whether `code` was declared in `category`.
    pub fn supports(&self, category: Category, code: u16) -> bool {
        self.bits(category)
            .is_some_and(|bits| bits.contains(code as usize))
    }

    /// Whether events of `event_type` were declared.
    pub fn supports_event(&self, event_type: u16) -> bool {
        self.supports(Category::Type, event_type)
    }

    /// The bitmap for `category`, if it has one.
    pub fn bits(&self, category: Category) -> Option<&BitSet> {
        match category {
            Category::Type => Some(&self.types),
            Category::Key => Some(&self.keys),
            Category::Rel => Some(&self.rel),
            Category::Abs => Some(&self.abs),
            Category::Msc => Some(&self.msc),
            Category::Sw => Some(&self.sw),
            Category::Led => Some(&self.leds),
            Category::Snd => Some(&self.sounds),
            Category::Prop => Some(&self.props),
            Category::Syn | Category::Rep => None,
        }
    }

    fn bits_mut(&mut self, category: Category) -> Option<&mut BitSet> {
        match category {
            Category::Type => Some(&mut self.types),
            Category::Key => Some(&mut self.keys),
            Category::Rel => Some(&mut self.rel),
            Category::Abs => Some(&mut self.abs),
            Category::Msc => Some(&mut self.msc),
            Category::Sw => Some(&mut self.sw),
            Category::Led => Some(&mut self.leds),
            Category::Snd => Some(&mut self.sounds),
            Category::Prop => Some(&mut self.props),
            Category::Syn | Category::Rep => None,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new()
    }
}

/// Who generates autorepeat events for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// The device does not autorepeat.
    #[default]
    NoRepeat,
    /// The hardware driver emits repeats itself.
    Driver,
    /// Repeats are synthesized above the driver.
    Software,
}

/// Autorepeat mode and timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepeatConfig {
    pub mode: RepeatMode,
    /// Delay before the first repeat, in milliseconds.
    pub delay_ms: u32,
    /// Interval between repeats, in milliseconds.
    pub period_ms: u32,
}

impl RepeatConfig {
    /// Fill in the default timing when the device repeats but left both
    /// values unset.
    pub(crate) fn apply_defaults(&mut self) {
        if self.mode != RepeatMode::NoRepeat && self.delay_ms == 0 && self.period_ms == 0 {
            self.delay_ms = DEFAULT_REPEAT_DELAY_MS;
            self.period_ms = DEFAULT_REPEAT_PERIOD_MS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORIES: [Category; 9] = [
        Category::Type,
        Category::Key,
        Category::Rel,
        Category::Abs,
        Category::Msc,
        Category::Sw,
        Category::Led,
        Category::Snd,
        Category::Prop,
    ];

    #[test]
    fn test_support_range_per_category() {
        for category in CATEGORIES {
            let mut caps = Capabilities::new();
            let limit = category.limit();

            let err = caps.support(category, limit).unwrap_err();
            assert!(err.is_invalid_argument());
            assert!(caps.bits(category).unwrap().is_empty());

            caps.support(category, limit - 1).unwrap();
            let bits = caps.bits(category).unwrap();
            assert_eq!(bits.iter().collect::<Vec<_>>(), vec![limit as usize - 1]);

            for other in CATEGORIES.iter().filter(|&&c| c != category) {
                assert!(caps.bits(*other).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn test_categories_without_bitmap() {
        let mut caps = Capabilities::new();
        assert!(caps.support(Category::Syn, 0).is_err());
        assert!(caps.support(Category::Rep, 0).is_err());
        assert!(!caps.supports(Category::Rep, 0));
    }

    #[test]
    fn test_repeat_defaults() {
        let mut config = RepeatConfig {
            mode: RepeatMode::Software,
            ..Default::default()
        };
        config.apply_defaults();
        assert_eq!(config.delay_ms, DEFAULT_REPEAT_DELAY_MS);
        assert_eq!(config.period_ms, DEFAULT_REPEAT_PERIOD_MS);

        let mut explicit = RepeatConfig {
            mode: RepeatMode::Driver,
            delay_ms: 0,
            period_ms: 33,
        };
        explicit.apply_defaults();
        assert_eq!(explicit.delay_ms, 0);
        assert_eq!(explicit.period_ms, 33);

        let mut none = RepeatConfig::default();
        none.apply_defaults();
        assert_eq!(none, RepeatConfig::default());
    }
}
