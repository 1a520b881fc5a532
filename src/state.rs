//! Per-device state tracking.
//!
//! Mirrors the last pushed value of every stateful code so that consumers
//! can query the instantaneous state of a device without replaying its
//! event history.

use crate::bitset::BitSet;
use crate::codes::{ABS_CNT, Category, EV_ABS, EV_KEY, EV_LED, EV_SND, EV_SW};
use crate::event::InputEvent;

/// Range and current value of one absolute axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsInfo {
    /// Last reported value.
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    /// Noise filter threshold.
    pub fuzz: i32,
    /// Dead zone around the center.
    pub flat: i32,
    /// Units per millimeter (or per radian for rotational axes).
    pub resolution: i32,
}

impl AbsInfo {
    /// Axis descriptor with the given range and everything else zero.
    pub fn with_range(minimum: i32, maximum: i32) -> Self {
        Self {
            minimum,
            maximum,
            ..Default::default()
        }
    }
}

/// Instantaneous state of keys, LEDs, sounds, switches and absolute axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    keys: BitSet,
    leds: BitSet,
    sounds: BitSet,
    switches: BitSet,
    absinfo: Box<[AbsInfo]>,
}

impl DeviceState {
    /// All bits clear and every axis zeroed.
    pub fn new() -> Self {
        Self::with_absinfo(vec![AbsInfo::default(); ABS_CNT as usize])
    }

    /// Start from a per-axis table declared before registration.
    pub(crate) fn with_absinfo(mut absinfo: Vec<AbsInfo>) -> Self {
        absinfo.resize(ABS_CNT as usize, AbsInfo::default());
        let bits = |category: Category| BitSet::new(category.limit() as usize);
        Self {
            keys: bits(Category::Key),
            leds: bits(Category::Led),
            sounds: bits(Category::Snd),
            switches: bits(Category::Sw),
            absinfo: absinfo.into_boxed_slice(),
        }
    }

    /// Record `event` if its type is stateful.
    ///
    /// The code must already be validated against its category.
    pub(crate) fn apply(&mut self, event: &InputEvent) {
        let code = event.code as usize;
        let on = event.value != 0;
        let applied = match event.event_type {
            EV_KEY => self.keys.set(code, on),
            EV_LED => self.leds.set(code, on),
            EV_SND => self.sounds.set(code, on),
            EV_SW => self.switches.set(code, on),
            EV_ABS => {
                if let Some(info) = self.absinfo.get_mut(code) {
                    info.value = event.value;
                }
                Ok(())
            }
            _ => Ok(()),
        };
        debug_assert!(applied.is_ok(), "unvalidated code {}", event);
    }

    pub fn key(&self, code: u16) -> bool {
        self.keys.contains(code as usize)
    }

    pub fn led(&self, code: u16) -> bool {
        self.leds.contains(code as usize)
    }

    pub fn sound(&self, code: u16) -> bool {
        self.sounds.contains(code as usize)
    }

    pub fn switch(&self, code: u16) -> bool {
        self.switches.contains(code as usize)
    }

    /// Descriptor and last value of an absolute axis.
    pub fn abs_info(&self, axis: u16) -> Option<AbsInfo> {
        self.absinfo.get(axis as usize).copied()
    }

    /// Bitmap of the given stateful category.
    pub fn bits(&self, category: Category) -> Option<&BitSet> {
        match category {
            Category::Key => Some(&self.keys),
            Category::Led => Some(&self.leds),
            Category::Snd => Some(&self.sounds),
            Category::Sw => Some(&self.switches),
            _ => None,
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{
        ABS_X, EV_REL, KEY_A, KEY_S, LED_CAPSL, REL_X, SND_BELL, SW_LID,
    };

    fn ev(event_type: u16, code: u16, value: i32) -> InputEvent {
        InputEvent::new(event_type, code, value)
    }

    #[test]
    fn test_key_state_follows_last_value() {
        let mut state = DeviceState::new();
        state.apply(&ev(EV_KEY, KEY_A, 1));
        state.apply(&ev(EV_KEY, KEY_S, 1));
        state.apply(&ev(EV_KEY, KEY_A, 0));
        state.apply(&ev(EV_KEY, KEY_S, 2));

        assert!(!state.key(KEY_A));
        assert!(state.key(KEY_S));
    }

    #[test]
    fn test_other_stateful_categories() {
        let mut state = DeviceState::new();
        state.apply(&ev(EV_LED, LED_CAPSL, 1));
        state.apply(&ev(EV_SND, SND_BELL, 1));
        state.apply(&ev(EV_SW, SW_LID, 1));
        state.apply(&ev(EV_ABS, ABS_X, -17));

        assert!(state.led(LED_CAPSL));
        assert!(state.sound(SND_BELL));
        assert!(state.switch(SW_LID));
        assert_eq!(state.abs_info(ABS_X).unwrap().value, -17);
    }

    #[test]
    fn test_relative_events_are_stateless() {
        let mut state = DeviceState::new();
        state.apply(&ev(EV_REL, REL_X, 5));
        assert_eq!(state, DeviceState::new());
    }

    #[test]
    fn test_absinfo_table_is_padded() {
        let state = DeviceState::with_absinfo(vec![AbsInfo::with_range(0, 1023)]);
        assert_eq!(state.abs_info(ABS_X).unwrap().maximum, 1023);
        assert_eq!(state.abs_info(ABS_CNT - 1), Some(AbsInfo::default()));
        assert_eq!(state.abs_info(ABS_CNT), None);
    }
}
