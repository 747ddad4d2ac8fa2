use ahash::AHashMap;
use colored::Colorize;
use padlink_emu::{Button, InputPacket, StickAxis, StickSide};
use padlink_input::{EventKind, RawEvent};

use crate::print_debug;

use super::turbo::TurboEngine;

// Linux input-event-codes the kernel driver emits for a Pro Controller.
pub(crate) const BTN_SOUTH: u16 = 0x130; // B
pub(crate) const BTN_EAST: u16 = 0x131; // A
pub(crate) const BTN_NORTH: u16 = 0x133; // X
pub(crate) const BTN_WEST: u16 = 0x134; // Y
pub(crate) const BTN_Z: u16 = 0x135; // Capture
pub(crate) const BTN_TL: u16 = 0x136;
pub(crate) const BTN_TR: u16 = 0x137;
pub(crate) const BTN_TL2: u16 = 0x138;
pub(crate) const BTN_TR2: u16 = 0x139;
pub(crate) const BTN_SELECT: u16 = 0x13a;
pub(crate) const BTN_START: u16 = 0x13b;
pub(crate) const BTN_MODE: u16 = 0x13c;
pub(crate) const BTN_THUMBL: u16 = 0x13d;
pub(crate) const BTN_THUMBR: u16 = 0x13e;
pub(crate) const BTN_DPAD_UP: u16 = 0x220;
pub(crate) const BTN_DPAD_DOWN: u16 = 0x221;
pub(crate) const BTN_DPAD_LEFT: u16 = 0x222;
pub(crate) const BTN_DPAD_RIGHT: u16 = 0x223;
pub(crate) const ABS_X: u16 = 0x00;
pub(crate) const ABS_Y: u16 = 0x01;
pub(crate) const ABS_RX: u16 = 0x03;
pub(crate) const ABS_RY: u16 = 0x04;

const AXIS_SOURCE_MAX: i32 = 255;

/// Translates raw device events into packet field updates.
///
/// Owns the physical button state (edge-trigger dedupe) and the turbo
/// toggle gesture. All maps are freshly constructed per session; nothing
/// here is shared between proxy instances.
pub(crate) struct EventMapper {
    buttons: AHashMap<u16, Button>,
    axes: AHashMap<u16, (StickSide, StickAxis)>,
    pressed: AHashMap<u16, bool>,
    modifier: Button,
    modifier_down: bool,
}

impl EventMapper {
    pub fn new(modifier: Button) -> Self {
        Self {
            buttons: default_button_layout(),
            axes: default_axis_layout(),
            pressed: AHashMap::new(),
            modifier,
            modifier_down: false,
        }
    }

    /// Applies one raw event to the packet. Unmapped codes are dropped.
    pub fn handle_event(
        &mut self,
        event: RawEvent,
        packet: &mut InputPacket,
        turbo: &mut TurboEngine,
    ) {
        match event.kind {
            EventKind::Key => self.handle_key(event, packet, turbo),
            EventKind::Axis => self.handle_axis(event, packet),
        }
    }

    fn handle_key(&mut self, event: RawEvent, packet: &mut InputPacket, turbo: &mut TurboEngine) {
        let pressed = event.value != 0;
        let previous = self.pressed.get(&event.code).copied().unwrap_or(false);
        if previous == pressed {
            // key repeats carry no transition
            return;
        }
        self.pressed.insert(event.code, pressed);

        let Some(&button) = self.buttons.get(&event.code) else {
            return;
        };
        if button == self.modifier {
            self.modifier_down = pressed;
        }

        // a press while the modifier is held toggles turbo instead of
        // being forwarded
        if pressed && self.modifier_down && button != self.modifier {
            let enabled = turbo.toggle(button, pressed, packet);
            print_debug!(
                "turbo {} for {button:?}",
                if enabled { "enabled" } else { "disabled" }
            );
            return;
        }

        if turbo.controls(button) {
            turbo.on_physical(button, pressed, packet);
            return;
        }

        packet.set_button(button, pressed);
    }

    fn handle_axis(&mut self, event: RawEvent, packet: &mut InputPacket) {
        let Some(&(side, axis)) = self.axes.get(&event.code) else {
            return;
        };
        packet.set_axis(side, axis, normalize_axis(event.value));
    }
}

/// Maps the 0-255 source range linearly onto [-100, 100], exact at the
/// endpoints.
fn normalize_axis(value: i32) -> i8 {
    let clamped = value.clamp(0, AXIS_SOURCE_MAX) as f64;
    let scaled = clamped / f64::from(AXIS_SOURCE_MAX) * 200.0 - 100.0;
    scaled.round() as i8
}

fn default_button_layout() -> AHashMap<u16, Button> {
    [
        (BTN_EAST, Button::A),
        (BTN_SOUTH, Button::B),
        (BTN_NORTH, Button::X),
        (BTN_WEST, Button::Y),
        (BTN_TL, Button::L),
        (BTN_TR, Button::R),
        (BTN_TL2, Button::Zl),
        (BTN_TR2, Button::Zr),
        (BTN_SELECT, Button::Minus),
        (BTN_START, Button::Plus),
        (BTN_MODE, Button::Home),
        (BTN_Z, Button::Capture),
        (BTN_THUMBL, Button::LStick),
        (BTN_THUMBR, Button::RStick),
        (BTN_DPAD_UP, Button::DpadUp),
        (BTN_DPAD_DOWN, Button::DpadDown),
        (BTN_DPAD_LEFT, Button::DpadLeft),
        (BTN_DPAD_RIGHT, Button::DpadRight),
    ]
    .into_iter()
    .collect()
}

fn default_axis_layout() -> AHashMap<u16, (StickSide, StickAxis)> {
    [
        (ABS_X, (StickSide::Left, StickAxis::X)),
        (ABS_Y, (StickSide::Left, StickAxis::Y)),
        (ABS_RX, (StickSide::Right, StickAxis::X)),
        (ABS_RY, (StickSide::Right, StickAxis::Y)),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn mapper() -> (EventMapper, TurboEngine, InputPacket) {
        (
            EventMapper::new(Button::Capture),
            TurboEngine::new(Duration::from_millis(25)),
            InputPacket::new(),
        )
    }

    #[test]
    fn axis_mapping_is_exact_at_the_boundaries() {
        assert_eq!(normalize_axis(0), -100);
        assert_eq!(normalize_axis(255), 100);
        assert_eq!(normalize_axis(128), 0);
    }

    #[test]
    fn axis_events_land_on_the_mapped_stick() {
        let (mut mapper, mut turbo, mut packet) = mapper();
        mapper.handle_event(RawEvent::axis(ABS_RY, 255), &mut packet, &mut turbo);
        assert_eq!(packet.axis(StickSide::Right, StickAxis::Y), 100);
        assert_eq!(packet.axis(StickSide::Left, StickAxis::Y), 0);
    }

    #[test]
    fn press_release_roundtrip_touches_only_that_button() {
        let (mut mapper, mut turbo, mut packet) = mapper();

        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        let mut expected = InputPacket::new();
        expected.set_button(Button::A, true);
        assert_eq!(packet, expected);

        mapper.handle_event(RawEvent::key(BTN_EAST, 0), &mut packet, &mut turbo);
        assert_eq!(packet, InputPacket::new());
    }

    #[test]
    fn identical_repeats_are_edge_filtered() {
        let (mut mapper, mut turbo, mut packet) = mapper();

        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        packet.set_button(Button::A, false); // consumer observed it
        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        assert!(!packet.button(Button::A));
    }

    #[test]
    fn unmapped_codes_are_silently_dropped() {
        let (mut mapper, mut turbo, mut packet) = mapper();
        mapper.handle_event(RawEvent::key(0x2c0, 1), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::axis(0x10, 200), &mut packet, &mut turbo);
        assert_eq!(packet, InputPacket::new());
    }

    #[test]
    fn turbo_toggle_requires_the_modifier() {
        let (mut mapper, mut turbo, mut packet) = mapper();

        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        assert!(!turbo.controls(Button::A));

        mapper.handle_event(RawEvent::key(BTN_EAST, 0), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::key(BTN_Z, 1), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        assert!(turbo.controls(Button::A));
        // the toggling press is consumed, not forwarded
        assert!(!packet.button(Button::A));
    }

    #[test]
    fn turbo_owned_buttons_bypass_the_direct_path() {
        let (mut mapper, mut turbo, mut packet) = mapper();

        mapper.handle_event(RawEvent::key(BTN_Z, 1), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::key(BTN_Z, 0), &mut packet, &mut turbo);
        assert!(turbo.controls(Button::A));

        // releases feed the oscillator's physical view, not the packet
        mapper.handle_event(RawEvent::key(BTN_EAST, 0), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        assert!(!packet.button(Button::A));
        assert!(turbo.controls(Button::A));
    }

    #[test]
    fn disabling_turbo_resumes_direct_forwarding() {
        let (mut mapper, mut turbo, mut packet) = mapper();

        // enable while the modifier is held
        mapper.handle_event(RawEvent::key(BTN_Z, 1), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::key(BTN_EAST, 0), &mut packet, &mut turbo);

        // disable: next press with the modifier still held
        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        assert!(!turbo.controls(Button::A));
        assert!(packet.button(Button::A));

        // normal forwarding from here on
        mapper.handle_event(RawEvent::key(BTN_Z, 0), &mut packet, &mut turbo);
        mapper.handle_event(RawEvent::key(BTN_EAST, 0), &mut packet, &mut turbo);
        assert!(!packet.button(Button::A));
        mapper.handle_event(RawEvent::key(BTN_EAST, 1), &mut packet, &mut turbo);
        assert!(packet.button(Button::A));
    }
}
