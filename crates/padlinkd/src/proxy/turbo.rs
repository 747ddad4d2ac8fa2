use std::time::{Duration, Instant};

use ahash::AHashMap;
use padlink_emu::{Button, InputPacket};

#[derive(Debug, Clone, Copy)]
struct TurboState {
    /// Next value the oscillator will report for the button.
    phase: bool,
    /// Whether the user is physically holding the button right now.
    held: bool,
}

/// Per-button auto-repeat.
///
/// While a button is registered, its packet field belongs to this
/// engine: the mapper's direct path must not write it. The oscillator
/// flips registered buttons every half-period while they are physically
/// held and forces them released otherwise.
#[derive(Debug)]
pub(crate) struct TurboEngine {
    registry: AHashMap<Button, TurboState>,
    half_period: Duration,
    next_flip: Option<Instant>,
}

impl TurboEngine {
    pub fn new(half_period: Duration) -> Self {
        Self {
            registry: AHashMap::new(),
            half_period,
            next_flip: None,
        }
    }

    /// Whether the button's packet field is currently owned by turbo.
    pub fn controls(&self, button: Button) -> bool {
        self.registry.contains_key(&button)
    }

    /// Flips the button's turbo membership. Enabling seeds the phase to
    /// released; disabling hands the packet field back to the physical
    /// state. Returns whether turbo is now enabled for the button.
    pub fn toggle(
        &mut self,
        button: Button,
        physically_pressed: bool,
        packet: &mut InputPacket,
    ) -> bool {
        if self.registry.remove(&button).is_some() {
            packet.set_button(button, physically_pressed);
            return false;
        }
        self.registry.insert(
            button,
            TurboState {
                phase: false,
                held: physically_pressed,
            },
        );
        packet.set_button(button, false);
        true
    }

    /// Records a physical transition of a registered button. Releasing
    /// kills the oscillation immediately so no forced press outlives
    /// the user's grip.
    pub fn on_physical(&mut self, button: Button, pressed: bool, packet: &mut InputPacket) {
        let Some(state) = self.registry.get_mut(&button) else {
            return;
        };
        state.held = pressed;
        if !pressed {
            state.phase = false;
            packet.set_button(button, false);
        }
    }

    /// One oscillation check, driven by the proxy tick. Fires at most
    /// once per half-period; overruns roll into the next cadence slot
    /// with no catch-up.
    pub fn on_tick(&mut self, now: Instant, packet: &mut InputPacket) {
        if self.registry.is_empty() {
            return;
        }
        if let Some(due) = self.next_flip {
            if now < due {
                return;
            }
        }
        self.next_flip = Some(now + self.half_period);

        for (button, state) in self.registry.iter_mut() {
            if state.held {
                packet.set_button(*button, state.phase);
                state.phase = !state.phase;
            } else {
                state.phase = false;
                packet.set_button(*button, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_PERIOD: Duration = Duration::from_millis(5);

    fn engine() -> (TurboEngine, InputPacket) {
        (TurboEngine::new(HALF_PERIOD), InputPacket::new())
    }

    #[test]
    fn held_button_alternates_starting_released() {
        let (mut turbo, mut packet) = engine();
        turbo.toggle(Button::A, true, &mut packet);

        let base = Instant::now();
        let mut observed = Vec::new();
        for i in 0..10u32 {
            turbo.on_tick(base + HALF_PERIOD * i, &mut packet);
            observed.push(packet.button(Button::A));
        }

        let expected: Vec<bool> = (0..10u32).map(|i| i % 2 == 1).collect();
        assert_eq!(observed, expected);
    }

    #[test]
    fn flips_at_most_once_per_half_period() {
        let (mut turbo, mut packet) = engine();
        turbo.toggle(Button::A, true, &mut packet);

        let base = Instant::now();
        turbo.on_tick(base, &mut packet);
        assert!(!packet.button(Button::A));

        // within the same half-period nothing moves
        turbo.on_tick(base + Duration::from_millis(1), &mut packet);
        assert!(!packet.button(Button::A));

        turbo.on_tick(base + HALF_PERIOD, &mut packet);
        assert!(packet.button(Button::A));
    }

    #[test]
    fn released_button_never_fires() {
        let (mut turbo, mut packet) = engine();
        turbo.toggle(Button::B, true, &mut packet);
        turbo.on_physical(Button::B, false, &mut packet);

        let base = Instant::now();
        for i in 0..6u32 {
            turbo.on_tick(base + HALF_PERIOD * i, &mut packet);
            assert!(!packet.button(Button::B));
        }
        assert!(turbo.controls(Button::B));
    }

    #[test]
    fn release_mid_press_clears_the_forced_state_immediately() {
        let (mut turbo, mut packet) = engine();
        turbo.toggle(Button::A, true, &mut packet);

        let base = Instant::now();
        turbo.on_tick(base, &mut packet);
        turbo.on_tick(base + HALF_PERIOD, &mut packet);
        assert!(packet.button(Button::A));

        turbo.on_physical(Button::A, false, &mut packet);
        assert!(!packet.button(Button::A));
    }

    #[test]
    fn disabling_restores_the_physical_state() {
        let (mut turbo, mut packet) = engine();
        turbo.toggle(Button::A, true, &mut packet);
        let base = Instant::now();
        turbo.on_tick(base, &mut packet);

        let enabled = turbo.toggle(Button::A, true, &mut packet);
        assert!(!enabled);
        assert!(!turbo.controls(Button::A));
        assert!(packet.button(Button::A));
    }
}
