/// Discrete buttons of the emulated Pro Controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    L,
    R,
    Zl,
    Zr,
    Minus,
    Plus,
    Home,
    Capture,
    LStick,
    RStick,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickAxis {
    X,
    Y,
}

/// One analog stick deflection, both axes in [-100, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StickPosition {
    pub x: i8,
    pub y: i8,
}

/// The state record transmitted to the emulated controller each tick.
///
/// Exactly one instance exists per proxy session. The proxy worker
/// mutates it in place and every field update for a tick completes
/// before the packet is pushed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputPacket {
    a: bool,
    b: bool,
    x: bool,
    y: bool,
    l: bool,
    r: bool,
    zl: bool,
    zr: bool,
    minus: bool,
    plus: bool,
    home: bool,
    capture: bool,
    l_stick: bool,
    r_stick: bool,
    dpad_up: bool,
    dpad_down: bool,
    dpad_left: bool,
    dpad_right: bool,
    left: StickPosition,
    right: StickPosition,
}

impl InputPacket {
    /// A neutral packet: nothing pressed, sticks centered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(&self, button: Button) -> bool {
        *self.field(button)
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        *self.field_mut(button) = pressed;
    }

    pub fn stick(&self, side: StickSide) -> StickPosition {
        match side {
            StickSide::Left => self.left,
            StickSide::Right => self.right,
        }
    }

    pub fn axis(&self, side: StickSide, axis: StickAxis) -> i8 {
        let stick = self.stick(side);
        match axis {
            StickAxis::X => stick.x,
            StickAxis::Y => stick.y,
        }
    }

    pub fn set_axis(&mut self, side: StickSide, axis: StickAxis, value: i8) {
        let stick = match side {
            StickSide::Left => &mut self.left,
            StickSide::Right => &mut self.right,
        };
        match axis {
            StickAxis::X => stick.x = value,
            StickAxis::Y => stick.y = value,
        }
    }

    fn field(&self, button: Button) -> &bool {
        match button {
            Button::A => &self.a,
            Button::B => &self.b,
            Button::X => &self.x,
            Button::Y => &self.y,
            Button::L => &self.l,
            Button::R => &self.r,
            Button::Zl => &self.zl,
            Button::Zr => &self.zr,
            Button::Minus => &self.minus,
            Button::Plus => &self.plus,
            Button::Home => &self.home,
            Button::Capture => &self.capture,
            Button::LStick => &self.l_stick,
            Button::RStick => &self.r_stick,
            Button::DpadUp => &self.dpad_up,
            Button::DpadDown => &self.dpad_down,
            Button::DpadLeft => &self.dpad_left,
            Button::DpadRight => &self.dpad_right,
        }
    }

    fn field_mut(&mut self, button: Button) -> &mut bool {
        match button {
            Button::A => &mut self.a,
            Button::B => &mut self.b,
            Button::X => &mut self.x,
            Button::Y => &mut self.y,
            Button::L => &mut self.l,
            Button::R => &mut self.r,
            Button::Zl => &mut self.zl,
            Button::Zr => &mut self.zr,
            Button::Minus => &mut self.minus,
            Button::Plus => &mut self.plus,
            Button::Home => &mut self.home,
            Button::Capture => &mut self.capture,
            Button::LStick => &mut self.l_stick,
            Button::RStick => &mut self.r_stick,
            Button::DpadUp => &mut self.dpad_up,
            Button::DpadDown => &mut self.dpad_down,
            Button::DpadLeft => &mut self.dpad_left,
            Button::DpadRight => &mut self.dpad_right,
        }
    }
}
