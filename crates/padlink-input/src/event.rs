/// Kind of a raw device event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Key,
    Axis,
}

/// One event read from the physical controller. Immutable, consumed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub const fn key(code: u16, value: i32) -> Self {
        Self {
            kind: EventKind::Key,
            code,
            value,
        }
    }

    pub const fn axis(code: u16, value: i32) -> Self {
        Self {
            kind: EventKind::Axis,
            code,
            value,
        }
    }
}
