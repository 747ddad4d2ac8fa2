use std::collections::VecDeque;

use crate::error::Result;
use crate::event::RawEvent;

/// Non-blocking source of raw controller events.
pub trait InputSource: Send {
    /// Returns the next pending event, or `None` when the device has
    /// nothing to report right now. Must never block; the proxy calls
    /// this in a tight drain loop every tick.
    fn try_read_event(&mut self) -> Result<Option<RawEvent>>;
}

/// Plays back a fixed sequence of events. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    events: VecDeque<RawEvent>,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = RawEvent>>(events: I) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl InputSource for ScriptedSource {
    fn try_read_event(&mut self) -> Result<Option<RawEvent>> {
        Ok(self.events.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_order_then_reports_none() {
        let mut source =
            ScriptedSource::new([RawEvent::key(304, 1), RawEvent::key(304, 0)]);
        assert_eq!(source.try_read_event().unwrap(), Some(RawEvent::key(304, 1)));
        assert_eq!(source.try_read_event().unwrap(), Some(RawEvent::key(304, 0)));
        assert_eq!(source.try_read_event().unwrap(), None);
        assert!(source.is_empty());
    }
}
