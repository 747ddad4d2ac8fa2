use std::fs::{self, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use evdev_rs::enums::EventCode;
use evdev_rs::util::event_code_to_int;
use evdev_rs::{Device, DeviceWrapper, ReadFlag, ReadStatus};

use crate::error::{Error, Result};
use crate::event::RawEvent;
use crate::source::InputSource;

/// Reads events from a Linux evdev node opened in non-blocking mode.
pub struct EvdevSource {
    device: Device,
}

// The device handle is owned exclusively and only touched from the
// thread holding the source; libevdev handles have no thread affinity.
unsafe impl Send for EvdevSource {}

impl EvdevSource {
    /// Opens the device node at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path.as_ref())?;
        let device = Device::new_from_file(file)?;
        Ok(Self { device })
    }

    /// Locates a device by its advertised name among `/dev/input/event*`.
    pub fn open_by_name(name: &str) -> Result<Self> {
        for entry in fs::read_dir("/dev/input")? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !file_name.starts_with("event") {
                continue;
            }
            // nodes we cannot open (permissions, races) are skipped
            let Ok(source) = Self::open(&path) else {
                continue;
            };
            if source.name() == Some(name) {
                return Ok(source);
            }
        }
        Err(Error::DeviceNotFound(name.to_string()))
    }

    /// The device's advertised name.
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }
}

impl InputSource for EvdevSource {
    fn try_read_event(&mut self) -> Result<Option<RawEvent>> {
        loop {
            match self.device.next_event(ReadFlag::NORMAL) {
                Ok((ReadStatus::Success, event)) => {
                    let (_, code) = event_code_to_int(&event.event_code);
                    match event.event_code {
                        EventCode::EV_KEY(_) => {
                            return Ok(Some(RawEvent::key(code as u16, event.value)));
                        }
                        EventCode::EV_ABS(_) => {
                            return Ok(Some(RawEvent::axis(code as u16, event.value)));
                        }
                        // SYN, MSC and friends carry nothing the proxy maps
                        _ => continue,
                    }
                }
                Ok((ReadStatus::Sync, _)) => continue,
                Err(e) if e.raw_os_error() == Some(libc::EAGAIN) => return Ok(None),
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }
}
