//! OS input hooks backed by kernel evdev devices.
//!
//! Reading `/dev/input/event*` needs membership in the `input` group (or
//! root). Without it no device opens and the listener reports the source as
//! unavailable instead of failing the daemon.

use crate::core::listeners::{InputSource, ListenerKind};
use crate::error::Result;

/// Open an input source for the given listener kind
pub fn open_source(kind: ListenerKind) -> Result<Box<dyn InputSource>> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(evdev_source::EvdevSource::open(kind)?))
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(crate::error::ResolverError::sensor_unavailable(format!(
            "{} input hooks are only supported on Linux",
            kind
        )))
    }
}

#[cfg(target_os = "linux")]
mod evdev_source {
    use std::io;
    use std::os::unix::io::AsRawFd;
    use std::thread;
    use std::time::Duration;

    use evdev::{Device, InputEventKind, Key, RelativeAxisType};

    use crate::core::listeners::{InputEvent, InputSource, ListenerKind, MouseButton};
    use crate::error::{ResolverError, Result};

    pub struct EvdevSource {
        kind: ListenerKind,
        devices: Vec<Device>,
        /// Motion seen since the last SYN_REPORT of each device
        moved: Vec<bool>,
    }

    impl EvdevSource {
        pub fn open(kind: ListenerKind) -> Result<Self> {
            let devices: Vec<Device> = evdev::enumerate()
                .map(|(_, device)| device)
                .filter(|device| matches_kind(device, kind))
                .filter_map(|device| match set_nonblocking(&device) {
                    Ok(()) => Some(device),
                    Err(e) => {
                        log::debug!(
                            target: "resolver::listener",
                            "skipping {:?}: {}",
                            device.name(),
                            e
                        );
                        None
                    }
                })
                .collect();

            if devices.is_empty() {
                return Err(ResolverError::sensor_unavailable(format!(
                    "no readable {} devices under /dev/input",
                    kind
                )));
            }

            log::debug!(
                target: "resolver::listener",
                "{} listener hooked {} device(s)",
                kind,
                devices.len()
            );

            let moved = vec![false; devices.len()];
            Ok(Self {
                kind,
                devices,
                moved,
            })
        }
    }

    fn matches_kind(device: &Device, kind: ListenerKind) -> bool {
        match kind {
            ListenerKind::Keyboard => device
                .supported_keys()
                .map_or(false, |keys| keys.contains(Key::KEY_A) && keys.contains(Key::KEY_ENTER)),
            ListenerKind::Mouse => device.supported_relative_axes().map_or(false, |axes| {
                axes.contains(RelativeAxisType::REL_X) && axes.contains(RelativeAxisType::REL_Y)
            }),
        }
    }

    fn set_nonblocking(device: &Device) -> io::Result<()> {
        let fd = device.as_raw_fd();
        // SAFETY: fd is owned by `device` and stays open for its lifetime
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: same descriptor, only the O_NONBLOCK flag is added
        if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn button(key: Key) -> Option<MouseButton> {
        match key {
            Key::BTN_LEFT => Some(MouseButton::Left),
            Key::BTN_RIGHT => Some(MouseButton::Right),
            Key::BTN_MIDDLE => Some(MouseButton::Middle),
            _ => None,
        }
    }

    /// Translate one device's pending events, tracking its motion flag
    fn translate(
        kind: ListenerKind,
        device: &mut Device,
        moved: &mut bool,
        events: &mut Vec<InputEvent>,
    ) -> io::Result<()> {
        for event in device.fetch_events()? {
            match (kind, event.kind()) {
                (ListenerKind::Keyboard, InputEventKind::Key(_)) => match event.value() {
                    1 => events.push(InputEvent::KeyPress),
                    0 => events.push(InputEvent::KeyRelease),
                    // Autorepeat
                    _ => {}
                },
                (ListenerKind::Mouse, InputEventKind::Key(key)) => {
                    if let Some(button) = button(key) {
                        events.push(match event.value() {
                            0 => InputEvent::ButtonRelease(button),
                            _ => InputEvent::ButtonPress(button),
                        });
                    }
                }
                (ListenerKind::Mouse, InputEventKind::RelAxis(axis)) => match axis {
                    RelativeAxisType::REL_X | RelativeAxisType::REL_Y => *moved = true,
                    RelativeAxisType::REL_WHEEL => events.push(InputEvent::Scroll {
                        dx: 0,
                        dy: i64::from(event.value()),
                    }),
                    RelativeAxisType::REL_HWHEEL => events.push(InputEvent::Scroll {
                        dx: i64::from(event.value()),
                        dy: 0,
                    }),
                    _ => {}
                },
                (_, InputEventKind::Synchronization(_)) => {
                    if std::mem::take(moved) {
                        events.push(InputEvent::Move);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Drain every device once. A device failing with anything but
    /// `WouldBlock` (typically ENODEV after an unplug) is dropped and the
    /// others keep counting; the source fails only once none are left.
    fn drain_devices<D>(
        kind: ListenerKind,
        devices: &mut Vec<D>,
        moved: &mut Vec<bool>,
        mut drain: impl FnMut(&mut D, &mut bool, &mut Vec<InputEvent>) -> io::Result<()>,
    ) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        let mut index = 0;

        while index < devices.len() {
            match drain(&mut devices[index], &mut moved[index], &mut events) {
                Ok(()) => index += 1,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => index += 1,
                Err(e) => {
                    log::warn!(
                        target: "resolver::listener",
                        "dropping {} device: {}",
                        kind,
                        e
                    );
                    devices.swap_remove(index);
                    moved.swap_remove(index);
                }
            }
        }

        if devices.is_empty() && events.is_empty() {
            return Err(ResolverError::sensor_unavailable(format!(
                "every {} device is gone",
                kind
            )));
        }

        Ok(events)
    }

    impl InputSource for EvdevSource {
        fn poll(&mut self, timeout: Duration) -> Result<Vec<InputEvent>> {
            let kind = self.kind;
            let events = drain_devices(
                kind,
                &mut self.devices,
                &mut self.moved,
                |device, moved, events| translate(kind, device, moved, events),
            )?;

            if events.is_empty() {
                thread::sleep(timeout);
            }

            Ok(events)
        }
    }

}
