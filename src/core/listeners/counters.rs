use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::{InputEvent, ListenerKind, MouseButton};

/// Cumulative input counters written by the hook threads and read by the
/// monitor loop. Every field is an independent atomic, so a read never
/// observes a torn value.
#[derive(Debug, Default)]
pub struct ListenerCounters {
    keyboard_up: AtomicBool,
    mouse_up: AtomicBool,
    press: AtomicU64,
    left: AtomicU64,
    right: AtomicU64,
    middle: AtomicU64,
    scroll_x: AtomicU64,
    scroll_y: AtomicU64,
    moves: AtomicU64,
}

impl ListenerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one input event; releases are ignored
    pub fn record(&self, event: &InputEvent) {
        match *event {
            InputEvent::KeyPress => {
                self.press.fetch_add(1, Ordering::Relaxed);
            }
            InputEvent::ButtonPress(button) => {
                let counter = match button {
                    MouseButton::Left => &self.left,
                    MouseButton::Right => &self.right,
                    MouseButton::Middle => &self.middle,
                };
                counter.fetch_add(1, Ordering::Relaxed);
            }
            InputEvent::Scroll { dx, dy } => {
                self.scroll_x.fetch_add(dx.unsigned_abs(), Ordering::Relaxed);
                self.scroll_y.fetch_add(dy.unsigned_abs(), Ordering::Relaxed);
            }
            InputEvent::Move => {
                self.moves.fetch_add(1, Ordering::Relaxed);
            }
            InputEvent::KeyRelease | InputEvent::ButtonRelease(_) => {}
        }
    }

    pub fn set_up(&self, kind: ListenerKind, up: bool) {
        self.flag(kind).store(up, Ordering::SeqCst);
    }

    pub fn is_up(&self, kind: ListenerKind) -> bool {
        self.flag(kind).load(Ordering::SeqCst)
    }

    fn flag(&self, kind: ListenerKind) -> &AtomicBool {
        match kind {
            ListenerKind::Keyboard => &self.keyboard_up,
            ListenerKind::Mouse => &self.mouse_up,
        }
    }

    /// Zero every counter; listener up/down state is kept
    pub fn reset(&self) {
        for counter in [
            &self.press,
            &self.left,
            &self.right,
            &self.middle,
            &self.scroll_x,
            &self.scroll_y,
            &self.moves,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Read the current values without resetting them
    pub fn snapshot(&self) -> ListenerSnapshot {
        ListenerSnapshot {
            keyboard: KeyboardCounts {
                up: self.keyboard_up.load(Ordering::SeqCst),
                press: self.press.load(Ordering::Relaxed),
            },
            mouse: MouseCounts {
                up: self.mouse_up.load(Ordering::SeqCst),
                left: self.left.load(Ordering::Relaxed),
                right: self.right.load(Ordering::Relaxed),
                middle: self.middle.load(Ordering::Relaxed),
                scroll_x: self.scroll_x.load(Ordering::Relaxed),
                scroll_y: self.scroll_y.load(Ordering::Relaxed),
                moves: self.moves.load(Ordering::Relaxed),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerSnapshot {
    pub keyboard: KeyboardCounts,
    pub mouse: MouseCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardCounts {
    pub up: bool,
    pub press: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseCounts {
    pub up: bool,
    pub left: u64,
    pub right: u64,
    pub middle: u64,
    pub scroll_x: u64,
    pub scroll_y: u64,
    pub moves: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presses_counted_releases_ignored() {
        let counters = ListenerCounters::new();
        counters.record(&InputEvent::KeyPress);
        counters.record(&InputEvent::KeyRelease);
        counters.record(&InputEvent::KeyPress);

        assert_eq!(counters.snapshot().keyboard.press, 2);
    }

    #[test]
    fn test_clicks_per_button() {
        let counters = ListenerCounters::new();
        counters.record(&InputEvent::ButtonPress(MouseButton::Left));
        counters.record(&InputEvent::ButtonRelease(MouseButton::Left));
        counters.record(&InputEvent::ButtonPress(MouseButton::Right));
        counters.record(&InputEvent::ButtonPress(MouseButton::Middle));
        counters.record(&InputEvent::ButtonPress(MouseButton::Middle));

        let mouse = counters.snapshot().mouse;
        assert_eq!((mouse.left, mouse.right, mouse.middle), (1, 1, 2));
    }

    #[test]
    fn test_scroll_sums_absolute_deltas() {
        let counters = ListenerCounters::new();
        counters.record(&InputEvent::Scroll { dx: 0, dy: 3 });
        counters.record(&InputEvent::Scroll { dx: 0, dy: -2 });
        counters.record(&InputEvent::Scroll { dx: -1, dy: 0 });

        let mouse = counters.snapshot().mouse;
        assert_eq!(mouse.scroll_y, 5);
        assert_eq!(mouse.scroll_x, 1);
    }

    #[test]
    fn test_snapshot_does_not_reset() {
        let counters = ListenerCounters::new();
        counters.record(&InputEvent::Move);
        assert_eq!(counters.snapshot().mouse.moves, 1);
        assert_eq!(counters.snapshot().mouse.moves, 1);

        counters.reset();
        assert_eq!(counters.snapshot().mouse.moves, 0);
    }

    #[test]
    fn test_up_flags_are_independent() {
        let counters = ListenerCounters::new();
        counters.set_up(ListenerKind::Mouse, true);
        assert!(counters.is_up(ListenerKind::Mouse));
        assert!(!counters.is_up(ListenerKind::Keyboard));
    }
}
