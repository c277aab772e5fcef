use glam::Vec2;
use winit::event::TouchPhase;

/// Pointer gesture after mouse and touch have been folded together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Moved(Vec2),
    Pressed(Vec2),
    /// `click` is set when the pointer stayed within the click slop
    /// between press and release.
    Released { pos: Vec2, click: bool },
}

/// Tracks raw mouse/touch state and turns it into `Gesture`s.
///
/// Only one pointer drives the pet: the mouse, or the first finger down.
pub struct PointerTracker {
    cursor: Vec2,
    /// Where the current press started, if a press is held.
    press_origin: Option<Vec2>,
    /// Furthest the pointer has strayed from `press_origin`.
    max_travel: f32,
    touch_id: Option<u64>,
    pub click_slop: f32,
}

impl PointerTracker {
    pub fn new(start: Vec2, click_slop: f32) -> Self {
        Self {
            cursor: start,
            press_origin: None,
            max_travel: 0.0,
            touch_id: None,
            click_slop,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press_origin.is_some()
    }

    pub fn cursor_moved(&mut self, pos: Vec2) -> Gesture {
        self.cursor = pos;
        if let Some(origin) = self.press_origin {
            self.max_travel = self.max_travel.max(origin.distance(pos));
        }
        Gesture::Moved(pos)
    }

    /// Left button edge. Repeated presses while held are ignored.
    pub fn mouse_button(&mut self, pressed: bool) -> Option<Gesture> {
        if pressed {
            self.press()
        } else {
            Some(self.release(true))
        }
    }

    pub fn touch(&mut self, id: u64, phase: TouchPhase, pos: Vec2) -> Option<Gesture> {
        match phase {
            TouchPhase::Started => {
                if self.touch_id.is_some() {
                    return None;
                }
                self.touch_id = Some(id);
                self.cursor = pos;
                self.press()
            }
            TouchPhase::Moved if self.touch_id == Some(id) => Some(self.cursor_moved(pos)),
            TouchPhase::Ended | TouchPhase::Cancelled if self.touch_id == Some(id) => {
                self.touch_id = None;
                self.cursor = pos;
                Some(self.release(phase == TouchPhase::Ended))
            }
            _ => None,
        }
    }

    /// Pointer left the window: a held press ends here, never as a click.
    pub fn cursor_left(&mut self) -> Option<Gesture> {
        if self.is_pressed() {
            Some(self.release(false))
        } else {
            None
        }
    }

    fn press(&mut self) -> Option<Gesture> {
        if self.press_origin.is_some() {
            return None;
        }
        self.press_origin = Some(self.cursor);
        self.max_travel = 0.0;
        Some(Gesture::Pressed(self.cursor))
    }

    fn release(&mut self, may_click: bool) -> Gesture {
        let click = match self.press_origin.take() {
            Some(origin) => {
                let travel = self.max_travel.max(origin.distance(self.cursor));
                may_click && travel < self.click_slop
            }
            None => false,
        };
        Gesture::Released {
            pos: self.cursor,
            click,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> PointerTracker {
        PointerTracker::new(Vec2::ZERO, 6.0)
    }

    #[test]
    fn press_release_in_place_is_click() {
        let mut t = tracker();
        t.cursor_moved(Vec2::new(10.0, 10.0));
        assert_eq!(t.mouse_button(true), Some(Gesture::Pressed(Vec2::new(10.0, 10.0))));
        t.cursor_moved(Vec2::new(12.0, 11.0));
        assert_eq!(
            t.mouse_button(false),
            Some(Gesture::Released {
                pos: Vec2::new(12.0, 11.0),
                click: true
            })
        );
    }

    #[test]
    fn drag_out_and_back_is_not_click() {
        let mut t = tracker();
        t.mouse_button(true);
        t.cursor_moved(Vec2::new(80.0, 0.0));
        t.cursor_moved(Vec2::new(1.0, 0.0));
        assert_eq!(
            t.mouse_button(false),
            Some(Gesture::Released {
                pos: Vec2::new(1.0, 0.0),
                click: false
            })
        );
    }

    #[test]
    fn release_without_press_is_forwarded_but_not_click() {
        let mut t = tracker();
        assert_eq!(
            t.mouse_button(false),
            Some(Gesture::Released {
                pos: Vec2::ZERO,
                click: false
            })
        );
    }

    #[test]
    fn double_press_is_ignored() {
        let mut t = tracker();
        assert!(t.mouse_button(true).is_some());
        assert!(t.mouse_button(true).is_none());
    }

    #[test]
    fn touch_and_mouse_give_same_gestures() {
        let p = Vec2::new(200.0, 150.0);
        let q = Vec2::new(230.0, 150.0);

        let mut mouse = tracker();
        let m = [
            Some(mouse.cursor_moved(p)),
            mouse.mouse_button(true),
            Some(mouse.cursor_moved(q)),
            mouse.mouse_button(false),
        ];

        let mut touch = tracker();
        let t = [
            None,
            touch.touch(1, TouchPhase::Started, p),
            touch.touch(1, TouchPhase::Moved, q),
            touch.touch(1, TouchPhase::Ended, q),
        ];

        assert_eq!(m[1], t[1]);
        assert_eq!(m[2], t[2]);
        assert_eq!(m[3], t[3]);
    }

    #[test]
    fn second_finger_is_ignored() {
        let mut t = tracker();
        t.touch(1, TouchPhase::Started, Vec2::ZERO);
        assert_eq!(t.touch(2, TouchPhase::Started, Vec2::ONE), None);
        assert_eq!(t.touch(2, TouchPhase::Moved, Vec2::ONE), None);
        assert_eq!(t.touch(2, TouchPhase::Ended, Vec2::ONE), None);
        assert!(t.is_pressed());
    }

    #[test]
    fn cancelled_touch_never_clicks() {
        let mut t = tracker();
        t.touch(4, TouchPhase::Started, Vec2::ZERO);
        assert_eq!(
            t.touch(4, TouchPhase::Cancelled, Vec2::ZERO),
            Some(Gesture::Released {
                pos: Vec2::ZERO,
                click: false
            })
        );
    }

    #[test]
    fn leaving_window_ends_press() {
        let mut t = tracker();
        assert_eq!(t.cursor_left(), None);
        t.mouse_button(true);
        assert!(matches!(
            t.cursor_left(),
            Some(Gesture::Released { click: false, .. })
        ));
        assert!(!t.is_pressed());
    }
}
