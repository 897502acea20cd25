//! Keyboard and mouse devices fed from winit window events.
//!
//! The window's event handler pushes raw events into a shared [`InputFeed`];
//! devices drain it on `capture`. Events are only queued while the matching
//! device exists.

use std::{
    cell::RefCell,
    collections::{HashSet, VecDeque},
    rc::Rc,
};

use winit::{
    event::{ElementState, MouseScrollDelta},
    keyboard::{KeyCode as WinitKey, PhysicalKey},
};

use crate::input::{
    InputBackend, InputError, InputManager, KeyCode, KeyEvent, KeyListener, Keyboard, Mouse,
    MouseButton, MouseEvent, MouseListener, MouseState, ParamList, WINDOW_PARAM,
};

/// Wheel distance reported for one notch of a line-based scroll wheel.
const WHEEL_DELTA: f32 = 120.0;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RawMouse {
    Moved { x: i32, y: i32 },
    Wheel(i32),
    Button(MouseButton, bool),
}

#[derive(Debug, Default)]
pub(crate) struct InputFeed {
    window: Option<u64>,
    keyboard_attached: bool,
    mouse_attached: bool,
    keys: VecDeque<(KeyEvent, bool)>,
    mouse: VecDeque<RawMouse>,
}

pub(crate) type SharedFeed = Rc<RefCell<InputFeed>>;

impl InputFeed {
    pub(crate) fn bind_window(&mut self, id: u64) {
        self.window = Some(id);
    }

    pub(crate) fn push_key(&mut self, event: &winit::event::KeyEvent) {
        if !self.keyboard_attached || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let text = event.text.as_ref().and_then(|t| t.chars().next());
        self.queue_key(code, event.state == ElementState::Pressed, text);
    }

    /// Queues one key transition. Text is only kept for presses.
    pub(crate) fn queue_key(&mut self, code: WinitKey, pressed: bool, text: Option<char>) {
        if !self.keyboard_attached {
            return;
        }
        let key = map_key(code);
        if key == KeyCode::Unassigned {
            log::debug!("unmapped key {:?}", code);
        }
        let text = if pressed { text } else { None };
        self.keys.push_back((KeyEvent { key, text }, pressed));
    }

    pub(crate) fn push_cursor(&mut self, x: f64, y: f64) {
        if self.mouse_attached {
            self.mouse.push_back(RawMouse::Moved {
                x: x as i32,
                y: y as i32,
            });
        }
    }

    pub(crate) fn push_wheel(&mut self, delta: MouseScrollDelta) {
        if !self.mouse_attached {
            return;
        }
        let z = match delta {
            MouseScrollDelta::LineDelta(_, y) => (y * WHEEL_DELTA) as i32,
            MouseScrollDelta::PixelDelta(pos) => pos.y as i32,
        };
        self.mouse.push_back(RawMouse::Wheel(z));
    }

    pub(crate) fn push_button(&mut self, button: winit::event::MouseButton, state: ElementState) {
        if self.mouse_attached {
            self.mouse
                .push_back(RawMouse::Button(map_button(button), state.is_pressed()));
        }
    }
}

/// [`InputBackend`] bound to the window of a [`super::WinitRoot`].
pub struct WinitInput {
    feed: SharedFeed,
}

impl WinitInput {
    pub(crate) fn new(feed: SharedFeed) -> Self {
        Self { feed }
    }
}

impl InputBackend for WinitInput {
    fn create_input_system(
        &mut self,
        params: &ParamList,
    ) -> Result<Box<dyn InputManager>, InputError> {
        let window = params.get(WINDOW_PARAM).ok_or(InputError::MissingWindow)?;
        let bound = self.feed.borrow().window;
        match window.parse::<u64>() {
            Ok(id) if Some(id) == bound => {
                log::debug!("input system created for window {}", id);
                Ok(Box::new(WinitInputManager {
                    feed: self.feed.clone(),
                }))
            }
            _ => Err(InputError::UnknownWindow(window.to_string())),
        }
    }
}

pub struct WinitInputManager {
    feed: SharedFeed,
}

impl InputManager for WinitInputManager {
    fn create_keyboard(&mut self, buffered: bool) -> Result<Box<dyn Keyboard>, InputError> {
        let mut feed = self.feed.borrow_mut();
        if feed.keyboard_attached {
            return Err(InputError::DeviceBusy("keyboard"));
        }
        feed.keyboard_attached = true;
        Ok(Box::new(WinitKeyboard {
            feed: self.feed.clone(),
            buffered,
            down: HashSet::new(),
            listener: None,
        }))
    }

    fn create_mouse(&mut self, buffered: bool) -> Result<Box<dyn Mouse>, InputError> {
        let mut feed = self.feed.borrow_mut();
        if feed.mouse_attached {
            return Err(InputError::DeviceBusy("mouse"));
        }
        feed.mouse_attached = true;
        Ok(Box::new(WinitMouse {
            feed: self.feed.clone(),
            buffered,
            state: MouseState::default(),
            listener: None,
        }))
    }

    fn destroy_keyboard(&mut self, keyboard: Box<dyn Keyboard>) {
        drop(keyboard);
        let mut feed = self.feed.borrow_mut();
        feed.keyboard_attached = false;
        feed.keys.clear();
        log::debug!("keyboard destroyed");
    }

    fn destroy_mouse(&mut self, mouse: Box<dyn Mouse>) {
        drop(mouse);
        let mut feed = self.feed.borrow_mut();
        feed.mouse_attached = false;
        feed.mouse.clear();
        log::debug!("mouse destroyed");
    }

    fn destroy_input_system(self: Box<Self>) {
        log::debug!("input system destroyed");
    }
}

pub struct WinitKeyboard {
    feed: SharedFeed,
    buffered: bool,
    down: HashSet<KeyCode>,
    listener: Option<Box<dyn KeyListener>>,
}

impl Keyboard for WinitKeyboard {
    fn capture(&mut self) {
        let events: Vec<_> = self.feed.borrow_mut().keys.drain(..).collect();
        for (event, pressed) in events {
            if pressed {
                self.down.insert(event.key);
            } else {
                self.down.remove(&event.key);
            }
            if !self.buffered {
                continue;
            }
            if let Some(listener) = self.listener.as_mut() {
                if pressed {
                    listener.key_pressed(&event);
                } else {
                    listener.key_released(&event);
                }
            }
        }
    }

    fn is_key_down(&self, key: KeyCode) -> bool {
        self.down.contains(&key)
    }

    fn set_event_callback(&mut self, listener: Box<dyn KeyListener>) {
        self.listener = Some(listener);
    }
}

pub struct WinitMouse {
    feed: SharedFeed,
    buffered: bool,
    state: MouseState,
    listener: Option<Box<dyn MouseListener>>,
}

impl Mouse for WinitMouse {
    fn capture(&mut self) {
        self.state.x.rel = 0;
        self.state.y.rel = 0;
        self.state.z.rel = 0;

        let events: Vec<_> = self.feed.borrow_mut().mouse.drain(..).collect();
        for raw in events {
            match raw {
                RawMouse::Moved { x, y } => {
                    self.state.x.rel += x - self.state.x.abs;
                    self.state.y.rel += y - self.state.y.abs;
                    self.state.x.abs = x;
                    self.state.y.abs = y;
                    self.state.clip();
                    self.dispatch(|l, e| l.mouse_moved(e));
                }
                RawMouse::Wheel(z) => {
                    self.state.z.rel += z;
                    self.state.z.abs += z;
                    self.dispatch(|l, e| l.mouse_moved(e));
                }
                RawMouse::Button(button, true) => {
                    self.state.set_button(button, true);
                    self.dispatch(|l, e| l.mouse_pressed(e, button));
                }
                RawMouse::Button(button, false) => {
                    self.state.set_button(button, false);
                    self.dispatch(|l, e| l.mouse_released(e, button));
                }
            }
        }
    }

    fn state(&self) -> &MouseState {
        &self.state
    }

    fn set_clip_area(&mut self, width: u32, height: u32) {
        self.state.width = width;
        self.state.height = height;
        self.state.clip();
    }

    fn set_event_callback(&mut self, listener: Box<dyn MouseListener>) {
        self.listener = Some(listener);
    }
}

impl WinitMouse {
    fn dispatch(&mut self, f: impl FnOnce(&mut dyn MouseListener, &MouseEvent) -> bool) {
        if !self.buffered {
            return;
        }
        if let Some(listener) = self.listener.as_deref_mut() {
            let event = MouseEvent {
                state: self.state.clone(),
            };
            f(listener, &event);
        }
    }
}

fn map_button(button: winit::event::MouseButton) -> MouseButton {
    use winit::event::MouseButton as B;
    match button {
        B::Left => MouseButton::Left,
        B::Right => MouseButton::Right,
        B::Middle => MouseButton::Middle,
        B::Back => MouseButton::Back,
        B::Forward => MouseButton::Forward,
        B::Other(n) => MouseButton::Other(n.min(u8::MAX as u16) as u8),
    }
}

pub(crate) fn map_key(code: WinitKey) -> KeyCode {
    match code {
        WinitKey::Escape => KeyCode::Escape,
        WinitKey::Enter | WinitKey::NumpadEnter => KeyCode::Enter,
        WinitKey::Space => KeyCode::Space,
        WinitKey::Tab => KeyCode::Tab,
        WinitKey::Backspace => KeyCode::Backspace,
        WinitKey::ArrowUp => KeyCode::Up,
        WinitKey::ArrowDown => KeyCode::Down,
        WinitKey::ArrowLeft => KeyCode::Left,
        WinitKey::ArrowRight => KeyCode::Right,
        WinitKey::ShiftLeft => KeyCode::LShift,
        WinitKey::ShiftRight => KeyCode::RShift,
        WinitKey::ControlLeft => KeyCode::LControl,
        WinitKey::ControlRight => KeyCode::RControl,
        WinitKey::AltLeft => KeyCode::LAlt,
        WinitKey::AltRight => KeyCode::RAlt,
        WinitKey::KeyA => KeyCode::A,
        WinitKey::KeyB => KeyCode::B,
        WinitKey::KeyC => KeyCode::C,
        WinitKey::KeyD => KeyCode::D,
        WinitKey::KeyE => KeyCode::E,
        WinitKey::KeyF => KeyCode::F,
        WinitKey::KeyG => KeyCode::G,
        WinitKey::KeyH => KeyCode::H,
        WinitKey::KeyI => KeyCode::I,
        WinitKey::KeyJ => KeyCode::J,
        WinitKey::KeyK => KeyCode::K,
        WinitKey::KeyL => KeyCode::L,
        WinitKey::KeyM => KeyCode::M,
        WinitKey::KeyN => KeyCode::N,
        WinitKey::KeyO => KeyCode::O,
        WinitKey::KeyP => KeyCode::P,
        WinitKey::KeyQ => KeyCode::Q,
        WinitKey::KeyR => KeyCode::R,
        WinitKey::KeyS => KeyCode::S,
        WinitKey::KeyT => KeyCode::T,
        WinitKey::KeyU => KeyCode::U,
        WinitKey::KeyV => KeyCode::V,
        WinitKey::KeyW => KeyCode::W,
        WinitKey::KeyX => KeyCode::X,
        WinitKey::KeyY => KeyCode::Y,
        WinitKey::KeyZ => KeyCode::Z,
        WinitKey::Digit0 => KeyCode::Num0,
        WinitKey::Digit1 => KeyCode::Num1,
        WinitKey::Digit2 => KeyCode::Num2,
        WinitKey::Digit3 => KeyCode::Num3,
        WinitKey::Digit4 => KeyCode::Num4,
        WinitKey::Digit5 => KeyCode::Num5,
        WinitKey::Digit6 => KeyCode::Num6,
        WinitKey::Digit7 => KeyCode::Num7,
        WinitKey::Digit8 => KeyCode::Num8,
        WinitKey::Digit9 => KeyCode::Num9,
        WinitKey::F1 => KeyCode::F1,
        WinitKey::F2 => KeyCode::F2,
        WinitKey::F3 => KeyCode::F3,
        WinitKey::F4 => KeyCode::F4,
        WinitKey::F5 => KeyCode::F5,
        WinitKey::F6 => KeyCode::F6,
        WinitKey::F7 => KeyCode::F7,
        WinitKey::F8 => KeyCode::F8,
        WinitKey::F9 => KeyCode::F9,
        WinitKey::F10 => KeyCode::F10,
        WinitKey::F11 => KeyCode::F11,
        WinitKey::F12 => KeyCode::F12,
        _ => KeyCode::Unassigned,
    }
}
