//! Input devices and their listeners.
//!
//! The shape follows classic polled input libraries: an [`InputManager`] is
//! created for a window from a [`ParamList`], hands out [`Keyboard`] and
//! [`Mouse`] objects, and those devices are `capture`d once per frame. In
//! buffered mode `capture` also dispatches the queued events to the
//! registered [`KeyListener`] / [`MouseListener`].
//!
//! Listeners return `true` when they handled an event. [`SimpleKeyListener`]
//! and [`SimpleMouseListener`] accept everything and change nothing.

use thiserror::Error;

use crate::engine::WindowHandle;

/// Parameter key carrying the native window handle.
pub const WINDOW_PARAM: &str = "WINDOW";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("parameter list has no `WINDOW` entry")]
    MissingWindow,

    #[error("`{0}` does not name a window this input backend is bound to")]
    UnknownWindow(String),

    #[error("a {0} has already been created; destroy it first")]
    DeviceBusy(&'static str),
}

/// Ordered multimap of string parameters used to create an input system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamList {
    params: Vec<(String, String)>,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_window(handle: WindowHandle) -> Self {
        let mut params = Self::new();
        params.insert(WINDOW_PARAM, handle.to_string());
        params
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push((key.into(), value.into()));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    LShift,
    RShift,
    LControl,
    RControl,
    LAlt,
    RAlt,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Unassigned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u8),
}

impl MouseButton {
    fn bit(self) -> u32 {
        let idx = match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Middle => 2,
            Self::Back => 3,
            Self::Forward => 4,
            Self::Other(n) => n.min(31) as u32,
        };
        1 << idx
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    /// Text produced by the key press, if any.
    pub text: Option<char>,
}

/// One axis of mouse movement: absolute position and change since the last capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Axis {
    pub abs: i32,
    pub rel: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MouseState {
    pub x: Axis,
    pub y: Axis,
    /// Wheel.
    pub z: Axis,
    buttons: u32,
    /// Clip area the absolute X/Y are clamped to.
    pub width: u32,
    pub height: u32,
}

impl MouseState {
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons & button.bit() != 0
    }

    pub fn set_button(&mut self, button: MouseButton, down: bool) {
        if down {
            self.buttons |= button.bit();
        } else {
            self.buttons &= !button.bit();
        }
    }

    /// Clamps the absolute position into the clip area.
    pub fn clip(&mut self) {
        self.x.abs = self.x.abs.clamp(0, i32::try_from(self.width).unwrap_or(i32::MAX));
        self.y.abs = self.y.abs.clamp(0, i32::try_from(self.height).unwrap_or(i32::MAX));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub state: MouseState,
}

pub trait KeyListener {
    fn key_pressed(&mut self, event: &KeyEvent) -> bool;
    fn key_released(&mut self, event: &KeyEvent) -> bool;
}

pub trait MouseListener {
    fn mouse_moved(&mut self, event: &MouseEvent) -> bool;
    fn mouse_pressed(&mut self, event: &MouseEvent, button: MouseButton) -> bool;
    fn mouse_released(&mut self, event: &MouseEvent, button: MouseButton) -> bool;
}

/// Acknowledges every key event without acting on it.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleKeyListener;

impl KeyListener for SimpleKeyListener {
    fn key_pressed(&mut self, _: &KeyEvent) -> bool {
        true
    }

    fn key_released(&mut self, _: &KeyEvent) -> bool {
        true
    }
}

/// Acknowledges every mouse event without acting on it.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleMouseListener;

impl MouseListener for SimpleMouseListener {
    fn mouse_moved(&mut self, _: &MouseEvent) -> bool {
        true
    }

    fn mouse_pressed(&mut self, _: &MouseEvent, _: MouseButton) -> bool {
        true
    }

    fn mouse_released(&mut self, _: &MouseEvent, _: MouseButton) -> bool {
        true
    }
}

pub trait Keyboard {
    /// Pulls pending input from the device; dispatches events when buffered.
    fn capture(&mut self);

    /// State as of the last `capture`.
    fn is_key_down(&self, key: KeyCode) -> bool;

    fn set_event_callback(&mut self, listener: Box<dyn KeyListener>);
}

pub trait Mouse {
    fn capture(&mut self);

    fn state(&self) -> &MouseState;

    fn set_clip_area(&mut self, width: u32, height: u32);

    fn set_event_callback(&mut self, listener: Box<dyn MouseListener>);
}

/// Owner of the input devices of one window.
pub trait InputManager {
    fn create_keyboard(&mut self, buffered: bool) -> Result<Box<dyn Keyboard>, InputError>;

    fn create_mouse(&mut self, buffered: bool) -> Result<Box<dyn Mouse>, InputError>;

    fn destroy_keyboard(&mut self, keyboard: Box<dyn Keyboard>);

    fn destroy_mouse(&mut self, mouse: Box<dyn Mouse>);

    /// Releases the manager itself; every device must be destroyed first.
    fn destroy_input_system(self: Box<Self>);
}

/// Factory for input managers.
pub trait InputBackend {
    fn create_input_system(
        &mut self,
        params: &ParamList,
    ) -> Result<Box<dyn InputManager>, InputError>;
}
