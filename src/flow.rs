//! Frame flow control.
//!
//! The render loop owned by the engine calls a [`FrameListener`] around every
//! frame; returning `false` from either hook ends the loop. This module
//! provides the listener trait and the [`FrameGate`], the listener that keeps
//! the loop running until escape is held.
//!
//! # Lifecycle
//!
//! 1. `frame_started()` is called before the frame is rendered
//! 2. the engine renders and presents the frame
//! 3. `frame_ended()` is called after presentation
//!
//! Both hooks run on the render thread and must return quickly.

use instant::Duration;

use crate::input::{KeyCode, Keyboard, Mouse};

/// Timing information handed to frame listeners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameEvent {
    /// Time since the previous `frame_started`.
    pub time_since_last_frame: Duration,
    /// Time since the previous hook of either kind.
    pub time_since_last_event: Duration,
}

/// Per-frame callback of the render loop.
///
/// Any `FnMut(&FrameEvent) -> bool` closure is a listener whose
/// `frame_started` is the closure.
pub trait FrameListener {
    /// Called before the next frame is rendered.
    fn frame_started(&mut self, event: &FrameEvent) -> bool;

    /// Called at the end of a frame.
    fn frame_ended(&mut self, _event: &FrameEvent) -> bool {
        true
    }
}

impl<F> FrameListener for F
where
    F: FnMut(&FrameEvent) -> bool,
{
    fn frame_started(&mut self, event: &FrameEvent) -> bool {
        self(event)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Running,
    /// Terminal.
    Stopped,
}

impl GateState {
    /// Feeds one poll of the escape key; returns whether rendering continues.
    pub fn advance(&mut self, escape_down: bool) -> bool {
        if escape_down {
            *self = GateState::Stopped;
        }
        *self == GateState::Running
    }
}

/// Keeps the render loop alive until escape is held at the start of a frame.
///
/// The gate borrows the devices for the duration of the loop; destroying
/// them afterwards is up to whoever created them.
pub struct FrameGate<'a> {
    keyboard: &'a mut dyn Keyboard,
    mouse: Option<&'a mut dyn Mouse>,
    state: GateState,
}

impl<'a> FrameGate<'a> {
    pub fn new(keyboard: &'a mut dyn Keyboard, mouse: Option<&'a mut dyn Mouse>) -> Self {
        Self {
            keyboard,
            mouse,
            state: GateState::Running,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }
}

impl FrameListener for FrameGate<'_> {
    fn frame_started(&mut self, _event: &FrameEvent) -> bool {
        if self.state == GateState::Stopped {
            return false;
        }
        self.keyboard.capture();
        if let Some(mouse) = self.mouse.as_mut() {
            mouse.capture();
        }

        let running = self.state.advance(self.keyboard.is_key_down(KeyCode::Escape));
        if !running {
            log::info!("escape pressed, leaving the render loop");
        }
        running
    }
}
