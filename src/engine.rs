//! The rendering engine as seen by the application.
//!
//! [`RenderRoot`] is the single handle the driver owns. It exposes the
//! resource manager, the render window, the scene manager and the blocking
//! render loop. Calls have to follow the engine's ordering rules (window
//! before resource groups, resource groups before the scene, camera before
//! the viewport); violations are reported as [`EngineError`]s.

use std::fmt;

use thiserror::Error;

pub use crate::scene::SceneType;
use crate::{
    flow::FrameListener,
    resources::{ResourceError, ResourceGroupManager},
    scene::{Colour, SceneError, SceneManager},
    settings::WindowSettings,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot create the render window: {0}")]
    WindowCreation(String),

    #[error("the render window has not been created yet")]
    NoWindow,

    #[error("resource groups have not been initialised yet")]
    ResourcesNotInitialised,

    #[error("no scene manager has been created yet")]
    NoSceneManager,

    #[error("no camera named `{0}`")]
    UnknownCamera(String),

    #[error("configuration dialog failed: {0}")]
    Dialog(#[source] std::io::Error),

    #[error("graphics error: {0}")]
    Graphics(String),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Native window identifier, passed to the input system as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowMetrics {
    pub width: u32,
    pub height: u32,
    pub colour_depth: u32,
    pub left: i32,
    pub top: i32,
}

pub trait RenderRoot {
    fn resource_groups(&mut self) -> &mut dyn ResourceGroupManager;

    /// Returns `false` when the user cancelled.
    fn show_config_dialog(&mut self) -> Result<bool, EngineError>;

    fn initialise(&mut self, window: &WindowSettings) -> Result<(), EngineError>;

    fn initialise_all_resource_groups(&mut self) -> Result<(), EngineError>;

    fn create_scene_manager(&mut self, kind: SceneType)
    -> Result<&mut dyn SceneManager, EngineError>;

    fn add_viewport(&mut self, camera: &str, background: Colour) -> Result<(), EngineError>;

    fn window_handle(&self) -> Result<WindowHandle, EngineError>;

    fn window_metrics(&self) -> Result<WindowMetrics, EngineError>;

    /// Blocks until `listener` returns `false` or the window is closed.
    fn start_rendering(&mut self, listener: &mut dyn FrameListener) -> Result<(), EngineError>;

    fn shutdown(self);
}
