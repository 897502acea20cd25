//! flow-scene
//!
//! A minimal windowed 3D scene application. It reads resource locations from
//! a `resources.cfg`-style file, opens a render window, builds a small scene
//! (ground plane, a mesh, three lights and a camera) and renders until the
//! escape key is held. Engine and input are reached through traits, so the
//! driver runs against the winit/wgpu backend or any other implementation.
//!
//! High-level modules
//! - `app`: the driver sequencing startup, the render loop and teardown
//! - `backend`: winit window, input devices and wgpu frame clearing
//! - `context`: GPU surface, device and queue of the render window
//! - `data_structures`: scene graph and transforms
//! - `engine`: the `RenderRoot` contract
//! - `flow`: frame listeners and the escape-key frame gate
//! - `input`: input system, keyboard, mouse and listener contracts
//! - `resources`: config file reader, resource groups, archives and meshes
//! - `scene`: scene descriptors and `build_scene`
//! - `settings`: TOML application settings
//!

pub mod app;
pub mod backend;
pub mod context;
pub mod data_structures;
pub mod engine;
pub mod flow;
pub mod input;
pub mod resources;
pub mod scene;
pub mod settings;

// Re-exports commonly used types for convenience in downstream code.
pub use app::{Exit, run};
pub use engine::{EngineError, RenderRoot};
pub use flow::{FrameEvent, FrameGate, FrameListener};
pub use scene::{SceneDescriptor, build_scene};
pub use settings::Settings;
