//! Windowed engine backend: winit for the window and input, wgpu for drawing.
//!
//! [`WinitRoot`] drives the winit event loop with `pump_app_events` so the
//! caller keeps control of the loop, the way a classic engine root's
//! `startRendering` does. Each frame pumps pending window events, notifies
//! the frame listener and clears the viewport to the background colour lit
//! by the scene's ambient light.

pub mod dialog;
pub mod input;

use std::{cell::RefCell, io, rc::Rc, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowAttributes, WindowId},
};

pub use self::input::WinitInput;
use self::input::{InputFeed, SharedFeed};
use crate::{
    context::Context,
    data_structures::scene_graph::SceneGraph,
    engine::{EngineError, RenderRoot, SceneType, WindowHandle, WindowMetrics},
    flow::{FrameEvent, FrameListener},
    resources::{ResourceGroupManager, ResourceGroups, ResourceIndex},
    scene::{Colour, SceneManager},
    settings::WindowSettings,
};

/// How long `initialise` waits for the platform to hand out the window.
const WINDOW_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives winit callbacks between pumps.
struct Shell {
    pending: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    creation_error: Option<String>,
    close_requested: bool,
    resized: Option<PhysicalSize<u32>>,
    feed: SharedFeed,
}

impl Shell {
    fn create_pending(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.pending.take() else {
            return;
        };
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.creation_error = Some(e.to_string()),
        }
    }
}

impl ApplicationHandler for Shell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => self.resized = Some(size),
            WindowEvent::KeyboardInput { event, .. } => self.feed.borrow_mut().push_key(&event),
            WindowEvent::CursorMoved { position, .. } => {
                self.feed.borrow_mut().push_cursor(position.x, position.y)
            }
            WindowEvent::MouseWheel { delta, .. } => self.feed.borrow_mut().push_wheel(delta),
            WindowEvent::MouseInput { state, button, .. } => {
                self.feed.borrow_mut().push_button(button, state)
            }
            _ => {}
        }
    }
}

#[derive(Debug)]
struct Viewport {
    camera: String,
    background: Colour,
}

/// [`RenderRoot`] backed by a real window.
pub struct WinitRoot {
    scene: Option<SceneGraph>,
    context: Option<Context>,
    shell: Shell,
    event_loop: EventLoop<()>,
    async_runtime: tokio::runtime::Runtime,
    resources: ResourceGroups,
    index: Option<ResourceIndex>,
    viewport: Option<Viewport>,
    prompt: Option<WindowSettings>,
}

impl WinitRoot {
    pub fn new() -> Result<Self, EngineError> {
        #[cfg(all(feature = "integration-tests", target_os = "linux"))]
        let event_loop = {
            use winit::platform::wayland::EventLoopBuilderExtWayland;

            EventLoop::builder().with_any_thread(true).build()
        };

        #[cfg(all(feature = "integration-tests", target_os = "windows"))]
        let event_loop = {
            use winit::platform::windows::EventLoopBuilderExtWindows;

            EventLoop::builder().with_any_thread(true).build()
        };

        #[cfg(not(all(
            feature = "integration-tests",
            any(target_os = "linux", target_os = "windows")
        )))]
        let event_loop = EventLoop::new();

        let event_loop = event_loop.map_err(|e| EngineError::WindowCreation(e.to_string()))?;
        let async_runtime =
            tokio::runtime::Runtime::new().map_err(|e| EngineError::Graphics(e.to_string()))?;
        Ok(Self {
            scene: None,
            context: None,
            shell: Shell {
                pending: None,
                window: None,
                creation_error: None,
                close_requested: false,
                resized: None,
                feed: Rc::new(RefCell::new(InputFeed::default())),
            },
            event_loop,
            async_runtime,
            resources: ResourceGroups::new(),
            index: None,
            viewport: None,
            prompt: None,
        })
    }

    /// Ask on the console whether to open `window` before initialising.
    pub fn with_config_prompt(mut self, window: &WindowSettings) -> Self {
        self.prompt = Some(window.clone());
        self
    }

    /// Input backend reading this root's window events.
    pub fn input(&self) -> WinitInput {
        WinitInput::new(self.shell.feed.clone())
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    fn window(&self) -> Result<&Arc<Window>, EngineError> {
        self.shell.window.as_ref().ok_or(EngineError::NoWindow)
    }

    fn pump(&mut self, timeout: Duration) -> PumpStatus {
        self.event_loop
            .pump_app_events(Some(timeout), &mut self.shell)
    }

    fn apply_resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.resize(size.width, size.height);
        }
        if size.height == 0 {
            return;
        }
        if let (Some(scene), Some(viewport)) = (self.scene.as_mut(), self.viewport.as_ref()) {
            if let Some(camera) = scene.camera_mut(&viewport.camera) {
                camera.aspect_ratio = size.width as f32 / size.height as f32;
            }
        }
    }

    fn draw(&mut self) -> Result<(), EngineError> {
        let Some(ctx) = self.context.as_mut() else {
            return Err(EngineError::NoWindow);
        };
        let background = self
            .viewport
            .as_ref()
            .map_or(Colour::BLACK, |v| v.background);
        let ambient = self
            .scene
            .as_ref()
            .map_or(Colour::BLACK, |s| s.ambient_light());
        ctx.clear_colour = Colour::new(
            background.r + ambient.r,
            background.g + ambient.g,
            background.b + ambient.b,
        )
        .into();

        match ctx.render() {
            Ok(()) => Ok(()),
            // Reconfigure the surface if it's lost or outdated
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("surface {}, reconfiguring", e);
                ctx.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(EngineError::Graphics("out of memory".to_string()))
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
                Ok(())
            }
        }
    }
}

impl RenderRoot for WinitRoot {
    fn resource_groups(&mut self) -> &mut dyn ResourceGroupManager {
        &mut self.resources
    }

    fn show_config_dialog(&mut self) -> Result<bool, EngineError> {
        let Some(window) = self.prompt.as_ref() else {
            return Ok(true);
        };
        let stdin = io::stdin();
        dialog::confirm(window, &mut stdin.lock(), &mut io::stdout()).map_err(EngineError::Dialog)
    }

    fn initialise(&mut self, window: &WindowSettings) -> Result<(), EngineError> {
        if self.shell.window.is_some() {
            return Ok(());
        }
        self.shell.pending = Some(
            Window::default_attributes()
                .with_title(window.title.clone())
                .with_inner_size(PhysicalSize::new(window.width, window.height)),
        );

        let deadline = Instant::now() + WINDOW_TIMEOUT;
        while self.shell.window.is_none() {
            if let PumpStatus::Exit(code) = self.pump(Duration::from_millis(16)) {
                return Err(EngineError::WindowCreation(format!(
                    "event loop exited with code {}",
                    code
                )));
            }
            if let Some(e) = self.shell.creation_error.take() {
                return Err(EngineError::WindowCreation(e));
            }
            if Instant::now() >= deadline {
                return Err(EngineError::WindowCreation(
                    "timed out waiting for the window".to_string(),
                ));
            }
        }

        let handle = self.window()?.clone();
        let ctx = self
            .async_runtime
            .block_on(Context::new(handle.clone()))
            .map_err(|e| EngineError::Graphics(e.to_string()))?;
        self.context = Some(ctx);
        self.shell.feed.borrow_mut().bind_window(u64::from(handle.id()));
        log::info!(
            "render window \"{}\" created ({}x{})",
            window.title,
            window.width,
            window.height
        );
        Ok(())
    }

    fn initialise_all_resource_groups(&mut self) -> Result<(), EngineError> {
        self.window()?;
        let index = self.resources.initialise_all()?;
        log::info!("{} resource group(s) initialised", index.group_count());
        self.index = Some(index);
        Ok(())
    }

    fn create_scene_manager(
        &mut self,
        kind: SceneType,
    ) -> Result<&mut dyn SceneManager, EngineError> {
        let index = self
            .index
            .clone()
            .ok_or(EngineError::ResourcesNotInitialised)?;
        log::debug!("scene manager created ({:?})", kind);
        self.viewport = None;
        let scene: &mut dyn SceneManager = self.scene.insert(SceneGraph::new(kind, Some(index)));
        Ok(scene)
    }

    fn add_viewport(&mut self, camera: &str, background: Colour) -> Result<(), EngineError> {
        let size = self.window()?.inner_size();
        let scene = self.scene.as_mut().ok_or(EngineError::NoSceneManager)?;
        let cam = scene
            .camera_mut(camera)
            .ok_or_else(|| EngineError::UnknownCamera(camera.to_string()))?;
        if size.height > 0 {
            cam.aspect_ratio = size.width as f32 / size.height as f32;
        }
        self.viewport = Some(Viewport {
            camera: camera.to_string(),
            background,
        });
        Ok(())
    }

    fn window_handle(&self) -> Result<WindowHandle, EngineError> {
        Ok(WindowHandle(u64::from(self.window()?.id())))
    }

    fn window_metrics(&self) -> Result<WindowMetrics, EngineError> {
        let window = self.window()?;
        let size = window.inner_size();
        let position = window.outer_position().unwrap_or_default();
        Ok(WindowMetrics {
            width: size.width,
            height: size.height,
            colour_depth: 32,
            left: position.x,
            top: position.y,
        })
    }

    fn start_rendering(&mut self, listener: &mut dyn FrameListener) -> Result<(), EngineError> {
        self.window()?;
        let mut last_started = Instant::now();
        let mut last_ended = last_started;
        let mut last_event = last_started;

        loop {
            if let PumpStatus::Exit(code) = self.pump(Duration::ZERO) {
                log::info!("event loop exited with code {}", code);
                break;
            }
            if self.shell.close_requested {
                log::info!("render window closed");
                break;
            }
            if let Some(size) = self.shell.resized.take() {
                self.apply_resize(size);
            }

            let now = Instant::now();
            let started = FrameEvent {
                time_since_last_frame: now - last_started,
                time_since_last_event: now - last_event,
            };
            last_started = now;
            last_event = now;
            if !listener.frame_started(&started) {
                break;
            }

            self.draw()?;

            let now = Instant::now();
            let ended = FrameEvent {
                time_since_last_frame: now - last_ended,
                time_since_last_event: now - last_event,
            };
            last_ended = now;
            last_event = now;
            if !listener.frame_ended(&ended) {
                break;
            }
        }
        Ok(())
    }

    fn shutdown(mut self) {
        self.viewport = None;
        self.scene = None;
        // The surface must go before the window it was created from.
        self.context = None;
        self.shell.window = None;
        log::info!("render root shut down");
    }
}
