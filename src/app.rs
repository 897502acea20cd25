//! Top-level driver.
//!
//! [`run`] sequences the engine and input collaborators: resources, window,
//! scene, viewport, input devices, then the blocking render loop gated by a
//! [`FrameGate`]. Everything acquired is released in reverse order once the
//! loop returns: input devices, then the input system, then the engine root.

use anyhow::Context as _;

use crate::{
    engine::{RenderRoot, WindowMetrics},
    flow::FrameGate,
    input::{
        InputBackend, InputError, InputManager, Keyboard, Mouse, ParamList, SimpleKeyListener,
        SimpleMouseListener,
    },
    resources::{load_resource_config, setup_resources},
    scene::build_scene,
    settings::Settings,
};

/// How a run ended without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// The render loop finished (escape or window closed).
    Graceful,
    /// The user declined the configuration dialog.
    Cancelled,
}

/// Runs the application until the frame gate stops the render loop.
///
/// Startup failures release the root and return the error. Errors from the
/// render loop are reported after teardown.
pub fn run<R, I>(mut root: R, mut input: I, settings: &Settings) -> anyhow::Result<Exit>
where
    R: RenderRoot,
    I: InputBackend,
{
    let (params, metrics) = match startup(&mut root, settings) {
        Ok(Some(ready)) => ready,
        Ok(None) => {
            log::info!("configuration cancelled");
            root.shutdown();
            return Ok(Exit::Cancelled);
        }
        Err(e) => {
            root.shutdown();
            return Err(e);
        }
    };

    let manager = match input.create_input_system(&params) {
        Ok(manager) => manager,
        Err(e) => {
            root.shutdown();
            return Err(e).context("cannot create the input system");
        }
    };

    let mut session = InputSession::new(manager);
    let outcome = match session.attach_devices(metrics) {
        Ok(()) => session.render(&mut root),
        Err(e) => Err(e).context("cannot create input devices"),
    };

    session.teardown();
    root.shutdown();
    log::info!("shut down");

    outcome.map(|()| Exit::Graceful)
}

fn startup<R: RenderRoot>(
    root: &mut R,
    settings: &Settings,
) -> anyhow::Result<Option<(ParamList, WindowMetrics)>> {
    let locations = load_resource_config(&settings.resources).with_context(|| {
        format!(
            "cannot load resource locations from {:?}",
            settings.resources
        )
    })?;
    setup_resources(root.resource_groups(), &locations)?;

    if !root.show_config_dialog()? {
        return Ok(None);
    }

    root.initialise(&settings.window)
        .context("cannot initialise the render window")?;
    root.initialise_all_resource_groups()
        .context("cannot initialise resource groups")?;

    let scene = root.create_scene_manager(settings.scene.scene_type)?;
    build_scene(scene, &settings.scene).context("cannot build the scene")?;
    root.add_viewport(&settings.scene.camera.name, settings.window.background)?;

    let handle = root.window_handle()?;
    let metrics = root.window_metrics()?;
    Ok(Some((ParamList::for_window(handle), metrics)))
}

/// Input system plus the devices created from it.
struct InputSession {
    manager: Box<dyn InputManager>,
    keyboard: Option<Box<dyn Keyboard>>,
    mouse: Option<Box<dyn Mouse>>,
}

impl InputSession {
    fn new(manager: Box<dyn InputManager>) -> Self {
        Self {
            manager,
            keyboard: None,
            mouse: None,
        }
    }

    fn attach_devices(&mut self, metrics: WindowMetrics) -> Result<(), InputError> {
        let mut keyboard = self.manager.create_keyboard(true)?;
        keyboard.set_event_callback(Box::new(SimpleKeyListener));
        self.keyboard = Some(keyboard);

        let mut mouse = self.manager.create_mouse(true)?;
        mouse.set_clip_area(metrics.width, metrics.height);
        mouse.set_event_callback(Box::new(SimpleMouseListener));
        self.mouse = Some(mouse);
        Ok(())
    }

    fn render<R: RenderRoot>(&mut self, root: &mut R) -> anyhow::Result<()> {
        let Some(keyboard) = self.keyboard.as_deref_mut() else {
            anyhow::bail!("no keyboard attached");
        };
        let mouse = self.mouse.as_deref_mut().map(|m| m as &mut dyn Mouse);
        let mut gate = FrameGate::new(keyboard, mouse);
        log::info!("entering the render loop");
        root.start_rendering(&mut gate).context("render loop failed")
    }

    /// Devices first, then the manager.
    fn teardown(mut self) {
        if let Some(mouse) = self.mouse.take() {
            self.manager.destroy_mouse(mouse);
        }
        if let Some(keyboard) = self.keyboard.take() {
            self.manager.destroy_keyboard(keyboard);
        }
        self.manager.destroy_input_system();
    }
}
