//! Recording doubles for the engine and input collaborators.
//!
//! Every fake appends to one shared [`CallLog`], so tests can assert on the
//! exact interleaving of engine, scene and input calls.

use std::{cell::RefCell, rc::Rc};

use cgmath::Vector3;
use flow_scene::{
    engine::{EngineError, RenderRoot, SceneType, WindowHandle, WindowMetrics},
    flow::{FrameEvent, FrameListener},
    input::{
        InputBackend, InputError, InputManager, KeyCode, KeyListener, Keyboard, Mouse,
        MouseListener, MouseState, ParamList, WINDOW_PARAM,
    },
    resources::{ResourceError, ResourceGroupManager},
    scene::{
        CameraDescriptor, Colour, EntityId, LightDescriptor, NodeId, PlaneDescriptor, SceneError,
        SceneManager, ShadowTechnique,
    },
    settings::WindowSettings,
};

pub const FAKE_WINDOW: WindowHandle = WindowHandle(42);
pub const FAKE_METRICS: WindowMetrics = WindowMetrics {
    width: 800,
    height: 600,
    colour_depth: 32,
    left: 10,
    top: 20,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    AddResourceLocation {
        path: String,
        kind: String,
        group: String,
    },
    ShowConfigDialog,
    Initialise(String),
    InitialiseResourceGroups,
    CreateSceneManager(SceneType),
    AddViewport(String),
    WindowHandle,
    WindowMetrics,
    StartRendering,
    FrameStarted,
    FrameEnded,
    Shutdown,

    SetAmbientLight(Colour),
    SetShadowTechnique(ShadowTechnique),
    CreatePlaneMesh(String),
    CreateEntity { name: String, mesh: String },
    SetMaterial(String, String),
    SetCastShadows(String, bool),
    CreateChildNode(NodeId),
    AttachEntity(NodeId, String),
    CreateLight(String),
    CreateCamera(String),

    CreateInputSystem(Option<String>),
    CreateKeyboard(bool),
    CreateMouse(bool),
    SetClipArea(u32, u32),
    DestroyKeyboard,
    DestroyMouse,
    DestroyInputSystem,
}

#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.0.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.0.borrow().iter().position(|c| c == call)
    }

    /// Calls that match `keep`, in order.
    pub fn filtered(&self, keep: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.0.borrow().iter().filter(|c| keep(c)).cloned().collect()
    }
}

/// Scene manager that records calls and hands out sequential ids.
pub struct FakeScene {
    log: CallLog,
    entities: Vec<String>,
    nodes: usize,
    missing_meshes: Vec<String>,
}

impl FakeScene {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            entities: Vec::new(),
            nodes: 1,
            missing_meshes: Vec::new(),
        }
    }

    /// Makes `create_entity` fail for `mesh`.
    pub fn without_mesh(mut self, mesh: &str) -> Self {
        self.missing_meshes.push(mesh.to_string());
        self
    }

    fn entity_name(&self, id: EntityId) -> Result<String, SceneError> {
        self.entities
            .get(id.0)
            .cloned()
            .ok_or(SceneError::UnknownEntity(id))
    }
}

impl SceneManager for FakeScene {
    fn set_ambient_light(&mut self, colour: Colour) {
        self.log.push(Call::SetAmbientLight(colour));
    }

    fn set_shadow_technique(&mut self, technique: ShadowTechnique) {
        self.log.push(Call::SetShadowTechnique(technique));
    }

    fn create_plane_mesh(&mut self, plane: &PlaneDescriptor) -> Result<(), SceneError> {
        self.log.push(Call::CreatePlaneMesh(plane.name.clone()));
        Ok(())
    }

    fn create_entity(&mut self, name: &str, mesh: &str) -> Result<EntityId, SceneError> {
        self.log.push(Call::CreateEntity {
            name: name.to_string(),
            mesh: mesh.to_string(),
        });
        if self.missing_meshes.iter().any(|m| m == mesh) {
            return Err(SceneError::Resource {
                entity: name.to_string(),
                source: ResourceError::NotFound(mesh.to_string()),
            });
        }
        self.entities.push(name.to_string());
        Ok(EntityId(self.entities.len() - 1))
    }

    fn set_material(&mut self, entity: EntityId, material: &str) -> Result<(), SceneError> {
        let name = self.entity_name(entity)?;
        self.log.push(Call::SetMaterial(name, material.to_string()));
        Ok(())
    }

    fn set_cast_shadows(&mut self, entity: EntityId, cast: bool) -> Result<(), SceneError> {
        let name = self.entity_name(entity)?;
        self.log.push(Call::SetCastShadows(name, cast));
        Ok(())
    }

    fn root_node(&self) -> NodeId {
        NodeId(0)
    }

    fn create_child_node(
        &mut self,
        parent: NodeId,
        _position: Vector3<f32>,
    ) -> Result<NodeId, SceneError> {
        self.log.push(Call::CreateChildNode(parent));
        let id = NodeId(self.nodes);
        self.nodes += 1;
        Ok(id)
    }

    fn attach_entity(&mut self, node: NodeId, entity: EntityId) -> Result<(), SceneError> {
        let name = self.entity_name(entity)?;
        self.log.push(Call::AttachEntity(node, name));
        Ok(())
    }

    fn create_light(&mut self, light: &LightDescriptor) -> Result<(), SceneError> {
        self.log.push(Call::CreateLight(light.name.clone()));
        Ok(())
    }

    fn create_camera(&mut self, camera: &CameraDescriptor) -> Result<(), SceneError> {
        self.log.push(Call::CreateCamera(camera.name.clone()));
        Ok(())
    }
}

/// Engine root whose render loop runs until the listener stops it.
pub struct FakeRoot {
    log: CallLog,
    scene: FakeScene,
    /// Answer of the configuration dialog.
    pub accept_config: bool,
    pub fail_initialise: bool,
    /// Safety net for listeners that never stop.
    pub max_frames: usize,
}

impl FakeRoot {
    pub fn new(log: CallLog) -> Self {
        Self {
            scene: FakeScene::new(log.clone()),
            log,
            accept_config: true,
            fail_initialise: false,
            max_frames: 1000,
        }
    }
}

impl ResourceGroupManager for CallLog {
    fn add_resource_location(
        &mut self,
        archive_path: &str,
        archive_type: &str,
        group: &str,
    ) -> Result<(), ResourceError> {
        self.push(Call::AddResourceLocation {
            path: archive_path.to_string(),
            kind: archive_type.to_string(),
            group: group.to_string(),
        });
        Ok(())
    }
}

impl RenderRoot for FakeRoot {
    fn resource_groups(&mut self) -> &mut dyn ResourceGroupManager {
        &mut self.log
    }

    fn show_config_dialog(&mut self) -> Result<bool, EngineError> {
        self.log.push(Call::ShowConfigDialog);
        Ok(self.accept_config)
    }

    fn initialise(&mut self, window: &WindowSettings) -> Result<(), EngineError> {
        self.log.push(Call::Initialise(window.title.clone()));
        if self.fail_initialise {
            return Err(EngineError::WindowCreation("no display".to_string()));
        }
        Ok(())
    }

    fn initialise_all_resource_groups(&mut self) -> Result<(), EngineError> {
        self.log.push(Call::InitialiseResourceGroups);
        Ok(())
    }

    fn create_scene_manager(
        &mut self,
        kind: SceneType,
    ) -> Result<&mut dyn SceneManager, EngineError> {
        self.log.push(Call::CreateSceneManager(kind));
        Ok(&mut self.scene)
    }

    fn add_viewport(&mut self, camera: &str, _background: Colour) -> Result<(), EngineError> {
        self.log.push(Call::AddViewport(camera.to_string()));
        Ok(())
    }

    fn window_handle(&self) -> Result<WindowHandle, EngineError> {
        self.log.push(Call::WindowHandle);
        Ok(FAKE_WINDOW)
    }

    fn window_metrics(&self) -> Result<WindowMetrics, EngineError> {
        self.log.push(Call::WindowMetrics);
        Ok(FAKE_METRICS)
    }

    fn start_rendering(&mut self, listener: &mut dyn FrameListener) -> Result<(), EngineError> {
        self.log.push(Call::StartRendering);
        let event = FrameEvent::default();
        for _ in 0..self.max_frames {
            self.log.push(Call::FrameStarted);
            if !listener.frame_started(&event) {
                break;
            }
            self.log.push(Call::FrameEnded);
            if !listener.frame_ended(&event) {
                break;
            }
        }
        Ok(())
    }

    fn shutdown(self) {
        self.log.push(Call::Shutdown);
    }
}

/// Keyboard whose escape key goes down on the `escape_at`-th capture.
pub struct FakeKeyboard {
    pub captures: usize,
    pub escape_at: Option<usize>,
}

impl FakeKeyboard {
    pub fn new(escape_at: Option<usize>) -> Self {
        Self {
            captures: 0,
            escape_at,
        }
    }
}

impl Keyboard for FakeKeyboard {
    fn capture(&mut self) {
        self.captures += 1;
    }

    fn is_key_down(&self, key: KeyCode) -> bool {
        key == KeyCode::Escape && self.escape_at.is_some_and(|at| self.captures >= at)
    }

    fn set_event_callback(&mut self, _listener: Box<dyn KeyListener>) {}
}

#[derive(Default)]
pub struct FakeMouse {
    pub captures: usize,
    state: MouseState,
    log: Option<CallLog>,
}

impl FakeMouse {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mouse for FakeMouse {
    fn capture(&mut self) {
        self.captures += 1;
    }

    fn state(&self) -> &MouseState {
        &self.state
    }

    fn set_clip_area(&mut self, width: u32, height: u32) {
        self.state.width = width;
        self.state.height = height;
        if let Some(log) = &self.log {
            log.push(Call::SetClipArea(width, height));
        }
    }

    fn set_event_callback(&mut self, _listener: Box<dyn MouseListener>) {}
}

/// Input backend whose keyboard reports escape on the given capture.
pub struct FakeInput {
    log: CallLog,
    escape_at: Option<usize>,
    pub fail_system: bool,
    pub fail_mouse: bool,
}

impl FakeInput {
    pub fn new(log: CallLog, escape_at: Option<usize>) -> Self {
        Self {
            log,
            escape_at,
            fail_system: false,
            fail_mouse: false,
        }
    }
}

impl InputBackend for FakeInput {
    fn create_input_system(
        &mut self,
        params: &ParamList,
    ) -> Result<Box<dyn InputManager>, InputError> {
        let window = params.get(WINDOW_PARAM).map(str::to_string);
        self.log.push(Call::CreateInputSystem(window));
        if self.fail_system {
            return Err(InputError::MissingWindow);
        }
        Ok(Box::new(FakeInputManager {
            log: self.log.clone(),
            escape_at: self.escape_at,
            fail_mouse: self.fail_mouse,
        }))
    }
}

struct FakeInputManager {
    log: CallLog,
    escape_at: Option<usize>,
    fail_mouse: bool,
}

impl InputManager for FakeInputManager {
    fn create_keyboard(&mut self, buffered: bool) -> Result<Box<dyn Keyboard>, InputError> {
        self.log.push(Call::CreateKeyboard(buffered));
        Ok(Box::new(FakeKeyboard::new(self.escape_at)))
    }

    fn create_mouse(&mut self, buffered: bool) -> Result<Box<dyn Mouse>, InputError> {
        self.log.push(Call::CreateMouse(buffered));
        if self.fail_mouse {
            return Err(InputError::DeviceBusy("mouse"));
        }
        Ok(Box::new(FakeMouse {
            log: Some(self.log.clone()),
            ..FakeMouse::default()
        }))
    }

    fn destroy_keyboard(&mut self, _keyboard: Box<dyn Keyboard>) {
        self.log.push(Call::DestroyKeyboard);
    }

    fn destroy_mouse(&mut self, _mouse: Box<dyn Mouse>) {
        self.log.push(Call::DestroyMouse);
    }

    fn destroy_input_system(self: Box<Self>) {
        self.log.push(Call::DestroyInputSystem);
    }
}
