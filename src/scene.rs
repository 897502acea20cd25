//! Scene description and population.
//!
//! A [`SceneDescriptor`] is plain data: ambient light, shadow technique,
//! ground planes, mesh placements, lights and one camera. [`build_scene`]
//! replays it against any [`SceneManager`], so the same descriptor drives the
//! real [`crate::data_structures::scene_graph::SceneGraph`] and test doubles.
//!
//! Descriptors deserialize from the `[scene]` table of the settings file; the
//! [`Default`] is the classic demo scene (a ninja on a rock-walled ground
//! plane lit by a red point light, a dim directional light and a blue spot).

use cgmath::Vector3;
use serde::Deserialize;
use thiserror::Error;

use crate::resources::{ResourceError, mesh::PlaneShape};

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0.0, 0.0, 0.0);
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);
    pub const RED: Colour = Colour::new(1.0, 0.0, 0.0);
    pub const BLUE: Colour = Colour::new(0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneType {
    #[default]
    Generic,
    ExteriorClose,
    Interior,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowTechnique {
    #[default]
    None,
    StencilAdditive,
    StencilModulative,
    TextureModulative,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(pub usize);

/// A mesh instance hung below its own child of the root node.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeshPlacement {
    pub name: String,
    pub mesh: String,
    pub cast_shadows: bool,
    pub material: Option<String>,
    pub position: [f32; 3],
}

impl Default for MeshPlacement {
    fn default() -> Self {
        Self {
            name: "Ninja".to_string(),
            mesh: "ninja.mesh".to_string(),
            cast_shadows: true,
            material: None,
            position: [0.0; 3],
        }
    }
}

/// A procedurally built plane mesh plus the entity showing it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaneDescriptor {
    /// Name the generated mesh is registered under.
    pub name: String,
    pub entity: String,
    pub normal: [f32; 3],
    pub distance: f32,
    pub width: f32,
    pub height: f32,
    pub segments_x: u32,
    pub segments_y: u32,
    pub tiles_u: f32,
    pub tiles_v: f32,
    pub up: [f32; 3],
    pub material: Option<String>,
    pub cast_shadows: bool,
    pub position: [f32; 3],
}

impl Default for PlaneDescriptor {
    fn default() -> Self {
        Self {
            name: "ground".to_string(),
            entity: "GroundEntity".to_string(),
            normal: [0.0, 1.0, 0.0],
            distance: 0.0,
            width: 1500.0,
            height: 1500.0,
            segments_x: 20,
            segments_y: 20,
            tiles_u: 5.0,
            tiles_v: 5.0,
            up: [0.0, 0.0, 1.0],
            material: Some("Examples/Rockwall".to_string()),
            cast_shadows: false,
            position: [0.0; 3],
        }
    }
}

impl PlaneDescriptor {
    pub fn shape(&self) -> PlaneShape {
        PlaneShape {
            normal: self.normal,
            distance: self.distance,
            width: self.width,
            height: self.height,
            segments_x: self.segments_x,
            segments_y: self.segments_y,
            tiles_u: self.tiles_u,
            tiles_v: self.tiles_v,
            up: self.up,
        }
    }
}

/// Inner and outer cone angle of a spot light, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct SpotRange {
    pub inner_deg: f32,
    pub outer_deg: f32,
}

impl SpotRange {
    pub fn is_empty(&self) -> bool {
        // Written positively so NaN angles count as empty.
        !(self.outer_deg > 0.0 && self.inner_deg >= 0.0 && self.inner_deg <= self.outer_deg)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LightKind {
    Point {
        position: [f32; 3],
    },
    Directional {
        direction: [f32; 3],
    },
    Spot {
        position: [f32; 3],
        direction: [f32; 3],
        range: SpotRange,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LightDescriptor {
    pub name: String,
    pub kind: LightKind,
    #[serde(default)]
    pub diffuse: Colour,
    #[serde(default)]
    pub specular: Colour,
}

impl LightDescriptor {
    pub fn point(name: &str, position: [f32; 3], colour: Colour) -> Self {
        Self {
            name: name.to_string(),
            kind: LightKind::Point { position },
            diffuse: colour,
            specular: colour,
        }
    }

    pub fn directional(name: &str, direction: [f32; 3], colour: Colour) -> Self {
        Self {
            name: name.to_string(),
            kind: LightKind::Directional { direction },
            diffuse: colour,
            specular: colour,
        }
    }

    pub fn spot(
        name: &str,
        position: [f32; 3],
        direction: [f32; 3],
        range: SpotRange,
        colour: Colour,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: LightKind::Spot {
                position,
                direction,
                range,
            },
            diffuse: colour,
            specular: colour,
        }
    }

    fn validate(&self) -> Result<(), SceneError> {
        match self.kind {
            LightKind::Spot { range, .. } if range.is_empty() => Err(SceneError::InvalidSpotRange {
                name: self.name.clone(),
                inner: range.inner_deg,
                outer: range.outer_deg,
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraDescriptor {
    pub name: String,
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub near_clip: f32,
}

impl Default for CameraDescriptor {
    fn default() -> Self {
        Self {
            name: "PlayerCam".to_string(),
            position: [0.0, 10.0, 500.0],
            look_at: [0.0, 0.0, 0.0],
            near_clip: 5.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneDescriptor {
    pub scene_type: SceneType,
    pub ambient_light: Colour,
    pub shadow_technique: ShadowTechnique,
    pub planes: Vec<PlaneDescriptor>,
    pub meshes: Vec<MeshPlacement>,
    pub lights: Vec<LightDescriptor>,
    pub camera: CameraDescriptor,
}

impl SceneDescriptor {
    /// Camera only: no geometry, no lights.
    pub fn empty() -> Self {
        Self {
            scene_type: SceneType::Generic,
            ambient_light: Colour::BLACK,
            shadow_technique: ShadowTechnique::None,
            planes: Vec::new(),
            meshes: Vec::new(),
            lights: Vec::new(),
            camera: CameraDescriptor::default(),
        }
    }
}

impl Default for SceneDescriptor {
    fn default() -> Self {
        Self {
            scene_type: SceneType::Generic,
            ambient_light: Colour::BLACK,
            shadow_technique: ShadowTechnique::StencilAdditive,
            planes: vec![PlaneDescriptor::default()],
            meshes: vec![MeshPlacement::default()],
            lights: vec![
                LightDescriptor::point("Light1", [0.0, 150.0, 250.0], Colour::RED),
                LightDescriptor::directional(
                    "Light2",
                    [0.0, -1.0, 1.0],
                    Colour::new(0.25, 0.25, 0.0),
                ),
                LightDescriptor::spot(
                    "Light3",
                    [300.0, 300.0, 0.0],
                    [-1.0, -1.0, 0.0],
                    SpotRange {
                        inner_deg: 35.0,
                        outer_deg: 50.0,
                    },
                    Colour::BLUE,
                ),
            ],
            camera: CameraDescriptor::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("a {kind} named `{name}` already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("no {kind} named `{name}`")]
    UnknownName { kind: &'static str, name: String },

    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),

    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),

    #[error("entity {0:?} is already attached to a node")]
    AlreadyAttached(EntityId),

    #[error("spot light `{name}` has an empty range ({inner}..{outer} degrees)")]
    InvalidSpotRange { name: String, inner: f32, outer: f32 },

    #[error("resource groups must be initialised before creating entity `{0}`")]
    ResourcesNotInitialised(String),

    #[error("entity `{entity}`: {source}")]
    Resource {
        entity: String,
        #[source]
        source: ResourceError,
    },
}

/// Scene-graph operations the builder relies on.
pub trait SceneManager {
    fn set_ambient_light(&mut self, colour: Colour);

    fn set_shadow_technique(&mut self, technique: ShadowTechnique);

    /// Registers a plane mesh under `plane.name` for later entities.
    fn create_plane_mesh(&mut self, plane: &PlaneDescriptor) -> Result<(), SceneError>;

    fn create_entity(&mut self, name: &str, mesh: &str) -> Result<EntityId, SceneError>;

    fn set_material(&mut self, entity: EntityId, material: &str) -> Result<(), SceneError>;

    fn set_cast_shadows(&mut self, entity: EntityId, cast: bool) -> Result<(), SceneError>;

    fn root_node(&self) -> NodeId;

    fn create_child_node(
        &mut self,
        parent: NodeId,
        position: Vector3<f32>,
    ) -> Result<NodeId, SceneError>;

    fn attach_entity(&mut self, node: NodeId, entity: EntityId) -> Result<(), SceneError>;

    fn create_light(&mut self, light: &LightDescriptor) -> Result<(), SceneError>;

    fn create_camera(&mut self, camera: &CameraDescriptor) -> Result<(), SceneError>;
}

/// Populates `scene` from `desc`.
///
/// Not idempotent: a second call collides with the names of the first.
pub fn build_scene(scene: &mut dyn SceneManager, desc: &SceneDescriptor) -> Result<(), SceneError> {
    // Reject bad lights before anything is created.
    for light in &desc.lights {
        light.validate()?;
    }

    scene.set_ambient_light(desc.ambient_light);
    scene.set_shadow_technique(desc.shadow_technique);

    for plane in &desc.planes {
        scene.create_plane_mesh(plane)?;
        place_entity(
            scene,
            &plane.entity,
            &plane.name,
            plane.material.as_deref(),
            plane.cast_shadows,
            plane.position,
        )?;
    }

    for mesh in &desc.meshes {
        place_entity(
            scene,
            &mesh.name,
            &mesh.mesh,
            mesh.material.as_deref(),
            mesh.cast_shadows,
            mesh.position,
        )?;
    }

    for light in &desc.lights {
        log::debug!("creating light {}", light.name);
        scene.create_light(light)?;
    }

    scene.create_camera(&desc.camera)?;

    log::info!(
        "scene built: {} planes, {} meshes, {} lights",
        desc.planes.len(),
        desc.meshes.len(),
        desc.lights.len()
    );
    Ok(())
}

fn place_entity(
    scene: &mut dyn SceneManager,
    name: &str,
    mesh: &str,
    material: Option<&str>,
    cast_shadows: bool,
    position: [f32; 3],
) -> Result<(), SceneError> {
    log::debug!("creating entity {} from {}", name, mesh);
    let entity = scene.create_entity(name, mesh)?;
    if let Some(material) = material {
        scene.set_material(entity, material)?;
    }
    scene.set_cast_shadows(entity, cast_shadows)?;
    let root = scene.root_node();
    let node = scene.create_child_node(root, position.into())?;
    scene.attach_entity(node, entity)
}
