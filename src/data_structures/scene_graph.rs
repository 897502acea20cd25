//! Scene graph and hierarchical scene organization.
//!
//! [`SceneGraph`] is the in-memory [`SceneManager`] behind the windowed
//! backend. Nodes live in an arena indexed by [`NodeId`]; node 0 is the root.
//! Entities, lights and cameras are looked up by name, and names are unique
//! per kind.

use std::collections::HashMap;

use cgmath::Vector3;

use crate::{
    data_structures::transform::Transform,
    resources::{
        ResourceIndex,
        mesh::{MeshData, load_mesh},
    },
    scene::{
        CameraDescriptor, Colour, EntityId, LightDescriptor, NodeId, PlaneDescriptor,
        SceneError, SceneManager, SceneType, ShadowTechnique,
    },
};

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Transform,
    pub entities: Vec<EntityId>,
}

impl SceneNode {
    fn new(parent: Option<NodeId>, transform: Transform) -> Self {
        Self {
            parent,
            children: Vec::new(),
            transform,
            entities: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub name: String,
    pub mesh: String,
    pub material: Option<String>,
    pub cast_shadows: bool,
    pub node: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub name: String,
    pub transform: Transform,
    pub near_clip: f32,
    pub aspect_ratio: f32,
}

#[derive(Debug)]
pub struct SceneGraph {
    kind: SceneType,
    index: Option<ResourceIndex>,
    ambient: Colour,
    shadows: ShadowTechnique,
    meshes: HashMap<String, MeshData>,
    nodes: Vec<SceneNode>,
    entities: Vec<Entity>,
    lights: Vec<LightDescriptor>,
    cameras: Vec<Camera>,
}

impl SceneGraph {
    /// `index` is `None` until resource groups are initialised; entities
    /// backed by mesh files cannot be created before that.
    pub fn new(kind: SceneType, index: Option<ResourceIndex>) -> Self {
        Self {
            kind,
            index,
            ambient: Colour::BLACK,
            shadows: ShadowTechnique::None,
            meshes: HashMap::new(),
            nodes: vec![SceneNode::new(None, Transform::new())],
            entities: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
        }
    }

    pub fn kind(&self) -> SceneType {
        self.kind
    }

    pub fn ambient_light(&self) -> Colour {
        self.ambient
    }

    pub fn shadow_technique(&self) -> ShadowTechnique {
        self.shadows
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshData> {
        self.meshes.get(name)
    }

    pub fn lights(&self) -> &[LightDescriptor] {
        &self.lights
    }

    pub fn light(&self, name: &str) -> Option<&LightDescriptor> {
        self.lights.iter().find(|l| l.name == name)
    }

    pub fn camera(&self, name: &str) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.name == name)
    }

    pub fn camera_mut(&mut self, name: &str) -> Option<&mut Camera> {
        self.cameras.iter_mut().find(|c| c.name == name)
    }

    /// Transform of `id` relative to the root, composed along the parent chain.
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let mut node = self.nodes.get(id.0)?;
        let mut world = node.transform;
        while let Some(parent) = node.parent {
            node = &self.nodes[parent.0];
            world = &node.transform * &world;
        }
        Some(world)
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, SceneError> {
        self.entities
            .get_mut(id.0)
            .ok_or(SceneError::UnknownEntity(id))
    }

    fn check_node(&self, id: NodeId) -> Result<(), SceneError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownNode(id))
        }
    }

    fn resolve_mesh(&mut self, entity: &str, mesh: &str) -> Result<(), SceneError> {
        if self.meshes.contains_key(mesh) {
            return Ok(());
        }
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| SceneError::ResourcesNotInitialised(entity.to_string()))?;
        let data = load_mesh(index, mesh).map_err(|source| SceneError::Resource {
            entity: entity.to_string(),
            source,
        })?;
        self.meshes.insert(mesh.to_string(), data);
        Ok(())
    }
}

fn duplicate(kind: &'static str, name: &str) -> SceneError {
    SceneError::DuplicateName {
        kind,
        name: name.to_string(),
    }
}

impl SceneManager for SceneGraph {
    fn set_ambient_light(&mut self, colour: Colour) {
        self.ambient = colour;
    }

    fn set_shadow_technique(&mut self, technique: ShadowTechnique) {
        self.shadows = technique;
    }

    fn create_plane_mesh(&mut self, plane: &PlaneDescriptor) -> Result<(), SceneError> {
        if self.meshes.contains_key(&plane.name) {
            return Err(duplicate("mesh", &plane.name));
        }
        let data = MeshData::plane(&plane.name, plane.shape());
        self.meshes.insert(plane.name.clone(), data);
        Ok(())
    }

    fn create_entity(&mut self, name: &str, mesh: &str) -> Result<EntityId, SceneError> {
        if self.entity(name).is_some() {
            return Err(duplicate("entity", name));
        }
        self.resolve_mesh(name, mesh)?;
        self.entities.push(Entity {
            name: name.to_string(),
            mesh: mesh.to_string(),
            material: None,
            cast_shadows: true,
            node: None,
        });
        Ok(EntityId(self.entities.len() - 1))
    }

    fn set_material(&mut self, entity: EntityId, material: &str) -> Result<(), SceneError> {
        self.entity_mut(entity)?.material = Some(material.to_string());
        Ok(())
    }

    fn set_cast_shadows(&mut self, entity: EntityId, cast: bool) -> Result<(), SceneError> {
        self.entity_mut(entity)?.cast_shadows = cast;
        Ok(())
    }

    fn root_node(&self) -> NodeId {
        NodeId(0)
    }

    fn create_child_node(
        &mut self,
        parent: NodeId,
        position: Vector3<f32>,
    ) -> Result<NodeId, SceneError> {
        self.check_node(parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(SceneNode::new(Some(parent), Transform::from_position(position)));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    fn attach_entity(&mut self, node: NodeId, entity: EntityId) -> Result<(), SceneError> {
        self.check_node(node)?;
        let target = self.entity_mut(entity)?;
        if target.node.is_some() {
            return Err(SceneError::AlreadyAttached(entity));
        }
        target.node = Some(node);
        self.nodes[node.0].entities.push(entity);
        Ok(())
    }

    fn create_light(&mut self, light: &LightDescriptor) -> Result<(), SceneError> {
        if self.light(&light.name).is_some() {
            return Err(duplicate("light", &light.name));
        }
        self.lights.push(light.clone());
        Ok(())
    }

    fn create_camera(&mut self, camera: &CameraDescriptor) -> Result<(), SceneError> {
        if self.camera(&camera.name).is_some() {
            return Err(duplicate("camera", &camera.name));
        }
        let position: Vector3<f32> = camera.position.into();
        let transform = Transform {
            rotation: Transform::look_rotation(position, camera.look_at.into()),
            ..Transform::from_position(position)
        };
        self.cameras.push(Camera {
            name: camera.name.clone(),
            transform,
            near_clip: camera.near_clip,
            aspect_ratio: 4.0 / 3.0,
        });
        Ok(())
    }
}
