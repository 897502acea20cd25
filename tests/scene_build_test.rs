mod common;

use common::{
    fakes::{Call, CallLog, FakeScene},
    test_utils::{QUAD_OBJ, TempDir},
};
use flow_scene::{
    data_structures::scene_graph::SceneGraph,
    resources::{ResourceGroupManager, ResourceGroups, ResourceIndex, mesh::MeshSource},
    scene::{
        Colour, LightDescriptor, LightKind, MeshPlacement, NodeId, PlaneDescriptor,
        SceneDescriptor, SceneError, SceneManager, SceneType, ShadowTechnique, SpotRange,
        build_scene,
    },
};

fn index_with(files: &[(&str, &str)]) -> (TempDir, ResourceIndex) {
    let dir = TempDir::new("scene");
    for (name, contents) in files {
        dir.write(name, contents);
    }
    let mut groups = ResourceGroups::new();
    groups
        .add_resource_location(&dir.path().display().to_string(), "FileSystem", "General")
        .unwrap();
    let index = groups.initialise_all().unwrap();
    (dir, index)
}

#[test]
fn demo_scene_call_sequence() {
    let log = CallLog::new();
    let mut scene = FakeScene::new(log.clone());

    build_scene(&mut scene, &SceneDescriptor::default()).unwrap();

    let ground = "GroundEntity".to_string();
    let ninja = "Ninja".to_string();
    assert_eq!(
        log.calls(),
        vec![
            Call::SetAmbientLight(Colour::BLACK),
            Call::SetShadowTechnique(ShadowTechnique::StencilAdditive),
            Call::CreatePlaneMesh("ground".to_string()),
            Call::CreateEntity {
                name: ground.clone(),
                mesh: "ground".to_string()
            },
            Call::SetMaterial(ground.clone(), "Examples/Rockwall".to_string()),
            Call::SetCastShadows(ground.clone(), false),
            Call::CreateChildNode(NodeId(0)),
            Call::AttachEntity(NodeId(1), ground),
            Call::CreateEntity {
                name: ninja.clone(),
                mesh: "ninja.mesh".to_string()
            },
            Call::SetCastShadows(ninja.clone(), true),
            Call::CreateChildNode(NodeId(0)),
            Call::AttachEntity(NodeId(2), ninja),
            Call::CreateLight("Light1".to_string()),
            Call::CreateLight("Light2".to_string()),
            Call::CreateLight("Light3".to_string()),
            Call::CreateCamera("PlayerCam".to_string()),
        ]
    );
}

#[test]
fn demo_lights_are_created_unmodified() {
    let (_dir, index) = index_with(&[("ninja.mesh", "mesh")]);
    let mut graph = SceneGraph::new(SceneType::Generic, Some(index));
    let desc = SceneDescriptor::default();

    build_scene(&mut graph, &desc).unwrap();

    assert_eq!(graph.lights(), desc.lights.as_slice());
    let light1 = graph.light("Light1").unwrap();
    assert_eq!(
        light1.kind,
        LightKind::Point {
            position: [0.0, 150.0, 250.0]
        }
    );
    assert_eq!(light1.diffuse, Colour::RED);
    let light3 = graph.light("Light3").unwrap();
    let LightKind::Spot { range, .. } = light3.kind else {
        panic!("Light3 should be a spot light, got {:?}", light3.kind);
    };
    assert_eq!(
        range,
        SpotRange {
            inner_deg: 35.0,
            outer_deg: 50.0
        }
    );
}

#[test]
fn scene_without_lights_creates_none() {
    let log = CallLog::new();
    let mut scene = FakeScene::new(log.clone());

    build_scene(&mut scene, &SceneDescriptor::empty()).unwrap();

    assert_eq!(
        log.filtered(|c| matches!(c, Call::CreateLight(_))),
        Vec::<Call>::new()
    );
    assert_eq!(log.count(&Call::CreateCamera("PlayerCam".to_string())), 1);
}

#[test]
fn entities_hang_below_children_of_the_root() {
    let (_dir, index) = index_with(&[("ninja.mesh", "mesh")]);
    let mut graph = SceneGraph::new(SceneType::Generic, Some(index));

    build_scene(&mut graph, &SceneDescriptor::default()).unwrap();

    let root = graph.root_node();
    assert_eq!(graph.node(root).unwrap().entities, vec![]);
    for entity in graph.entities() {
        let node = entity.node.expect("entity is attached");
        assert_ne!(node, root);
        assert_eq!(graph.node(node).unwrap().parent, Some(root));
    }
    assert_eq!(graph.node_count(), 3);

    let ground = graph.entity("GroundEntity").unwrap();
    assert_eq!(ground.material.as_deref(), Some("Examples/Rockwall"));
    assert!(!ground.cast_shadows);
    assert!(graph.entity("Ninja").unwrap().cast_shadows);

    let plane = graph.mesh("ground").unwrap();
    let MeshSource::Plane(shape) = plane.source else {
        panic!("ground should be a generated plane, got {:?}", plane.source);
    };
    assert_eq!(shape, PlaneDescriptor::default().shape());
    assert_eq!((shape.width, shape.height), (1500.0, 1500.0));
    assert_eq!((shape.tiles_u, shape.tiles_v), (5.0, 5.0));
    assert_eq!(shape.normal, [0.0, 1.0, 0.0]);
    assert_eq!(shape.up, [0.0, 0.0, 1.0]);
    assert_eq!(plane.vertex_count, 21 * 21);
    assert_eq!(plane.index_count, 20 * 20 * 6);

    assert_eq!(graph.ambient_light(), Colour::BLACK);
    assert_eq!(graph.shadow_technique(), ShadowTechnique::StencilAdditive);
}

#[test]
fn camera_looks_at_the_origin() {
    let (_dir, index) = index_with(&[("ninja.mesh", "mesh")]);
    let mut graph = SceneGraph::new(SceneType::Generic, Some(index));

    build_scene(&mut graph, &SceneDescriptor::default()).unwrap();

    let camera = graph.camera("PlayerCam").unwrap();
    assert_eq!(camera.near_clip, 5.0);
    assert_eq!(camera.transform.position, cgmath::Vector3::new(0.0, 10.0, 500.0));
    let forward = camera.transform.rotation * -cgmath::Vector3::<f32>::unit_z();
    let expected = cgmath::InnerSpace::normalize(cgmath::Vector3::new(0.0f32, -10.0, -500.0));
    assert!(cgmath::InnerSpace::dot(forward, expected) > 0.999);
}

#[test]
fn building_twice_collides_on_names() {
    let (_dir, index) = index_with(&[("ninja.mesh", "mesh")]);
    let mut graph = SceneGraph::new(SceneType::Generic, Some(index));
    let desc = SceneDescriptor::default();

    build_scene(&mut graph, &desc).unwrap();
    let err = build_scene(&mut graph, &desc).unwrap_err();

    assert!(matches!(
        err,
        SceneError::DuplicateName { kind: "mesh", ref name } if name == "ground"
    ));
}

#[test]
fn missing_mesh_names_the_entity() {
    let (_dir, index) = index_with(&[]);
    let mut graph = SceneGraph::new(SceneType::Generic, Some(index));

    let err = build_scene(&mut graph, &SceneDescriptor::default()).unwrap_err();

    assert!(matches!(err, SceneError::Resource { ref entity, .. } if entity == "Ninja"));
}

#[test]
fn entities_need_initialised_resources() {
    let mut graph = SceneGraph::new(SceneType::Generic, None);
    let err = graph.create_entity("Ninja", "ninja.mesh").unwrap_err();
    assert!(matches!(err, SceneError::ResourcesNotInitialised(_)));
}

#[test]
fn empty_spot_range_fails_before_anything_is_created() {
    let log = CallLog::new();
    let mut scene = FakeScene::new(log.clone());
    let mut desc = SceneDescriptor::default();
    desc.lights.push(LightDescriptor::spot(
        "Broken",
        [0.0; 3],
        [0.0, -1.0, 0.0],
        SpotRange {
            inner_deg: 60.0,
            outer_deg: 30.0,
        },
        Colour::WHITE,
    ));

    let err = build_scene(&mut scene, &desc).unwrap_err();

    assert!(matches!(err, SceneError::InvalidSpotRange { ref name, .. } if name == "Broken"));
    assert!(log.calls().is_empty());
}

#[test]
fn nan_spot_angles_are_rejected() {
    let empty = |inner_deg, outer_deg| {
        let range = SpotRange {
            inner_deg,
            outer_deg,
        };
        range.is_empty()
    };
    assert!(empty(f32::NAN, 30.0));
    assert!(empty(10.0, f32::NAN));
    assert!(!empty(10.0, 30.0));

    let log = CallLog::new();
    let mut scene = FakeScene::new(log.clone());
    let desc = SceneDescriptor {
        lights: vec![LightDescriptor::spot(
            "Flicker",
            [0.0; 3],
            [0.0, -1.0, 0.0],
            SpotRange {
                inner_deg: f32::NAN,
                outer_deg: 50.0,
            },
            Colour::BLUE,
        )],
        ..SceneDescriptor::default()
    };

    let err = build_scene(&mut scene, &desc).unwrap_err();

    assert!(matches!(err, SceneError::InvalidSpotRange { ref name, .. } if name == "Flicker"));
    assert!(log.calls().is_empty());
}

#[test]
fn failing_mesh_stops_the_build() {
    let log = CallLog::new();
    let mut scene = FakeScene::new(log.clone()).without_mesh("ninja.mesh");

    assert!(build_scene(&mut scene, &SceneDescriptor::default()).is_err());
    assert_eq!(log.position(&Call::CreateLight("Light1".to_string())), None);
}

#[test]
fn obj_placements_load_geometry() {
    let (_dir, index) = index_with(&[("quad.obj", QUAD_OBJ)]);
    let mut graph = SceneGraph::new(SceneType::ExteriorClose, Some(index));
    let desc = SceneDescriptor {
        meshes: vec![MeshPlacement {
            name: "Quad".to_string(),
            mesh: "quad.obj".to_string(),
            position: [5.0, 0.0, -5.0],
            ..MeshPlacement::default()
        }],
        ..SceneDescriptor::empty()
    };

    build_scene(&mut graph, &desc).unwrap();

    assert_eq!(graph.kind(), SceneType::ExteriorClose);
    let mesh = graph.mesh("quad.obj").unwrap();
    assert_eq!((mesh.vertex_count, mesh.index_count), (4, 6));
    let node = graph.entity("Quad").unwrap().node.unwrap();
    let world = graph.world_transform(node).unwrap();
    assert_eq!(world.position, cgmath::Vector3::new(5.0, 0.0, -5.0));
}
