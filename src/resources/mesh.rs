use std::io::{BufReader, Cursor};

use crate::resources::{ResourceError, ResourceIndex};

/// Parameters of a generated plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneShape {
    pub normal: [f32; 3],
    /// Offset of the plane along its normal.
    pub distance: f32,
    pub width: f32,
    pub height: f32,
    pub segments_x: u32,
    pub segments_y: u32,
    /// Texture repeats across the width and height.
    pub tiles_u: f32,
    pub tiles_v: f32,
    pub up: [f32; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub enum MeshSource {
    /// Parsed Wavefront geometry.
    Obj { group: String },
    /// A format we do not decode; only the payload size is known.
    Binary { group: String, bytes: usize },
    /// Built in memory from plane parameters.
    Plane(PlaneShape),
}

/// Geometry summary of a mesh the scene can instantiate.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub source: MeshSource,
    pub submeshes: usize,
    pub vertex_count: usize,
    pub index_count: usize,
}

impl MeshData {
    /// A flat grid of `segments_x` by `segments_y` quads.
    pub fn plane(name: &str, shape: PlaneShape) -> Self {
        let (sx, sy) = (
            shape.segments_x.max(1) as usize,
            shape.segments_y.max(1) as usize,
        );
        Self {
            name: name.to_string(),
            source: MeshSource::Plane(shape),
            submeshes: 1,
            vertex_count: (sx + 1) * (sy + 1),
            index_count: sx * sy * 6,
        }
    }
}

/// Resolves `name` through the resource index and reads its geometry.
pub fn load_mesh(index: &ResourceIndex, name: &str) -> Result<MeshData, ResourceError> {
    let handle = index
        .locate(name)
        .ok_or_else(|| ResourceError::NotFound(name.to_string()))?;
    let bytes = handle.read()?;

    if handle.extension().as_deref() != Some("obj") {
        log::debug!("mesh {} loaded as opaque blob ({} bytes)", name, bytes.len());
        return Ok(MeshData {
            name: name.to_string(),
            source: MeshSource::Binary {
                group: handle.group,
                bytes: bytes.len(),
            },
            submeshes: 1,
            vertex_count: 0,
            index_count: 0,
        });
    }

    let mut reader = BufReader::new(Cursor::new(bytes));
    let (models, materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| match index.read(&p.to_string_lossy()) {
            Ok(mtl) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mtl))),
            Err(_) => Err(tobj::LoadError::OpenFileFailed),
        },
    )
    .map_err(|source| ResourceError::Obj {
        name: name.to_string(),
        source,
    })?;
    if let Err(e) = materials {
        log::warn!("materials of mesh {} could not be loaded: {}", name, e);
    }

    Ok(MeshData {
        name: name.to_string(),
        source: MeshSource::Obj {
            group: handle.group,
        },
        submeshes: models.len(),
        vertex_count: models.iter().map(|m| m.mesh.positions.len() / 3).sum(),
        index_count: models.iter().map(|m| m.mesh.indices.len()).sum(),
    })
}
