//! Engine data structures backing the windowed scene.
//!
//! - `transform` holds per-node position, rotation and scale
//! - `scene_graph` is the in-memory scene manager: nodes, entities, lights and cameras

pub mod scene_graph;
pub mod transform;
