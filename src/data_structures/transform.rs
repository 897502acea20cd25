//! Local transforms of scene nodes.
//!
//! Every node stores its transform relative to its parent; world transforms
//! are obtained by composing the chain from the root with `*`.

use std::ops::Mul;

use cgmath::{InnerSpace, One};

/// Position, rotation (as quaternion) and scale of a scene node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: cgmath::Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Rotation that turns the default forward axis (-Z) towards `target`.
    ///
    /// Returns identity when `target` coincides with the position.
    pub fn look_rotation(
        from: cgmath::Vector3<f32>,
        target: cgmath::Vector3<f32>,
    ) -> cgmath::Quaternion<f32> {
        let dir = target - from;
        if dir.magnitude2() <= f32::EPSILON {
            return cgmath::Quaternion::one();
        }
        cgmath::Quaternion::from_arc(-cgmath::Vector3::unit_z(), dir.normalize(), None)
    }
}

impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Transform;

    fn mul(self, rhs: &'b Transform) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Transform {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}
