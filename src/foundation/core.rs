pub use glam::DVec3 as Vec3;
pub use kurbo::{Point, Rect, Size};

/// Position of a snapshot within its series.
///
/// Snapshots are identified by their place in the series, never by pointer identity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SnapshotId(pub usize);

/// Spatial state of one node: position, scale and rotation about the vertical axis.
///
/// Layout strategies emit `position` at the ground centre of the block; everything downstream of
/// [`crate::apply_layout`] treats it as the block centre.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeTransform {
    /// Block position.
    pub position: Vec3,
    /// Block extent along each axis.
    pub scale: Vec3,
    /// Rotation about the y axis, in degrees.
    pub rotation: f64,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: 0.0,
        }
    }
}

impl NodeTransform {
    /// Transform with the given position and scale and no rotation.
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            rotation: 0.0,
        }
    }

    /// Component-wise linear interpolation; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, to: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            position: self.position.lerp(to.position, t),
            scale: self.scale.lerp(to.scale, t),
            rotation: self.rotation + (to.rotation - self.rotation) * t,
        }
    }

    /// Footprint of the block on the ground plane (x/z).
    pub fn footprint(self) -> Rect {
        Rect::from_center_size(
            Point::new(self.position.x, self.position.z),
            Size::new(self.scale.x, self.scale.z),
        )
    }

    /// Same transform lowered so that its top sits at ground level.
    pub fn below_ground(self) -> Self {
        Self {
            position: Vec3::new(self.position.x, -self.scale.y / 2.0, self.position.z),
            ..self
        }
    }
}
