//! Collision queries between the player capsule and axis-aligned volumes
//!
//! The player is an upright capsule; obstacles and pickups are boxes or
//! points. Queries run in two phases: a cheap bounds overlap to gather
//! candidates, then an exact centerline distance test that rejects
//! candidates which only share a bounding volume.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box standing at `base_y`, centered on `x` and `z`
    pub fn from_base(x: f32, base_y: f32, z: f32, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(
            Vec3::new(x - half.x, base_y, z - half.z),
            Vec3::new(x + half.x, base_y + size.y, z + half.z),
        )
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Closest point on (or in) the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }
}

/// Upright capsule: a vertical centerline segment swept by `radius`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    /// Lower end of the centerline
    pub a: Vec3,
    /// Upper end of the centerline
    pub b: Vec3,
    pub radius: f32,
}

impl Capsule {
    /// Capsule whose lowest point sits at `foot` and spans `height`
    pub fn upright(foot: Vec3, height: f32, radius: f32) -> Self {
        let radius = radius.max(0.0);
        let half_span = (height * 0.5 - radius).max(0.0);
        let center = foot + Vec3::Y * (height * 0.5);
        Self {
            a: center - Vec3::Y * half_span,
            b: center + Vec3::Y * half_span,
            radius,
        }
    }

    /// Bounding box of the swept volume
    pub fn bounds(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::new(self.a.min(self.b) - r, self.a.max(self.b) + r)
    }

    /// Distance from the centerline to the closest point of `aabb`
    /// (zero when the centerline touches or enters the box).
    ///
    /// The centerline is vertical, so the horizontal separation is
    /// independent of height and the vertical separation is an
    /// interval gap.
    pub fn centerline_distance_to_aabb(&self, aabb: &Aabb) -> f32 {
        let x = self.a.x;
        let z = self.a.z;
        let (lo, hi) = (self.a.y.min(self.b.y), self.a.y.max(self.b.y));

        let dx = (aabb.min.x - x).max(0.0).max(x - aabb.max.x);
        let dz = (aabb.min.z - z).max(0.0).max(z - aabb.max.z);
        let dy = (aabb.min.y - hi).max(0.0).max(lo - aabb.max.y);
        Vec3::new(dx, dy, dz).length()
    }

    /// Distance from the centerline to a point
    pub fn centerline_distance_to_point(&self, p: Vec3) -> f32 {
        let (lo, hi) = (self.a.y.min(self.b.y), self.a.y.max(self.b.y));
        let nearest = Vec3::new(self.a.x, p.y.clamp(lo, hi), self.a.z);
        (p - nearest).length()
    }

    /// Broad phase plus exact confirmation against a box
    pub fn overlaps_aabb(&self, aabb: &Aabb) -> bool {
        self.bounds().intersects(aabb) && self.centerline_distance_to_aabb(aabb) < self.radius
    }

    /// Whether a sphere of `radius` at `center` touches the capsule
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.centerline_distance_to_point(center) < self.radius + radius
    }
}
