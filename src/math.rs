//! Vector, plane and ray helpers shared by picking and the transform gizmo.
//!
//! Everything here is a pure function over `glam` types. Gizmo code talks
//! about a constrained axis through [`Axis`] and the component accessors
//! below instead of branching on x/y/z by hand.

use glam::{EulerRot, Quat, Vec3};

/// Below this `|dot(normal, dir)|` a ray counts as parallel to a plane.
pub const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// X -> Y -> Z -> X.
    pub fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    /// The axis carrying the largest absolute component of `v`.
    /// Ties resolve towards X, then Y.
    pub fn from_dominant(v: Vec3) -> Self {
        let a = v.abs();
        if a.x >= a.y && a.x >= a.z {
            Axis::X
        } else if a.y >= a.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Signed distance along the ray to `point`'s projection.
    pub fn param_of(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// Intersect the infinite line `origin + t * dir` with a plane.
///
/// Returns `None` only when the ray is parallel to the plane; intersections
/// behind the origin (`t < 0`) are still reported.
pub fn plane_ray_intersect(
    plane_normal: Vec3,
    point_on_plane: Vec3,
    ray_origin: Vec3,
    ray_dir: Vec3,
) -> Option<Vec3> {
    let denom = plane_normal.dot(ray_dir);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = plane_normal.dot(point_on_plane - ray_origin) / denom;
    Some(ray_origin + ray_dir * t)
}

/// Orthogonal projection of `point` onto the plane. `normal` need not be unit length.
pub fn closest_point_on_plane(point: Vec3, point_on_plane: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    point - n * n.dot(point - point_on_plane)
}

/// The two axes spanning the plane perpendicular to `axis`.
pub fn axis_complement(axis: Axis) -> (Axis, Axis) {
    match axis {
        Axis::X => (Axis::Y, Axis::Z),
        Axis::Y => (Axis::X, Axis::Z),
        Axis::Z => (Axis::X, Axis::Y),
    }
}

/// Pick the candidate whose dot product with `direction` is smallest or
/// largest. The first candidate wins ties; an empty slice yields zero.
pub fn extremum_by_dot(direction: Vec3, candidates: &[Vec3], extremum: Extremum) -> Vec3 {
    let mut best: Option<(Vec3, f32)> = None;
    for &candidate in candidates {
        let d = direction.dot(candidate);
        let better = match (best, extremum) {
            (None, _) => true,
            (Some((_, b)), Extremum::Min) => d < b,
            (Some((_, b)), Extremum::Max) => d > b,
        };
        if better {
            best = Some((candidate, d));
        }
    }
    best.map(|(v, _)| v).unwrap_or(Vec3::ZERO)
}

pub fn vector_component(v: Vec3, axis: Axis) -> f32 {
    v[axis.index()]
}

pub fn add_component(v: &mut Vec3, delta: f32, axis: Axis) {
    v[axis.index()] += delta;
}

/// Rotation for Euler angles in degrees, applied Y, then X, then Z.
pub fn euler_rotation(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Inverse of [`euler_rotation`], in degrees. May contain NaN for a
/// degenerate quaternion; callers check.
pub fn rotation_to_euler_degrees(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Round `value` to the nearest multiple of `step`. A non-positive step
/// disables snapping.
pub fn snap(value: f32, step: f32) -> f32 {
    if step > 0.0 {
        (value / step).round() * step
    } else {
        value
    }
}

pub fn snap_vec(v: Vec3, step: f32) -> Vec3 {
    Vec3::new(snap(v.x, step), snap(v.y, step), snap(v.z, step))
}

/// Floored modulus into [0, 360).
pub fn wrap_degrees(value: f32) -> f32 {
    let wrapped = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn has_nan(v: Vec3) -> bool {
    v.x.is_nan() || v.y.is_nan() || v.z.is_nan()
}
