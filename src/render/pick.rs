//! CPU ray picking
//!
//! Casts a world-space ray against every live object's bounding geometry and
//! reports the nearest hit. Each object class has its own test:
//!
//! - planes are unit squares anchored at their origin corner and spanning
//!   local `[0, scale.x] × [0, scale.z]`
//! - cubes are centred on their origin and tested face by face
//! - lights are stand-in cubes of half-extent [`LIGHT_PICK_HALF_EXTENT`]
//!   that ignore the light's rotation and scale
//!
//! Classes are evaluated in the order Plane, Cube, Pointlight, Spotlight and
//! only a strictly closer hit replaces an earlier one.

use crate::math::{axis_complement, plane_ray_intersect, vector_component, Axis, Ray};
use crate::scene::{ObjectKind, ObjectRef, SceneState, Transform};
use glam::{Quat, Vec3};

/// Half-extent of the invisible cube used to pick lights.
pub const LIGHT_PICK_HALF_EXTENT: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub object: ObjectRef,
    pub distance: f32,
    pub point: Vec3,
}

/// Accepts a hit only if it lies in front of the ray origin.
fn forward_hit(ray: &Ray, normal: Vec3, point_on_plane: Vec3) -> Option<(Vec3, f32)> {
    let hit = plane_ray_intersect(normal, point_on_plane, ray.origin, ray.direction)?;
    if ray.param_of(hit) < 0.0 {
        return None;
    }
    Some((hit, (hit - ray.origin).length()))
}

/// Distance to a plane object, if the ray crosses its anchored square.
pub fn ray_hits_plane(ray: &Ray, transform: &Transform) -> Option<(Vec3, f32)> {
    let rotation = transform.rotation_quat();
    let normal = rotation * Vec3::Y;
    let (hit, distance) = forward_hit(ray, normal, transform.translation)?;
    let local = rotation.inverse() * (hit - transform.translation);
    let inside_x = local.x >= 0.0 && local.x <= transform.scale.x;
    let inside_z = local.z >= 0.0 && local.z <= transform.scale.z;
    (inside_x && inside_z).then_some((hit, distance))
}

/// Nearest face hit on a centred, rotated box with full extents `size`.
fn ray_hits_box(
    ray: &Ray,
    center: Vec3,
    rotation: Quat,
    size: Vec3,
) -> Option<(Vec3, f32)> {
    let half = size * 0.5;
    let inverse = rotation.inverse();
    let mut best: Option<(Vec3, f32)> = None;

    for axis in Axis::ALL {
        let (u, v) = axis_complement(axis);
        for sign in [1.0f32, -1.0] {
            let local_normal = axis.unit() * sign;
            let face_center = center + rotation * (local_normal * vector_component(half, axis));
            let Some((hit, distance)) = forward_hit(ray, rotation * local_normal, face_center)
            else {
                continue;
            };
            let local = inverse * (hit - center);
            let within_u = vector_component(local, u).abs() <= vector_component(half, u);
            let within_v = vector_component(local, v).abs() <= vector_component(half, v);
            if !(within_u && within_v) {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((hit, distance));
            }
        }
    }
    best
}

pub fn ray_hits_cube(ray: &Ray, transform: &Transform) -> Option<(Vec3, f32)> {
    ray_hits_box(
        ray,
        transform.translation,
        transform.rotation_quat(),
        transform.scale,
    )
}

pub fn ray_hits_light(ray: &Ray, position: Vec3) -> Option<(Vec3, f32)> {
    ray_hits_box(
        ray,
        position,
        Quat::IDENTITY,
        Vec3::splat(LIGHT_PICK_HALF_EXTENT * 2.0),
    )
}

type HitTest = fn(&Ray, &Transform) -> Option<(Vec3, f32)>;

/// `(index, distance)` of the nearest hit among `transforms`.
fn nearest<'a, I>(ray: &Ray, transforms: I, test: HitTest) -> Option<(usize, f32)>
where
    I: Iterator<Item = &'a Transform>,
{
    let mut best: Option<(usize, f32)> = None;
    for (index, transform) in transforms.enumerate() {
        let Some((_, distance)) = test(ray, transform) else {
            continue;
        };
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    best
}

fn light_test(ray: &Ray, transform: &Transform) -> Option<(Vec3, f32)> {
    ray_hits_light(ray, transform.translation)
}

pub fn pick_planes(scene: &SceneState, ray: &Ray) -> Option<(usize, f32)> {
    nearest(ray, scene.planes.iter().map(|m| &m.transform), ray_hits_plane)
}

pub fn pick_cubes(scene: &SceneState, ray: &Ray) -> Option<(usize, f32)> {
    nearest(ray, scene.cubes.iter().map(|m| &m.transform), ray_hits_cube)
}

pub fn pick_pointlights(scene: &SceneState, ray: &Ray) -> Option<(usize, f32)> {
    nearest(ray, scene.pointlights.iter().map(|l| &l.transform), light_test)
}

pub fn pick_spotlights(scene: &SceneState, ray: &Ray) -> Option<(usize, f32)> {
    nearest(ray, scene.spotlights.iter().map(|l| &l.transform), light_test)
}

/// Closest hit across all object classes, or `None` if the ray misses everything.
pub fn pick(scene: &SceneState, ray: &Ray) -> Option<PickHit> {
    let candidates = [
        (ObjectKind::Plane, pick_planes(scene, ray)),
        (ObjectKind::Cube, pick_cubes(scene, ray)),
        (ObjectKind::Pointlight, pick_pointlights(scene, ray)),
        (ObjectKind::Spotlight, pick_spotlights(scene, ray)),
    ];

    let mut best: Option<PickHit> = None;
    for (kind, hit) in candidates {
        let Some((index, distance)) = hit else {
            continue;
        };
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(PickHit {
                object: ObjectRef::new(kind, index),
                distance,
                point: ray.at(distance),
            });
        }
    }
    best
}

// ========================================================================
// Tests
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Mesh, MeshKind, Pointlight, ShadowMapAllocator, Spotlight};

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    fn plane(scale: Vec3) -> Transform {
        Transform {
            scale,
            ..Transform::default()
        }
    }

    #[test]
    fn plane_accepts_points_inside_anchored_square() {
        let t = plane(Vec3::new(2.0, 1.0, 3.0));
        for (x, z) in [(0.0, 0.0), (1.0, 1.5), (2.0, 3.0), (0.5, 2.9)] {
            assert!(ray_hits_plane(&down_ray(x, z), &t).is_some(), "({x}, {z})");
        }
    }

    #[test]
    fn plane_rejects_points_before_origin_corner() {
        let t = plane(Vec3::new(2.0, 1.0, 3.0));
        assert!(ray_hits_plane(&down_ray(-0.1, 1.0), &t).is_none());
        assert!(ray_hits_plane(&down_ray(1.0, -0.1), &t).is_none());
        assert!(ray_hits_plane(&down_ray(2.1, 1.0), &t).is_none());
    }

    #[test]
    fn plane_behind_ray_is_ignored() {
        let t = plane(Vec3::ONE);
        let ray = Ray::new(Vec3::new(0.5, 10.0, 0.5), Vec3::Y);
        assert!(ray_hits_plane(&ray, &t).is_none());
    }

    #[test]
    fn rotated_plane_uses_local_frame() {
        // 90 degrees about Z stands the plane up; its local X now runs along world Y
        let t = Transform {
            rotation: Vec3::new(0.0, 0.0, 90.0),
            ..plane(Vec3::new(2.0, 1.0, 1.0))
        };
        let ray = Ray::new(Vec3::new(-5.0, 1.0, 0.5), Vec3::X);
        assert!(ray_hits_plane(&ray, &t).is_some());
        let below = Ray::new(Vec3::new(-5.0, -1.0, 0.5), Vec3::X);
        assert!(ray_hits_plane(&below, &t).is_none());
    }

    #[test]
    fn cube_front_face_distance() {
        for scale in [Vec3::ONE, Vec3::new(2.0, 3.0, 4.0), Vec3::new(0.5, 0.5, 1.5)] {
            let t = Transform {
                scale,
                ..Transform::default()
            };
            let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
            let (point, distance) = ray_hits_cube(&ray, &t).unwrap();
            assert!((distance - (10.0 - scale.z / 2.0)).abs() < 1e-4);
            assert!(point.x.abs() < 1e-5 && point.y.abs() < 1e-5);
        }
    }

    #[test]
    fn cube_miss_outside_extents() {
        let t = Transform::default();
        let ray = Ray::new(Vec3::new(0.6, 0.0, 10.0), Vec3::NEG_Z);
        assert!(ray_hits_cube(&ray, &t).is_none());
    }

    #[test]
    fn rotated_cube_grows_its_silhouette() {
        let t = Transform {
            rotation: Vec3::new(0.0, 45.0, 0.0),
            ..Transform::default()
        };
        // 0.6 is outside the axis-aligned half-width but inside the rotated diagonal
        let ray = Ray::new(Vec3::new(0.6, 0.0, 10.0), Vec3::NEG_Z);
        assert!(ray_hits_cube(&ray, &t).is_some());
    }

    #[test]
    fn light_uses_fixed_pick_box() {
        let ray = Ray::new(Vec3::new(0.3, 0.0, 10.0), Vec3::NEG_Z);
        let (_, distance) = ray_hits_light(&ray, Vec3::ZERO).unwrap();
        assert!((distance - (10.0 - LIGHT_PICK_HALF_EXTENT)).abs() < 1e-4);
        let wide = Ray::new(Vec3::new(0.4, 0.0, 10.0), Vec3::NEG_Z);
        assert!(ray_hits_light(&wide, Vec3::ZERO).is_none());
    }

    #[test]
    fn nearest_object_wins_across_classes() {
        let mut scene = SceneState::default();
        // plane surface 5 units from the ray origin, cube face 3 units away
        scene
            .add_plane(Mesh::new(
                MeshKind::Plane,
                Transform {
                    translation: Vec3::new(-1.0, 5.0, -1.0),
                    scale: Vec3::new(2.0, 1.0, 2.0),
                    ..Transform::default()
                },
            ))
            .unwrap();
        scene
            .add_cube(Mesh::new(
                MeshKind::Cube,
                Transform::from_translation(Vec3::new(0.0, 6.5, 0.0)),
            ))
            .unwrap();

        let ray = down_ray(0.0, 0.0);
        assert_eq!(pick_planes(&scene, &ray).map(|h| h.0), Some(0));
        assert!((pick_planes(&scene, &ray).unwrap().1 - 5.0).abs() < 1e-4);
        assert!((pick_cubes(&scene, &ray).unwrap().1 - 3.0).abs() < 1e-4);

        let hit = pick(&scene, &ray).unwrap();
        assert_eq!(hit.object, ObjectRef::new(ObjectKind::Cube, 0));
        assert!((hit.distance - 3.0).abs() < 1e-4);
    }

    #[test]
    fn earlier_class_wins_ties() {
        let mut scene = SceneState::default();
        let mut shadow_maps = ShadowMapAllocator::default();
        let at = Transform::from_translation(Vec3::new(0.0, 2.0, 0.0));
        scene
            .add_pointlight(Pointlight {
                transform: at,
                ..Pointlight::default()
            })
            .unwrap();
        scene
            .add_spotlight(Spotlight::new(at, shadow_maps.allocate()))
            .unwrap();
        let hit = pick(&scene, &down_ray(0.0, 0.0)).unwrap();
        assert_eq!(hit.object.kind, ObjectKind::Pointlight);
    }

    #[test]
    fn nearest_within_class_is_reported() {
        let mut scene = SceneState::default();
        for y in [1.0, 4.0, 2.0] {
            scene
                .add_cube(Mesh::new(
                    MeshKind::Cube,
                    Transform::from_translation(Vec3::new(0.0, y, 0.0)),
                ))
                .unwrap();
        }
        let hit = pick(&scene, &down_ray(0.0, 0.0)).unwrap();
        assert_eq!(hit.object, ObjectRef::new(ObjectKind::Cube, 1));
    }

    #[test]
    fn empty_scene_has_no_hit() {
        let scene = SceneState::default();
        assert!(pick(&scene, &down_ray(0.0, 0.0)).is_none());
    }
}
