pub mod registry;
pub mod serialization;

pub use registry::{Registry, RegistryError};

use crate::math::euler_rotation;
use glam::{Quat, Vec3};

/// Smallest scale any component may be written with.
pub const MIN_SCALE: f32 = 0.01;

/// Translation, Euler rotation in degrees (applied Y, X, Z) and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    #[cfg(test)]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn rotation_quat(&self) -> Quat {
        euler_rotation(self.rotation)
    }
}

pub type MaterialId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Plane,
    Cube,
}

/// Shared shape of planes and cubes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub transform: Transform,
    pub material: MaterialId,
    pub kind: MeshKind,
    pub uv_multiplier: f32,
}

impl Mesh {
    pub fn new(kind: MeshKind, transform: Transform) -> Self {
        Self {
            transform,
            material: 0,
            kind,
            uv_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointlight {
    pub transform: Transform,
    pub color: Vec3,
    pub range: f32,
    pub specular: f32,
    pub intensity: f32,
    pub on: bool,
}

impl Default for Pointlight {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            color: Vec3::ONE,
            range: 10.0,
            specular: 0.5,
            intensity: 1.0,
            on: true,
        }
    }
}

/// Opaque handle to a renderer-owned shadow map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowMapHandle(pub u32);

/// Hands out unique shadow map handles; duplicated spotlights never share one.
#[derive(Debug, Default)]
pub struct ShadowMapAllocator {
    next: u32,
}

impl ShadowMapAllocator {
    pub fn allocate(&mut self) -> ShadowMapHandle {
        let handle = ShadowMapHandle(self.next);
        self.next = self.next.wrapping_add(1);
        handle
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spotlight {
    pub transform: Transform,
    pub color: Vec3,
    pub specular: f32,
    pub range: f32,
    pub fov_deg: f32,
    pub outer_cutoff_deg: f32,
    pub on: bool,
    pub shadow_map: ShadowMapHandle,
}

impl Spotlight {
    pub fn new(transform: Transform, shadow_map: ShadowMapHandle) -> Self {
        Self {
            transform,
            color: Vec3::ONE,
            specular: 0.5,
            range: 20.0,
            fov_deg: 30.0,
            outer_cutoff_deg: 35.0,
            on: true,
            shadow_map,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Plane,
    Cube,
    Pointlight,
    Spotlight,
}

impl ObjectKind {
    pub fn can_rotate(self) -> bool {
        !matches!(self, ObjectKind::Pointlight)
    }

    pub fn can_scale(self) -> bool {
        matches!(self, ObjectKind::Plane | ObjectKind::Cube)
    }
}

/// `(type, index)` identity of a live object. Invalidated by any removal
/// from the same registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub index: usize,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, index: usize) -> Self {
        Self { kind, index }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RegistryCapacities {
    pub planes: usize,
    pub cubes: usize,
    pub pointlights: usize,
    pub spotlights: usize,
}

impl Default for RegistryCapacities {
    fn default() -> Self {
        Self {
            planes: 64,
            cubes: 256,
            pointlights: 32,
            spotlights: 16,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneState {
    pub planes: Registry<Mesh>,
    pub cubes: Registry<Mesh>,
    pub pointlights: Registry<Pointlight>,
    pub spotlights: Registry<Spotlight>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(RegistryCapacities::default())
    }
}

impl SceneState {
    pub fn new(capacities: RegistryCapacities) -> Self {
        Self {
            planes: Registry::with_capacity(capacities.planes),
            cubes: Registry::with_capacity(capacities.cubes),
            pointlights: Registry::with_capacity(capacities.pointlights),
            spotlights: Registry::with_capacity(capacities.spotlights),
        }
    }

    pub fn capacities(&self) -> RegistryCapacities {
        RegistryCapacities {
            planes: self.planes.capacity(),
            cubes: self.cubes.capacity(),
            pointlights: self.pointlights.capacity(),
            spotlights: self.spotlights.capacity(),
        }
    }

    pub fn object_count(&self) -> usize {
        self.planes.len() + self.cubes.len() + self.pointlights.len() + self.spotlights.len()
    }

    pub fn contains(&self, object: ObjectRef) -> bool {
        self.transform(object).is_some()
    }

    pub fn transform(&self, object: ObjectRef) -> Option<&Transform> {
        match object.kind {
            ObjectKind::Plane => self.planes.get(object.index).map(|m| &m.transform),
            ObjectKind::Cube => self.cubes.get(object.index).map(|m| &m.transform),
            ObjectKind::Pointlight => self.pointlights.get(object.index).map(|l| &l.transform),
            ObjectKind::Spotlight => self.spotlights.get(object.index).map(|l| &l.transform),
        }
    }

    pub fn transform_mut(&mut self, object: ObjectRef) -> Option<&mut Transform> {
        match object.kind {
            ObjectKind::Plane => self.planes.get_mut(object.index).map(|m| &mut m.transform),
            ObjectKind::Cube => self.cubes.get_mut(object.index).map(|m| &mut m.transform),
            ObjectKind::Pointlight => self
                .pointlights
                .get_mut(object.index)
                .map(|l| &mut l.transform),
            ObjectKind::Spotlight => self
                .spotlights
                .get_mut(object.index)
                .map(|l| &mut l.transform),
        }
    }

    pub fn add_plane(&mut self, mesh: Mesh) -> Result<ObjectRef, RegistryError> {
        let index = self.planes.add(Mesh {
            kind: MeshKind::Plane,
            ..mesh
        })?;
        Ok(ObjectRef::new(ObjectKind::Plane, index))
    }

    pub fn add_cube(&mut self, mesh: Mesh) -> Result<ObjectRef, RegistryError> {
        let index = self.cubes.add(Mesh {
            kind: MeshKind::Cube,
            ..mesh
        })?;
        Ok(ObjectRef::new(ObjectKind::Cube, index))
    }

    pub fn add_pointlight(&mut self, light: Pointlight) -> Result<ObjectRef, RegistryError> {
        let index = self.pointlights.add(light)?;
        Ok(ObjectRef::new(ObjectKind::Pointlight, index))
    }

    pub fn add_spotlight(&mut self, light: Spotlight) -> Result<ObjectRef, RegistryError> {
        let index = self.spotlights.add(light)?;
        Ok(ObjectRef::new(ObjectKind::Spotlight, index))
    }

    /// Swap-remove `object`. Returns false when the reference is stale.
    pub fn remove(&mut self, object: ObjectRef) -> bool {
        match object.kind {
            ObjectKind::Plane => self.planes.swap_remove(object.index).is_some(),
            ObjectKind::Cube => self.cubes.swap_remove(object.index).is_some(),
            ObjectKind::Pointlight => self.pointlights.swap_remove(object.index).is_some(),
            ObjectKind::Spotlight => self.spotlights.swap_remove(object.index).is_some(),
        }
    }

    /// Copy `object` to the end of its registry. Spotlights get a fresh
    /// shadow map from `shadow_maps`.
    pub fn duplicate(
        &mut self,
        object: ObjectRef,
        shadow_maps: &mut ShadowMapAllocator,
    ) -> Option<Result<ObjectRef, RegistryError>> {
        let copy = match object.kind {
            ObjectKind::Plane => {
                let source = *self.planes.get(object.index)?;
                self.add_plane(source)
            }
            ObjectKind::Cube => {
                let source = *self.cubes.get(object.index)?;
                self.add_cube(source)
            }
            ObjectKind::Pointlight => {
                let source = *self.pointlights.get(object.index)?;
                self.add_pointlight(source)
            }
            ObjectKind::Spotlight => {
                let source = *self.spotlights.get(object.index)?;
                if self.spotlights.is_full() {
                    return Some(Err(RegistryError::CapacityExceeded {
                        capacity: self.spotlights.capacity(),
                    }));
                }
                self.add_spotlight(Spotlight {
                    shadow_map: shadow_maps.allocate(),
                    ..source
                })
            }
        };
        Some(copy)
    }

    /// Empty every registry; capacities are kept.
    pub fn clear(&mut self) {
        self.planes.clear();
        self.cubes.clear();
        self.pointlights.clear();
        self.spotlights.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scene() -> SceneState {
        SceneState::new(RegistryCapacities {
            planes: 2,
            cubes: 4,
            pointlights: 2,
            spotlights: 2,
        })
    }

    #[test]
    fn add_returns_typed_refs() {
        let mut scene = small_scene();
        let plane = scene
            .add_plane(Mesh::new(MeshKind::Plane, Transform::default()))
            .unwrap();
        let light = scene.add_pointlight(Pointlight::default()).unwrap();
        assert_eq!(plane, ObjectRef::new(ObjectKind::Plane, 0));
        assert_eq!(light, ObjectRef::new(ObjectKind::Pointlight, 0));
        assert_eq!(scene.object_count(), 2);
    }

    #[test]
    fn add_cube_forces_mesh_kind() {
        let mut scene = small_scene();
        let cube = scene
            .add_cube(Mesh::new(MeshKind::Plane, Transform::default()))
            .unwrap();
        assert_eq!(scene.cubes.get(cube.index).unwrap().kind, MeshKind::Cube);
    }

    #[test]
    fn remove_reassigns_last_index() {
        let mut scene = small_scene();
        for x in 0..3 {
            scene
                .add_cube(Mesh::new(
                    MeshKind::Cube,
                    Transform::from_translation(Vec3::new(x as f32, 0.0, 0.0)),
                ))
                .unwrap();
        }
        assert!(scene.remove(ObjectRef::new(ObjectKind::Cube, 0)));
        assert_eq!(scene.cubes.len(), 2);
        let moved = scene
            .transform(ObjectRef::new(ObjectKind::Cube, 0))
            .unwrap();
        assert_eq!(moved.translation, Vec3::new(2.0, 0.0, 0.0));
        assert!(!scene.contains(ObjectRef::new(ObjectKind::Cube, 2)));
    }

    #[test]
    fn duplicate_spotlight_allocates_new_shadow_map() {
        let mut scene = small_scene();
        let mut shadow_maps = ShadowMapAllocator::default();
        let original = scene
            .add_spotlight(Spotlight::new(Transform::default(), shadow_maps.allocate()))
            .unwrap();
        let copy = scene
            .duplicate(original, &mut shadow_maps)
            .unwrap()
            .unwrap();
        let a = scene.spotlights.get(original.index).unwrap();
        let b = scene.spotlights.get(copy.index).unwrap();
        assert_ne!(a.shadow_map, b.shadow_map);
        assert_eq!(a.transform, b.transform);
    }

    #[test]
    fn duplicate_into_full_registry_fails() {
        let mut scene = small_scene();
        let mut shadow_maps = ShadowMapAllocator::default();
        let plane = scene
            .add_plane(Mesh::new(MeshKind::Plane, Transform::default()))
            .unwrap();
        scene.duplicate(plane, &mut shadow_maps).unwrap().unwrap();
        let err = scene.duplicate(plane, &mut shadow_maps).unwrap();
        assert!(matches!(err, Err(RegistryError::CapacityExceeded { capacity: 2 })));
    }

    #[test]
    fn clear_keeps_capacities() {
        let mut scene = small_scene();
        scene.add_pointlight(Pointlight::default()).unwrap();
        scene
            .add_cube(Mesh::new(MeshKind::Cube, Transform::default()))
            .unwrap();
        scene.clear();
        assert_eq!(scene.object_count(), 0);
        assert_eq!(scene.capacities().cubes, 4);
    }

    #[test]
    fn stale_ref_resolves_to_nothing() {
        let mut scene = small_scene();
        let mut shadow_maps = ShadowMapAllocator::default();
        let stale = ObjectRef::new(ObjectKind::Pointlight, 1);
        assert!(scene.transform_mut(stale).is_none());
        assert!(scene.duplicate(stale, &mut shadow_maps).is_none());
        assert!(!scene.remove(stale));
    }
}
