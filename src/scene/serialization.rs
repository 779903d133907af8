//! Binary scene file.
//!
//! Layout: a [`FileHeader`] followed by `counts[0]` plane records,
//! `counts[1]` cube records, `counts[2]` pointlight records and `counts[3]`
//! spotlight records. Every record is a fixed-size `#[repr(C)]` struct
//! written in native byte order.

use crate::scene::{
    Mesh, MeshKind, Pointlight, RegistryCapacities, RegistryError, SceneState,
    ShadowMapAllocator, Spotlight, Transform,
};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::io::Write;
use std::path::Path;

pub const MAGIC: [u8; 4] = *b"SCNE";
pub const VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a scene file (bad magic {0:?})")]
    BadMagic([u8; 4]),
    #[error("unsupported scene version {0}")]
    UnsupportedVersion(u32),
    #[error("scene file truncated at byte {0}")]
    Truncated(usize),
    #[error("scene does not fit: {0}")]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FileHeader {
    magic: [u8; 4],
    version: u32,
    counts: [u32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformRecord {
    pub translation: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl From<&Transform> for TransformRecord {
    fn from(t: &Transform) -> Self {
        Self {
            translation: t.translation.to_array(),
            rotation: t.rotation.to_array(),
            scale: t.scale.to_array(),
        }
    }
}

impl From<TransformRecord> for Transform {
    fn from(r: TransformRecord) -> Self {
        Self {
            translation: Vec3::from_array(r.translation),
            rotation: Vec3::from_array(r.rotation),
            scale: Vec3::from_array(r.scale),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MeshRecord {
    transform: TransformRecord,
    material: u32,
    kind: u32,
    uv_multiplier: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct PointlightRecord {
    transform: TransformRecord,
    color: [f32; 3],
    range: f32,
    specular: f32,
    intensity: f32,
    on: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SpotlightRecord {
    transform: TransformRecord,
    color: [f32; 3],
    specular: f32,
    range: f32,
    fov_deg: f32,
    outer_cutoff_deg: f32,
    on: u32,
}

impl From<&Mesh> for MeshRecord {
    fn from(m: &Mesh) -> Self {
        Self {
            transform: (&m.transform).into(),
            material: m.material,
            kind: match m.kind {
                MeshKind::Plane => 0,
                MeshKind::Cube => 1,
            },
            uv_multiplier: m.uv_multiplier,
        }
    }
}

impl From<MeshRecord> for Mesh {
    fn from(r: MeshRecord) -> Self {
        Self {
            transform: r.transform.into(),
            material: r.material,
            kind: if r.kind == 0 {
                MeshKind::Plane
            } else {
                MeshKind::Cube
            },
            uv_multiplier: r.uv_multiplier,
        }
    }
}

impl From<&Pointlight> for PointlightRecord {
    fn from(l: &Pointlight) -> Self {
        Self {
            transform: (&l.transform).into(),
            color: l.color.to_array(),
            range: l.range,
            specular: l.specular,
            intensity: l.intensity,
            on: l.on as u32,
        }
    }
}

impl From<PointlightRecord> for Pointlight {
    fn from(r: PointlightRecord) -> Self {
        Self {
            transform: r.transform.into(),
            color: Vec3::from_array(r.color),
            range: r.range,
            specular: r.specular,
            intensity: r.intensity,
            on: r.on != 0,
        }
    }
}

impl From<&Spotlight> for SpotlightRecord {
    fn from(l: &Spotlight) -> Self {
        Self {
            transform: (&l.transform).into(),
            color: l.color.to_array(),
            specular: l.specular,
            range: l.range,
            fov_deg: l.fov_deg,
            outer_cutoff_deg: l.outer_cutoff_deg,
            on: l.on as u32,
        }
    }
}

fn write_records<T: Pod, W: Write>(out: &mut W, records: impl Iterator<Item = T>) -> Result<()> {
    for record in records {
        out.write_all(bytemuck::bytes_of(&record))?;
    }
    Ok(())
}

pub fn write_scene<W: Write>(scene: &SceneState, out: &mut W) -> Result<()> {
    let header = FileHeader {
        magic: MAGIC,
        version: VERSION,
        counts: [
            scene.planes.len() as u32,
            scene.cubes.len() as u32,
            scene.pointlights.len() as u32,
            scene.spotlights.len() as u32,
        ],
    };
    out.write_all(bytemuck::bytes_of(&header))?;
    write_records(out, scene.planes.iter().map(MeshRecord::from))?;
    write_records(out, scene.cubes.iter().map(MeshRecord::from))?;
    write_records(out, scene.pointlights.iter().map(PointlightRecord::from))?;
    write_records(out, scene.spotlights.iter().map(SpotlightRecord::from))?;
    Ok(())
}

struct RecordReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> RecordReader<'a> {
    fn next<T: Pod>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let end = self.offset + size;
        let Some(slice) = self.bytes.get(self.offset..end) else {
            return Err(SerializationError::Truncated(self.offset));
        };
        self.offset = end;
        Ok(bytemuck::pod_read_unaligned(slice))
    }
}

/// Decode a scene into registries sized by `capacities`. Spotlights are
/// given fresh shadow maps from `shadow_maps`.
pub fn read_scene(
    bytes: &[u8],
    capacities: RegistryCapacities,
    shadow_maps: &mut ShadowMapAllocator,
) -> Result<SceneState> {
    let mut reader = RecordReader { bytes, offset: 0 };
    let header: FileHeader = reader.next()?;
    if header.magic != MAGIC {
        return Err(SerializationError::BadMagic(header.magic));
    }
    if header.version != VERSION {
        return Err(SerializationError::UnsupportedVersion(header.version));
    }

    let mut scene = SceneState::new(capacities);
    let [planes, cubes, pointlights, spotlights] = header.counts;
    for _ in 0..planes {
        let record: MeshRecord = reader.next()?;
        scene.add_plane(record.into())?;
    }
    for _ in 0..cubes {
        let record: MeshRecord = reader.next()?;
        scene.add_cube(record.into())?;
    }
    for _ in 0..pointlights {
        let record: PointlightRecord = reader.next()?;
        scene.add_pointlight(record.into())?;
    }
    for _ in 0..spotlights {
        let record: SpotlightRecord = reader.next()?;
        let mut light = Spotlight::new(record.transform.into(), shadow_maps.allocate());
        light.color = Vec3::from_array(record.color);
        light.specular = record.specular;
        light.range = record.range;
        light.fov_deg = record.fov_deg;
        light.outer_cutoff_deg = record.outer_cutoff_deg;
        light.on = record.on != 0;
        scene.add_spotlight(light)?;
    }
    Ok(scene)
}

pub fn save_scene_to_file(scene: &SceneState, path: &Path) -> Result<()> {
    let mut bytes = Vec::new();
    write_scene(scene, &mut bytes)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn load_scene_from_file(
    path: &Path,
    capacities: RegistryCapacities,
    shadow_maps: &mut ShadowMapAllocator,
) -> Result<SceneState> {
    let bytes = std::fs::read(path)?;
    read_scene(&bytes, capacities, shadow_maps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshKind, ObjectKind, ObjectRef};

    fn sample_scene(shadow_maps: &mut ShadowMapAllocator) -> SceneState {
        let mut scene = SceneState::default();
        let mut plane = Mesh::new(MeshKind::Plane, Transform::default());
        plane.material = 3;
        plane.uv_multiplier = 4.0;
        scene.add_plane(plane).unwrap();
        scene
            .add_cube(Mesh::new(
                MeshKind::Cube,
                Transform {
                    translation: Vec3::new(1.0, 2.0, 3.0),
                    rotation: Vec3::new(10.0, 20.0, 30.0),
                    scale: Vec3::new(0.5, 1.5, 2.5),
                },
            ))
            .unwrap();
        scene
            .add_pointlight(Pointlight {
                on: false,
                ..Pointlight::default()
            })
            .unwrap();
        scene
            .add_spotlight(Spotlight::new(
                Transform::from_translation(Vec3::Y),
                shadow_maps.allocate(),
            ))
            .unwrap();
        scene
    }

    #[test]
    fn test_scene_survives_write_and_read() {
        let mut shadow_maps = ShadowMapAllocator::default();
        let scene = sample_scene(&mut shadow_maps);
        let mut bytes = Vec::new();
        write_scene(&scene, &mut bytes).unwrap();

        let loaded = read_scene(&bytes, scene.capacities(), &mut shadow_maps).unwrap();
        assert_eq!(loaded.object_count(), 4);
        assert_eq!(loaded.planes.get(0).unwrap().material, 3);
        assert_eq!(loaded.planes.get(0).unwrap().uv_multiplier, 4.0);
        assert_eq!(
            loaded.transform(ObjectRef::new(ObjectKind::Cube, 0)),
            scene.transform(ObjectRef::new(ObjectKind::Cube, 0))
        );
        assert!(!loaded.pointlights.get(0).unwrap().on);
        assert_ne!(
            loaded.spotlights.get(0).unwrap().shadow_map,
            scene.spotlights.get(0).unwrap().shadow_map
        );
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut shadow_maps = ShadowMapAllocator::default();
        let mut bytes = Vec::new();
        write_scene(&SceneState::default(), &mut bytes).unwrap();
        bytes[0] = b'X';
        let err = read_scene(&bytes, RegistryCapacities::default(), &mut shadow_maps);
        assert!(matches!(err, Err(SerializationError::BadMagic(_))));
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let mut shadow_maps = ShadowMapAllocator::default();
        let scene = sample_scene(&mut shadow_maps);
        let mut bytes = Vec::new();
        write_scene(&scene, &mut bytes).unwrap();
        bytes.truncate(bytes.len() - 4);
        let err = read_scene(&bytes, scene.capacities(), &mut shadow_maps);
        assert!(matches!(err, Err(SerializationError::Truncated(_))));
    }

    #[test]
    fn test_truncation_reports_start_of_short_record() {
        let mut shadow_maps = ShadowMapAllocator::default();
        let scene = sample_scene(&mut shadow_maps);
        let mut bytes = Vec::new();
        write_scene(&scene, &mut bytes).unwrap();
        let header_len = std::mem::size_of::<FileHeader>();
        bytes.truncate(header_len + 10);
        let err = read_scene(&bytes, scene.capacities(), &mut shadow_maps);
        assert!(matches!(err, Err(SerializationError::Truncated(at)) if at == header_len));
    }

    #[test]
    fn test_scene_larger_than_capacity_is_rejected() {
        let mut shadow_maps = ShadowMapAllocator::default();
        let scene = sample_scene(&mut shadow_maps);
        let mut bytes = Vec::new();
        write_scene(&scene, &mut bytes).unwrap();
        let tight = RegistryCapacities {
            planes: 0,
            ..RegistryCapacities::default()
        };
        let err = read_scene(&bytes, tight, &mut shadow_maps);
        assert!(matches!(err, Err(SerializationError::Registry(_))));
    }

    #[test]
    fn test_save_load_via_file() {
        let mut shadow_maps = ShadowMapAllocator::default();
        let scene = sample_scene(&mut shadow_maps);

        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("scenedit_scene_{}_{}.bin", std::process::id(), nonce));

        save_scene_to_file(&scene, &path).unwrap();
        let loaded = load_scene_from_file(&path, scene.capacities(), &mut shadow_maps).unwrap();
        assert_eq!(loaded.cubes.len(), 1);
        assert_eq!(loaded.spotlights.len(), 1);

        let _ = std::fs::remove_file(path);
    }
}
