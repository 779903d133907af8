//! Editor session state: scene registries, selection and the gizmo, owned
//! together and advanced once per frame.

pub mod gizmo;
pub mod selection;

pub use gizmo::{ClipSettings, GizmoFrame, GizmoMode, ModeTriggers, SessionView, TransformSession};
pub use selection::{Selection, SelectionError};

use crate::math::{Axis, Ray};
use crate::render::pick::{pick, PickHit};
use crate::scene::{
    Mesh, MeshKind, ObjectKind, ObjectRef, Pointlight, RegistryCapacities, RegistryError,
    SceneState, ShadowMapAllocator, Spotlight, Transform,
};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Add(ObjectKind),
    DeleteSelected,
    DuplicateSelected,
    Deselect,
    ClearScene,
}

/// Everything the editor needs from one frame of input. `ray` is the
/// pointer ray, present only while the cursor is over the 3D viewport.
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub ray: Option<Ray>,
    pub view_dir: Vec3,
    pub clicked: bool,
    pub triggers: ModeTriggers,
    pub axis_lock: Option<Axis>,
    pub cycle_axis: bool,
    pub commands: Vec<EditorCommand>,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            ray: None,
            view_dir: Vec3::NEG_Z,
            clicked: false,
            triggers: ModeTriggers::default(),
            axis_lock: None,
            cycle_axis: false,
            commands: Vec::new(),
        }
    }
}

pub struct EditorContext {
    scene: SceneState,
    selection: Selection,
    session: TransformSession,
    clip: ClipSettings,
    shadow_maps: ShadowMapAllocator,
}

impl EditorContext {
    pub fn new(capacities: RegistryCapacities, clip: ClipSettings) -> Self {
        Self {
            scene: SceneState::new(capacities),
            selection: Selection::default(),
            session: TransformSession::new(),
            clip,
            shadow_maps: ShadowMapAllocator::default(),
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn session(&self) -> &TransformSession {
        &self.session
    }

    pub fn shadow_maps_mut(&mut self) -> &mut ShadowMapAllocator {
        &mut self.shadow_maps
    }

    /// Swap in a freshly loaded scene; any selection is dropped.
    pub fn replace_scene(&mut self, scene: SceneState) {
        self.deselect();
        self.scene = scene;
    }

    pub fn select(&mut self, object: ObjectRef) -> Result<(), SelectionError> {
        if !self.scene.contains(object) {
            return Err(SelectionError::Stale(object));
        }
        if self.selection.current() != Some(object) {
            self.session.reset();
            log::info!("Selected {:?} #{}", object.kind, object.index);
        }
        self.selection.select(object);
        Ok(())
    }

    pub fn deselect(&mut self) {
        if self.selection.has_selection() {
            log::info!("Selection cleared");
        }
        self.selection.deselect();
        self.session.reset();
        self.session.set_axis_lock(None);
    }

    pub fn current_transform(&self) -> Result<&Transform, SelectionError> {
        let object = self.selection.require()?;
        self.scene
            .transform(object)
            .ok_or(SelectionError::Stale(object))
    }

    pub fn current_transform_mut(&mut self) -> Result<&mut Transform, SelectionError> {
        let object = self.selection.require()?;
        self.scene
            .transform_mut(object)
            .ok_or(SelectionError::Stale(object))
    }

    /// Swap-delete the selected object and clear the selection. Returns the
    /// reference the object had.
    pub fn delete_current(&mut self) -> Result<ObjectRef, SelectionError> {
        let object = self.selection.require()?;
        if !self.scene.remove(object) {
            return Err(SelectionError::Stale(object));
        }
        log::info!("Deleted {:?} #{}", object.kind, object.index);
        self.deselect();
        Ok(object)
    }

    /// Append a copy of the selected object and select the copy.
    pub fn duplicate_current(&mut self) -> Result<ObjectRef, EditorError> {
        let object = self.selection.require()?;
        let copy = self
            .scene
            .duplicate(object, &mut self.shadow_maps)
            .ok_or(SelectionError::Stale(object))??;
        log::info!(
            "Duplicated {:?} #{} as #{}",
            object.kind,
            object.index,
            copy.index
        );
        self.select(copy)?;
        Ok(copy)
    }

    /// Add a default object of `kind` at the origin and select it.
    pub fn add_object(&mut self, kind: ObjectKind) -> Result<ObjectRef, RegistryError> {
        let transform = Transform::default();
        let object = match kind {
            ObjectKind::Plane => self.scene.add_plane(Mesh::new(MeshKind::Plane, transform))?,
            ObjectKind::Cube => self.scene.add_cube(Mesh::new(MeshKind::Cube, transform))?,
            ObjectKind::Pointlight => self.scene.add_pointlight(Pointlight {
                transform,
                ..Pointlight::default()
            })?,
            ObjectKind::Spotlight => {
                if self.scene.spotlights.is_full() {
                    return Err(RegistryError::CapacityExceeded {
                        capacity: self.scene.spotlights.capacity(),
                    });
                }
                let shadow_map = self.shadow_maps.allocate();
                self.scene.add_spotlight(Spotlight::new(transform, shadow_map))?
            }
        };
        log::info!("Added {:?} #{}", kind, object.index);
        if let Err(err) = self.select(object) {
            log::warn!("Could not select new {:?}: {}", kind, err);
        }
        Ok(object)
    }

    /// Pick with `ray`; a hit selects, a miss deselects.
    pub fn click(&mut self, ray: &Ray) -> Option<PickHit> {
        let hit = pick(&self.scene, ray);
        match hit {
            Some(hit) => {
                log::debug!("Pick hit at {:?} (distance {:.3})", hit.point, hit.distance);
                if let Err(err) = self.select(hit.object) {
                    log::warn!("Pick returned an unselectable object: {}", err);
                }
            }
            None => self.deselect(),
        }
        hit
    }

    fn apply_command(&mut self, command: EditorCommand) {
        let result = match command {
            EditorCommand::Add(kind) => self.add_object(kind).map(|_| ()).map_err(EditorError::from),
            EditorCommand::DeleteSelected => {
                self.delete_current().map(|_| ()).map_err(EditorError::from)
            }
            EditorCommand::DuplicateSelected => self.duplicate_current().map(|_| ()),
            EditorCommand::Deselect => {
                self.deselect();
                Ok(())
            }
            EditorCommand::ClearScene => {
                self.deselect();
                self.scene.clear();
                log::info!("Scene cleared");
                Ok(())
            }
        };
        if let Err(err) = result {
            log::warn!("{:?} failed: {}", command, err);
        }
    }

    /// Run one frame: commands, axis controls, picking, then the gizmo.
    pub fn update(&mut self, input: &FrameInput) -> GizmoMode {
        for &command in &input.commands {
            self.apply_command(command);
        }

        if let Some(axis) = input.axis_lock {
            if self.session.locked_axis() != Some(axis) {
                log::debug!("Gizmo axis locked to {}", axis.label());
            }
            self.session.set_axis_lock(Some(axis));
        }
        if input.cycle_axis {
            let axis = self.session.cycle_axis();
            log::debug!("Gizmo axis locked to {}", axis.label());
        }

        if input.clicked && !self.session.is_active() {
            if let Some(ray) = &input.ray {
                self.click(ray);
            }
        }

        let frame = GizmoFrame {
            triggers: input.triggers,
            ray: input.ray,
            view_dir: input.view_dir,
        };
        // the session is moved out so the selected transform can be borrowed
        // through the context while it advances
        let clip = self.clip;
        let kind = self.selection.current().map(|object| object.kind);
        let mut session = std::mem::take(&mut self.session);
        let mode = match self.current_transform_mut() {
            Ok(transform) => session.update(&frame, kind.map(|kind| (kind, transform)), &clip),
            Err(err) => {
                if let SelectionError::Stale(object) = err {
                    log::warn!("Dropping stale selection {:?}", object);
                    self.selection.deselect();
                }
                session.update(&frame, None, &clip)
            }
        };
        self.session = session;
        mode
    }
}
