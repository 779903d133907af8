//! Transform gizmo state machine.
//!
//! While a mode key is held the pointer ray is intersected every frame with a
//! constraint plane chosen for the active axis. Consecutive intersections
//! become deltas that are summed into per-channel accumulators; the
//! accumulators are snapped and clamped only when written back to the
//! object, so small motions are never lost to rounding.
//!
//! Accumulators are seeded from the object's transform on the frame the
//! session becomes active and are left untouched when it ends.

use crate::math::{
    closest_point_on_plane, extremum_by_dot, has_nan, plane_ray_intersect,
    rotation_to_euler_degrees, snap_vec, wrap_degrees, Axis, Extremum, Ray,
};
use crate::scene::{ObjectKind, Transform, MIN_SCALE};
use glam::{Quat, Vec3};

/// Pointer positions closer than this to the pivot do not rotate.
pub const ROTATE_DEAD_ZONE: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Idle,
    Translating,
    Rotating,
    Scaling,
}

impl GizmoMode {
    pub fn label(self) -> &'static str {
        match self {
            GizmoMode::Idle => "idle",
            GizmoMode::Translating => "translate",
            GizmoMode::Rotating => "rotate",
            GizmoMode::Scaling => "scale",
        }
    }
}

/// Mode keys currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeTriggers {
    pub translate: bool,
    pub rotate: bool,
    pub scale: bool,
}

/// Snap step per channel; zero or negative disables snapping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipSettings {
    pub translate: f32,
    pub rotate: f32,
    pub scale: f32,
}

/// First matching trigger wins: translate, then rotate for anything but
/// pointlights, then scale for meshes.
pub fn select_mode(triggers: ModeTriggers, kind: ObjectKind) -> GizmoMode {
    if triggers.translate {
        GizmoMode::Translating
    } else if triggers.rotate && kind.can_rotate() {
        GizmoMode::Rotating
    } else if triggers.scale && kind.can_scale() {
        GizmoMode::Scaling
    } else {
        GizmoMode::Idle
    }
}

/// Running, unclipped totals for each transform channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDelta {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl From<&Transform> for TransformDelta {
    fn from(t: &Transform) -> Self {
        Self {
            translation: t.translation,
            rotation: t.rotation,
            scale: t.scale,
        }
    }
}

/// Per-frame input to the gizmo.
#[derive(Debug, Clone, Copy)]
pub struct GizmoFrame {
    pub triggers: ModeTriggers,
    pub ray: Option<Ray>,
    pub view_dir: Vec3,
}

/// Read-only snapshot of an active session, for overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionView {
    pub mode: GizmoMode,
    pub axis: Axis,
    pub plane_normal: Vec3,
    pub plane_point: Vec3,
    pub prev_intersection: Option<Vec3>,
    pub current_intersection: Option<Vec3>,
    pub accumulated: TransformDelta,
}

#[derive(Debug, Clone)]
pub struct TransformSession {
    mode: GizmoMode,
    axis: Axis,
    locked_axis: Option<Axis>,
    plane_normal: Vec3,
    plane_point: Vec3,
    prev_intersection: Option<Vec3>,
    current_intersection: Option<Vec3>,
    accumulated: TransformDelta,
    active: bool,
}

impl Default for TransformSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformSession {
    pub fn new() -> Self {
        Self {
            mode: GizmoMode::Idle,
            axis: Axis::Y,
            locked_axis: None,
            plane_normal: Vec3::Y,
            plane_point: Vec3::ZERO,
            prev_intersection: None,
            current_intersection: None,
            accumulated: TransformDelta::from(&Transform::default()),
            active: false,
        }
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn locked_axis(&self) -> Option<Axis> {
        self.locked_axis
    }

    /// Lock the constraint axis; `None` returns to the view-derived default.
    pub fn set_axis_lock(&mut self, axis: Option<Axis>) {
        self.locked_axis = axis;
    }

    /// Lock the axis after the current one (X, Y, Z, X, ...).
    pub fn cycle_axis(&mut self) -> Axis {
        let next = self.locked_axis.unwrap_or(self.axis).next();
        self.locked_axis = Some(next);
        next
    }

    pub fn view(&self) -> Option<SessionView> {
        self.active.then_some(SessionView {
            mode: self.mode,
            axis: self.axis,
            plane_normal: self.plane_normal,
            plane_point: self.plane_point,
            prev_intersection: self.prev_intersection,
            current_intersection: self.current_intersection,
            accumulated: self.accumulated,
        })
    }

    /// End any running session. Called when the selection goes away.
    pub fn reset(&mut self) {
        if self.active {
            log::info!("Gizmo {} session ended", self.mode.label());
        }
        self.active = false;
        self.mode = GizmoMode::Idle;
        self.prev_intersection = None;
        self.current_intersection = None;
    }

    /// Advance one frame. `selected` is the selected object's kind and
    /// transform, or `None` when nothing is selected.
    pub fn update(
        &mut self,
        frame: &GizmoFrame,
        selected: Option<(ObjectKind, &mut Transform)>,
        clip: &ClipSettings,
    ) -> GizmoMode {
        let Some((kind, transform)) = selected else {
            self.reset();
            return self.mode;
        };

        let desired = select_mode(frame.triggers, kind);
        if desired == GizmoMode::Idle {
            self.reset();
            return self.mode;
        }

        if !self.active {
            self.active = true;
            self.accumulated = TransformDelta::from(&*transform);
            log::info!("Gizmo {} session started", desired.label());
        }

        let axis_changed = self.locked_axis.is_some_and(|axis| axis != self.axis);
        if desired != self.mode || axis_changed || self.prev_intersection.is_none() {
            self.enter(desired, transform, frame);
            return self.mode;
        }

        let Some(ray) = frame.ray else {
            return self.mode;
        };
        match self.mode {
            GizmoMode::Translating => self.step_translate(transform, &ray, clip),
            GizmoMode::Rotating => self.step_rotate(transform, &ray, clip),
            GizmoMode::Scaling => self.step_scale(transform, &ray, clip),
            GizmoMode::Idle => {}
        }
        self.mode
    }

    /// Pick the axis and constraint plane for `mode` and anchor the drag at
    /// the pointer's current intersection.
    fn enter(&mut self, mode: GizmoMode, transform: &Transform, frame: &GizmoFrame) {
        let rotation = match mode {
            GizmoMode::Scaling => transform.rotation_quat(),
            _ => Quat::IDENTITY,
        };
        self.mode = mode;
        self.axis = self
            .locked_axis
            .unwrap_or_else(|| default_axis(frame.view_dir, rotation));
        self.plane_normal = rotation * self.axis.unit();
        self.plane_point = transform.translation;
        self.prev_intersection = frame.ray.and_then(|ray| self.intersect(&ray));
        self.current_intersection = self.prev_intersection;
        log::debug!(
            "Gizmo {} on axis {} (normal {:?})",
            mode.label(),
            self.axis.label(),
            self.plane_normal
        );
    }

    fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let hit = plane_ray_intersect(self.plane_normal, self.plane_point, ray.origin, ray.direction);
        if hit.is_none() {
            log::debug!("Pointer ray parallel to gizmo plane; skipping frame");
        }
        hit
    }

    fn step_translate(&mut self, transform: &mut Transform, ray: &Ray, clip: &ClipSettings) {
        let (Some(prev), Some(hit)) = (self.prev_intersection, self.intersect(ray)) else {
            return;
        };
        let delta = hit - prev;
        self.accumulated.translation += delta;
        transform.translation = snap_vec(self.accumulated.translation, clip.translate);
        self.prev_intersection = Some(hit);
        self.current_intersection = Some(hit);
        log::trace!("translate delta {:?}", delta);
    }

    fn step_scale(&mut self, transform: &mut Transform, ray: &Ray, clip: &ClipSettings) {
        let (Some(prev), Some(hit)) = (self.prev_intersection, self.intersect(ray)) else {
            return;
        };
        let hit = closest_point_on_plane(hit, self.plane_point, self.plane_normal);
        let inverse = transform.rotation_quat().inverse();
        let local_new = inverse * (hit - self.plane_point);
        let local_prev = inverse * (prev - self.plane_point);
        let delta = local_new - local_prev;
        self.accumulated.scale += delta;
        transform.scale = snap_vec(self.accumulated.scale, clip.scale).max(Vec3::splat(MIN_SCALE));
        self.prev_intersection = Some(hit);
        self.current_intersection = Some(hit);
        log::trace!("scale delta {:?}", delta);
    }

    fn step_rotate(&mut self, transform: &mut Transform, ray: &Ray, clip: &ClipSettings) {
        let (Some(prev), Some(hit)) = (self.prev_intersection, self.intersect(ray)) else {
            return;
        };
        self.current_intersection = Some(hit);
        let pivot = transform.translation;
        let to_new = hit - pivot;
        if to_new.length() <= ROTATE_DEAD_ZONE {
            return;
        }
        let to_prev = prev - pivot;
        if to_prev.length() <= ROTATE_DEAD_ZONE {
            // anchor was inside the dead zone; re-anchor outside it
            self.prev_intersection = Some(hit);
            return;
        }

        let prev_dir = to_prev.normalize();
        let new_dir = to_new.normalize();
        let Some(axis) = prev_dir.cross(new_dir).try_normalize() else {
            return;
        };
        let angle = prev_dir.dot(new_dir).clamp(-1.0, 1.0).acos();
        let delta = rotation_to_euler_degrees(Quat::from_axis_angle(axis, angle));
        if has_nan(delta) {
            log::debug!("Degenerate rotation delta; skipping frame");
            return;
        }

        self.accumulated.rotation += delta;
        let snapped = snap_vec(self.accumulated.rotation, clip.rotate);
        transform.rotation = Vec3::new(
            wrap_degrees(snapped.x),
            wrap_degrees(snapped.y),
            wrap_degrees(snapped.z),
        );
        self.prev_intersection = Some(hit);
        log::trace!("rotate delta {:?}", delta);
    }
}

/// The (possibly rotated) axis most aligned with the view direction, so the
/// constraint plane faces the camera.
fn default_axis(view_dir: Vec3, rotation: Quat) -> Axis {
    let candidates: Vec<Vec3> = Axis::ALL
        .iter()
        .flat_map(|axis| {
            let n = rotation * axis.unit();
            [n, -n]
        })
        .collect();
    let best = extremum_by_dot(view_dir, &candidates, Extremum::Max);
    Axis::from_dominant(rotation.inverse() * best)
}
