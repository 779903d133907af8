//! Gizmo debug geometry.
//!
//! Turns the selected transform and the active gizmo session into plain line
//! segments. A renderer draws them as-is; nothing here touches editor state.

use crate::editor::{GizmoMode, SessionView};
use crate::math::{axis_complement, extremum_by_dot, Axis, Extremum};
use crate::scene::Transform;
use glam::Vec3;

const AXIS_COLORS: [[u8; 4]; 3] = [[255, 80, 80, 255], [80, 255, 80, 255], [80, 160, 255, 255]];
const PLANE_COLOR: [u8; 4] = [255, 255, 80, 180];
const DRAG_COLOR: [u8; 4] = [245, 245, 245, 220];
const RING_SEGMENTS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: [u8; 4],
}

impl DebugLine {
    fn new(start: Vec3, end: Vec3, color: [u8; 4]) -> Self {
        Self { start, end, color }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GizmoParams {
    pub axis_world_len: f32,
}

impl Default for GizmoParams {
    fn default() -> Self {
        Self {
            axis_world_len: 1.0,
        }
    }
}

/// Lines for the selected object's gizmo. Without an active session only the
/// three axis arrows are produced.
pub fn gizmo_lines(
    transform: &Transform,
    session: Option<&SessionView>,
    params: GizmoParams,
) -> Vec<DebugLine> {
    let origin = transform.translation;
    let len = params.axis_world_len.max(0.0001);
    let mut out = Vec::new();

    let rotation = match session.map(|s| s.mode) {
        Some(GizmoMode::Scaling) => transform.rotation_quat(),
        _ => glam::Quat::IDENTITY,
    };
    for axis in Axis::ALL {
        let dir = rotation * axis.unit();
        let tip = origin + dir * len;
        let color = AXIS_COLORS[axis.index()];
        out.push(DebugLine::new(origin, tip, color));
        push_arrow_head(&mut out, tip, dir, len * 0.12, color);
    }

    let Some(view) = session else {
        return out;
    };

    match view.mode {
        GizmoMode::Rotating => push_ring(&mut out, view, len * 1.1),
        GizmoMode::Translating | GizmoMode::Scaling => push_plane_outline(&mut out, view, len),
        GizmoMode::Idle => {}
    }
    if let (Some(a), Some(b)) = (view.prev_intersection, view.current_intersection) {
        out.push(DebugLine::new(view.plane_point, b, DRAG_COLOR));
        if a != b {
            out.push(DebugLine::new(a, b, DRAG_COLOR));
        }
    }
    out
}

fn in_plane_basis(normal: Vec3, axis: Axis) -> (Vec3, Vec3) {
    let (u, _) = axis_complement(axis);
    let u = (u.unit() - normal * normal.dot(u.unit())).normalize_or_zero();
    let v = normal.cross(u).normalize_or_zero();
    (u, v)
}

fn push_arrow_head(out: &mut Vec<DebugLine>, tip: Vec3, dir: Vec3, size: f32, color: [u8; 4]) {
    // perpendicular to the shaft, derived from the least-aligned world axis
    let away = extremum_by_dot(dir.abs(), &[Vec3::X, Vec3::Y, Vec3::Z], Extremum::Min);
    let side = dir.cross(away).normalize_or_zero();
    let back = tip - dir * size;
    out.push(DebugLine::new(tip, back + side * size * 0.5, color));
    out.push(DebugLine::new(tip, back - side * size * 0.5, color));
}

fn push_plane_outline(out: &mut Vec<DebugLine>, view: &SessionView, half: f32) {
    let (u, v) = in_plane_basis(view.plane_normal, view.axis);
    let c = view.plane_point;
    let corners = [
        c + (u + v) * half,
        c + (u - v) * half,
        c + (-u - v) * half,
        c + (-u + v) * half,
    ];
    for i in 0..4 {
        out.push(DebugLine::new(corners[i], corners[(i + 1) % 4], PLANE_COLOR));
    }
}

fn push_ring(out: &mut Vec<DebugLine>, view: &SessionView, radius: f32) {
    let (u, v) = in_plane_basis(view.plane_normal, view.axis);
    let color = AXIS_COLORS[view.axis.index()];
    let point = |i: usize| {
        let t = (i as f32 / RING_SEGMENTS as f32) * std::f32::consts::TAU;
        view.plane_point + (u * t.cos() + v * t.sin()) * radius
    };
    for i in 0..RING_SEGMENTS {
        out.push(DebugLine::new(point(i), point(i + 1), color));
    }
}
