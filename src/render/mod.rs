mod camera;
mod editor_overlay;
pub mod pick;

pub use camera::{CameraController, CameraMovement, Viewport};
pub use editor_overlay::{gizmo_lines, DebugLine, GizmoParams};

use crate::editor::SessionView;
use crate::scene::SceneState;

/// What a renderer receives each frame. Read-only by construction.
pub struct FrameView<'a> {
    pub scene: &'a SceneState,
    pub camera: &'a CameraController,
    pub gizmo: &'a [DebugLine],
    pub session: Option<&'a SessionView>,
}

/// Draw-side collaborator. Implementations must not feed anything back into
/// the editor.
pub trait FrameSink {
    fn submit(&mut self, frame: &FrameView<'_>);
}

/// Headless sink that only reports what would be drawn.
#[derive(Debug, Default)]
pub struct LogSink {
    last_counts: Option<(usize, usize)>,
}

impl FrameSink for LogSink {
    fn submit(&mut self, frame: &FrameView<'_>) {
        let counts = (frame.scene.object_count(), frame.gizmo.len());
        if self.last_counts != Some(counts) {
            log::debug!(
                "Frame: {} objects, {} gizmo lines, camera at {:?}",
                counts.0,
                counts.1,
                frame.camera.position
            );
            self.last_counts = Some(counts);
        }
        for light in frame.scene.spotlights.iter() {
            log::trace!(
                "spotlight at {:?} uses shadow map {}",
                light.transform.translation,
                light.shadow_map.0
            );
        }
        if let Some(view) = frame.session {
            log::trace!(
                "{} on {}: totals t={:?} r={:?} s={:?}",
                view.mode.label(),
                view.axis.label(),
                view.accumulated.translation,
                view.accumulated.rotation,
                view.accumulated.scale
            );
        }
        for line in frame.gizmo {
            log::trace!("line {:?} -> {:?} rgba {:?}", line.start, line.end, line.color);
        }
    }
}
