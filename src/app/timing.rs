use crate::editor::GizmoMode;
use std::time::{Duration, Instant};
use winit::window::Window;

const TITLE_REFRESH: Duration = Duration::from_millis(500);

pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    update_ms: f32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: String) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: Instant::now(),
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            update_ms: 0.0,
            base_title,
        }
    }

    pub fn set_update_ms(&mut self, update_ms: f32) {
        self.update_ms = update_ms;
    }

    /// Advance the frame clock. Every half second the window title is
    /// refreshed with the frame rate and `mode`.
    pub fn update(&mut self, window: Option<&Window>, now: Instant, mode: GizmoMode) {
        let dt_duration = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::from_millis(16),
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed >= TITLE_REFRESH {
            if let Some(window) = window {
                window.set_title(&self.title(elapsed, mode));
            }
            self.frame_count = 0;
            self.last_fps_time = now;
        }
    }

    fn title(&self, elapsed: Duration, mode: GizmoMode) -> String {
        let fps = self.frame_count as f32 / elapsed.as_secs_f32().max(1e-6);
        format!(
            "{} [{}] - {:.1} fps (cadence {:.2} ms, update {:.2} ms)",
            self.base_title,
            mode.label(),
            fps,
            self.frame_dt * 1000.0,
            self.update_ms
        )
    }
}
