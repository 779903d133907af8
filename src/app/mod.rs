mod config;
mod input;
mod timing;

use crate::editor::{EditorContext, FrameInput, GizmoMode};
use crate::render::{
    gizmo_lines, CameraController, FrameSink, FrameView, GizmoParams, LogSink, Viewport,
};
use crate::scene::serialization::{load_scene_from_file, save_scene_to_file};
use config::EditorConfig;
use input::{InputAction, InputState};
use timing::FrameTiming;

use glam::Vec3;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Modifiers, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "scenedit";
const ZOOM_STEP: f32 = 0.3;

pub struct App {
    window: Option<Arc<Window>>,
    config: EditorConfig,
    editor: EditorContext,
    input: InputState,
    modifiers: Modifiers,
    mouse_pos: Option<(f32, f32)>,
    window_size: PhysicalSize<u32>,
    camera: CameraController,
    timing: FrameTiming,
    sink: LogSink,
    last_mode: GizmoMode,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(config: EditorConfig) -> Self {
        let editor = EditorContext::new(config.capacities(), config.clip());
        let camera = CameraController::looking_at(Vec3::new(4.0, 3.0, 6.0), Vec3::ZERO)
            .with_fov(config.camera_fov_deg);
        Self {
            window: None,
            window_size: PhysicalSize::new(config.window_width, config.window_height),
            editor,
            input: InputState::default(),
            modifiers: Modifiers::default(),
            mouse_pos: None,
            camera,
            timing: FrameTiming::new(WINDOW_TITLE.to_string()),
            sink: LogSink::default(),
            last_mode: GizmoMode::Idle,
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
            config,
        }
    }

    /// The 3D area of the window: everything left of the side panel.
    fn viewport(&self) -> Viewport {
        let width = self.window_size.width as f32 - self.config.panel_width.max(0.0);
        Viewport::new(0.0, 0.0, width, self.window_size.height as f32)
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn frame_input(&mut self) -> FrameInput {
        let viewport = self.viewport();
        let requests = self.input.take_requests();
        let ray = self
            .mouse_pos
            .filter(|&(x, y)| viewport.contains(x, y))
            .map(|(x, y)| self.camera.ray_from_screen_point(x, y, &viewport));
        FrameInput {
            clicked: requests.clicked && ray.is_some(),
            ray,
            view_dir: self.camera.forward(),
            triggers: self.input.triggers,
            axis_lock: requests.axis_lock,
            cycle_axis: requests.cycle_axis,
            commands: requests.commands,
        }
    }

    fn frame(&mut self) {
        let frame_start = Instant::now();
        self.timing
            .update(self.window.as_deref(), frame_start, self.last_mode);
        self.camera
            .update_movement(&self.input.camera_movement(), self.timing.frame_dt);

        let input = self.frame_input();
        let mode = self.editor.update(&input);
        if mode != self.last_mode {
            log::debug!("Gizmo {} -> {}", self.last_mode.label(), mode.label());
            self.last_mode = mode;
        }

        let view = self.editor.session().view();
        let gizmo = self
            .editor
            .current_transform()
            .map(|transform| gizmo_lines(transform, view.as_ref(), GizmoParams::default()))
            .unwrap_or_default();
        self.sink.submit(&FrameView {
            scene: self.editor.scene(),
            camera: &self.camera,
            gizmo: &gizmo,
            session: view.as_ref(),
        });

        self.timing
            .set_update_ms(frame_start.elapsed().as_secs_f32() * 1000.0);
    }

    fn save_scene(&self) {
        let path = &self.config.scene_path;
        match save_scene_to_file(self.editor.scene(), path) {
            Ok(()) => log::info!(
                "Saved {} objects to {:?}",
                self.editor.scene().object_count(),
                path
            ),
            Err(err) => log::warn!("Failed to save scene to {:?}: {}", path, err),
        }
    }

    fn load_scene(&mut self) {
        let path = self.config.scene_path.clone();
        let capacities = self.config.capacities();
        match load_scene_from_file(&path, capacities, self.editor.shadow_maps_mut()) {
            Ok(scene) => {
                log::info!("Loaded {} objects from {:?}", scene.object_count(), path);
                self.editor.replace_scene(scene);
            }
            Err(err) => log::warn!("Failed to load scene from {:?}: {}", path, err),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(self.window_size)
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        self.window_size = window.inner_size();
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(focused) => {
                if !focused {
                    self.mouse_pos = None;
                    self.input.release_all();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                let ctrl = self.modifiers.state().control_key();
                match self
                    .input
                    .handle_key(event.physical_key, pressed, event.repeat, ctrl)
                {
                    InputAction::ZoomIn => self.camera.nudge(0.0, 0.0, ZOOM_STEP),
                    InputAction::ZoomOut => self.camera.nudge(0.0, 0.0, -ZOOM_STEP),
                    InputAction::SaveScene => self.save_scene(),
                    InputAction::LoadScene => self.load_scene(),
                    InputAction::None => {}
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers;
            }
            WindowEvent::Resized(new_size) => {
                self.window_size = new_size;
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = Some((position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_pos = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.input.clicked = true;
            }
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("scenedit starting");
    log::info!("G/R/S drag to translate/rotate/scale, X/Y/Z lock an axis, 1-4 add objects");

    let config = EditorConfig::load();
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {}", err);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", err);
    }

    log::info!("scenedit exiting");
}
