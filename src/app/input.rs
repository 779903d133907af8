use crate::editor::{EditorCommand, ModeTriggers};
use crate::math::Axis;
use crate::render::CameraMovement;
use crate::scene::ObjectKind;
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    ZoomIn,
    ZoomOut,
    SaveScene,
    LoadScene,
}

/// Held keys plus one-shot requests collected between frames.
#[derive(Default, Debug, Clone)]
pub struct InputState {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub aim_left: bool,
    pub aim_right: bool,
    pub aim_up: bool,
    pub aim_down: bool,
    pub triggers: ModeTriggers,
    pub clicked: bool,
    axis_lock: Option<Axis>,
    cycle_axis: bool,
    commands: Vec<EditorCommand>,
}

/// One-shot input drained at the start of a frame.
#[derive(Debug, Default)]
pub struct FrameRequests {
    pub clicked: bool,
    pub axis_lock: Option<Axis>,
    pub cycle_axis: bool,
    pub commands: Vec<EditorCommand>,
}

impl InputState {
    pub fn handle_key(
        &mut self,
        key: PhysicalKey,
        pressed: bool,
        repeat: bool,
        ctrl: bool,
    ) -> InputAction {
        let PhysicalKey::Code(code) = key else {
            return InputAction::None;
        };
        match code {
            KeyCode::KeyI => self.move_forward = pressed,
            KeyCode::KeyK => self.move_backward = pressed,
            KeyCode::KeyJ => self.move_left = pressed,
            KeyCode::KeyL => self.move_right = pressed,
            KeyCode::PageUp => self.move_up = pressed,
            KeyCode::PageDown => self.move_down = pressed,
            KeyCode::ArrowLeft => self.aim_left = pressed,
            KeyCode::ArrowRight => self.aim_right = pressed,
            KeyCode::ArrowUp => self.aim_up = pressed,
            KeyCode::ArrowDown => self.aim_down = pressed,
            KeyCode::KeyG => self.triggers.translate = pressed,
            KeyCode::KeyR => self.triggers.rotate = pressed,
            KeyCode::KeyS if !ctrl => self.triggers.scale = pressed,
            _ => {}
        }
        if !pressed || repeat {
            return InputAction::None;
        }

        match code {
            KeyCode::KeyS if ctrl => return InputAction::SaveScene,
            KeyCode::KeyO if ctrl => return InputAction::LoadScene,
            KeyCode::KeyD if ctrl => self.commands.push(EditorCommand::DuplicateSelected),
            KeyCode::KeyN if ctrl => self.commands.push(EditorCommand::ClearScene),
            KeyCode::Delete | KeyCode::Backspace => {
                self.commands.push(EditorCommand::DeleteSelected)
            }
            KeyCode::Escape => self.commands.push(EditorCommand::Deselect),
            KeyCode::Digit1 => self.commands.push(EditorCommand::Add(ObjectKind::Plane)),
            KeyCode::Digit2 => self.commands.push(EditorCommand::Add(ObjectKind::Cube)),
            KeyCode::Digit3 => self.commands.push(EditorCommand::Add(ObjectKind::Pointlight)),
            KeyCode::Digit4 => self.commands.push(EditorCommand::Add(ObjectKind::Spotlight)),
            KeyCode::KeyX => self.axis_lock = Some(Axis::X),
            KeyCode::KeyY => self.axis_lock = Some(Axis::Y),
            KeyCode::KeyZ => self.axis_lock = Some(Axis::Z),
            KeyCode::Tab => self.cycle_axis = true,
            KeyCode::Equal | KeyCode::NumpadAdd => return InputAction::ZoomIn,
            KeyCode::Minus | KeyCode::NumpadSubtract => return InputAction::ZoomOut,
            _ => {}
        }
        InputAction::None
    }

    /// Forget held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.move_forward = false;
        self.move_backward = false;
        self.move_left = false;
        self.move_right = false;
        self.move_up = false;
        self.move_down = false;
        self.aim_left = false;
        self.aim_right = false;
        self.aim_up = false;
        self.aim_down = false;
        self.triggers = ModeTriggers::default();
    }

    pub fn camera_movement(&self) -> CameraMovement {
        CameraMovement {
            move_forward: self.move_forward,
            move_backward: self.move_backward,
            move_left: self.move_left,
            move_right: self.move_right,
            move_up: self.move_up,
            move_down: self.move_down,
            aim_left: self.aim_left,
            aim_right: self.aim_right,
            aim_up: self.aim_up,
            aim_down: self.aim_down,
        }
    }

    pub fn take_requests(&mut self) -> FrameRequests {
        FrameRequests {
            clicked: std::mem::take(&mut self.clicked),
            axis_lock: self.axis_lock.take(),
            cycle_axis: std::mem::take(&mut self.cycle_axis),
            commands: std::mem::take(&mut self.commands),
        }
    }
}
