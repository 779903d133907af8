//! scenedit - a minimal interactive 3D scene editor core.
//!
//! Objects live in fixed-capacity registries, are picked with a pointer
//! ray and edited with a plane-constrained translate/rotate/scale gizmo.

mod app;
mod editor;
mod math;
mod render;
mod scene;

fn main() {
    app::run();
}
