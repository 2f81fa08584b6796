mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use input::{InputAction, KeysHeld};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    world_rect_to_screen, world_to_screen, Renderer, ScreenRectPx, Viewport,
};
pub use scene::{InputEvent, InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld};
