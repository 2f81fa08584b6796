//! Window-independent neighborhood logic: geometry, movement, camera framing
//! and interaction prompts. Nothing in here touches winit or pixels.

mod camera;
mod config;
mod geometry;
mod interaction;
mod movement;
mod roster;
mod session;
mod world;

pub use camera::{compute_transform, CameraState, CameraTransform};
pub use config::{
    EngineConfig, EngineConfigError, ZoomLimits, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX,
    CAMERA_ZOOM_MIN, CAMERA_ZOOM_STEP,
};
pub use geometry::{Rect, Size, Vec2};
pub use interaction::{
    resolve_activation, resolve_prompt, InteractionEvent, InteractionPrompt, InteractionRanges,
    PromptTarget,
};
pub use movement::{can_move_to, step, ActorState, Facing, StepOutcome};
pub use roster::{
    find_player, Teammate, TeammateId, ACTOR_SPAWN_OFFSET, HOUSE_CENTER_OFFSET, HOUSE_SPRITE_SIZE,
};
pub use session::{Session, TickReport};
pub use world::{WorldObject, WorldObjectId, WorldObjectKind, WorldTable};
