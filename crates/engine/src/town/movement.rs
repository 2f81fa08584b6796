use crate::app::{InputAction, KeysHeld};

use super::config::EngineConfig;
use super::geometry::{Rect, Size, Vec2};
use super::world::WorldTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub position: Vec2,
    /// Direction of the last held movement key in check order, if any.
    pub facing: Option<Facing>,
    pub moved: bool,
}

/// Player-controlled actor. `position` stays unset until the spawn point is
/// known; every controller treats that state as a no-op.
#[derive(Debug, Clone, Default)]
pub struct ActorState {
    position: Option<Vec2>,
    pub keys_held: KeysHeld,
    facing: Facing,
    is_moving: bool,
}

impl ActorState {
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn spawn_at(&mut self, position: Vec2) {
        self.position = Some(position);
        self.facing = Facing::Down;
        self.is_moving = false;
    }

    pub fn advance(&mut self, config: &EngineConfig, world: &WorldTable) {
        let Some(position) = self.position else {
            self.is_moving = false;
            return;
        };
        let outcome = step(
            position,
            &self.keys_held,
            config.move_speed,
            config.actor_size(),
            world,
        );
        self.position = Some(outcome.position);
        if let Some(facing) = outcome.facing {
            self.facing = facing;
        }
        self.is_moving = outcome.moved;
    }
}

/// Map-bounds check for an actor centered at `candidate`. Positions that put
/// any part of the actor box outside the map are rejected.
pub fn can_move_to(candidate: Vec2, actor_size: Size, map_size: Size) -> bool {
    if !candidate.is_finite() {
        return false;
    }
    let half = actor_size.half();
    candidate.x >= half.x
        && candidate.x <= map_size.width - half.x
        && candidate.y >= half.y
        && candidate.y <= map_size.height - half.y
}

fn is_passable(candidate: Vec2, actor_size: Size, world: &WorldTable) -> bool {
    can_move_to(candidate, actor_size, world.map_size())
        && world
            .resolve_collision(Rect::centered_at(candidate, actor_size))
            .is_none()
}

/// Advances one tick from held keys.
///
/// Keys are checked in the fixed order up, down, left, right and each one
/// only proposes a single-axis move; a later key on the same axis replaces
/// the earlier proposal, so holding up and down moves down and holding left
/// and right moves right. The Y proposal is tested first, then the X
/// proposal against the committed Y, which lets the actor slide along a wall
/// that blocks only one axis.
pub fn step(
    position: Vec2,
    keys: &KeysHeld,
    speed: f32,
    actor_size: Size,
    world: &WorldTable,
) -> StepOutcome {
    let mut facing = None;
    let mut candidate_y = None;
    let mut candidate_x = None;

    if keys.is_down(InputAction::MoveUp) {
        candidate_y = Some(position.y - speed);
        facing = Some(Facing::Up);
    }
    if keys.is_down(InputAction::MoveDown) {
        candidate_y = Some(position.y + speed);
        facing = Some(Facing::Down);
    }
    if keys.is_down(InputAction::MoveLeft) {
        candidate_x = Some(position.x - speed);
        facing = Some(Facing::Left);
    }
    if keys.is_down(InputAction::MoveRight) {
        candidate_x = Some(position.x + speed);
        facing = Some(Facing::Right);
    }

    let mut next = position;
    if let Some(y) = candidate_y {
        let candidate = Vec2::new(next.x, y);
        if is_passable(candidate, actor_size, world) {
            next = candidate;
        }
    }
    if let Some(x) = candidate_x {
        let candidate = Vec2::new(x, next.y);
        if is_passable(candidate, actor_size, world) {
            next = candidate;
        }
    }

    StepOutcome {
        position: next,
        facing,
        moved: next != position,
    }
}
