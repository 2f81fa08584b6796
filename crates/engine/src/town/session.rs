use tracing::{debug, info, warn};

use crate::app::{InputAction, KeysHeld};

use super::camera::{CameraState, CameraTransform};
use super::config::EngineConfig;
use super::geometry::{Size, Vec2};
use super::interaction::{resolve_activation, resolve_prompt, InteractionEvent, InteractionPrompt};
use super::movement::{ActorState, Facing};
use super::roster::{find_player, Teammate};
use super::world::WorldTable;

/// Read-only snapshot of one tick, handed to renderers and UI adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub actor_position: Option<Vec2>,
    pub facing: Facing,
    pub is_moving: bool,
    pub camera: CameraTransform,
    pub prompt: InteractionPrompt,
}

/// Per-view game state: actor, camera and held keys over an immutable world.
///
/// Created when a view mounts and dropped when it unmounts. The roster is
/// passed into every call and never stored.
#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    world: WorldTable,
    actor: ActorState,
    camera: CameraState,
    ticks: u64,
}

impl Session {
    pub fn new(config: EngineConfig, world: WorldTable) -> Self {
        let camera = CameraState::new(config.zoom_limits());
        Self {
            config,
            world,
            actor: ActorState::default(),
            camera,
            ticks: 0,
        }
    }

    /// Places the actor in front of the player's house. Without a player the
    /// actor stays unspawned and every controller idles.
    pub fn spawn_from_roster(&mut self, roster: &[Teammate]) -> Option<Vec2> {
        let Some(player) = find_player(roster) else {
            warn!(teammates = roster.len(), "player_missing_from_roster");
            return None;
        };
        let spawn = player.spawn_point();
        self.actor.spawn_at(spawn);
        info!(
            player = %player.id,
            x = spawn.x,
            y = spawn.y,
            "actor_spawned"
        );
        Some(spawn)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldTable {
        &self.world
    }

    pub fn actor(&self) -> &ActorState {
        &self.actor
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn keys_held(&self) -> &KeysHeld {
        &self.actor.keys_held
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Records a key press. Interaction and zoom actions fire once per press;
    /// repeats while the key stays down are ignored.
    pub fn key_down(&mut self, action: InputAction, roster: &[Teammate]) -> Option<InteractionEvent> {
        let was_down = self.actor.keys_held.is_down(action);
        self.actor.keys_held.set(action, true);

        if action.is_movement() {
            self.camera.begin_recentering();
            return None;
        }
        if action.is_pan() {
            self.camera.cancel_recentering();
            return None;
        }
        if was_down {
            return None;
        }

        let limits = self.config.zoom_limits();
        match action {
            InputAction::Interact => {
                let event = resolve_activation(
                    self.actor.position(),
                    roster,
                    &self.world,
                    self.config.interaction_ranges(),
                );
                if let Some(event) = &event {
                    info!(event = ?event, "interaction_triggered");
                }
                event
            }
            InputAction::ZoomIn => {
                self.camera.apply_zoom_steps(1, limits);
                debug!(zoom = self.camera.zoom(), "camera_zoom_changed");
                None
            }
            InputAction::ZoomOut => {
                self.camera.apply_zoom_steps(-1, limits);
                debug!(zoom = self.camera.zoom(), "camera_zoom_changed");
                None
            }
            InputAction::ZoomReset => {
                self.camera.reset(limits);
                debug!("camera_reset");
                None
            }
            _ => None,
        }
    }

    pub fn key_up(&mut self, action: InputAction) {
        self.actor.keys_held.set(action, false);
    }

    pub fn clear_held_keys(&mut self) {
        self.actor.keys_held.clear();
    }

    /// Mouse wheel zoom. Positive steps zoom in.
    pub fn apply_zoom_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        self.camera.apply_zoom_steps(steps, self.config.zoom_limits());
        debug!(zoom = self.camera.zoom(), "camera_zoom_changed");
    }

    /// One fixed step: movement, then camera, then prompt.
    pub fn tick(&mut self, roster: &[Teammate], viewport: Size) -> TickReport {
        self.ticks = self.ticks.saturating_add(1);

        self.actor.advance(&self.config, &self.world);

        let map_size = self.world.map_size();
        let pan = pan_direction(&self.actor.keys_held);
        self.camera.apply_pan(pan, self.config.camera_pan_speed, map_size);
        self.camera
            .decay_recentering(self.config.recenter_rate, self.config.recenter_threshold);

        let actor_position = self.actor.position();
        let prompt = resolve_prompt(
            actor_position,
            roster,
            &self.world,
            self.config.interaction_ranges(),
        );

        TickReport {
            tick: self.ticks,
            actor_position,
            facing: self.actor.facing(),
            is_moving: self.actor.is_moving(),
            camera: self.camera.transform(actor_position, viewport, map_size),
            prompt,
        }
    }
}

/// Same check order as movement keys: a later key overrides an earlier one
/// on its axis.
fn pan_direction(keys: &KeysHeld) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if keys.is_down(InputAction::PanUp) {
        direction.y = -1.0;
    }
    if keys.is_down(InputAction::PanDown) {
        direction.y = 1.0;
    }
    if keys.is_down(InputAction::PanLeft) {
        direction.x = -1.0;
    }
    if keys.is_down(InputAction::PanRight) {
        direction.x = 1.0;
    }
    direction
}
