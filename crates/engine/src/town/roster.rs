use std::fmt;

use super::geometry::{Rect, Size, Vec2};

/// Footprint of the standard house sprite. House interaction is measured
/// from the center of this footprint, whatever size the house renders at.
pub const HOUSE_SPRITE_SIZE: Size = Size::new(64.0, 64.0);
pub const HOUSE_CENTER_OFFSET: Vec2 = Vec2::new(
    HOUSE_SPRITE_SIZE.width / 2.0,
    HOUSE_SPRITE_SIZE.height / 2.0,
);
/// Spawn point relative to the player's house: centered, south of the door.
pub const ACTOR_SPAWN_OFFSET: Vec2 = Vec2::new(HOUSE_CENTER_OFFSET.x, 80.0);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeammateId(pub String);

impl fmt::Display for TeammateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Teammate {
    pub id: TeammateId,
    pub name: String,
    pub house_position: Vec2,
    pub is_player: bool,
}

impl Teammate {
    pub fn house_center(&self) -> Vec2 {
        self.house_position.offset_by(HOUSE_CENTER_OFFSET)
    }

    pub fn house_footprint(&self) -> Rect {
        Rect::new(
            self.house_position.x,
            self.house_position.y,
            HOUSE_SPRITE_SIZE.width,
            HOUSE_SPRITE_SIZE.height,
        )
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.house_position.offset_by(ACTOR_SPAWN_OFFSET)
    }
}

pub fn find_player(roster: &[Teammate]) -> Option<&Teammate> {
    roster.iter().find(|teammate| teammate.is_player)
}
