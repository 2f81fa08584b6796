use super::geometry::Vec2;
use super::roster::{Teammate, TeammateId};
use super::world::{WorldObject, WorldObjectId, WorldObjectKind, WorldTable};

/// Requests for the UI panels that sit outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    OpenOwnBoard,
    ViewTeammateBoard(TeammateId),
    OpenTownHallPanel,
    InspectObject(WorldObjectId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptTarget {
    OwnHouse(TeammateId),
    TeammateHouse(TeammateId),
    Object {
        id: WorldObjectId,
        kind: WorldObjectKind,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionPrompt {
    pub visible: bool,
    pub message: String,
    pub anchor_position: Vec2,
    pub target: Option<PromptTarget>,
    /// False for informational prompts that have nothing to activate.
    pub actionable: bool,
}

impl InteractionPrompt {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            message: String::new(),
            anchor_position: Vec2::ZERO,
            target: None,
            actionable: false,
        }
    }
}

impl Default for InteractionPrompt {
    fn default() -> Self {
        Self::hidden()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRanges {
    /// Per-axis half extent of the box around a house center.
    pub house: f32,
    /// Euclidean radius around an object center.
    pub object: f32,
}

enum ResolvedTarget<'a> {
    House(&'a Teammate),
    Object(&'a WorldObject),
}

/// Houses always win over generic objects: the first teammate in roster
/// order whose house box contains the actor is the target, and objects are
/// only considered when no house matched.
fn resolve_target<'a>(
    actor: Vec2,
    roster: &'a [Teammate],
    world: &'a WorldTable,
    ranges: InteractionRanges,
) -> Option<ResolvedTarget<'a>> {
    let house = roster.iter().find(|teammate| {
        let center = teammate.house_center();
        (actor.x - center.x).abs() < ranges.house && (actor.y - center.y).abs() < ranges.house
    });
    if let Some(teammate) = house {
        return Some(ResolvedTarget::House(teammate));
    }
    world
        .nearest_interactable(actor, ranges.object)
        .map(ResolvedTarget::Object)
}

pub fn resolve_prompt(
    actor: Option<Vec2>,
    roster: &[Teammate],
    world: &WorldTable,
    ranges: InteractionRanges,
) -> InteractionPrompt {
    let Some(actor) = actor else {
        return InteractionPrompt::hidden();
    };
    match resolve_target(actor, roster, world, ranges) {
        Some(ResolvedTarget::House(teammate)) => house_prompt(teammate),
        Some(ResolvedTarget::Object(object)) => object_prompt(object),
        None => InteractionPrompt::hidden(),
    }
}

/// Resolves the target at the actor's current position, never a prompt
/// computed on an earlier tick, and maps it to the event to dispatch.
pub fn resolve_activation(
    actor: Option<Vec2>,
    roster: &[Teammate],
    world: &WorldTable,
    ranges: InteractionRanges,
) -> Option<InteractionEvent> {
    let actor = actor?;
    match resolve_target(actor, roster, world, ranges)? {
        ResolvedTarget::House(teammate) if teammate.is_player => {
            Some(InteractionEvent::OpenOwnBoard)
        }
        ResolvedTarget::House(teammate) => {
            Some(InteractionEvent::ViewTeammateBoard(teammate.id.clone()))
        }
        ResolvedTarget::Object(object) => match object.kind {
            WorldObjectKind::TownHall => Some(InteractionEvent::OpenTownHallPanel),
            WorldObjectKind::EmptyLand => None,
            _ => Some(InteractionEvent::InspectObject(object.id.clone())),
        },
    }
}

fn house_prompt(teammate: &Teammate) -> InteractionPrompt {
    let center = teammate.house_center();
    let (message, target) = if teammate.is_player {
        (
            "Press E to update your board".to_string(),
            PromptTarget::OwnHouse(teammate.id.clone()),
        )
    } else {
        (
            format!("Press E to view {}'s board", teammate.name),
            PromptTarget::TeammateHouse(teammate.id.clone()),
        )
    };
    InteractionPrompt {
        visible: true,
        message,
        anchor_position: Vec2::new(center.x, teammate.house_position.y),
        target: Some(target),
        actionable: true,
    }
}

fn object_prompt(object: &WorldObject) -> InteractionPrompt {
    let (message, actionable) = match object.kind {
        WorldObjectKind::TownHall => (format!("Press E to enter {}", object.display_name), true),
        WorldObjectKind::EmptyLand => (format!("{}: empty plot", object.display_name), false),
        _ => (
            format!("Press E to interact with {}", object.display_name),
            true,
        ),
    };
    InteractionPrompt {
        visible: true,
        message,
        anchor_position: Vec2::new(object.bounds.center().x, object.bounds.y),
        target: Some(PromptTarget::Object {
            id: object.id.clone(),
            kind: object.kind,
        }),
        actionable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::town::geometry::{Rect, Size};

    const RANGES: InteractionRanges = InteractionRanges {
        house: 64.0,
        object: 80.0,
    };

    fn teammate(id: &str, name: &str, x: f32, y: f32, is_player: bool) -> Teammate {
        Teammate {
            id: TeammateId(id.to_string()),
            name: name.to_string(),
            house_position: Vec2::new(x, y),
            is_player,
        }
    }

    fn object(id: &str, name: &str, kind: WorldObjectKind, bounds: Rect) -> WorldObject {
        WorldObject {
            id: WorldObjectId(id.to_string()),
            kind,
            bounds,
            interactable: true,
            display_name: name.to_string(),
        }
    }

    fn world(objects: Vec<WorldObject>) -> WorldTable {
        WorldTable::new(Size::new(2048.0, 1342.0), objects)
    }

    #[test]
    fn own_house_in_range_prompts_board_update() {
        let roster = vec![teammate("me", "Me", 782.0, 232.0, true)];
        let prompt = resolve_prompt(
            Some(Vec2::new(800.0, 300.0)),
            &roster,
            &world(Vec::new()),
            RANGES,
        );
        assert!(prompt.visible);
        assert!(prompt.actionable);
        assert_eq!(prompt.message, "Press E to update your board");
        assert_eq!(
            prompt.target,
            Some(PromptTarget::OwnHouse(TeammateId("me".to_string())))
        );
        assert_eq!(prompt.anchor_position, Vec2::new(814.0, 232.0));
    }

    #[test]
    fn teammate_house_prompts_view_with_name() {
        let roster = vec![teammate("sam", "Sam", 100.0, 100.0, false)];
        let prompt = resolve_prompt(
            Some(Vec2::new(132.0, 180.0)),
            &roster,
            &world(Vec::new()),
            RANGES,
        );
        assert_eq!(prompt.message, "Press E to view Sam's board");
        assert_eq!(
            prompt.target,
            Some(PromptTarget::TeammateHouse(TeammateId("sam".to_string())))
        );
    }

    #[test]
    fn house_range_is_per_axis_and_exclusive() {
        let roster = vec![teammate("sam", "Sam", 0.0, 0.0, false)];
        let empty = world(Vec::new());
        // Center is (32, 32). Diagonal corner inside both axis limits matches
        // even though the Euclidean distance exceeds the range.
        let corner = resolve_prompt(Some(Vec2::new(95.0, 95.0)), &roster, &empty, RANGES);
        assert!(corner.visible);
        let edge = resolve_prompt(Some(Vec2::new(96.0, 32.0)), &roster, &empty, RANGES);
        assert!(!edge.visible);
    }

    #[test]
    fn first_teammate_in_roster_order_wins_overlapping_houses() {
        let roster = vec![
            teammate("first", "First", 100.0, 100.0, false),
            teammate("second", "Second", 110.0, 100.0, true),
        ];
        let prompt = resolve_prompt(
            Some(Vec2::new(140.0, 132.0)),
            &roster,
            &world(Vec::new()),
            RANGES,
        );
        assert_eq!(
            prompt.target,
            Some(PromptTarget::TeammateHouse(TeammateId("first".to_string())))
        );
    }

    #[test]
    fn house_preempts_closer_generic_object() {
        let roster = vec![teammate("sam", "Sam", 100.0, 100.0, false)];
        let objects = world(vec![object(
            "well",
            "Well",
            WorldObjectKind::Rock,
            Rect::new(180.0, 170.0, 10.0, 10.0),
        )]);
        let actor = Some(Vec2::new(180.0, 170.0));
        let prompt = resolve_prompt(actor, &roster, &objects, RANGES);
        assert_eq!(
            prompt.target,
            Some(PromptTarget::TeammateHouse(TeammateId("sam".to_string())))
        );
        assert_eq!(
            resolve_activation(actor, &roster, &objects, RANGES),
            Some(InteractionEvent::ViewTeammateBoard(TeammateId(
                "sam".to_string()
            )))
        );
    }

    #[test]
    fn object_messages_depend_on_kind() {
        let hall = object(
            "hall",
            "Town Hall",
            WorldObjectKind::TownHall,
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        let plot = object(
            "plot",
            "Lot 7",
            WorldObjectKind::EmptyLand,
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        let tree = object(
            "oak",
            "Old Oak",
            WorldObjectKind::Tree,
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        let actor = Some(Vec2::new(50.0, 120.0));

        let hall_prompt = resolve_prompt(actor, &[], &world(vec![hall]), RANGES);
        assert_eq!(hall_prompt.message, "Press E to enter Town Hall");
        assert!(hall_prompt.actionable);
        assert_eq!(hall_prompt.anchor_position, Vec2::new(50.0, 0.0));

        let plot_prompt = resolve_prompt(actor, &[], &world(vec![plot]), RANGES);
        assert_eq!(plot_prompt.message, "Lot 7: empty plot");
        assert!(plot_prompt.visible);
        assert!(!plot_prompt.actionable);

        let tree_prompt = resolve_prompt(actor, &[], &world(vec![tree]), RANGES);
        assert_eq!(tree_prompt.message, "Press E to interact with Old Oak");
    }

    #[test]
    fn nothing_in_range_hides_prompt() {
        let roster = vec![teammate("sam", "Sam", 100.0, 100.0, false)];
        let prompt = resolve_prompt(
            Some(Vec2::new(1500.0, 1000.0)),
            &roster,
            &world(Vec::new()),
            RANGES,
        );
        assert_eq!(prompt, InteractionPrompt::hidden());
    }

    #[test]
    fn unspawned_actor_hides_prompt_and_never_activates() {
        let roster = vec![teammate("me", "Me", 0.0, 0.0, true)];
        assert!(!resolve_prompt(None, &roster, &world(Vec::new()), RANGES).visible);
        assert_eq!(
            resolve_activation(None, &roster, &world(Vec::new()), RANGES),
            None
        );
    }

    #[test]
    fn activation_dispatches_by_target() {
        let roster = vec![teammate("me", "Me", 0.0, 0.0, true)];
        let objects = world(vec![
            object(
                "hall",
                "Town Hall",
                WorldObjectKind::TownHall,
                Rect::new(1000.0, 0.0, 100.0, 100.0),
            ),
            object(
                "plot",
                "Lot",
                WorldObjectKind::EmptyLand,
                Rect::new(0.0, 1000.0, 100.0, 100.0),
            ),
            object(
                "bush",
                "Bush",
                WorldObjectKind::Bush,
                Rect::new(1000.0, 1000.0, 20.0, 20.0),
            ),
        ]);
        let at = |x, y| resolve_activation(Some(Vec2::new(x, y)), &roster, &objects, RANGES);
        assert_eq!(at(32.0, 80.0), Some(InteractionEvent::OpenOwnBoard));
        assert_eq!(at(1050.0, 120.0), Some(InteractionEvent::OpenTownHallPanel));
        assert_eq!(at(50.0, 1050.0), None);
        assert_eq!(
            at(1010.0, 1040.0),
            Some(InteractionEvent::InspectObject(WorldObjectId(
                "bush".to_string()
            )))
        );
        assert_eq!(at(600.0, 600.0), None);
    }
}
