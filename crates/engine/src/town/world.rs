use std::fmt;

use super::geometry::{Rect, Size, Vec2};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorldObjectId(pub String);

impl fmt::Display for WorldObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldObjectKind {
    House,
    TownHall,
    EmptyLand,
    Tree,
    Bush,
    Rock,
}

impl WorldObjectKind {
    pub const ALL: [WorldObjectKind; 6] = [
        WorldObjectKind::House,
        WorldObjectKind::TownHall,
        WorldObjectKind::EmptyLand,
        WorldObjectKind::Tree,
        WorldObjectKind::Bush,
        WorldObjectKind::Rock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::TownHall => "TownHall",
            Self::EmptyLand => "EmptyLand",
            Self::Tree => "Tree",
            Self::Bush => "Bush",
            Self::Rock => "Rock",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: WorldObjectId,
    pub kind: WorldObjectKind,
    pub bounds: Rect,
    pub interactable: bool,
    pub display_name: String,
}

/// Static world geometry for one session.
///
/// Objects keep their registration order; every resolver that can see more
/// than one candidate returns the earliest registered one.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldTable {
    map_size: Size,
    objects: Vec<WorldObject>,
}

impl WorldTable {
    pub fn new(map_size: Size, objects: Vec<WorldObject>) -> Self {
        Self { map_size, objects }
    }

    pub fn map_size(&self) -> Size {
        self.map_size
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn find(&self, id: &WorldObjectId) -> Option<&WorldObject> {
        self.objects.iter().find(|object| &object.id == id)
    }

    pub fn interactable_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|object| object.interactable)
            .count()
    }

    /// First object, in registration order, whose bounds overlap `candidate`.
    /// Every kind blocks movement regardless of its interactable flag.
    pub fn resolve_collision(&self, candidate: Rect) -> Option<&WorldObject> {
        self.objects
            .iter()
            .find(|object| object.bounds.overlaps(&candidate))
    }

    /// Nearest interactable object whose center lies strictly within `radius`
    /// of `point`. Equal distances keep the earlier registration.
    pub fn nearest_interactable(&self, point: Vec2, radius: f32) -> Option<&WorldObject> {
        let mut best: Option<(f32, &WorldObject)> = None;
        for object in self.objects.iter().filter(|object| object.interactable) {
            let distance = point.distance_to(object.bounds.center());
            let in_range = distance < radius;
            if !in_range {
                continue;
            }
            match best {
                Some((best_distance, _)) if best_distance <= distance => {}
                _ => best = Some((distance, object)),
            }
        }
        best.map(|(_, object)| object)
    }

    /// Pairs of objects whose bounds overlap each other. Overlapping geometry
    /// is a layout mistake; resolvers still answer with the first match.
    pub fn overlapping_pairs(&self) -> Vec<(&WorldObject, &WorldObject)> {
        let mut pairs = Vec::new();
        for (index, first) in self.objects.iter().enumerate() {
            for second in &self.objects[index + 1..] {
                if first.bounds.overlaps(&second.bounds) {
                    pairs.push((first, second));
                }
            }
        }
        pairs
    }

    /// Objects that are not fully inside the map rectangle.
    pub fn objects_outside_map(&self) -> Vec<&WorldObject> {
        self.objects
            .iter()
            .filter(|object| {
                object.bounds.x < 0.0
                    || object.bounds.y < 0.0
                    || object.bounds.right() > self.map_size.width
                    || object.bounds.bottom() > self.map_size.height
            })
            .collect()
    }
}
