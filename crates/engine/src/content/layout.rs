use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::{info, warn};

use crate::town::{
    can_move_to, find_player, Rect, Size, Teammate, TeammateId, Vec2, WorldObject, WorldObjectId,
    WorldObjectKind, WorldTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateId,
    PlayerCount,
}

#[derive(Debug, Clone)]
pub struct LayoutError {
    pub code: LayoutErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// World geometry plus the teammate roster for one view.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodLayout {
    pub world: WorldTable,
    pub roster: Vec<Teammate>,
}

/// Why the player could not move from its spawn point.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnBlocker {
    OutsideMap,
    Object(WorldObjectId),
}

impl NeighborhoodLayout {
    /// Checks the player's spawn point against the map bounds and the
    /// collision table for an actor of `actor_size`.
    pub fn spawn_blocker(&self, actor_size: Size) -> Option<SpawnBlocker> {
        let player = find_player(&self.roster)?;
        let spawn = player.spawn_point();
        if !can_move_to(spawn, actor_size, self.world.map_size()) {
            return Some(SpawnBlocker::OutsideMap);
        }
        self.world
            .resolve_collision(Rect::centered_at(spawn, actor_size))
            .map(|object| SpawnBlocker::Object(object.id.clone()))
    }
}

/// Logs a warning when the player would spawn stuck. Actor size comes from
/// tuning, so this runs after both files are loaded.
pub fn report_spawn_blocked(path: &Path, layout: &NeighborhoodLayout, actor_size: Size) {
    match layout.spawn_blocker(actor_size) {
        Some(SpawnBlocker::OutsideMap) => warn!(
            file = %path.display(),
            reason = "outside_map",
            "layout_spawn_blocked"
        ),
        Some(SpawnBlocker::Object(object)) => warn!(
            file = %path.display(),
            object = %object,
            "layout_spawn_blocked"
        ),
        None => {}
    }
}

/// Reads and parses a layout file, then logs geometry that is legal but
/// suspicious (overlapping objects, objects past the map edge).
pub fn load_layout(path: &Path) -> Result<NeighborhoodLayout, LayoutError> {
    let raw = fs::read_to_string(path).map_err(|source| LayoutError {
        code: LayoutErrorCode::ReadFile,
        message: format!("failed to read layout file: {source}"),
        file_path: path.to_path_buf(),
        location: None,
    })?;
    let layout = parse_layout(path, &raw)?;
    report_layout_warnings(path, &layout);
    info!(
        file = %path.display(),
        objects = layout.world.len(),
        interactables = layout.world.interactable_count(),
        teammates = layout.roster.len(),
        "layout_loaded"
    );
    Ok(layout)
}

pub fn parse_layout(file_path: &Path, raw: &str) -> Result<NeighborhoodLayout, LayoutError> {
    let doc = Document::parse(raw).map_err(|error| LayoutError {
        code: LayoutErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Neighborhood" {
        return Err(error_at_node(
            LayoutErrorCode::InvalidRoot,
            "root element must be <Neighborhood>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let mut map_size: Option<Size> = None;
    let mut objects = Vec::<WorldObject>::new();
    let mut roster = Vec::<Teammate>::new();
    let mut object_ids = HashSet::<String>::new();
    let mut teammate_ids = HashSet::<String>::new();

    for child in root.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "Map" => {
                if map_size.is_some() {
                    return Err(error_at_node(
                        LayoutErrorCode::DuplicateField,
                        "<Map> may appear only once".to_string(),
                        file_path,
                        &doc,
                        child,
                    ));
                }
                map_size = Some(parse_map(file_path, &doc, child)?);
            }
            "Object" => {
                let object = parse_object(file_path, &doc, child)?;
                if !object_ids.insert(object.id.0.clone()) {
                    return Err(error_at_node(
                        LayoutErrorCode::DuplicateId,
                        format!("duplicate object id '{}'", object.id),
                        file_path,
                        &doc,
                        child,
                    ));
                }
                objects.push(object);
            }
            "Teammate" => {
                let teammate = parse_teammate(file_path, &doc, child)?;
                if !teammate_ids.insert(teammate.id.0.clone()) {
                    return Err(error_at_node(
                        LayoutErrorCode::DuplicateId,
                        format!("duplicate teammate id '{}'", teammate.id),
                        file_path,
                        &doc,
                        child,
                    ));
                }
                roster.push(teammate);
            }
            other => {
                return Err(error_at_node(
                    LayoutErrorCode::UnknownElement,
                    format!(
                        "unsupported element <{}>; expected <Map>, <Object> or <Teammate>",
                        other
                    ),
                    file_path,
                    &doc,
                    child,
                ))
            }
        }
    }

    let Some(map_size) = map_size else {
        return Err(error_at_node(
            LayoutErrorCode::MissingField,
            "missing required element <Map>".to_string(),
            file_path,
            &doc,
            root,
        ));
    };

    let players = roster.iter().filter(|teammate| teammate.is_player).count();
    if players != 1 {
        return Err(error_at_node(
            LayoutErrorCode::PlayerCount,
            format!("exactly one <Teammate> must have isPlayer=true, found {players}"),
            file_path,
            &doc,
            root,
        ));
    }

    Ok(NeighborhoodLayout {
        world: WorldTable::new(map_size, objects),
        roster,
    })
}

fn report_layout_warnings(path: &Path, layout: &NeighborhoodLayout) {
    for (first, second) in layout.world.overlapping_pairs() {
        warn!(
            file = %path.display(),
            first = %first.id,
            second = %second.id,
            "layout_objects_overlap"
        );
    }
    for object in layout.world.objects_outside_map() {
        warn!(
            file = %path.display(),
            object = %object.id,
            "layout_object_outside_map"
        );
    }
}

/// Element fields of one record, each allowed once.
struct Fields<'a, 'input> {
    record: &'static str,
    file_path: &'a Path,
    doc: &'a Document<'input>,
    node: Node<'a, 'input>,
    seen: HashSet<String>,
}

impl<'a, 'input> Fields<'a, 'input> {
    fn new(
        record: &'static str,
        file_path: &'a Path,
        doc: &'a Document<'input>,
        node: Node<'a, 'input>,
    ) -> Self {
        Self {
            record,
            file_path,
            doc,
            node,
            seen: HashSet::new(),
        }
    }

    fn visit(&mut self, field: Node<'a, 'input>) -> Result<String, LayoutError> {
        let field_name = field.tag_name().name().to_string();
        if !self.seen.insert(field_name.clone()) {
            return Err(self.error(
                LayoutErrorCode::DuplicateField,
                format!("duplicate field <{}> in <{}>", field_name, self.record),
                field,
            ));
        }
        Ok(field_name)
    }

    fn text(&self, field: Node<'a, 'input>, field_name: &str) -> Result<String, LayoutError> {
        let value = field.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error(
                LayoutErrorCode::MissingField,
                format!("field <{}> must not be empty", field_name),
                field,
            ));
        }
        Ok(value)
    }

    fn number(&self, field: Node<'a, 'input>, field_name: &str) -> Result<f32, LayoutError> {
        let value = self.text(field, field_name)?;
        let parsed = value.parse::<f32>().map_err(|_| {
            self.error(
                LayoutErrorCode::InvalidValue,
                format!("{} '{}' is not a valid number", field_name, value),
                field,
            )
        })?;
        if !parsed.is_finite() {
            return Err(self.error(
                LayoutErrorCode::InvalidValue,
                format!("{} must be finite", field_name),
                field,
            ));
        }
        Ok(parsed)
    }

    fn positive(&self, field: Node<'a, 'input>, field_name: &str) -> Result<f32, LayoutError> {
        let value = self.number(field, field_name)?;
        if value <= 0.0 {
            return Err(self.error(
                LayoutErrorCode::InvalidValue,
                format!("{} must be > 0", field_name),
                field,
            ));
        }
        Ok(value)
    }

    fn flag(&self, field: Node<'a, 'input>, field_name: &str) -> Result<bool, LayoutError> {
        let value = self.text(field, field_name)?;
        match value.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.error(
                LayoutErrorCode::InvalidValue,
                format!("{} '{}' must be true or false", field_name, value),
                field,
            )),
        }
    }

    fn unknown(&self, field: Node<'a, 'input>, field_name: &str) -> LayoutError {
        self.error(
            LayoutErrorCode::UnknownField,
            format!("unknown field <{}> in <{}>", field_name, self.record),
            field,
        )
    }

    fn require<T>(&self, value: Option<T>, field_name: &str) -> Result<T, LayoutError> {
        value.ok_or_else(|| {
            self.error(
                LayoutErrorCode::MissingField,
                format!(
                    "missing required field <{}> in <{}>",
                    field_name, self.record
                ),
                self.node,
            )
        })
    }

    fn error(&self, code: LayoutErrorCode, message: String, node: Node<'_, '_>) -> LayoutError {
        error_at_node(code, message, self.file_path, self.doc, node)
    }
}

fn parse_map<'a, 'input>(
    file_path: &'a Path,
    doc: &'a Document<'input>,
    node: Node<'a, 'input>,
) -> Result<Size, LayoutError> {
    let mut fields = Fields::new("Map", file_path, doc, node);
    let mut width = None;
    let mut height = None;
    for field in node.children().filter(|child| child.is_element()) {
        let field_name = fields.visit(field)?;
        match field_name.as_str() {
            "width" => width = Some(fields.positive(field, "width")?),
            "height" => height = Some(fields.positive(field, "height")?),
            _ => return Err(fields.unknown(field, &field_name)),
        }
    }
    Ok(Size::new(
        fields.require(width, "width")?,
        fields.require(height, "height")?,
    ))
}

fn parse_object<'a, 'input>(
    file_path: &'a Path,
    doc: &'a Document<'input>,
    node: Node<'a, 'input>,
) -> Result<WorldObject, LayoutError> {
    let mut fields = Fields::new("Object", file_path, doc, node);
    let mut id = None;
    let mut kind = None;
    let mut x = None;
    let mut y = None;
    let mut width = None;
    let mut height = None;
    let mut interactable = None;
    let mut display_name = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = fields.visit(field)?;
        match field_name.as_str() {
            "id" => id = Some(fields.text(field, "id")?),
            "kind" => {
                let value = fields.text(field, "kind")?;
                let parsed = WorldObjectKind::parse(&value).ok_or_else(|| {
                    let allowed = WorldObjectKind::ALL
                        .iter()
                        .map(|kind| kind.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    fields.error(
                        LayoutErrorCode::InvalidValue,
                        format!("invalid kind '{}'; allowed values: {}", value, allowed),
                        field,
                    )
                })?;
                kind = Some(parsed);
            }
            "x" => x = Some(fields.number(field, "x")?),
            "y" => y = Some(fields.number(field, "y")?),
            "width" => width = Some(fields.positive(field, "width")?),
            "height" => height = Some(fields.positive(field, "height")?),
            "interactable" => interactable = Some(fields.flag(field, "interactable")?),
            "displayName" => display_name = Some(fields.text(field, "displayName")?),
            _ => return Err(fields.unknown(field, &field_name)),
        }
    }

    let id = fields.require(id, "id")?;
    let kind = fields.require(kind, "kind")?;
    let bounds = Rect::new(
        fields.require(x, "x")?,
        fields.require(y, "y")?,
        fields.require(width, "width")?,
        fields.require(height, "height")?,
    );
    Ok(WorldObject {
        display_name: display_name.unwrap_or_else(|| id.clone()),
        id: WorldObjectId(id),
        kind,
        bounds,
        interactable: interactable.unwrap_or(true),
    })
}

fn parse_teammate<'a, 'input>(
    file_path: &'a Path,
    doc: &'a Document<'input>,
    node: Node<'a, 'input>,
) -> Result<Teammate, LayoutError> {
    let mut fields = Fields::new("Teammate", file_path, doc, node);
    let mut id = None;
    let mut name = None;
    let mut house_x = None;
    let mut house_y = None;
    let mut is_player = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = fields.visit(field)?;
        match field_name.as_str() {
            "id" => id = Some(fields.text(field, "id")?),
            "name" => name = Some(fields.text(field, "name")?),
            "houseX" => house_x = Some(fields.number(field, "houseX")?),
            "houseY" => house_y = Some(fields.number(field, "houseY")?),
            "isPlayer" => is_player = Some(fields.flag(field, "isPlayer")?),
            _ => return Err(fields.unknown(field, &field_name)),
        }
    }

    Ok(Teammate {
        id: TeammateId(fields.require(id, "id")?),
        name: fields.require(name, "name")?,
        house_position: Vec2::new(
            fields.require(house_x, "houseX")?,
            fields.require(house_y, "houseY")?,
        ),
        is_player: is_player.unwrap_or(false),
    })
}

fn error_at_node(
    code: LayoutErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> LayoutError {
    let pos = doc.text_pos_at(node.range().start);
    LayoutError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}
