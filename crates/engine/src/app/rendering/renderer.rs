use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::SceneWorld;
use crate::town::{CameraTransform, PromptTarget, Rect, TickReport, WorldObjectKind, WorldTable};

use super::transform::{world_rect_to_screen, world_to_screen, ScreenRectPx, Viewport};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const MAP_COLOR: [u8; 4] = [74, 112, 56, 255];
const HOUSE_COLOR: [u8; 4] = [168, 112, 82, 255];
const PLAYER_HOUSE_COLOR: [u8; 4] = [206, 150, 92, 255];
const TOWN_HALL_COLOR: [u8; 4] = [150, 150, 170, 255];
const EMPTY_LAND_COLOR: [u8; 4] = [112, 83, 58, 255];
const TREE_COLOR: [u8; 4] = [38, 84, 40, 255];
const BUSH_COLOR: [u8; 4] = [60, 120, 60, 255];
const ROCK_COLOR: [u8; 4] = [110, 110, 110, 255];
const ACTOR_COLOR: [u8; 4] = [220, 220, 240, 255];
const TARGET_HIGHLIGHT_COLOR: [u8; 4] = [255, 210, 70, 255];
const PROMPT_MARKER_COLOR: [u8; 4] = [80, 220, 255, 255];
const PROMPT_MARKER_HALF_SIZE_PX: i32 = 6;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        compose_frame(self.pixels.frame_mut(), self.viewport, world);
        self.pixels.render()
    }
}

/// Draws one frame from the last tick report. Before the first tick only the
/// clear color is drawn.
fn compose_frame(frame: &mut [u8], viewport: Viewport, world: &SceneWorld) {
    fill_frame(frame, CLEAR_COLOR);

    let (Some(session), Some(report)) = (world.session(), world.last_report()) else {
        return;
    };
    let camera = report.camera;
    let table = session.world();
    let map_size = table.map_size();
    fill_rect_clipped(
        frame,
        viewport,
        world_rect_to_screen(Rect::new(0.0, 0.0, map_size.width, map_size.height), &camera),
        MAP_COLOR,
    );

    draw_world_objects(frame, viewport, table, &camera);
    for teammate in world.roster() {
        let color = if teammate.is_player {
            PLAYER_HOUSE_COLOR
        } else {
            HOUSE_COLOR
        };
        fill_rect_clipped(
            frame,
            viewport,
            world_rect_to_screen(teammate.house_footprint(), &camera),
            color,
        );
    }

    draw_prompt(frame, viewport, world, table, report);

    if let Some(position) = report.actor_position {
        let actor = Rect::centered_at(position, session.config().actor_size());
        fill_rect_clipped(
            frame,
            viewport,
            world_rect_to_screen(actor, &camera),
            ACTOR_COLOR,
        );
    }
}

fn draw_world_objects(
    frame: &mut [u8],
    viewport: Viewport,
    table: &WorldTable,
    camera: &CameraTransform,
) {
    for object in table.objects() {
        fill_rect_clipped(
            frame,
            viewport,
            world_rect_to_screen(object.bounds, camera),
            color_for_kind(object.kind),
        );
    }
}

fn draw_prompt(
    frame: &mut [u8],
    viewport: Viewport,
    world: &SceneWorld,
    table: &WorldTable,
    report: &TickReport,
) {
    let prompt = &report.prompt;
    if !prompt.visible {
        return;
    }
    let highlight = match &prompt.target {
        Some(PromptTarget::OwnHouse(id)) | Some(PromptTarget::TeammateHouse(id)) => world
            .roster()
            .iter()
            .find(|teammate| &teammate.id == id)
            .map(|teammate| teammate.house_footprint()),
        Some(PromptTarget::Object { id, .. }) => table.find(id).map(|object| object.bounds),
        None => None,
    };
    if let Some(bounds) = highlight {
        outline_rect_clipped(
            frame,
            viewport,
            world_rect_to_screen(bounds, &report.camera),
            TARGET_HIGHLIGHT_COLOR,
        );
    }

    let (x, y) = world_to_screen(prompt.anchor_position, &report.camera);
    draw_cross(
        frame,
        viewport,
        x,
        y - PROMPT_MARKER_HALF_SIZE_PX,
        PROMPT_MARKER_HALF_SIZE_PX,
        PROMPT_MARKER_COLOR,
    );
}

fn color_for_kind(kind: WorldObjectKind) -> [u8; 4] {
    match kind {
        WorldObjectKind::House => HOUSE_COLOR,
        WorldObjectKind::TownHall => TOWN_HALL_COLOR,
        WorldObjectKind::EmptyLand => EMPTY_LAND_COLOR,
        WorldObjectKind::Tree => TREE_COLOR,
        WorldObjectKind::Bush => BUSH_COLOR,
        WorldObjectKind::Rock => ROCK_COLOR,
    }
}

fn fill_frame(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

fn fill_rect_clipped(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let left = rect.left.max(0);
    let top = rect.top.max(0);
    let right = rect.right.min(viewport.width as i32);
    let bottom = rect.bottom.min(viewport.height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
        }
    }
}

fn outline_rect_clipped(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let width = viewport.width as usize;
    let right = rect.right - 1;
    let bottom = rect.bottom - 1;
    for x in rect.left..=right {
        write_pixel_rgba_clipped(frame, width, x, rect.top, color);
        write_pixel_rgba_clipped(frame, width, x, bottom, color);
    }
    for y in rect.top..=bottom {
        write_pixel_rgba_clipped(frame, width, rect.left, y, color);
        write_pixel_rgba_clipped(frame, width, right, y, color);
    }
}

fn draw_cross(
    frame: &mut [u8],
    viewport: Viewport,
    cx: i32,
    cy: i32,
    half_size: i32,
    color: [u8; 4],
) {
    let width = viewport.width as usize;
    for x in (cx - half_size)..=(cx + half_size) {
        write_pixel_rgba_clipped(frame, width, x, cy, color);
    }
    for y in (cy - half_size)..=(cy + half_size) {
        write_pixel_rgba_clipped(frame, width, cx, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{InputAction, InputEvent, InputSnapshot};
    use crate::town::{
        EngineConfig, Session, Size, Teammate, TeammateId, Vec2, WorldObject, WorldObjectId,
    };

    const VIEWPORT: Viewport = Viewport {
        width: 64,
        height: 48,
    };

    fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * VIEWPORT.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn blank_frame() -> Vec<u8> {
        vec![0; VIEWPORT.width as usize * VIEWPORT.height as usize * 4]
    }

    #[test]
    fn renderer_type_is_non_generic() {
        let _renderer: Option<Renderer> = None;
    }

    #[test]
    fn unmounted_world_draws_clear_color_only() {
        let mut frame = blank_frame();
        compose_frame(&mut frame, VIEWPORT, &SceneWorld::default());
        assert!(frame.chunks_exact(4).all(|pixel| pixel == CLEAR_COLOR));
    }

    #[test]
    fn write_pixel_ignores_out_of_bounds_coordinates() {
        let mut frame = blank_frame();
        write_pixel_rgba_clipped(&mut frame, 64, -1, 0, ACTOR_COLOR);
        write_pixel_rgba_clipped(&mut frame, 64, 64, 0, ACTOR_COLOR);
        write_pixel_rgba_clipped(&mut frame, 64, 0, 48, ACTOR_COLOR);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn fill_rect_is_clipped_to_viewport() {
        let mut frame = blank_frame();
        fill_rect_clipped(
            &mut frame,
            VIEWPORT,
            ScreenRectPx {
                left: -10,
                top: 40,
                right: 4,
                bottom: 100,
            },
            ROCK_COLOR,
        );
        assert_eq!(pixel(&frame, 0, 47), ROCK_COLOR);
        assert_eq!(pixel(&frame, 3, 40), ROCK_COLOR);
        assert_eq!(pixel(&frame, 4, 40), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 0, 39), [0, 0, 0, 0]);
    }

    #[test]
    fn mounted_world_draws_actor_over_objects() {
        let roster = vec![Teammate {
            id: TeammateId("me".to_string()),
            name: "Me".to_string(),
            house_position: Vec2::new(0.0, 0.0),
            is_player: true,
        }];
        let table = WorldTable::new(
            Size::new(64.0, 200.0),
            vec![WorldObject {
                id: WorldObjectId("rock".to_string()),
                kind: WorldObjectKind::Rock,
                bounds: Rect::new(0.0, 100.0, 8.0, 8.0),
                interactable: false,
                display_name: "Rock".to_string(),
            }],
        );
        let mut session = Session::new(EngineConfig::default(), table);
        session.spawn_from_roster(&roster);
        let mut world = SceneWorld::default();
        world.mount(session, roster);
        world.advance(
            &InputSnapshot::empty()
                .with_event(InputEvent::Pressed(InputAction::MoveDown))
                .with_event(InputEvent::Released(InputAction::MoveDown))
                .with_window_size((VIEWPORT.width, VIEWPORT.height)),
        );

        let report = world.last_report().expect("report");
        // Actor at (32, 80); camera y offset 80 - 24 = 56, x centered on the
        // 64 wide map.
        assert_eq!(report.camera.offset, Vec2::new(0.0, 56.0));

        let mut frame = blank_frame();
        compose_frame(&mut frame, VIEWPORT, &world);
        assert_eq!(pixel(&frame, 32, 24), ACTOR_COLOR);
        assert_eq!(pixel(&frame, 2, 46), ROCK_COLOR);
        assert_eq!(pixel(&frame, 20, 46), MAP_COLOR);
        assert_eq!(pixel(&frame, 60, 2), PLAYER_HOUSE_COLOR);
    }
}
