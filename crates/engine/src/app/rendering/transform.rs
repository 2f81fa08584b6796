use crate::town::{CameraTransform, Rect, Vec2};

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRectPx {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

pub fn world_to_screen(world: Vec2, camera: &CameraTransform) -> (i32, i32) {
    let view = camera.world_to_view(world);
    (view.x.round() as i32, view.y.round() as i32)
}

/// Screen rectangle covering `rect`, right/bottom exclusive.
pub fn world_rect_to_screen(rect: Rect, camera: &CameraTransform) -> ScreenRectPx {
    let (left, top) = world_to_screen(Vec2::new(rect.x, rect.y), camera);
    let (right, bottom) = world_to_screen(Vec2::new(rect.right(), rect.bottom()), camera);
    ScreenRectPx {
        left,
        top,
        right,
        bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_origin_maps_to_screen_origin() {
        let camera = CameraTransform {
            offset: Vec2::new(414.0, 12.0),
            zoom: 1.0,
        };
        assert_eq!(world_to_screen(Vec2::new(414.0, 12.0), &camera), (0, 0));
        assert_eq!(world_to_screen(Vec2::new(814.0, 312.0), &camera), (400, 300));
    }

    #[test]
    fn zoom_scales_distance_from_offset() {
        let camera = CameraTransform {
            offset: Vec2::new(800.0, 350.0),
            zoom: 2.0,
        };
        let rect = world_rect_to_screen(Rect::new(810.0, 360.0, 32.0, 16.0), &camera);
        assert_eq!(
            rect,
            ScreenRectPx {
                left: 20,
                top: 20,
                right: 84,
                bottom: 52,
            }
        );
    }
}
