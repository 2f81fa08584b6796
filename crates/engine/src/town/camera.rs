use super::config::ZoomLimits;
use super::geometry::{Size, Vec2};

/// Render transform for one tick: the world point drawn at the top-left of
/// the viewport, and the scale applied around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub offset: Vec2,
    pub zoom: f32,
}

impl CameraTransform {
    pub fn world_to_view(&self, world: Vec2) -> Vec2 {
        Vec2 {
            x: (world.x - self.offset.x) * self.zoom,
            y: (world.y - self.offset.y) * self.zoom,
        }
    }
}

/// Top-left world offset that frames the actor.
///
/// On each axis the camera centers on the actor plus the manual pan offset
/// and is clamped to the map. When the visible extent is at least the map
/// extent, the map is centered instead and neither actor nor pan affect that
/// axis.
pub fn compute_transform(
    actor: Vec2,
    pan_offset: Vec2,
    zoom: f32,
    viewport: Size,
    map_size: Size,
) -> Vec2 {
    let zoom = if zoom.is_finite() && zoom > 0.0 {
        zoom
    } else {
        1.0
    };
    let viewport_world = Size::new(
        finite_or_zero(viewport.width).max(0.0) / zoom,
        finite_or_zero(viewport.height).max(0.0) / zoom,
    );
    Vec2 {
        x: axis_offset(
            actor.x,
            finite_or_zero(pan_offset.x),
            viewport_world.width,
            map_size.width,
        ),
        y: axis_offset(
            actor.y,
            finite_or_zero(pan_offset.y),
            viewport_world.height,
            map_size.height,
        ),
    }
}

fn axis_offset(actor: f32, pan: f32, viewport_extent: f32, map_extent: f32) -> f32 {
    let map_extent = finite_or_zero(map_extent).max(0.0);
    if viewport_extent >= map_extent {
        return (viewport_extent - map_extent) / -2.0;
    }
    let raw = finite_or_zero(actor - viewport_extent / 2.0 + pan);
    raw.clamp(0.0, map_extent - viewport_extent)
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn clamp_zoom(zoom: f32, limits: ZoomLimits) -> f32 {
    if !zoom.is_finite() {
        return limits.default;
    }
    zoom.clamp(limits.min, limits.max)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pan_offset: Vec2,
    zoom: f32,
    is_recentering: bool,
}

impl CameraState {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            pan_offset: Vec2::ZERO,
            zoom: clamp_zoom(limits.default, limits),
            is_recentering: false,
        }
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan_offset
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_recentering(&self) -> bool {
        self.is_recentering
    }

    /// Zero transform until the actor has spawned.
    pub fn transform(&self, actor: Option<Vec2>, viewport: Size, map_size: Size) -> CameraTransform {
        let offset = match actor {
            Some(actor) => compute_transform(actor, self.pan_offset, self.zoom, viewport, map_size),
            None => Vec2::ZERO,
        };
        CameraTransform {
            offset,
            zoom: self.zoom,
        }
    }

    /// Adds one tick of manual pan. `direction` holds -1/0/1 per axis.
    /// The offset is kept within one map extent per axis so it can always
    /// decay back.
    pub fn apply_pan(&mut self, direction: Vec2, speed: f32, map_size: Size) {
        if direction == Vec2::ZERO {
            return;
        }
        let x = finite_or_zero(self.pan_offset.x + direction.x * speed);
        let y = finite_or_zero(self.pan_offset.y + direction.y * speed);
        let limit_x = finite_or_zero(map_size.width).abs();
        let limit_y = finite_or_zero(map_size.height).abs();
        self.pan_offset = Vec2 {
            x: x.clamp(-limit_x, limit_x),
            y: y.clamp(-limit_y, limit_y),
        };
    }

    pub fn set_pan_offset(&mut self, pan_offset: Vec2) {
        self.pan_offset = Vec2 {
            x: finite_or_zero(pan_offset.x),
            y: finite_or_zero(pan_offset.y),
        };
    }

    /// Starts easing the pan offset back to zero. Nothing to do when the
    /// camera is not panned.
    pub fn begin_recentering(&mut self) {
        if self.pan_offset != Vec2::ZERO {
            self.is_recentering = true;
        }
    }

    pub fn cancel_recentering(&mut self) {
        self.is_recentering = false;
    }

    /// One tick of recentering decay.
    pub fn decay_recentering(&mut self, rate: f32, threshold: f32) {
        if !self.is_recentering {
            return;
        }
        let keep = 1.0 - rate;
        self.pan_offset = Vec2 {
            x: decay_component(self.pan_offset.x, keep, threshold),
            y: decay_component(self.pan_offset.y, keep, threshold),
        };
        if self.pan_offset == Vec2::ZERO {
            self.is_recentering = false;
        }
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32, limits: ZoomLimits) {
        self.zoom = clamp_zoom(zoom, limits);
    }

    pub fn apply_zoom_steps(&mut self, steps: i32, limits: ZoomLimits) {
        if steps == 0 {
            return;
        }
        let target_zoom = self.zoom + steps as f32 * limits.step;
        self.set_zoom_clamped(target_zoom, limits);
    }

    /// Default zoom, no pan, no recentering.
    pub fn reset(&mut self, limits: ZoomLimits) {
        self.zoom = clamp_zoom(limits.default, limits);
        self.pan_offset = Vec2::ZERO;
        self.is_recentering = false;
    }
}

fn decay_component(value: f32, keep: f32, threshold: f32) -> f32 {
    let next = finite_or_zero(value * keep);
    if next.abs() <= threshold {
        0.0
    } else {
        next
    }
}
