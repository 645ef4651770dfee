use eframe::egui::{Pos2, Vec2};

pub(in crate::app) const MIN_SCALE: f32 = 0.5;
pub(in crate::app) const MAX_SCALE: f32 = 2.0;

// offset is in screen units, scale is uniform; screen = world * scale + offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Camera {
    pub offset: Vec2,
    pub scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        (world * self.scale + self.offset).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.offset) / self.scale
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    // The world point under screen_point stays under it, even when the
    // scale is already pinned at a bound.
    pub fn zoom_at(&mut self, screen_point: Pos2, scale_delta: f32) {
        let anchor = self.screen_to_world(screen_point);
        self.scale = (self.scale + scale_delta).clamp(MIN_SCALE, MAX_SCALE);
        self.offset = screen_point.to_vec2() - anchor * self.scale;
    }
}
