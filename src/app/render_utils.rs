use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use super::camera::Camera;

pub(super) const BACKDROP: Color32 = Color32::from_rgb(250, 250, 252);
pub(super) const GRID_LINE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 13);
pub(super) const NODE_BLUE: Color32 = Color32::from_rgb(66, 153, 225);
pub(super) const SELECTED_RING: Color32 = Color32::from_rgb(43, 108, 176);

const GRID_STEP_WORLD: f32 = 50.0;

pub(super) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

// Fixed world-spacing grid: lines ride along with the pan offset and their
// spacing stretches with the zoom scale.
pub(super) fn draw_background(painter: &Painter, rect: Rect, camera: &Camera) {
    painter.rect_filled(rect, 0.0, BACKDROP);

    let step = GRID_STEP_WORLD * camera.scale;
    let stroke = Stroke::new(1.0, GRID_LINE);

    let mut x = rect.left() + (camera.offset.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            stroke,
        );
        x += step;
    }

    let mut y = rect.top() + (camera.offset.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            stroke,
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn view() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    #[test]
    fn circle_visibility_counts_partial_overlap() {
        assert!(circle_visible(view(), pos2(400.0, 300.0), 10.0));
        assert!(circle_visible(view(), pos2(-5.0, 300.0), 10.0));
        assert!(!circle_visible(view(), pos2(-50.0, 300.0), 10.0));
        assert!(!circle_visible(view(), pos2(400.0, 700.0), 10.0));
    }

    #[test]
    fn segment_visibility_uses_the_padded_bounding_box() {
        assert!(segment_visible(view(), pos2(-100.0, -100.0), pos2(100.0, 100.0), 2.0));
        assert!(!segment_visible(view(), pos2(-300.0, -50.0), pos2(-100.0, -10.0), 2.0));
        assert!(segment_visible(view(), pos2(805.0, 100.0), pos2(900.0, 100.0), 10.0));
    }

    #[test]
    fn with_alpha_matches_direct_construction() {
        assert_eq!(
            with_alpha(NODE_BLUE, 51),
            Color32::from_rgba_unmultiplied(66, 153, 225, 51)
        );
        assert_eq!(with_alpha(NODE_BLUE, 255), NODE_BLUE);
    }
}
