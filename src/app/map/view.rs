use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{Align2, Color32, FontId, Painter, Rect, Sense, Stroke, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::trim_label;

use super::super::render_utils::{
    BACKDROP, NODE_BLUE, SELECTED_RING, circle_visible, draw_background, segment_visible,
    with_alpha,
};
use super::super::{SearchMatchCache, ViewModel};

const LINK_DISTANCE: f32 = 400.0;
const LABEL_MAX_CHARS: usize = 26;

fn fuzzy_match(matcher: &SkimMatcherV2, text: &str, query: &str) -> bool {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
        .is_some()
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<String>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.items_revision == self.items_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .nodes
            .iter()
            .filter(|node| fuzzy_match(&matcher, &node.item.name, query))
            .map(|node| node.item.id.clone())
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            items_revision: self.items_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    // The dragged node renders displaced by the live screen offset; its
    // stored position only moves at release.
    fn display_pos(&self, index: usize) -> Vec2 {
        let node = &self.nodes[index];
        if self.drag.dragged_item() == Some(node.item.id.as_str()) {
            node.pos + self.drag.node_offset() / self.camera.scale
        } else {
            node.pos
        }
    }

    pub(in crate::app) fn draw_map(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.nodes_dirty {
            let center = self.camera.screen_to_world(rect.center());
            let ring = (rect.size().min_elem() / (3.0 * self.camera.scale)).max(1.0);
            self.rebuild_nodes(center, ring);
        }

        self.handle_map_zoom(ui, rect, &response);
        self.handle_map_pointer(ui, &response);
        self.poll_commits();

        draw_background(&painter, rect, &self.camera);

        let matches = self.cached_search_matches();
        let search_active = matches
            .as_ref()
            .is_some_and(|matched| !matched.is_empty());
        let scale = self.camera.scale;

        // links between same-category neighbours, drawn once per pair
        let link_stroke = Stroke::new(1.0, with_alpha(NODE_BLUE, 51));
        for first in 0..self.nodes.len() {
            for second in (first + 1)..self.nodes.len() {
                if self.nodes[first].item.category != self.nodes[second].item.category {
                    continue;
                }
                if (self.nodes[first].pos - self.nodes[second].pos).length() >= LINK_DISTANCE {
                    continue;
                }

                let start = self.camera.world_to_screen(self.display_pos(first));
                let end = self.camera.world_to_screen(self.display_pos(second));
                if segment_visible(rect, start, end, 2.0) {
                    painter.line_segment([start, end], link_stroke);
                }
            }
        }

        for index in 0..self.nodes.len() {
            let node = &self.nodes[index];
            let position = self.camera.world_to_screen(self.display_pos(index));
            let radius = node.radius * scale;
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_selected = self.drag.dragged_item() == Some(node.item.id.as_str());
            let is_hovered = self.hovered == Some(index);
            let is_match = matches
                .as_ref()
                .is_some_and(|matched| matched.contains(&node.item.id));

            let fill = if is_selected {
                with_alpha(NODE_BLUE, 230)
            } else if is_hovered {
                with_alpha(NODE_BLUE, 204)
            } else if is_match {
                with_alpha(NODE_BLUE, 230)
            } else if search_active {
                with_alpha(NODE_BLUE, 46)
            } else {
                with_alpha(NODE_BLUE, 153)
            };

            painter.circle_filled(position, radius, fill);
            if is_selected {
                painter.circle_stroke(position, radius, Stroke::new(3.0, SELECTED_RING));
            }

            painter.text(
                position,
                Align2::CENTER_CENTER,
                trim_label(&node.item.name, LABEL_MAX_CHARS),
                FontId::proportional(14.0 * scale),
                Color32::WHITE,
            );
            painter.text(
                position + vec2(0.0, 20.0 * scale),
                Align2::CENTER_CENTER,
                format!("Qty: {}", node.item.quantity),
                FontId::proportional(12.0 * scale),
                Color32::WHITE,
            );
        }

        if self.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No items to map yet",
                FontId::proportional(15.0),
                Color32::from_gray(120),
            );
        }

        self.draw_hover_card(&painter, rect);
        draw_hint(&painter, rect);

        // keep the frame loop running at display cadence
        ui.ctx().request_repaint();
    }

    fn draw_hover_card(&self, painter: &Painter, rect: Rect) {
        let Some(index) = self.hovered else {
            return;
        };
        let Some(node) = self.nodes.get(index) else {
            return;
        };

        let lines = [
            node.item.name.clone(),
            format!("Quantity: {}", node.item.quantity),
            format!("Category: {}", node.item.category),
            format!("Location: {}", node.item.location),
        ];
        let galleys: Vec<_> = lines
            .into_iter()
            .enumerate()
            .map(|(line_index, line)| {
                let size = if line_index == 0 { 14.0 } else { 13.0 };
                painter.layout_no_wrap(line, FontId::proportional(size), Color32::from_gray(40))
            })
            .collect();

        let width = galleys.iter().map(|galley| galley.size().x).fold(0.0, f32::max);
        let height: f32 = galleys.iter().map(|galley| galley.size().y + 2.0).sum();

        let anchor = self.camera.world_to_screen(node.pos)
            + vec2(node.radius * self.camera.scale + 10.0, 0.0);
        let card = Rect::from_min_size(anchor, vec2(width + 16.0, height + 12.0));
        if !rect.intersects(card) {
            return;
        }

        painter.rect_filled(card, 6.0, with_alpha(Color32::WHITE, 242));

        let mut cursor = card.min + vec2(8.0, 6.0);
        for galley in galleys {
            let advance = galley.size().y + 2.0;
            painter.galley(cursor, galley, Color32::from_gray(40));
            cursor.y += advance;
        }
    }
}

fn draw_hint(painter: &Painter, rect: Rect) {
    let text = "Drag items to move • Hold and drag to pan • Scroll to zoom";
    let galley = painter.layout_no_wrap(
        text.to_owned(),
        FontId::proportional(12.5),
        Color32::from_gray(90),
    );
    let card = Rect::from_min_size(
        rect.right_bottom() - vec2(galley.size().x + 28.0, galley.size().y + 26.0),
        galley.size() + vec2(16.0, 12.0),
    );

    painter.rect_filled(card, 6.0, with_alpha(BACKDROP, 235));
    painter.galley(card.min + vec2(8.0, 6.0), galley, Color32::from_gray(90));
}
