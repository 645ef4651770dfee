use eframe::egui::{self, CursorIcon, Rect, Ui};

use super::super::ViewModel;
use super::super::nodes::hit_node;

const WHEEL_ZOOM_RATE: f32 = 0.001;

impl ViewModel {
    pub(in crate::app) fn handle_map_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.camera.zoom_at(pointer, scroll * WHEEL_ZOOM_RATE);
    }

    pub(in crate::app) fn handle_map_pointer(&mut self, ui: &Ui, response: &egui::Response) {
        let (pointer, pressed, down) = ui.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_down(),
            )
        });
        let released = ui.input(|input| input.pointer.primary_released());

        let Some(point) = pointer else {
            // pointer left the surface mid-gesture; same contract as release
            self.finish_drag();
            self.hovered = None;
            return;
        };

        if pressed && response.hovered() {
            let world = self.camera.screen_to_world(point);
            let hit = hit_node(&self.nodes, world).map(|index| self.nodes[index].item.id.clone());
            self.drag.begin(point, hit);
        } else if down {
            if let Some(delta) = self.drag.update(point) {
                self.camera.pan(delta);
            }
        }

        if released {
            self.finish_drag();
        }

        // hover probing only happens with no button held
        self.hovered = if self.drag.is_idle() && !down {
            hit_node(&self.nodes, self.camera.screen_to_world(point))
        } else {
            None
        };

        if !self.drag.is_idle() {
            ui.output_mut(|output| output.cursor_icon = CursorIcon::Grabbing);
        } else if self.hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = CursorIcon::Move);
        }
    }

    fn finish_drag(&mut self) {
        let Some((item_id, offset)) = self.drag.release() else {
            return;
        };

        if offset == eframe::egui::Vec2::ZERO {
            // a plain click; the position did not change, nothing to persist
            return;
        }

        let Some(index) = self.index_by_id.get(&item_id).copied() else {
            // the node was rebuilt away mid-drag
            return;
        };

        let new_pos = self.nodes[index].pos + offset / self.camera.scale;
        self.commit_node_position(item_id, new_pos);
    }
}
