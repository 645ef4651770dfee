use std::collections::{HashMap, VecDeque};

use eframe::egui::{self, Align, Color32, Context, Layout};

use crate::store::{Item, StoreConfig};

use super::super::camera::Camera;
use super::super::drag::DragState;
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(store: StoreConfig, items: Vec<Item>, load_error: Option<String>) -> Self {
        Self {
            store,
            items,
            items_revision: 0,
            load_error,
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            nodes_dirty: true,
            camera: Camera::default(),
            drag: DragState::Idle,
            hovered: None,
            search: String::new(),
            search_match_cache: None,
            pending_commits: Vec::new(),
            commit_seq: 0,
            latest_commit_by_item: HashMap::new(),
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_reloading: bool) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("storemap");
                    ui.separator();
                    ui.label(format!("items: {}", self.items.len()));
                    ui.label(format!("store: {}", self.store.base_url));

                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload items"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_reloading {
                        ui.spinner();
                    }

                    ui.label("search:");
                    ui.text_edit_singleline(&mut self.search);

                    if let Some(load_error) = &self.load_error {
                        ui.colored_label(
                            Color32::from_rgb(200, 90, 60),
                            format!("store unreachable: {load_error}"),
                        );
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        if ui.button("Reset view").clicked() {
                            self.camera = Camera::default();
                        }
                        ui.label(format!("zoom {:.0}%", self.camera.scale * 100.0));
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| self.draw_map(ui));
    }
}
