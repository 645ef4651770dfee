use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use log::{error, info, warn};

use crate::store::{self, Item, StoreConfig, StoreError};

mod camera;
mod commit;
mod drag;
mod map;
mod nodes;
mod render_utils;
mod ui;

use camera::Camera;
use commit::PendingCommit;
use drag::DragState;
use nodes::MapNode;

pub struct StoreMapApp {
    store: StoreConfig,
    state: AppState,
    reload_rx: Option<Receiver<Result<Vec<Item>, StoreError>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Vec<Item>, StoreError>>,
    },
    Ready(Box<ViewModel>),
}

struct ViewModel {
    store: StoreConfig,
    items: Vec<Item>,
    items_revision: u64,
    load_error: Option<String>,
    nodes: Vec<MapNode>,
    index_by_id: HashMap<String, usize>,
    nodes_dirty: bool,
    camera: Camera,
    drag: DragState,
    hovered: Option<usize>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    pending_commits: Vec<PendingCommit>,
    commit_seq: u64,
    latest_commit_by_item: HashMap<String, u64>,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchMatchCache {
    query: String,
    items_revision: u64,
    matches: Arc<HashSet<String>>,
}

impl StoreMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, store: StoreConfig) -> Self {
        let rx = Self::spawn_fetch(store.clone());
        Self {
            store,
            state: AppState::Loading { rx },
            reload_rx: None,
        }
    }

    fn spawn_fetch(store: StoreConfig) -> Receiver<Result<Vec<Item>, StoreError>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(store::fetch_items(&store));
        });

        rx
    }

    // A fetch failure degrades to an empty map with a status note; the map
    // view itself never turns into an error screen.
    fn model_from_fetch(store: &StoreConfig, result: Result<Vec<Item>, StoreError>) -> ViewModel {
        match result {
            Ok(items) => {
                info!("loaded {} items from {}", items.len(), store.base_url);
                ViewModel::new(store.clone(), items, None)
            }
            Err(store_error) => {
                warn!("item fetch failed, starting with an empty map: {store_error}");
                ViewModel::new(store.clone(), Vec::new(), Some(store_error.to_string()))
            }
        }
    }
}

impl eframe::App for StoreMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Err(TryRecvError::Empty) => {}
                    Ok(result) => {
                        transition = Some(AppState::Ready(Box::new(Self::model_from_fetch(
                            &self.store,
                            result,
                        ))));
                    }
                    Err(TryRecvError::Disconnected) => {
                        error!("fetch worker disconnected before sending a result");
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            self.store.clone(),
                            Vec::new(),
                            Some("fetch worker disconnected".to_owned()),
                        ))));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading inventory…");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_fetch(self.store.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(items)) => {
                            info!("reloaded {} items", items.len());
                            model.replace_items(items);
                        }
                        Ok(Err(store_error)) => {
                            warn!("reload failed, keeping the current item set: {store_error}");
                            model.load_error = Some(store_error.to_string());
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            error!("reload worker disconnected");
                            model.load_error = Some("reload worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl ViewModel {
    // The camera, gesture state, and in-flight commits all survive a
    // background refresh; only the node arena is rebuilt.
    fn replace_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.items_revision = self.items_revision.wrapping_add(1);
        self.load_error = None;
        self.nodes_dirty = true;
    }

    fn rebuild_nodes(&mut self, center: eframe::egui::Vec2, ring: f32) {
        self.nodes = nodes::build_nodes(&self.items, center, ring);
        self.index_by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.item.id.clone(), index))
            .collect();
        self.hovered = None;
        self.nodes_dirty = false;

        debug_assert_eq!(self.nodes.len(), self.items.len());
        debug_assert_eq!(self.index_by_id.len(), self.nodes.len(), "item ids must be unique");
    }
}
