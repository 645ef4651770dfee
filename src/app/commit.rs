use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::Vec2;
use log::{debug, warn};

use crate::store::{self, StoreError};

use super::ViewModel;

// One in-flight position write. `prior` is the pre-image captured at the
// optimistic apply; it is re-resolved by item id when the result lands, so
// a node-set reload in between cannot misdirect a rollback.
pub(in crate::app) struct PendingCommit {
    pub item_id: String,
    pub prior: Vec2,
    pub seq: u64,
    pub rx: Receiver<Result<(), StoreError>>,
}

impl ViewModel {
    // Moves one node (and its backing item record) to `position`, returning
    // the pre-image. Every other node is left untouched.
    pub(in crate::app) fn apply_position(&mut self, item_id: &str, position: Vec2) -> Option<Vec2> {
        let index = self.index_by_id.get(item_id).copied()?;
        let node = &mut self.nodes[index];

        let prior = node.pos;
        node.pos = position;
        node.item.x = Some(position.x);
        node.item.y = Some(position.y);

        if let Some(item) = self.items.iter_mut().find(|item| item.id == item_id) {
            item.x = Some(position.x);
            item.y = Some(position.y);
        }

        Some(prior)
    }

    // Optimistic commit: the node moves now, the store hears about it on a
    // worker thread, and a failure later rolls the move back.
    pub(in crate::app) fn commit_node_position(&mut self, item_id: String, position: Vec2) {
        let Some(prior) = self.apply_position(&item_id, position) else {
            return;
        };

        let (tx, rx) = mpsc::channel();
        let store = self.store.clone();
        let worker_id = item_id.clone();
        thread::spawn(move || {
            let _ = tx.send(store::update_item_position(
                &store,
                &worker_id,
                position.x,
                position.y,
            ));
        });

        self.register_commit(item_id, prior, rx);
    }

    pub(in crate::app) fn register_commit(
        &mut self,
        item_id: String,
        prior: Vec2,
        rx: Receiver<Result<(), StoreError>>,
    ) {
        self.commit_seq += 1;
        self.latest_commit_by_item
            .insert(item_id.clone(), self.commit_seq);
        self.pending_commits.push(PendingCommit {
            item_id,
            prior,
            seq: self.commit_seq,
            rx,
        });
    }

    // Drains every resolved commit; rendering never waits on the rest.
    pub(in crate::app) fn poll_commits(&mut self) {
        let mut resolved = Vec::new();
        let mut index = 0;
        while index < self.pending_commits.len() {
            let outcome = match self.pending_commits[index].rx.try_recv() {
                Err(TryRecvError::Empty) => {
                    index += 1;
                    continue;
                }
                Ok(result) => result,
                Err(TryRecvError::Disconnected) => {
                    Err(StoreError::Network("commit worker disconnected".to_owned()))
                }
            };
            resolved.push((self.pending_commits.swap_remove(index), outcome));
        }

        for (commit, outcome) in resolved {
            self.resolve_commit(commit, outcome);
        }
    }

    fn resolve_commit(&mut self, commit: PendingCommit, outcome: Result<(), StoreError>) {
        let is_latest = self
            .latest_commit_by_item
            .get(&commit.item_id)
            .is_some_and(|&latest| latest == commit.seq);

        match outcome {
            Ok(()) => {
                debug!("position of {} persisted", commit.item_id);
            }
            Err(store_error) if is_latest => {
                warn!(
                    "position update for {} failed ({store_error}), rolling back",
                    commit.item_id
                );
                self.apply_position(&commit.item_id, commit.prior);
            }
            Err(store_error) => {
                // A newer commit for this node is already in memory; its
                // outcome governs, so the stale failure is only logged.
                warn!(
                    "superseded position update for {} failed ({store_error}), keeping newer value",
                    commit.item_id
                );
            }
        }

        if is_latest {
            self.latest_commit_by_item.remove(&commit.item_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use crate::app::camera::Camera;
    use crate::app::drag::DragState;
    use crate::app::nodes::{hit_node, test_item};
    use crate::store::StoreConfig;

    use super::*;

    fn model_with_items(items: Vec<crate::store::Item>) -> ViewModel {
        let store = StoreConfig::new("http://localhost:8787", None).expect("test config");
        let mut model = ViewModel::new(store, items, None);
        model.rebuild_nodes(vec2(640.0, 460.0), 300.0);
        model
    }

    fn send_outcome(model: &mut ViewModel, item_id: &str, prior: Vec2, outcome: Result<(), StoreError>) {
        let (tx, rx) = mpsc::channel();
        model.register_commit(item_id.to_owned(), prior, rx);
        tx.send(outcome).expect("receiver alive");
    }

    #[test]
    fn apply_position_touches_exactly_one_node() {
        let mut model = model_with_items(vec![
            test_item("a", 1, Some((100.0, 100.0))),
            test_item("b", 2, Some((400.0, 250.0))),
        ]);
        let untouched = model.nodes[1].clone();

        let prior = model.apply_position("a", vec2(150.0, 100.0)).expect("node exists");

        assert_eq!(prior, vec2(100.0, 100.0));
        assert_eq!(model.nodes[0].pos, vec2(150.0, 100.0));
        assert_eq!(model.nodes[0].item.x, Some(150.0));
        assert_eq!(model.nodes[1], untouched);
        assert_eq!(model.items[0].x, Some(150.0));
    }

    #[test]
    fn apply_position_on_a_missing_id_is_a_no_op() {
        let mut model = model_with_items(vec![test_item("a", 1, Some((100.0, 100.0)))]);
        assert!(model.apply_position("ghost", vec2(0.0, 0.0)).is_none());
        assert_eq!(model.nodes[0].pos, vec2(100.0, 100.0));
    }

    #[test]
    fn failed_commit_rolls_the_node_back_to_its_snapshot() {
        let mut model = model_with_items(vec![
            test_item("a", 1, Some((100.0, 100.0))),
            test_item("b", 2, Some((400.0, 250.0))),
        ]);
        let snapshot = model.nodes.clone();

        let prior = model.apply_position("a", vec2(150.0, 100.0)).expect("node exists");
        send_outcome(&mut model, "a", prior, Err(StoreError::RateLimited));
        model.poll_commits();

        assert_eq!(model.nodes, snapshot);
        assert!(model.pending_commits.is_empty());
        assert!(model.latest_commit_by_item.is_empty());
    }

    #[test]
    fn successful_commit_keeps_the_new_position() {
        let mut model = model_with_items(vec![test_item("a", 1, Some((100.0, 100.0)))]);

        let prior = model.apply_position("a", vec2(150.0, 100.0)).expect("node exists");
        send_outcome(&mut model, "a", prior, Ok(()));
        model.poll_commits();

        assert_eq!(model.nodes[0].pos, vec2(150.0, 100.0));
        assert!(model.pending_commits.is_empty());
    }

    #[test]
    fn unresolved_commit_stays_pending() {
        let mut model = model_with_items(vec![test_item("a", 1, Some((100.0, 100.0)))]);

        let (_tx, rx) = mpsc::channel();
        let prior = model.apply_position("a", vec2(150.0, 100.0)).expect("node exists");
        model.register_commit("a".to_owned(), prior, rx);
        model.poll_commits();

        assert_eq!(model.pending_commits.len(), 1);
        assert_eq!(model.nodes[0].pos, vec2(150.0, 100.0));
    }

    #[test]
    fn stale_failure_does_not_clobber_a_newer_commit() {
        let mut model = model_with_items(vec![test_item("a", 1, Some((100.0, 100.0)))]);

        let (first_tx, first_rx) = mpsc::channel();
        let prior_first = model.apply_position("a", vec2(150.0, 100.0)).expect("node exists");
        model.register_commit("a".to_owned(), prior_first, first_rx);

        let (second_tx, second_rx) = mpsc::channel();
        let prior_second = model.apply_position("a", vec2(210.0, 90.0)).expect("node exists");
        model.register_commit("a".to_owned(), prior_second, second_rx);

        // the older write fails after being superseded; the newer value holds
        first_tx.send(Err(StoreError::Http(500))).expect("receiver alive");
        model.poll_commits();
        assert_eq!(model.nodes[0].pos, vec2(210.0, 90.0));

        // the newer write failing does roll back, to its own pre-image
        second_tx.send(Err(StoreError::Http(500))).expect("receiver alive");
        model.poll_commits();
        assert_eq!(model.nodes[0].pos, vec2(150.0, 100.0));
    }

    #[test]
    fn rollback_after_a_reload_misses_gracefully() {
        let mut model = model_with_items(vec![test_item("a", 1, Some((100.0, 100.0)))]);

        let prior = model.apply_position("a", vec2(150.0, 100.0)).expect("node exists");
        send_outcome(&mut model, "a", prior, Err(StoreError::NotFound));

        // the item vanished from the store before the failure arrived
        model.replace_items(vec![test_item("b", 2, Some((50.0, 50.0)))]);
        model.rebuild_nodes(vec2(640.0, 460.0), 300.0);
        model.poll_commits();

        assert_eq!(model.nodes.len(), 1);
        assert_eq!(model.nodes[0].item.id, "b");
        assert_eq!(model.nodes[0].pos, vec2(50.0, 50.0));
    }

    // Full interaction walk: press on the node, pull it 50 px right,
    // release, watch the failed write revert it.
    #[test]
    fn drag_release_and_failed_write_round_trip() {
        let mut model = model_with_items(vec![test_item("a", 0, Some((100.0, 100.0)))]);
        assert_eq!(model.nodes[0].radius, 30.0);

        let camera = Camera::default();
        let mut drag = DragState::Idle;

        let down = pos2(100.0, 100.0);
        let hit = hit_node(&model.nodes, camera.screen_to_world(down))
            .map(|index| model.nodes[index].item.id.clone());
        drag.begin(down, hit);
        assert_eq!(drag.dragged_item(), Some("a"));

        drag.update(pos2(150.0, 100.0));
        assert_eq!(drag.node_offset(), vec2(50.0, 0.0));

        let (item_id, offset) = drag.release().expect("node move");
        let new_pos = model.nodes[0].pos + offset / camera.scale;
        let prior = model.apply_position(&item_id, new_pos).expect("node exists");
        assert_eq!(model.nodes[0].pos, vec2(150.0, 100.0));

        send_outcome(&mut model, &item_id, prior, Err(StoreError::Unauthorized));
        model.poll_commits();
        assert_eq!(model.nodes[0].pos, vec2(100.0, 100.0));
    }

    #[test]
    fn commit_delta_divides_by_the_scale_current_at_release() {
        let mut model = model_with_items(vec![test_item("a", 0, Some((100.0, 100.0)))]);
        let mut camera = Camera::default();
        let mut drag = DragState::Idle;

        drag.begin(pos2(100.0, 100.0), Some("a".to_owned()));
        drag.update(pos2(150.0, 100.0));

        // the wheel fires mid-drag; the screen offset is unchanged and the
        // commit divides by the scale in force at release
        camera.zoom_at(pos2(0.0, 0.0), 1.0);
        assert_eq!(camera.scale, 2.0);
        assert_eq!(drag.node_offset(), vec2(50.0, 0.0));

        let (item_id, offset) = drag.release().expect("node move");
        let new_pos = model.nodes[0].pos + offset / camera.scale;
        model.apply_position(&item_id, new_pos).expect("node exists");

        assert_eq!(model.nodes[0].pos, vec2(125.0, 100.0));
    }
}
