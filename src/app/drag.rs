use eframe::egui::{Pos2, Vec2};

pub(in crate::app) const PAN_DAMPING: f32 = 0.5;

// Pointer gesture state for the map surface. A node stays "selected" only
// for the lifetime of one DraggingNode episode; release always lands in
// Idle, so a later pointer-down starts from a fresh hit-test.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum DragState {
    Idle,
    Panning { last: Pos2 },
    DraggingNode { item_id: String, origin: Pos2, offset: Vec2 },
}

impl DragState {
    pub fn begin(&mut self, point: Pos2, hit: Option<String>) {
        *self = match hit {
            Some(item_id) => DragState::DraggingNode {
                item_id,
                origin: point,
                offset: Vec2::ZERO,
            },
            None => DragState::Panning { last: point },
        };
    }

    // Panning yields a damped incremental camera delta and re-anchors on the
    // current point; node dragging accumulates the raw screen offset from
    // the original down-point and yields nothing.
    pub fn update(&mut self, point: Pos2) -> Option<Vec2> {
        match self {
            DragState::Idle => None,
            DragState::Panning { last } => {
                let delta = (point - *last) * PAN_DAMPING;
                *last = point;
                Some(delta)
            }
            DragState::DraggingNode { origin, offset, .. } => {
                *offset = point - *origin;
                None
            }
        }
    }

    pub fn release(&mut self) -> Option<(String, Vec2)> {
        match std::mem::replace(self, DragState::Idle) {
            DragState::DraggingNode {
                item_id, offset, ..
            } => Some((item_id, offset)),
            DragState::Idle | DragState::Panning { .. } => None,
        }
    }

    pub fn dragged_item(&self) -> Option<&str> {
        match self {
            DragState::DraggingNode { item_id, .. } => Some(item_id),
            _ => None,
        }
    }

    pub fn node_offset(&self) -> Vec2 {
        match self {
            DragState::DraggingNode { offset, .. } => *offset,
            _ => Vec2::ZERO,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }
}
