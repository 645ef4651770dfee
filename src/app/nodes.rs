use eframe::egui::{Vec2, vec2};

use crate::store::Item;
use crate::util::stable_unit_pair;

const BASE_RADIUS: f32 = 30.0;
const QUANTITY_CAP: u32 = 20;
const RADIUS_PER_UNIT: f32 = 2.0;
const PLACEMENT_JITTER: f32 = 50.0;

// One node per item; pos and radius are in world units.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct MapNode {
    pub item: Item,
    pub pos: Vec2,
    pub radius: f32,
}

pub(in crate::app) fn node_radius(quantity: u32) -> f32 {
    BASE_RADIUS + quantity.min(QUANTITY_CAP) as f32 * RADIUS_PER_UNIT
}

// Items with a stored position keep it; the rest land on a ring around the
// viewport center, spread by index and nudged by an id-stable jitter so a
// fresh item set never stacks exactly.
pub(in crate::app) fn build_nodes(items: &[Item], center: Vec2, ring: f32) -> Vec<MapNode> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let pos = match (item.x, item.y) {
                (Some(x), Some(y)) => vec2(x, y),
                _ => ring_position(index, items.len(), center, ring, &item.id),
            };

            MapNode {
                pos,
                radius: node_radius(item.quantity),
                item: item.clone(),
            }
        })
        .collect()
}

fn ring_position(index: usize, count: usize, center: Vec2, ring: f32, id: &str) -> Vec2 {
    let angle = (index as f32 / count.max(1) as f32) * std::f32::consts::TAU;
    let (jx, jy) = stable_unit_pair(id);
    let distance = ring * (0.75 + 0.25 * jx);

    center + vec2(angle.cos(), angle.sin()) * distance + vec2(jx, jy) * PLACEMENT_JITTER
}

// First match in item order wins; pointer probes run every frame, so an
// unstable tie-break between overlapping nodes would flicker.
pub(in crate::app) fn hit_node(nodes: &[MapNode], world: Vec2) -> Option<usize> {
    nodes
        .iter()
        .position(|node| (world - node.pos).length() < node.radius)
}

#[cfg(test)]
pub(in crate::app) fn test_item(id: &str, quantity: u32, position: Option<(f32, f32)>) -> Item {
    Item {
        id: id.to_owned(),
        name: format!("Item {id}"),
        quantity,
        category: "Hardware".to_owned(),
        location: "Aisle 1".to_owned(),
        created_at: None,
        x: position.map(|(x, _)| x),
        y: position.map(|(_, y)| y),
    }
}
