use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub location: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
}

impl Item {
    pub fn has_position(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}
