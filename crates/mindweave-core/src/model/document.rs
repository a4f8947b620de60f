use crate::error::Result;
use crate::geom::{LogicalPoint, ScreenVector, Viewport, logical_point, screen_vector};
use crate::model::tree::{NodeRecord, NodeTree};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Node id → logical position. Absence means "needs placement".
pub type Positions = IndexMap<String, LogicalPoint>;

/// Storage key prefix used by module stores.
pub const STORAGE_KEY_PREFIX: &str = "mindmap-module-";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredPoint {
    x: f64,
    y: f64,
}

/// On-disk/in-storage module shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentModel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_top_level: bool,
    nodes: IndexMap<String, NodeRecord>,
    #[serde(default)]
    positions: Option<IndexMap<String, StoredPoint>>,
    #[serde(default)]
    pan: Option<StoredPoint>,
    #[serde(default)]
    zoom: Option<f64>,
}

/// A module: its node tree plus the layout and view state persisted alongside it.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
    pub is_top_level: bool,
    pub tree: NodeTree,
    pub positions: Positions,
    pub viewport: Viewport,
}

impl Document {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tree: NodeTree) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: None,
            is_top_level: false,
            tree,
            positions: Positions::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let model: DocumentModel = serde_json::from_str(text)?;
        Self::from_model(model)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let model = DocumentModel::deserialize(value)?;
        Self::from_model(model)
    }

    fn from_model(model: DocumentModel) -> Result<Self> {
        let tree = NodeTree::from_records(model.nodes)?;
        let mut doc = Self {
            id: model.id,
            name: model.name,
            path: model.path,
            is_top_level: model.is_top_level,
            tree,
            positions: model
                .positions
                .unwrap_or_default()
                .into_iter()
                .map(|(id, p)| (id, logical_point(p.x, p.y)))
                .collect(),
            viewport: Viewport::new(
                model
                    .pan
                    .map(|p| screen_vector(p.x, p.y))
                    .unwrap_or_else(ScreenVector::zero),
                model.zoom.unwrap_or(1.0),
            ),
        };
        let dropped = doc.prune_positions();
        if dropped > 0 {
            tracing::warn!(
                document = %doc.id,
                dropped,
                "ignoring stored positions for unknown nodes"
            );
        }
        Ok(doc)
    }

    fn to_model(&self) -> DocumentModel {
        DocumentModel {
            id: self.id.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
            is_top_level: self.is_top_level,
            nodes: self.tree.records().clone(),
            positions: Some(
                self.positions
                    .iter()
                    .map(|(id, p)| (id.clone(), StoredPoint { x: p.x, y: p.y }))
                    .collect(),
            ),
            pan: Some(StoredPoint {
                x: self.viewport.pan.x,
                y: self.viewport.pan.y,
            }),
            zoom: Some(self.viewport.zoom),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.to_model())?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_model())?)
    }

    /// Human-oriented export format (two-space indentation).
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_model())?)
    }

    pub fn storage_key(&self) -> String {
        storage_key(&self.id)
    }

    pub fn has_positions(&self) -> bool {
        !self.positions.is_empty()
    }

    /// Ids of nodes that currently have no position.
    pub fn unplaced(&self) -> impl Iterator<Item = &str> {
        self.tree.ids().filter(|id| !self.positions.contains_key(*id))
    }

    /// Drops positions whose node no longer exists; returns how many were removed.
    pub fn prune_positions(&mut self) -> usize {
        let before = self.positions.len();
        let tree = &self.tree;
        self.positions.retain(|id, _| tree.contains(id));
        before - self.positions.len()
    }

    pub fn add_child(
        &mut self,
        parent: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<String> {
        self.tree.add_child(parent, title, content)
    }

    /// Removes `id` and its subtree, along with their positions.
    pub fn remove_subtree(&mut self, id: &str) -> Result<Vec<String>> {
        let removed = self.tree.remove_subtree(id)?;
        for r in &removed {
            self.positions.shift_remove(r);
        }
        Ok(removed)
    }
}

pub fn storage_key(document_id: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{document_id}")
}

/// Derives a module id from its path: the file stem of the last path segment.
pub fn module_id_from_path(path: &str) -> &str {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.strip_suffix(".json").unwrap_or(last)
}
