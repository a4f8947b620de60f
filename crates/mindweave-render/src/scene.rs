//! Retained model of the drawn mind map.
//!
//! The scene mirrors what a host draws: one group per positioned node, one line per
//! positioned parent/child pair and a single viewport transform. Every mutation records
//! [`Damage`] so hosts can patch their surface instead of redrawing it.

use crate::style::SceneStyle;
use indexmap::{IndexMap, IndexSet};
use mindweave_core::{LogicalPoint, NodeTree, Positions, ROOT_ID, ScreenPoint, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: String,
    pub position: LogicalPoint,
    /// The title split on whitespace, one entry per rendered line.
    pub lines: Vec<String>,
    pub has_sub_module: bool,
    pub active: bool,
}

impl SceneNode {
    pub fn is_child(&self) -> bool {
        self.id != ROOT_ID
    }

    /// CSS classes of the node group, in render order.
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec!["node-group"];
        if self.has_sub_module {
            classes.push("has-submodule");
        }
        if self.is_child() {
            classes.push("is-child-node");
        }
        if self.active {
            classes.push("active");
        }
        classes
    }

    /// Offset of the first text line so the block is vertically centered on the node.
    pub fn first_line_offset(&self, line_height: f64) -> f64 {
        let extra = self.lines.len().saturating_sub(1) as f64;
        -(extra * line_height) / 2.0
    }
}

/// A parent to child connector, keyed by the child id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneEdge {
    pub from: LogicalPoint,
    pub to: LogicalPoint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Damage {
    /// Everything must be rebuilt.
    Full,
    /// The node group, its classes or the lines attached to it changed.
    Node(String),
    /// Only the viewport transform changed.
    Transform,
}

#[derive(Debug, Clone, Default)]
struct DamageSet {
    full: bool,
    nodes: IndexSet<String>,
    transform: bool,
}

impl DamageSet {
    fn mark_node(&mut self, id: &str) {
        if !self.full {
            self.nodes.insert(id.to_string());
        }
    }

    fn mark_full(&mut self) {
        self.full = true;
        self.nodes.clear();
        self.transform = false;
    }

    fn mark_transform(&mut self) {
        if !self.full {
            self.transform = true;
        }
    }

    fn drain(&mut self) -> Vec<Damage> {
        let taken = std::mem::take(self);
        if taken.full {
            return vec![Damage::Full];
        }
        let mut out: Vec<Damage> = taken.nodes.into_iter().map(Damage::Node).collect();
        if taken.transform {
            out.push(Damage::Transform);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    style: SceneStyle,
    nodes: IndexMap<String, SceneNode>,
    edges: IndexMap<String, SceneEdge>,
    viewport: Viewport,
    active: Option<String>,
    damage: DamageSet,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneStyle::default())
    }
}

impl Scene {
    pub fn new(style: SceneStyle) -> Self {
        Self {
            style,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            viewport: Viewport::default(),
            active: None,
            damage: DamageSet::default(),
        }
    }

    pub fn style(&self) -> &SceneStyle {
        &self.style
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Nodes in draw order (later entries are drawn on top).
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Edges as `(child id, edge)` in draw order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &SceneEdge)> {
        self.edges.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn edge_to(&self, child: &str) -> Option<&SceneEdge> {
        self.edges.get(child)
    }

    /// Rebuilds the scene from scratch. Nodes without a position are not drawn.
    pub fn redraw(&mut self, tree: &NodeTree, positions: &Positions, style: SceneStyle) {
        self.style = style;
        self.nodes.clear();
        self.edges.clear();

        for record in tree.nodes() {
            let Some(&position) = positions.get(&record.id) else {
                continue;
            };
            let parent_at = tree
                .parent_of(&record.id)
                .and_then(|parent| positions.get(parent));
            if let Some(&from) = parent_at {
                self.edges
                    .insert(record.id.clone(), SceneEdge { from, to: position });
            }
            self.nodes.insert(
                record.id.clone(),
                SceneNode {
                    id: record.id.clone(),
                    position,
                    lines: record.title.split_whitespace().map(str::to_string).collect(),
                    has_sub_module: record.sub_module.is_some(),
                    active: self.active.as_deref() == Some(record.id.as_str()),
                },
            );
        }

        if self
            .active
            .as_deref()
            .is_some_and(|id| !self.nodes.contains_key(id))
        {
            self.active = None;
        }
        tracing::trace!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "scene redrawn"
        );
        self.damage.mark_full();
    }

    /// Moves one node and patches the line to its parent and the lines to its children.
    /// Unknown ids are ignored.
    pub fn update_node_position(&mut self, tree: &NodeTree, id: &str, position: LogicalPoint) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.position = position;

        if let Some(edge) = self.edges.get_mut(id) {
            edge.to = position;
        }
        for child in tree.children_of(id) {
            if let Some(edge) = self.edges.get_mut(child) {
                edge.from = position;
                self.damage.mark_node(child);
            }
        }
        self.damage.mark_node(id);
    }

    pub fn apply_viewport(&mut self, viewport: Viewport) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.damage.mark_transform();
        }
    }

    /// Moves the highlight to `id`; `None` or an undrawn id clears it.
    pub fn set_active(&mut self, id: Option<&str>) {
        let next = id.filter(|id| self.nodes.contains_key(*id));
        if self.active.as_deref() == next {
            return;
        }
        if let Some(prev) = self.active.take() {
            if let Some(node) = self.nodes.get_mut(&prev) {
                node.active = false;
                self.damage.mark_node(&prev);
            }
        }
        if let Some(next) = next {
            if let Some(node) = self.nodes.get_mut(next) {
                node.active = true;
                self.active = Some(next.to_string());
                self.damage.mark_node(next);
            }
        }
    }

    /// The topmost node whose circle contains `point`.
    pub fn hit_test(&self, point: ScreenPoint) -> Option<&str> {
        let logical = self.viewport.screen_to_logical(point);
        let r2 = self.style.node_radius * self.style.node_radius;
        self.nodes
            .values()
            .rev()
            .find(|n| (logical - n.position).square_length() <= r2)
            .map(|n| n.id.as_str())
    }

    /// Returns and clears what changed since the previous call.
    pub fn take_damage(&mut self) -> Vec<Damage> {
        self.damage.drain()
    }
}
