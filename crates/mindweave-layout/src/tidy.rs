//! Initial tidy-tree placement for nodes that have never been positioned.

use mindweave_core::{LogicalPoint, NodeTree, Positions, ROOT_ID, logical_point};
use rustc_hash::FxHashMap;

const FALLBACK_SPACING: f64 = 144.0;

/// Places every node missing from `positions` in a top-down tidy tree and returns how many
/// were written. Existing positions are left untouched and act as anchors for their subtrees.
///
/// Each subtree is `max(spacing, sum of child subtree widths)` wide; children are centered
/// under their parent one `spacing` lower. The root of a fresh tree sits at `(0, spacing)`.
/// Parentless nodes other than the root are laid out as extra trees to the right.
pub fn place_unpositioned(tree: &NodeTree, positions: &mut Positions, spacing: f64) -> usize {
    let spacing = if spacing.is_finite() && spacing > 0.0 {
        spacing
    } else {
        FALLBACK_SPACING
    };

    let mut roots: Vec<&str> = tree
        .ids()
        .filter(|id| tree.parent_of(id).is_none())
        .collect();
    roots.sort_by_key(|id| *id != ROOT_ID);

    let mut widths: FxHashMap<&str, f64> = FxHashMap::default();
    let mut placed = 0usize;
    let mut right_edge: Option<f64> = None;

    for root in roots {
        let width = subtree_width(tree, root, spacing, &mut widths);
        let anchor = match positions.get(root) {
            Some(p) => *p,
            None => {
                let x = right_edge.map_or(0.0, |edge| edge + width / 2.0);
                let p = logical_point(x, spacing);
                positions.insert(root.to_string(), p);
                placed += 1;
                p
            }
        };
        let edge = anchor.x + width / 2.0;
        right_edge = Some(right_edge.map_or(edge, |e| e.max(edge)));
        placed += place_children(tree, root, anchor, spacing, &widths, positions);
    }

    if placed > 0 {
        tracing::debug!(placed, "placed unpositioned nodes");
    }
    placed
}

fn subtree_width<'a>(
    tree: &'a NodeTree,
    id: &'a str,
    spacing: f64,
    widths: &mut FxHashMap<&'a str, f64>,
) -> f64 {
    if let Some(w) = widths.get(id) {
        return *w;
    }
    let children: f64 = tree
        .children_of(id)
        .iter()
        .filter(|c| tree.contains(c))
        .map(|c| subtree_width(tree, c, spacing, widths))
        .sum();
    let w = children.max(spacing);
    widths.insert(id, w);
    w
}

fn place_children(
    tree: &NodeTree,
    parent: &str,
    at: LogicalPoint,
    spacing: f64,
    widths: &FxHashMap<&str, f64>,
    positions: &mut Positions,
) -> usize {
    let children: Vec<&str> = tree
        .children_of(parent)
        .iter()
        .map(String::as_str)
        .filter(|c| tree.contains(c))
        .collect();
    let width_of = |id: &str| widths.get(id).copied().unwrap_or(spacing);
    let total: f64 = children.iter().map(|c| width_of(*c)).sum();

    let mut placed = 0usize;
    let mut x = at.x - total / 2.0;
    for child in children {
        let w = width_of(child);
        let center = x + w / 2.0;
        x += w;

        let p = match positions.get(child) {
            Some(p) => *p,
            None => {
                let p = logical_point(center, at.y + spacing);
                positions.insert(child.to_string(), p);
                placed += 1;
                p
            }
        };
        placed += place_children(tree, child, p, spacing, widths, positions);
    }
    placed
}
