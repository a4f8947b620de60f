use crate::error::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Deserializer, Serialize};

/// Id of the distinguished node every module tree is rooted at.
pub const ROOT_ID: &str = "root";

/// Documents written by older editors store `null` for empty lists and text.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Rich-text body. Stored and carried verbatim, never interpreted here.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<String>,
    /// Reference to another module document this node opens when selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_module: Option<String>,
    #[serde(default)]
    pub quiz: Option<Vec<QuizQuestion>>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            children: Vec::new(),
            sub_module: None,
            quiz: None,
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_sub_module(mut self, reference: impl Into<String>) -> Self {
        self.sub_module = Some(reference.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }
}

/// Arena storage for a module's node tree.
///
/// Nodes live in a flat id-keyed map (insertion ordered); parent links are derived from the
/// `children` lists and kept in sync by every mutation. Construction validates the tree
/// shape, so a `NodeTree` always has a root, no dangling child ids, at most one parent per
/// node and no cycles.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: IndexMap<String, NodeRecord>,
    parents: FxHashMap<String, String>,
}

impl NodeTree {
    /// A tree holding only an untitled root.
    pub fn with_root(title: impl Into<String>) -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(ROOT_ID.to_string(), NodeRecord::new(ROOT_ID, title));
        Self {
            nodes,
            parents: FxHashMap::default(),
        }
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeRecord>) -> Result<Self> {
        let mut records: IndexMap<String, NodeRecord> = IndexMap::new();
        for n in nodes {
            if records.contains_key(&n.id) {
                return Err(Error::DuplicateNode { id: n.id });
            }
            records.insert(n.id.clone(), n);
        }
        Self::from_records(records)
    }

    pub fn from_records(nodes: IndexMap<String, NodeRecord>) -> Result<Self> {
        if !nodes.contains_key(ROOT_ID) {
            return Err(Error::MissingRoot);
        }

        let mut parents: FxHashMap<String, String> = FxHashMap::default();
        parents.reserve(nodes.len());
        for (key, node) in &nodes {
            if key != &node.id {
                return Err(Error::IdMismatch {
                    key: key.clone(),
                    id: node.id.clone(),
                });
            }
            for child in &node.children {
                if !nodes.contains_key(child) {
                    return Err(Error::MissingChild {
                        parent: node.id.clone(),
                        child: child.clone(),
                    });
                }
                if child == ROOT_ID {
                    return Err(Error::RootHasParent {
                        parent: node.id.clone(),
                    });
                }
                if parents.insert(child.clone(), node.id.clone()).is_some() {
                    return Err(Error::MultipleParents {
                        child: child.clone(),
                    });
                }
            }
        }

        check_acyclic(&nodes, &parents)?;
        Ok(Self { nodes, parents })
    }

    pub fn root(&self) -> Option<&NodeRecord> {
        self.nodes.get(ROOT_ID)
    }

    pub fn get(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    pub fn records(&self) -> &IndexMap<String, NodeRecord> {
        &self.nodes
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// `(parent, child)` pairs, in node order then child order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.values().flat_map(|n| {
            n.children
                .iter()
                .map(move |c| (n.id.as_str(), c.as_str()))
        })
    }

    /// `id` followed by every node it owns, depth-first pre-order. Empty for unknown ids.
    pub fn subtree(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id.to_string()];
        while let Some(cur) = stack.pop() {
            // Push in reverse so the first child is visited first.
            for c in self.children_of(&cur).iter().rev() {
                stack.push(c.clone());
            }
            out.push(cur);
        }
        out
    }

    /// Depth of `id` below the root (root = 0), `None` when unreachable.
    pub fn depth(&self, id: &str) -> Option<usize> {
        let mut depth = 0usize;
        let mut cur = id;
        while cur != ROOT_ID {
            cur = self.parent_of(cur)?;
            depth += 1;
        }
        Some(depth)
    }

    /// Appends a new node under `parent` and returns its generated id.
    pub fn add_child(
        &mut self,
        parent: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<String> {
        let id = format!("node-{}", uuid::Uuid::new_v4().simple());
        self.insert_child(
            parent,
            NodeRecord::new(id.clone(), title).with_content(content),
        )?;
        Ok(id)
    }

    /// Appends `record` (which must be childless) under `parent`.
    pub fn insert_child(&mut self, parent: &str, mut record: NodeRecord) -> Result<()> {
        if self.nodes.contains_key(&record.id) {
            return Err(Error::DuplicateNode { id: record.id });
        }
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return Err(Error::UnknownNode {
                id: parent.to_string(),
            });
        };
        record.children.clear();
        parent_node.children.push(record.id.clone());
        self.parents.insert(record.id.clone(), parent.to_string());
        self.nodes.insert(record.id.clone(), record);
        Ok(())
    }

    /// Unlinks `id` from its parent and deletes it together with everything it owns.
    ///
    /// Returns the removed ids in depth-first pre-order.
    pub fn remove_subtree(&mut self, id: &str) -> Result<Vec<String>> {
        if id == ROOT_ID {
            return Err(Error::CannotRemoveRoot);
        }
        if !self.contains(id) {
            return Err(Error::UnknownNode { id: id.to_string() });
        }

        if let Some(parent) = self.parents.remove(id) {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| c != id);
            }
        }

        let removed = self.subtree(id);
        for r in &removed {
            self.nodes.shift_remove(r);
            self.parents.remove(r);
        }
        Ok(removed)
    }

    pub fn set_title(&mut self, id: &str, title: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, id: &str, content: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.content = content.into();
        Ok(())
    }

    pub fn set_quiz(&mut self, id: &str, quiz: Option<Vec<QuizQuestion>>) -> Result<()> {
        self.node_mut(id)?.quiz = quiz.filter(|q| !q.is_empty());
        Ok(())
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut NodeRecord> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })
    }
}

fn check_acyclic(
    nodes: &IndexMap<String, NodeRecord>,
    parents: &FxHashMap<String, String>,
) -> Result<()> {
    // With at most one parent per node, a cycle is a parent chain that revisits a node.
    let mut settled: FxHashSet<&str> = FxHashSet::default();
    for id in nodes.keys() {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: FxHashSet<&str> = FxHashSet::default();
        let mut cur = id.as_str();
        loop {
            if settled.contains(cur) {
                break;
            }
            if !on_path.insert(cur) {
                return Err(Error::Cycle {
                    node: cur.to_string(),
                });
            }
            path.push(cur);
            match parents.get(cur) {
                Some(p) => cur = p.as_str(),
                None => break,
            }
        }
        settled.extend(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NodeTree {
        NodeTree::from_nodes([
            NodeRecord::new("root", "Root").with_children(["a", "b"]),
            NodeRecord::new("a", "A").with_children(["a1", "a2"]),
            NodeRecord::new("a1", "A1"),
            NodeRecord::new("a2", "A2"),
            NodeRecord::new("b", "B"),
        ])
        .expect("valid tree")
    }

    #[test]
    fn subtree_is_preorder() {
        let t = sample();
        assert_eq!(t.subtree("root"), vec!["root", "a", "a1", "a2", "b"]);
        assert!(t.subtree("missing").is_empty());
    }

    #[test]
    fn depth_follows_parent_links() {
        let t = sample();
        assert_eq!(t.depth("root"), Some(0));
        assert_eq!(t.depth("a2"), Some(2));
        assert_eq!(t.depth("nope"), None);
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        let err = NodeTree::from_nodes([
            NodeRecord::new("root", "Root"),
            NodeRecord::new("x", "X").with_children(["y"]),
            NodeRecord::new("y", "Y").with_children(["x"]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Cycle { .. }), "got {err:?}");
    }

    #[test]
    fn self_child_is_a_cycle() {
        let err = NodeTree::from_nodes([
            NodeRecord::new("root", "Root").with_children(["x"]),
            NodeRecord::new("x", "X").with_children(["x"]),
        ])
        .unwrap_err();
        assert!(
            matches!(err, Error::MultipleParents { .. } | Error::Cycle { .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn set_quiz_drops_empty_lists() {
        let mut t = sample();
        t.set_quiz("a", Some(Vec::new())).expect("known node");
        assert_eq!(t.get("a").and_then(|n| n.quiz.clone()), None);
    }
}
