use alloc::vec::Vec;
use core::fmt;

use crate::key::{KeyMap, KeySet};
use crate::{Identity, IndexPath, ItemRef, RelativeLocation, SnapshotError, TreeIndex};

/// Input forest node: an item and its ordered children.
#[derive(Clone, Debug)]
pub struct TreeNode {
    pub value: ItemRef,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(value: ItemRef) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    pub fn with_children(value: ItemRef, children: Vec<TreeNode>) -> Self {
        Self { value, children }
    }

    pub fn push(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_len).sum::<usize>()
    }
}

#[derive(Clone, Debug)]
struct Node {
    index_path: IndexPath,
    parent: Option<Identity>,
    children: Vec<Identity>,
    /// Pre-order position in the input forest.
    order: usize,
}

/// Hierarchical snapshot with `O(1)` lookups by identity and by index path.
///
/// Built by a pre-order walk of the input forest. Every identity in a child list has a node,
/// each node's index path matches its position chain from the root, and the path map is the exact
/// inverse of the node paths.
///
/// Duplicate identities follow a first-wins policy: a later node reusing an identity is skipped
/// together with its subtree, and reported by [`TreeSnapshot::duplicates`].
#[derive(Clone, Default)]
pub struct TreeSnapshot {
    roots: Vec<Identity>,
    nodes: KeyMap<Identity, Node>,
    elements: KeyMap<Identity, ItemRef>,
    paths: KeyMap<IndexPath, Identity>,
    identifiers: KeySet<Identity>,
    duplicates: Vec<Identity>,
}

struct Builder {
    snapshot: TreeSnapshot,
    strict: bool,
    order: usize,
}

impl Builder {
    fn level(
        &mut self,
        parent: Option<&Identity>,
        parent_path: &IndexPath,
        nodes: &[TreeNode],
    ) -> Result<Vec<Identity>, SnapshotError> {
        let mut accepted: Vec<Identity> = Vec::with_capacity(nodes.len());
        for tree_node in nodes {
            let id = tree_node.value.identity();
            let order = self.order;
            if let Some(existing) = self.snapshot.nodes.get(&id) {
                if self.strict {
                    return Err(SnapshotError::DuplicateIdentity {
                        identity: id,
                        first: existing.order,
                        duplicate: order,
                    });
                }
                lwarn!(
                    identity = %id,
                    first = existing.order,
                    duplicate = order,
                    "TreeSnapshot: duplicate identity dropped with its subtree"
                );
                self.order += tree_node.subtree_len();
                self.snapshot.duplicates.push(id);
                continue;
            }
            self.order += 1;

            let index_path = parent_path.child(accepted.len());
            self.snapshot.identifiers.insert(id.clone());
            self.snapshot.paths.insert(index_path.clone(), id.clone());
            self.snapshot
                .elements
                .insert(id.clone(), tree_node.value.clone());
            self.snapshot.nodes.insert(
                id.clone(),
                Node {
                    index_path: index_path.clone(),
                    parent: parent.cloned(),
                    children: Vec::new(),
                    order,
                },
            );

            let children = self.level(Some(&id), &index_path, &tree_node.children)?;
            if let Some(node) = self.snapshot.nodes.get_mut(&id) {
                node.children = children;
            }
            accepted.push(id);
        }
        Ok(accepted)
    }
}

impl TreeSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a forest of root nodes, skipping duplicate identities.
    pub fn new(roots: &[TreeNode]) -> Self {
        let mut builder = Builder {
            snapshot: Self::default(),
            strict: false,
            order: 0,
        };
        // Lenient builds never return an error.
        builder.snapshot.roots = builder
            .level(None, &IndexPath::root(), roots)
            .unwrap_or_default();
        ldebug!(
            nodes = builder.snapshot.nodes.len(),
            roots = builder.snapshot.roots.len(),
            duplicates = builder.snapshot.duplicates.len(),
            "TreeSnapshot::new"
        );
        builder.snapshot
    }

    /// Builds a snapshot, failing on the first duplicate identity.
    pub fn try_new(roots: &[TreeNode]) -> Result<Self, SnapshotError> {
        let mut builder = Builder {
            snapshot: Self::default(),
            strict: true,
            order: 0,
        };
        builder.snapshot.roots = builder.level(None, &IndexPath::root(), roots)?;
        Ok(builder.snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of nodes at every depth.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> &[Identity] {
        &self.roots
    }

    /// Child identities of `parent`; `None` addresses the root level.
    pub fn children(&self, parent: Option<&Identity>) -> &[Identity] {
        match parent {
            None => &self.roots,
            Some(id) => self
                .nodes
                .get(id)
                .map(|node| node.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn children_count(&self, parent: Option<&Identity>) -> usize {
        self.children(parent).len()
    }

    pub fn child_identifier(&self, parent: Option<&Identity>, offset: usize) -> Option<&Identity> {
        self.children(parent).get(offset)
    }

    pub fn identifier_at(&self, path: &IndexPath) -> Option<&Identity> {
        self.paths.get(path)
    }

    pub fn index_path(&self, id: &Identity) -> Option<&IndexPath> {
        self.nodes.get(id).map(|node| &node.index_path)
    }

    pub fn index(&self, id: &Identity) -> Option<TreeIndex> {
        let path = self.index_path(id)?;
        Some(TreeIndex::new(id.clone(), path.clone()))
    }

    pub fn get(&self, id: &Identity) -> Option<&ItemRef> {
        self.elements.get(id)
    }

    pub fn get_at(&self, path: &IndexPath) -> Option<&ItemRef> {
        self.elements.get(self.paths.get(path)?)
    }

    pub fn parent(&self, id: &Identity) -> Option<&Identity> {
        self.nodes.get(id)?.parent.as_ref()
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.identifiers.contains(id)
    }

    pub fn identifiers(&self) -> &KeySet<Identity> {
        &self.identifiers
    }

    /// Identities in pre-order (parents before children, siblings in order).
    pub fn preorder(&self) -> Vec<Identity> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&Identity> = self.roots.iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id.clone());
            stack.extend(self.children(Some(id)).iter().rev());
        }
        out
    }

    /// Number of nodes in the union of the subtrees rooted at `ids`.
    ///
    /// Nested or repeated identities are counted once; unknown identities count zero.
    pub fn covered_len<'a>(&self, ids: impl IntoIterator<Item = &'a Identity>) -> usize {
        let mut seen: KeySet<&Identity> = KeySet::new();
        let mut stack: Vec<&Identity> = ids
            .into_iter()
            .filter_map(|id| self.nodes.get_key_value(id).map(|(key, _)| key))
            .collect();
        while let Some(id) = stack.pop() {
            if seen.insert(id) {
                stack.extend(self.children(Some(id)));
            }
        }
        seen.len()
    }

    pub fn duplicates(&self) -> &[Identity] {
        &self.duplicates
    }

    pub fn is_group(&self, id: &Identity) -> bool {
        self.get(id)
            .is_some_and(|item| item.configuration().is_group)
    }

    /// `true` when the node has at least one child.
    pub fn is_expandable(&self, id: &Identity) -> bool {
        !self.children(Some(id)).is_empty()
    }

    /// Translates a child offset into a placement relative to an existing sibling.
    ///
    /// Offsets past the first child resolve to `After(previous sibling)`; offset `0` resolves to
    /// `Before(first child)`. Returns `None` when `parent` has no children or `offset` is beyond
    /// the end.
    pub fn relative_location(
        &self,
        parent: Option<&Identity>,
        offset: usize,
    ) -> Option<RelativeLocation> {
        let children = self.children(parent);
        if offset > 0 {
            return children
                .get(offset - 1)
                .map(|id| RelativeLocation::After(id.clone()));
        }
        children
            .first()
            .map(|id| RelativeLocation::Before(id.clone()))
    }

    /// Replaces the stored item of the same identity without touching structure.
    ///
    /// Returns `false` when the identity is unknown.
    pub fn force_update(&mut self, item: ItemRef) -> bool {
        let id = item.identity();
        match self.elements.get_mut(&id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSnapshot")
            .field("roots", &self.roots)
            .field("len", &self.nodes.len())
            .field("duplicates", &self.duplicates)
            .finish()
    }
}
