use std::any::Any;
use std::sync::Arc;

use listsync::{
    Identity, Item, ItemRef, OutlineOp, Snapshot, TreeNode, TreeSnapshot, content_eq, diff,
    plan_list, plan_outline,
};

#[derive(Debug, PartialEq)]
struct Todo {
    id: u32,
    title: &'static str,
}

impl Item for Todo {
    fn identity(&self) -> Identity {
        Identity::from(self.id)
    }

    fn content_equals(&self, other: &dyn Item) -> bool {
        content_eq(self, other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn todo(id: u32, title: &'static str) -> ItemRef {
    Arc::new(Todo { id, title })
}

fn main() {
    // Example: the raw sequence diff. "c" moves to the front; "b" goes away.
    let old = ["a", "b", "c", "d"];
    let new = ["c", "a", "d", "e"];
    let difference = diff(&old, &new);
    for change in difference.iter() {
        println!("change: {change:?}");
    }
    for m in difference.moves() {
        println!("move: {} {} -> {}", m.element, m.from, m.to);
    }
    assert_eq!(difference.apply_to(&old), new);

    // Example: plan a flat update. Content changes become rebinds, not remove + insert.
    let before = Snapshot::new([todo(1, "milk"), todo(2, "eggs"), todo(3, "bread")]);
    let after = Snapshot::new([todo(1, "milk"), todo(3, "rye bread"), todo(4, "jam")]);
    let plan = plan_list(&before, &after);
    println!(
        "list: rebind={:?} remove={:?} insert={:?}",
        plan.rebinds
            .iter()
            .filter_map(|r| {
                let todo = r.item.as_any().downcast_ref::<Todo>()?;
                Some((r.position, todo.title))
            })
            .collect::<Vec<_>>(),
        plan.removed,
        plan.inserted
    );

    // Example: plan a tree update. Only the level whose children changed is touched.
    let before = TreeSnapshot::new(&[TreeNode::with_children(
        todo(10, "groceries"),
        vec![TreeNode::leaf(todo(1, "milk")), TreeNode::leaf(todo(2, "eggs"))],
    )]);
    let after = TreeSnapshot::new(&[TreeNode::with_children(
        todo(10, "groceries"),
        vec![
            TreeNode::leaf(todo(1, "milk")),
            TreeNode::leaf(todo(2, "eggs")),
            TreeNode::leaf(todo(4, "jam")),
        ],
    )]);
    let plan = plan_outline(&before, &after);
    for op in &plan.ops {
        match op {
            OutlineOp::ReloadParent { parent } => println!("outline: reload {parent:?}"),
            OutlineOp::Remove { parent, offset } => {
                println!("outline: remove {parent:?}[{offset}]")
            }
            OutlineOp::Insert { parent, offset } => {
                println!("outline: insert {parent:?}[{offset}]")
            }
        }
    }
    println!("handles: {:?}", plan.handles);
}
