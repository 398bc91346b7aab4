// src/services/tree.rs

//! Reply-tree assembly.
//!
//! Texts only store a pointer to their parent, so a tree is rebuilt by
//! walking downwards: one `list_children` call per expanded node. The cost
//! is O(number of descendants) store reads; fetching a whole subtree in a
//! single query would need an ancestor path or closure table, which the
//! schema does not have.

use std::vec::IntoIter;

use crate::{
    models::text::{Text, TextNode},
    store::{StoreError, TextStore},
};

/// A node whose replies are still being expanded.
struct Frame {
    node: TextNode,
    pending: IntoIter<Text>,
}

/// Fills `node.comments` with its full reply tree.
///
/// Children are visited depth-first in ascending id order and each one is
/// placed one level below its parent. A node without replies comes back
/// with an empty `comments` list. The walk keeps its own stack of partly
/// built nodes, so chain depth is limited by memory, not the call stack.
pub async fn expand(store: &dyn TextStore, mut root: TextNode) -> Result<TextNode, StoreError> {
    let mut root_pending = load_children(store, &root).await?;
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let (pending, depth) = match stack.last_mut() {
            Some(frame) => (&mut frame.pending, frame.node.comment_depth),
            None => (&mut root_pending, root.comment_depth),
        };

        match pending.next() {
            Some(child) => {
                let node = TextNode::from_text(child, depth + 1);
                let pending = load_children(store, &node).await?;
                stack.push(Frame { node, pending });
            }
            // Every reply of the top node is built; attach it to its parent.
            None => match stack.pop() {
                Some(done) => match stack.last_mut() {
                    Some(parent) => parent.node.comments.push(done.node),
                    None => root.comments.push(done.node),
                },
                None => return Ok(root),
            },
        }
    }
}

async fn load_children(store: &dyn TextStore, node: &TextNode) -> Result<IntoIter<Text>, StoreError> {
    let children = store.list_children(node.id).await?;
    tracing::debug!(
        id = node.id,
        depth = node.comment_depth,
        children = children.len(),
        "Expanding text"
    );
    Ok(children.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::text::{NO_PARENT, NewText, Text, TextResponse};
    use crate::store::{SqliteTextStore, sqlite::test_store};

    async fn insert(store: &SqliteTextStore, parent_id: i64) -> Text {
        let new_text = NewText::new(parent_id, Some("tester"), "body").unwrap();
        store.create(&new_text).await.unwrap()
    }

    async fn expand_from(store: &SqliteTextStore, id: i64) -> TextNode {
        let root = store.get_by_id(id).await.unwrap().unwrap();
        expand(store, TextNode::from_text(root, 0)).await.unwrap()
    }

    /// Pre-order list of (id, depth).
    fn flatten(node: &TextNode, out: &mut Vec<(i64, u32)>) {
        out.push((node.id, node.comment_depth));
        for child in &node.comments {
            flatten(child, out);
        }
    }

    #[tokio::test]
    async fn leaf_expands_to_empty_comments() {
        let store = test_store().await;
        let root = insert(&store, NO_PARENT).await;

        let node = expand_from(&store, root.id).await;
        assert_eq!(node.id, root.id);
        assert_eq!(node.comment_depth, 0);
        assert!(node.comments.is_empty());
    }

    #[tokio::test]
    async fn chain_depths_count_edges_from_root() {
        let store = test_store().await;
        let root = insert(&store, NO_PARENT).await;
        let child = insert(&store, root.id).await;
        let grandchild = insert(&store, child.id).await;

        let node = expand_from(&store, root.id).await;
        let mut order = Vec::new();
        flatten(&node, &mut order);
        assert_eq!(order, vec![(root.id, 0), (child.id, 1), (grandchild.id, 2)]);

        // Expanding from the middle restarts the depth count.
        let node = expand_from(&store, child.id).await;
        let mut order = Vec::new();
        flatten(&node, &mut order);
        assert_eq!(order, vec![(child.id, 0), (grandchild.id, 1)]);
    }

    #[tokio::test]
    async fn siblings_are_ordered_by_id_in_pre_order() {
        let store = test_store().await;
        let root = insert(&store, NO_PARENT).await;
        let a = insert(&store, root.id).await;
        let b = insert(&store, root.id).await;
        // Replies created after `b` still nest under `a`.
        let a1 = insert(&store, a.id).await;
        let b1 = insert(&store, b.id).await;
        let a2 = insert(&store, a.id).await;
        let a1x = insert(&store, a1.id).await;

        let node = expand_from(&store, root.id).await;
        let mut order = Vec::new();
        flatten(&node, &mut order);
        assert_eq!(
            order,
            vec![
                (root.id, 0),
                (a.id, 1),
                (a1.id, 2),
                (a1x.id, 3),
                (a2.id, 2),
                (b.id, 1),
                (b1.id, 2),
            ]
        );
        assert!(node.comments.iter().all(|c| c.parent_id == root.id));
    }

    #[tokio::test]
    async fn repeated_expansion_is_identical() {
        let store = test_store().await;
        let root = insert(&store, NO_PARENT).await;
        for _ in 0..3 {
            let child = insert(&store, root.id).await;
            insert(&store, child.id).await;
        }

        let first = expand_from(&store, root.id).await;
        let second = expand_from(&store, root.id).await;
        assert_eq!(first, second);
    }

    /// Same stack size tokio gives its worker threads.
    const WORKER_STACK: usize = 2 * 1024 * 1024;

    #[test]
    fn deep_chain_expands_on_worker_sized_stack() {
        const DEPTH: u32 = 5000;

        let worker = std::thread::Builder::new()
            .stack_size(WORKER_STACK)
            .spawn(|| {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();

                runtime.block_on(async {
                    let store = test_store().await;
                    let root = insert(&store, NO_PARENT).await;
                    let mut last = root.id;
                    for _ in 0..DEPTH {
                        last = insert(&store, last).await.id;
                    }

                    let tree = expand_from(&store, root.id).await;

                    let mut node = &tree;
                    let mut depth = 0;
                    while let Some(child) = node.comments.first() {
                        assert_eq!(node.comments.len(), 1);
                        depth += 1;
                        assert_eq!(child.comment_depth, depth);
                        assert_eq!(child.parent_id, node.id);
                        node = child;
                    }
                    assert_eq!(depth, DEPTH);
                    assert_eq!(node.id, last);

                    let response = TextResponse::from(tree);
                    let json = serde_json::to_string(&response).unwrap();
                    assert!(json.starts_with(&format!("{{\"id\":{},", root.id)));
                    assert!(json.ends_with(&"]}".repeat(DEPTH as usize + 1)));
                });
            })
            .unwrap();

        worker.join().unwrap();
    }
}
