//! Iterative assembly of owned nested trees.
//!
//! Flame graphs and call trees are owned recursive structures built over
//! graphs that may be tens of thousands of levels deep. Building them with
//! plain recursion would exhaust the stack, so the shape is planned in
//! preorder first and nodes are then finished bottom-up.

/// Build an owned tree rooted at `root` without recursion
///
/// * `expand(idx, ctx)` returns the children to emit under `idx`, each with
///   its own context, in display order.
/// * `finish(idx, ctx, children)` turns a node and its finished children
///   into the output value.
pub(crate) fn assemble<C, T, E, F>(root: usize, root_ctx: C, mut expand: E, mut finish: F) -> T
where
    E: FnMut(usize, &C) -> Vec<(usize, C)>,
    F: FnMut(usize, C, Vec<T>) -> T,
{
    struct Planned<C> {
        idx: usize,
        ctx: C,
        parent_slot: usize,
    }

    // Slot 0 belongs to the root; plan entry i uses slot i + 1.
    let mut plan: Vec<Planned<C>> = Vec::new();
    let mut stack: Vec<Planned<C>> = expand(root, &root_ctx)
        .into_iter()
        .rev()
        .map(|(idx, ctx)| Planned {
            idx,
            ctx,
            parent_slot: 0,
        })
        .collect();

    while let Some(item) = stack.pop() {
        let slot = plan.len() + 1;
        for (idx, ctx) in expand(item.idx, &item.ctx).into_iter().rev() {
            stack.push(Planned {
                idx,
                ctx,
                parent_slot: slot,
            });
        }
        plan.push(item);
    }

    let mut pending: Vec<Vec<T>> = (0..=plan.len()).map(|_| Vec::new()).collect();

    // Reverse preorder finishes every child before its parent, last sibling first.
    while let Some(item) = plan.pop() {
        let slot = plan.len() + 1;
        let mut children = std::mem::take(&mut pending[slot]);
        children.reverse();
        let built = finish(item.idx, item.ctx, children);
        pending[item.parent_slot].push(built);
    }

    let mut root_children = std::mem::take(&mut pending[0]);
    root_children.reverse();
    finish(root, root_ctx, root_children)
}
