//! Route a host-side selection back to the original menu tree

use crate::menu::item::MenuItem;

/// A position in the original menu tree
#[derive(Debug, Clone, Copy)]
pub enum MenuNode<'a> {
    /// Synthetic root whose submenu is the top-level items
    Root(&'a [MenuItem]),
    Item(&'a MenuItem),
}

impl<'a> MenuNode<'a> {
    pub fn submenu(&self) -> Option<&'a [MenuItem]> {
        match *self {
            MenuNode::Root(items) => Some(items),
            MenuNode::Item(item) => item.submenu(),
        }
    }

    /// The addressed item, `None` for the synthetic root
    pub fn item(&self) -> Option<&'a MenuItem> {
        match *self {
            MenuNode::Root(_) => None,
            MenuNode::Item(item) => Some(item),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, MenuNode::Root(_))
    }

    pub fn has_action(&self) -> bool {
        self.item().is_some_and(MenuItem::has_action)
    }
}

/// Follow an index path from the synthetic root
///
/// Returns `None` as soon as an index is out of range or addresses a node
/// without a submenu. An empty path resolves to the root.
pub fn resolve_selection<'a>(items: &'a [MenuItem], path: &[usize]) -> Option<MenuNode<'a>> {
    let mut candidate = Some(MenuNode::Root(items));
    for &index in path {
        let submenu = candidate?.submenu()?;
        candidate = submenu.get(index).map(MenuNode::Item);
    }
    candidate
}

/// Resolve `path` and run the selected item's action
///
/// Returns whether an action ran. Unresolvable paths, the root, and items
/// without an action are no-ops.
pub fn invoke_selection(items: &[MenuItem], path: &[usize]) -> bool {
    let invoked = resolve_selection(items, path)
        .and_then(|node| node.item())
        .is_some_and(MenuItem::run_action);
    tracing::debug!(?path, invoked, "menu selection dispatched");
    invoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn() + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// `[A [A1 (f)], B (g)]`
    fn scenario() -> (Vec<MenuItem>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let f = Arc::new(AtomicUsize::new(0));
        let g = Arc::new(AtomicUsize::new(0));
        let tree = vec![
            MenuItem::builder("A")
                .submenu([MenuItem::builder("A1").action(counting(&f)).build()])
                .build(),
            MenuItem::builder("B").action(counting(&g)).build(),
        ];
        (tree, f, g)
    }

    #[test]
    fn test_resolve_valid_paths() {
        let (tree, _, _) = scenario();

        let a1 = resolve_selection(&tree, &[0, 0]).and_then(|n| n.item()).unwrap();
        assert_eq!(a1.id(), "A1");

        let a = resolve_selection(&tree, &[0]).and_then(|n| n.item()).unwrap();
        assert_eq!(a.id(), "A");

        let b = resolve_selection(&tree, &[1]).and_then(|n| n.item()).unwrap();
        assert_eq!(b.id(), "B");
    }

    #[test]
    fn test_resolve_out_of_range() {
        let (tree, _, _) = scenario();
        assert!(resolve_selection(&tree, &[5]).is_none());
        assert!(resolve_selection(&tree, &[0, 3]).is_none());
        // B has no submenu
        assert!(resolve_selection(&tree, &[1, 0]).is_none());
        // out of range before the last index
        assert!(resolve_selection(&tree, &[7, 0]).is_none());
    }

    #[test]
    fn test_resolve_empty_path_is_root() {
        let (tree, _, _) = scenario();
        let node = resolve_selection(&tree, &[]).unwrap();
        assert!(node.is_root());
        assert!(!node.has_action());
        assert_eq!(node.submenu().map(<[MenuItem]>::len), Some(2));
    }

    #[test]
    fn test_invoke_runs_only_selected_action() {
        let (tree, f, g) = scenario();

        assert!(invoke_selection(&tree, &[0, 0]));
        assert_eq!(f.load(Ordering::SeqCst), 1);
        assert_eq!(g.load(Ordering::SeqCst), 0);

        assert!(invoke_selection(&tree, &[1]));
        assert_eq!(g.load(Ordering::SeqCst), 1);

        assert!(!invoke_selection(&tree, &[5]));
        assert!(!invoke_selection(&tree, &[]));
        // submenu header without action
        assert!(!invoke_selection(&tree, &[0]));
        assert_eq!(f.load(Ordering::SeqCst), 1);
        assert_eq!(g.load(Ordering::SeqCst), 1);
    }
}
