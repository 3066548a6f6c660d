// Render tree - the page's visual tab list.
// Rows live in an arena and are addressed by NodeHandle; window groups hold
// the ordered handles. A tab id maps to at most one handle.

use std::collections::HashMap;

use crate::state::{TabId, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

/// One visual row. Mirrors the attributes the page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct TabRow {
    pub tab_id: TabId,
    /// Last index recorded for the tab; may be stale until the next refresh.
    pub index: usize,
    pub window_id: WindowId,
    pub favicon_src: String,
    pub title: String,
    pub url: String,
    pub audible: bool,
    pub secure: bool,
    pub hidden: bool,
    pub discarded: bool,
}

/// Container for the rows of one window. Created on first use, never destroyed.
#[derive(Debug, Clone)]
pub struct WindowGroup {
    pub window_id: WindowId,
    /// Framed groups carry a "Window (ID n)" header (all-windows mode).
    pub framed: bool,
    children: Vec<NodeHandle>,
}

impl WindowGroup {
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    pub fn header(&self) -> Option<String> {
        self.framed.then(|| format!("Window (ID {})", self.window_id))
    }
}

#[derive(Debug, Default)]
pub struct RenderTree {
    slots: Vec<Option<TabRow>>,
    free: Vec<usize>,
    by_tab: HashMap<TabId, NodeHandle>,
    groups: Vec<WindowGroup>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[WindowGroup] {
        &self.groups
    }

    pub fn group(&self, window_id: WindowId) -> Option<&WindowGroup> {
        self.groups.iter().find(|g| g.window_id == window_id)
    }

    /// Returns the group for `window_id`, creating it if needed.
    pub fn ensure_group(&mut self, window_id: WindowId, framed: bool) -> &mut WindowGroup {
        let pos = match self.groups.iter().position(|g| g.window_id == window_id) {
            Some(pos) => pos,
            None => {
                self.groups.push(WindowGroup {
                    window_id,
                    framed,
                    children: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[pos]
    }

    pub fn row(&self, handle: NodeHandle) -> Option<&TabRow> {
        self.slots.get(handle.0).and_then(|slot| slot.as_ref())
    }

    pub fn row_mut(&mut self, handle: NodeHandle) -> Option<&mut TabRow> {
        self.slots.get_mut(handle.0).and_then(|slot| slot.as_mut())
    }

    pub fn handle_of(&self, tab_id: TabId) -> Option<NodeHandle> {
        self.by_tab.get(&tab_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tab.is_empty()
    }

    /// Rows of a window in visual order.
    pub fn rows_in(&self, window_id: WindowId) -> impl Iterator<Item = (NodeHandle, &TabRow)> + '_ {
        self.group(window_id)
            .map(|g| g.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |h| self.row(*h).map(|row| (*h, row)))
    }

    /// First row in the window whose recorded index equals `index`.
    pub fn find_by_index(&self, window_id: WindowId, index: usize) -> Option<NodeHandle> {
        self.rows_in(window_id)
            .find(|(_, row)| row.index == index)
            .map(|(h, _)| h)
    }

    /// Places a new row in `window_id`'s group, first or right after `after`.
    /// Returns None when `after` is not a child of that group or the tab is already present.
    pub fn insert(&mut self, window_id: WindowId, after: Option<NodeHandle>, row: TabRow) -> Option<NodeHandle> {
        if self.by_tab.contains_key(&row.tab_id) {
            return None;
        }
        let group = self.groups.iter().position(|g| g.window_id == window_id)?;
        let pos = match after {
            None => 0,
            Some(after) => self.groups[group].children.iter().position(|h| *h == after)? + 1,
        };

        let tab_id = row.tab_id;
        let handle = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(row);
                NodeHandle(slot)
            }
            None => {
                self.slots.push(Some(row));
                NodeHandle(self.slots.len() - 1)
            }
        };
        self.groups[group].children.insert(pos, handle);
        self.by_tab.insert(tab_id, handle);
        Some(handle)
    }

    pub fn remove(&mut self, handle: NodeHandle) -> Option<TabRow> {
        let row = self.slots.get_mut(handle.0)?.take()?;
        self.detach(handle);
        self.by_tab.remove(&row.tab_id);
        self.free.push(handle.0);
        Some(row)
    }

    /// Moves an existing row into `window_id`'s group, before `before` or at the end.
    pub fn move_before(&mut self, handle: NodeHandle, window_id: WindowId, before: Option<NodeHandle>) -> bool {
        if self.row(handle).is_none() || before == Some(handle) {
            return false;
        }
        let Some(group) = self.groups.iter().position(|g| g.window_id == window_id) else {
            return false;
        };
        if let Some(before) = before {
            if !self.groups[group].children.contains(&before) {
                return false;
            }
        }

        self.detach(handle);
        let children = &mut self.groups[group].children;
        let pos = match before {
            Some(before) => children.iter().position(|h| *h == before).unwrap_or(children.len()),
            None => children.len(),
        };
        children.insert(pos, handle);
        if let Some(row) = self.row_mut(handle) {
            row.window_id = window_id;
        }
        true
    }

    /// Points a row at a different tab id, keeping its place in the list.
    pub fn rebind(&mut self, handle: NodeHandle, new_tab_id: TabId) -> bool {
        if self.by_tab.contains_key(&new_tab_id) {
            return false;
        }
        let Some(row) = self.row_mut(handle) else {
            return false;
        };
        let old_tab_id = std::mem::replace(&mut row.tab_id, new_tab_id);
        self.by_tab.remove(&old_tab_id);
        self.by_tab.insert(new_tab_id, handle);
        true
    }

    pub fn previous_sibling(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let (group, pos) = self.position_of(handle)?;
        pos.checked_sub(1).map(|p| self.groups[group].children[p])
    }

    pub fn next_sibling(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let (group, pos) = self.position_of(handle)?;
        self.groups[group].children.get(pos + 1).copied()
    }

    fn position_of(&self, handle: NodeHandle) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(g, group)| {
            group.children.iter().position(|h| *h == handle).map(|p| (g, p))
        })
    }

    fn detach(&mut self, handle: NodeHandle) {
        if let Some((group, pos)) = self.position_of(handle) {
            self.groups[group].children.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tab_id: TabId, index: usize) -> TabRow {
        TabRow {
            tab_id,
            index,
            window_id: 1,
            favicon_src: String::new(),
            title: format!("Tab {}", tab_id),
            url: "https://example.com/".to_string(),
            audible: false,
            secure: true,
            hidden: false,
            discarded: false,
        }
    }

    fn order(tree: &RenderTree, window_id: WindowId) -> Vec<TabId> {
        tree.rows_in(window_id).map(|(_, r)| r.tab_id).collect()
    }

    #[test]
    fn test_insert_first_and_after() {
        let mut tree = RenderTree::new();
        tree.ensure_group(1, false);
        let a = tree.insert(1, None, row(10, 0)).unwrap();
        let c = tree.insert(1, Some(a), row(12, 1)).unwrap();
        tree.insert(1, Some(a), row(11, 1)).unwrap();
        assert_eq!(order(&tree, 1), vec![10, 11, 12]);
        assert_eq!(tree.handle_of(12), Some(c));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_insert_requires_group_and_anchor() {
        let mut tree = RenderTree::new();
        assert!(tree.insert(1, None, row(10, 0)).is_none());

        tree.ensure_group(1, false);
        tree.ensure_group(2, false);
        let a = tree.insert(1, None, row(10, 0)).unwrap();
        // anchor belongs to another group
        assert!(tree.insert(2, Some(a), row(11, 1)).is_none());
        // duplicate tab id
        assert!(tree.insert(1, None, row(10, 0)).is_none());
    }

    #[test]
    fn test_remove_recycles_slot() {
        let mut tree = RenderTree::new();
        tree.ensure_group(1, false);
        let a = tree.insert(1, None, row(10, 0)).unwrap();
        assert_eq!(tree.remove(a).map(|r| r.tab_id), Some(10));
        assert!(tree.remove(a).is_none());
        assert!(tree.handle_of(10).is_none());

        let b = tree.insert(1, None, row(11, 0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(order(&tree, 1), vec![11]);
    }

    #[test]
    fn test_move_before_and_to_end() {
        let mut tree = RenderTree::new();
        tree.ensure_group(1, false);
        let mut prev = None;
        let mut handles = Vec::new();
        for i in 0..4 {
            let h = tree.insert(1, prev, row(10 + i as TabId, i)).unwrap();
            handles.push(h);
            prev = Some(h);
        }
        assert!(tree.move_before(handles[3], 1, Some(handles[1])));
        assert_eq!(order(&tree, 1), vec![10, 13, 11, 12]);

        assert!(tree.move_before(handles[0], 1, None));
        assert_eq!(order(&tree, 1), vec![13, 11, 12, 10]);

        assert!(!tree.move_before(handles[0], 1, Some(handles[0])));
    }

    #[test]
    fn test_rebind_keeps_position() {
        let mut tree = RenderTree::new();
        tree.ensure_group(1, false);
        let a = tree.insert(1, None, row(5, 0)).unwrap();
        tree.insert(1, Some(a), row(6, 1)).unwrap();

        assert!(tree.rebind(a, 9));
        assert_eq!(order(&tree, 1), vec![9, 6]);
        assert_eq!(tree.handle_of(9), Some(a));
        assert!(tree.handle_of(5).is_none());
        assert!(!tree.rebind(a, 6));
    }

    #[test]
    fn test_siblings() {
        let mut tree = RenderTree::new();
        tree.ensure_group(1, true);
        let a = tree.insert(1, None, row(1, 0)).unwrap();
        let b = tree.insert(1, Some(a), row(2, 1)).unwrap();
        assert_eq!(tree.previous_sibling(a), None);
        assert_eq!(tree.previous_sibling(b), Some(a));
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.next_sibling(b), None);
        assert_eq!(tree.group(1).unwrap().header().as_deref(), Some("Window (ID 1)"));
    }
}
