// Bookmarks menu - built from the bookmark tree on every page load, never cached.

use log::debug;

use crate::browser::{BookmarkNode, BookmarkSubsystem};

/// Folder whose children form the top level of the menu (the bookmarks bar).
pub const ROOT_FOLDER_ID: &str = "1";

/// Folders nested deeper than this are left out of the menu.
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntryKind {
    /// `children` is empty for a folder with nothing in it.
    Folder { children: Vec<MenuEntry> },
    Link { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub id: String,
    pub title: Option<String>,
    /// Direct child of the root folder.
    pub top_level: bool,
    pub kind: MenuEntryKind,
}

impl MenuEntry {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "(no title)",
        }
    }

    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            MenuEntryKind::Link { url } => Some(url),
            MenuEntryKind::Folder { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkMenu {
    pub entries: Vec<MenuEntry>,
}

impl BookmarkMenu {
    fn find(&self, id: &str, folder: bool) -> Option<&MenuEntry> {
        fn walk<'a>(entries: &'a [MenuEntry], id: &str, folder: bool) -> Option<&'a MenuEntry> {
            entries.iter().find_map(|entry| {
                let is_folder = matches!(entry.kind, MenuEntryKind::Folder { .. });
                if entry.id == id && is_folder == folder {
                    return Some(entry);
                }
                match &entry.kind {
                    MenuEntryKind::Folder { children } => walk(children, id, folder),
                    MenuEntryKind::Link { .. } => None,
                }
            })
        }
        walk(&self.entries, id, folder)
    }

    /// Finds a link entry by bookmark id anywhere in the menu.
    pub fn find_link(&self, id: &str) -> Option<&MenuEntry> {
        self.find(id, false)
    }

    pub fn find_folder(&self, id: &str) -> Option<&MenuEntry> {
        self.find(id, true)
    }
}

pub fn load_bookmarks<S: BookmarkSubsystem + ?Sized>(source: &S) -> BookmarkMenu {
    let entries = collect_entries(source, ROOT_FOLDER_ID, 0);
    debug!("[Bookmarks] Loaded {} top-level entries", entries.len());
    BookmarkMenu { entries }
}

fn collect_entries<S: BookmarkSubsystem + ?Sized>(source: &S, folder_id: &str, depth: usize) -> Vec<MenuEntry> {
    if depth > MAX_DEPTH {
        debug!("[Bookmarks] Folder {} nested too deep, skipped", folder_id);
        return Vec::new();
    }
    let top_level = folder_id == ROOT_FOLDER_ID;
    source
        .get_children(folder_id)
        .into_iter()
        .map(|node| to_entry(source, node, top_level, depth))
        .collect()
}

fn to_entry<S: BookmarkSubsystem + ?Sized>(source: &S, node: BookmarkNode, top_level: bool, depth: usize) -> MenuEntry {
    let kind = match node.url {
        Some(url) => MenuEntryKind::Link { url },
        None => MenuEntryKind::Folder {
            children: collect_entries(source, &node.id, depth + 1),
        },
    };
    MenuEntry {
        id: node.id,
        title: node.title,
        top_level,
        kind,
    }
}

/// Inline style giving a link entry its favicon.
pub fn favicon_style(url: &str) -> String {
    format!(
        "background-image: -webkit-image-set(url(\"chrome://favicon/size/16@1x/{url}\") 1x, url(\"chrome://favicon/size/16@2x/{url}\") 2x);"
    )
}

/// Horizontal extent of a rendered element, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub width: f64,
}

/// Left offset that pulls a submenu back inside the viewport, or None when it fits.
///
/// Submenus of top-level entries shift by their width minus the parent's width
/// (they open below the parent); nested ones shift by their full width.
pub fn overflow_offset(submenu: Rect, parent: Rect, viewport_width: f64, parent_is_top_level: bool) -> Option<f64> {
    if submenu.left + submenu.width <= viewport_width {
        return None;
    }
    if parent_is_top_level {
        Some(-(submenu.width - parent.width))
    } else {
        Some(-submenu.width)
    }
}

/// Inline style for a shifted submenu, e.g. `left: -80px`.
pub fn submenu_style(offset: f64) -> String {
    format!("left: {}px", offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::memory_browser::InMemoryBrowser;
    use rstest::rstest;

    fn folder(id: &str, title: &str) -> BookmarkNode {
        BookmarkNode {
            id: id.to_string(),
            title: Some(title.to_string()),
            url: None,
        }
    }

    fn link(id: &str, title: Option<&str>, url: &str) -> BookmarkNode {
        BookmarkNode {
            id: id.to_string(),
            title: title.map(str::to_string),
            url: Some(url.to_string()),
        }
    }

    #[test]
    fn test_load_nested_tree() {
        let mut browser = InMemoryBrowser::new();
        browser.add_bookmarks("1", vec![folder("10", "Rust"), link("11", None, "https://news.example/")]);
        browser.add_bookmarks("10", vec![link("20", Some("Docs"), "https://docs.rs/"), folder("21", "Empty")]);

        let menu = load_bookmarks(&browser);
        assert_eq!(menu.entries.len(), 2);

        let rust = &menu.entries[0];
        assert!(rust.top_level);
        let MenuEntryKind::Folder { children } = &rust.kind else {
            panic!("expected folder");
        };
        assert_eq!(children.len(), 2);
        assert!(!children[0].top_level);
        assert_eq!(children[0].url(), Some("https://docs.rs/"));
        assert_eq!(children[1].kind, MenuEntryKind::Folder { children: vec![] });

        let untitled = &menu.entries[1];
        assert_eq!(untitled.display_title(), "(no title)");
        assert!(!untitled.has_title());

        assert_eq!(menu.find_link("20").map(|e| e.display_title()), Some("Docs"));
        assert!(menu.find_link("10").is_none());
        assert!(menu.find_folder("21").is_some_and(|e| !e.top_level));
        assert!(menu.find_folder("20").is_none());
    }

    #[test]
    fn test_empty_root() {
        let browser = InMemoryBrowser::new();
        assert!(load_bookmarks(&browser).entries.is_empty());
    }

    #[rstest]
    // fits
    #[case(100.0, 200.0, 1000.0, true, None)]
    // top-level: shift by the width difference
    #[case(900.0, 200.0, 1000.0, true, Some(-80.0))]
    // nested: shift by full width
    #[case(900.0, 200.0, 1000.0, false, Some(-200.0))]
    fn test_overflow_offset(
        #[case] left: f64,
        #[case] width: f64,
        #[case] viewport: f64,
        #[case] top_level: bool,
        #[case] expected: Option<f64>,
    ) {
        let submenu = Rect { left, width };
        let parent = Rect { left: 880.0, width: 120.0 };
        assert_eq!(overflow_offset(submenu, parent, viewport, top_level), expected);
    }

    #[test]
    fn test_submenu_style() {
        assert_eq!(submenu_style(-80.0), "left: -80px");
        assert_eq!(submenu_style(-72.5), "left: -72.5px");
    }

    #[test]
    fn test_favicon_style() {
        assert_eq!(
            favicon_style("https://a.example/"),
            "background-image: -webkit-image-set(url(\"chrome://favicon/size/16@1x/https://a.example/\") 1x, url(\"chrome://favicon/size/16@2x/https://a.example/\") 2x);"
        );
    }
}
