// Contracts of the browser subsystems the page talks to.
// The page only requests changes through these; it learns the outcome from later events.

use serde::{Deserialize, Serialize};

use crate::state::{TabEntry, TabId, WindowId};

/// Filter for `TabSubsystem::query`. `window_id: None` queries every window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub window_id: Option<WindowId>,
}

impl QueryFilter {
    pub fn all() -> Self {
        Self { window_id: None }
    }

    pub fn window(window_id: WindowId) -> Self {
        Self {
            window_id: Some(window_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveProperties {
    pub index: usize,
    pub window_id: WindowId,
}

/// External tab operations. Results of mutating calls arrive later as page events.
pub trait TabSubsystem {
    /// Tabs matching the filter, ordered by window then index.
    fn query(&self, filter: &QueryFilter) -> Vec<TabEntry>;
    /// The tab hosting the page itself, if any.
    fn current_tab(&self) -> Option<TabId>;
    fn move_tab(&mut self, tab_id: TabId, properties: MoveProperties);
    fn select(&mut self, tab_id: TabId);
    fn reload(&mut self, tab_id: TabId);
    /// The outcome, success or failure, is always delivered as
    /// `PageEvent::DiscardCompleted`.
    fn discard(&mut self, tab_id: TabId);
    fn supports_discard(&self) -> bool {
        true
    }
    fn remove(&mut self, tab_id: TabId);
    fn create(&mut self, url: &str, active: bool);
}

pub trait WindowSubsystem {
    fn current_window(&self) -> Option<WindowId>;
}

/// A bookmark folder or link. Folders have no url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl BookmarkNode {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

pub trait BookmarkSubsystem {
    fn get_children(&self, folder_id: &str) -> Vec<BookmarkNode>;
}

/// Everything the page needs from its host browser.
pub trait Browser: TabSubsystem + WindowSubsystem + BookmarkSubsystem {}

impl<T: TabSubsystem + WindowSubsystem + BookmarkSubsystem> Browser for T {}

/// A request the page issued, as recorded by test and replay browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum BrowserCommand {
    Move { tab_id: TabId, properties: MoveProperties },
    Select { tab_id: TabId },
    Reload { tab_id: TabId },
    Discard { tab_id: TabId },
    Remove { tab_id: TabId },
    Create { url: String, active: bool },
}
