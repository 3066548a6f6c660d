// Shared state structs for the page.
// AppState is owned by the page and handed to the router and sync engine by &mut;
// everything runs on one event queue so nothing here is locked.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::modules::registry::{DiscardState, TabRegistry};
use crate::modules::render_tree::RenderTree;
use crate::settings::Settings;

pub type TabId = i64;
pub type WindowId = i64;

/// URL of the browser's new-tab placeholder. Rows for it are kept but hidden.
pub const NEW_TAB_URL: &str = "chrome://newtab/";

/// One open tab as reported by the browser.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabEntry {
    pub id: TabId,
    pub window_id: WindowId,
    /// Position within the window. Only the browser is authoritative for it.
    pub index: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "favIconUrl")]
    pub favicon_url: Option<String>,
    #[serde(default, rename = "audible")]
    pub is_audible: bool,
    #[serde(default, rename = "discarded")]
    pub is_discarded: bool,
    #[serde(default)]
    pub incognito: bool,
}

impl TabEntry {
    pub fn new(id: TabId, window_id: WindowId, index: usize, title: &str, url: &str) -> Self {
        Self {
            id,
            window_id,
            index,
            title: title.to_string(),
            url: url.to_string(),
            favicon_url: None,
            is_audible: false,
            is_discarded: false,
            incognito: false,
        }
    }

    /// True iff the tab shows the new-tab placeholder.
    pub fn is_hidden(&self) -> bool {
        if self.url == NEW_TAB_URL {
            return true;
        }
        match Url::parse(&self.url) {
            Ok(u) => {
                u.scheme() == "chrome"
                    && u.host_str() == Some("newtab")
                    && (u.path() == "/" || u.path().is_empty())
                    && u.query().is_none()
            }
            Err(_) => false,
        }
    }

    /// True for pages served over https (drives the lock indicator).
    pub fn is_secure(&self) -> bool {
        Url::parse(&self.url)
            .map(|u| u.scheme() == "https")
            .unwrap_or(false)
    }
}

/// State of one page lifetime. Rebuilt from scratch on every reload.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    /// Window hosting the page; re-resolved on structural events.
    pub current_window_id: Option<WindowId>,
    pub registry: TabRegistry,
    pub tree: RenderTree,
    pub tabs_counter: usize,
    pub counter_label: String,
    pub discard: DiscardState,
}

impl AppState {
    pub fn new(settings: Settings, current_window_id: Option<WindowId>) -> Self {
        Self {
            settings,
            current_window_id,
            registry: TabRegistry::new(),
            tree: RenderTree::new(),
            tabs_counter: 0,
            counter_label: String::new(),
            discard: DiscardState::Idle,
        }
    }

    pub fn show_all_windows(&self) -> bool {
        self.settings.show_all_windows
    }

    /// Whether events for `window_id` concern this page.
    pub fn is_window_of_interest(&self, window_id: WindowId) -> bool {
        self.settings.show_all_windows || self.current_window_id == Some(window_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("chrome://newtab/", true)]
    #[case("chrome://newtab", true)]
    #[case("chrome://newtab/?foo=1", false)]
    #[case("chrome://settings/", false)]
    #[case("https://example.com", false)]
    #[case("not a url", false)]
    fn test_hidden_tab_detection(#[case] url: &str, #[case] expected: bool) {
        let tab = TabEntry::new(1, 1, 0, "t", url);
        assert_eq!(tab.is_hidden(), expected);
    }

    #[rstest]
    #[case("https://example.com/", true)]
    #[case("http://example.com/", false)]
    #[case("chrome://newtab/", false)]
    fn test_secure_detection(#[case] url: &str, #[case] expected: bool) {
        let tab = TabEntry::new(1, 1, 0, "t", url);
        assert_eq!(tab.is_secure(), expected);
    }

    #[test]
    fn test_tab_entry_parses_browser_payload() {
        let json = r#"{
            "id": 42, "windowId": 3, "index": 2,
            "title": "Docs", "url": "https://docs.rs/",
            "favIconUrl": "https://docs.rs/favicon.ico",
            "audible": true, "discarded": false
        }"#;
        let tab: TabEntry = serde_json::from_str(json).unwrap();
        assert_eq!(tab.id, 42);
        assert_eq!(tab.window_id, 3);
        assert_eq!(tab.index, 2);
        assert!(tab.is_audible);
        assert!(!tab.incognito);
        assert_eq!(tab.favicon_url.as_deref(), Some("https://docs.rs/favicon.ico"));
    }

    #[test]
    fn test_window_of_interest() {
        let mut state = AppState::new(Settings::default(), Some(1));
        assert!(state.is_window_of_interest(1));
        assert!(!state.is_window_of_interest(2));

        state.settings.show_all_windows = true;
        assert!(state.is_window_of_interest(2));
    }
}
