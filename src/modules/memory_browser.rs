// In-memory browser used by the replay host and the tests.
// Requests mutate the model immediately; the confirming notifications are queued
// and only reach the page when the host drains them with take_events().

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::browser::{
    BookmarkNode, BookmarkSubsystem, BrowserCommand, MoveProperties, QueryFilter, TabSubsystem,
    WindowSubsystem,
};
use crate::modules::router::{AttachInfo, MoveInfo, PageEvent, TabChange};
use crate::state::{TabEntry, TabId, WindowId};

#[derive(Debug)]
pub struct InMemoryBrowser {
    windows: BTreeMap<WindowId, Vec<TabEntry>>,
    current_window: Option<WindowId>,
    current_tab: Option<TabId>,
    bookmarks: HashMap<String, Vec<BookmarkNode>>,
    next_tab_id: TabId,
    discard_supported: bool,
    events: VecDeque<PageEvent>,
    commands: Vec<BrowserCommand>,
}

impl Default for InMemoryBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBrowser {
    pub fn new() -> Self {
        Self {
            windows: BTreeMap::new(),
            current_window: None,
            current_tab: None,
            bookmarks: HashMap::new(),
            next_tab_id: 1,
            discard_supported: true,
            events: VecDeque::new(),
            commands: Vec::new(),
        }
    }

    /// Appends a tab to a window without notifying. Returns its id.
    pub fn open_tab(&mut self, window_id: WindowId, title: &str, url: &str) -> TabId {
        let tab = TabEntry::new(self.next_tab_id, window_id, 0, title, url);
        self.push_tab(tab)
    }

    /// Appends `tab` to its window without notifying, keeping its id.
    /// The index is assigned from the tab's position.
    pub fn push_tab(&mut self, tab: TabEntry) -> TabId {
        let id = tab.id;
        let window_id = tab.window_id;
        self.next_tab_id = self.next_tab_id.max(id + 1);
        if self.current_window.is_none() {
            self.current_window = Some(window_id);
        }
        self.windows.entry(window_id).or_default().push(tab);
        self.reindex(window_id);
        id
    }

    pub fn set_current(&mut self, window_id: WindowId, tab_id: Option<TabId>) {
        self.current_window = Some(window_id);
        self.current_tab = tab_id;
    }

    pub fn add_bookmarks(&mut self, folder_id: &str, nodes: Vec<BookmarkNode>) {
        self.bookmarks.insert(folder_id.to_string(), nodes);
    }

    pub fn set_discard_supported(&mut self, supported: bool) {
        self.discard_supported = supported;
    }

    /// Drains the queued notifications in the order they were produced.
    pub fn take_events(&mut self) -> Vec<PageEvent> {
        self.events.drain(..).collect()
    }

    pub fn commands(&self) -> &[BrowserCommand] {
        &self.commands
    }

    pub fn tab(&self, tab_id: TabId) -> Option<&TabEntry> {
        self.windows.values().flatten().find(|t| t.id == tab_id)
    }

    /// A tab opened by something other than the page.
    pub fn external_create(&mut self, window_id: WindowId, index: usize, title: &str, url: &str) -> TabId {
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        let tabs = self.windows.entry(window_id).or_default();
        let index = index.min(tabs.len());
        tabs.insert(index, TabEntry::new(id, window_id, index, title, url));
        self.reindex(window_id);

        if let Some(tab) = self.tab(id).cloned() {
            self.events.push_back(PageEvent::Created { tab });
        }
        id
    }

    /// A tab closed by something other than the page.
    pub fn external_remove(&mut self, tab_id: TabId) {
        if self.take_tab(tab_id).is_some() {
            self.events.push_back(PageEvent::Removed { tab_id });
        }
    }

    /// A tab navigating, retitling or starting to play sound.
    pub fn external_update(&mut self, tab_id: TabId, change: TabChange) {
        let Some(tab) = self.windows.values_mut().flatten().find(|t| t.id == tab_id) else {
            return;
        };
        if let Some(url) = &change.url {
            tab.url = url.clone();
        }
        if let Some(title) = &change.title {
            tab.title = title.clone();
        }
        if let Some(audible) = change.audible {
            tab.is_audible = audible;
        }
        if let Some(icon) = &change.fav_icon_url {
            tab.favicon_url = Some(icon.clone());
        }
        let tab = tab.clone();
        self.events.push_back(PageEvent::Updated { tab_id, change, tab });
    }

    fn locate(&self, tab_id: TabId) -> Option<(WindowId, usize)> {
        self.windows.iter().find_map(|(window_id, tabs)| {
            tabs.iter().position(|t| t.id == tab_id).map(|pos| (*window_id, pos))
        })
    }

    fn take_tab(&mut self, tab_id: TabId) -> Option<TabEntry> {
        let (window_id, pos) = self.locate(tab_id)?;
        let tab = self.windows.get_mut(&window_id)?.remove(pos);
        self.reindex(window_id);
        Some(tab)
    }

    fn reindex(&mut self, window_id: WindowId) {
        if let Some(tabs) = self.windows.get_mut(&window_id) {
            for (index, tab) in tabs.iter_mut().enumerate() {
                tab.index = index;
                tab.window_id = window_id;
            }
        }
    }
}

impl TabSubsystem for InMemoryBrowser {
    fn query(&self, filter: &QueryFilter) -> Vec<TabEntry> {
        self.windows
            .iter()
            .filter(|(window_id, _)| filter.window_id.map_or(true, |w| w == **window_id))
            .flat_map(|(_, tabs)| tabs.iter().cloned())
            .collect()
    }

    fn current_tab(&self) -> Option<TabId> {
        self.current_tab
    }

    fn move_tab(&mut self, tab_id: TabId, properties: MoveProperties) {
        self.commands.push(BrowserCommand::Move { tab_id, properties });
        let Some((from_window, from_index)) = self.locate(tab_id) else {
            return;
        };
        let Some(tab) = self.take_tab(tab_id) else {
            return;
        };

        let tabs = self.windows.entry(properties.window_id).or_default();
        let to_index = properties.index.min(tabs.len());
        tabs.insert(to_index, tab);
        self.reindex(properties.window_id);

        if from_window == properties.window_id {
            if from_index != to_index {
                self.events.push_back(PageEvent::Moved {
                    tab_id,
                    move_info: MoveInfo {
                        from_index,
                        to_index,
                        window_id: from_window,
                    },
                });
            }
        } else {
            self.events.push_back(PageEvent::Detached { tab_id });
            self.events.push_back(PageEvent::Attached {
                attach_info: AttachInfo {
                    tab_id: Some(tab_id),
                    new_window_id: properties.window_id,
                    new_position: to_index,
                },
            });
        }
    }

    fn select(&mut self, tab_id: TabId) {
        self.commands.push(BrowserCommand::Select { tab_id });
    }

    fn reload(&mut self, tab_id: TabId) {
        self.commands.push(BrowserCommand::Reload { tab_id });
    }

    fn discard(&mut self, tab_id: TabId) {
        self.commands.push(BrowserCommand::Discard { tab_id });
        let new_id = self.next_tab_id;
        let Some(tab) = self.windows.values_mut().flatten().find(|t| t.id == tab_id) else {
            self.events.push_back(PageEvent::DiscardCompleted { tab_id, tab: None });
            return;
        };
        self.next_tab_id += 1;
        tab.id = new_id;
        tab.is_discarded = true;
        tab.is_audible = false;
        let tab = tab.clone();

        let change = TabChange {
            discarded: Some(true),
            ..TabChange::default()
        };
        self.events.push_back(PageEvent::Updated {
            tab_id: new_id,
            change,
            tab: tab.clone(),
        });
        self.events.push_back(PageEvent::DiscardCompleted {
            tab_id,
            tab: Some(tab),
        });
    }

    fn supports_discard(&self) -> bool {
        self.discard_supported
    }

    fn remove(&mut self, tab_id: TabId) {
        self.commands.push(BrowserCommand::Remove { tab_id });
        if self.take_tab(tab_id).is_some() {
            self.events.push_back(PageEvent::Removed { tab_id });
        }
    }

    fn create(&mut self, url: &str, active: bool) {
        self.commands.push(BrowserCommand::Create {
            url: url.to_string(),
            active,
        });
        let Some(window_id) = self.current_window else {
            return;
        };
        let index = self.windows.get(&window_id).map_or(0, Vec::len);
        self.external_create(window_id, index, url, url);
    }
}

impl WindowSubsystem for InMemoryBrowser {
    fn current_window(&self) -> Option<WindowId> {
        self.current_window
    }
}

impl BookmarkSubsystem for InMemoryBrowser {
    fn get_children(&self, folder_id: &str) -> Vec<BookmarkNode> {
        self.bookmarks.get(folder_id).cloned().unwrap_or_default()
    }
}
