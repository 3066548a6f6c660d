// Replay host: drives a page against the in-memory browser from a JSON script.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::browser::{BookmarkNode, MoveProperties, TabSubsystem};
use crate::errors::ScenarioError;
use crate::modules::layout::HitTest;
use crate::modules::memory_browser::InMemoryBrowser;
use crate::modules::render_tree::NodeHandle;
use crate::modules::options;
use crate::modules::router::{Dispatch, PageEvent, TabChange};
use crate::page::{NewTabPage, RowAction};
use crate::settings::{MemorySettingsStore, Settings, SettingsStore};
use crate::state::{TabEntry, TabId, WindowId};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub current_window: Option<WindowId>,
    /// Tab hosting the page.
    #[serde(default)]
    pub page_tab: Option<TabId>,
    /// Initial tabs; order within a window sets their index.
    pub tabs: Vec<TabEntry>,
    /// Bookmark folder id -> children.
    #[serde(default)]
    pub bookmarks: HashMap<String, Vec<BookmarkNode>>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    /// Click a row button.
    Row { tab_id: TabId, action: RowAction },
    /// Drag a row and drop it over another row, or past the end of the list.
    Drag { tab_id: TabId, onto_tab_id: Option<TabId> },
    /// Deliver a raw browser notification.
    Event { event: PageEvent },
    ExternalCreate { window_id: WindowId, index: usize, title: String, url: String },
    ExternalRemove { tab_id: TabId },
    ExternalUpdate { tab_id: TabId, change: TabChange },
    ExternalMove { tab_id: TabId, window_id: WindowId, index: usize },
    /// Click a checkbox on the options page.
    SetOption { checkbox: String, checked: bool },
    OpenBookmark { bookmark_id: String },
}

pub fn load(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn build_browser(scenario: &Scenario) -> InMemoryBrowser {
    let mut browser = InMemoryBrowser::new();
    for tab in &scenario.tabs {
        browser.push_tab(tab.clone());
    }
    for (folder_id, nodes) in &scenario.bookmarks {
        browser.add_bookmarks(folder_id, nodes.clone());
    }
    let current_window = scenario
        .current_window
        .or_else(|| scenario.tabs.first().map(|t| t.window_id));
    if let Some(window_id) = current_window {
        browser.set_current(window_id, scenario.page_tab);
    }
    browser
}

/// Runs every step, reloading the page whenever it asks to. Returns the final page.
pub fn run(scenario: &Scenario) -> Result<NewTabPage<InMemoryBrowser>, ScenarioError> {
    let mut store = MemorySettingsStore::new(scenario.settings.clone());
    let mut page = NewTabPage::load(build_browser(scenario), &store);

    for (n, step) in scenario.steps.iter().enumerate() {
        info!("[Scenario] Step {}: {:?}", n + 1, step);
        let mut outcome = apply_step(&mut page, &mut store, step)?;
        if outcome != Dispatch::ReloadPage {
            outcome = page.pump();
        }
        if outcome == Dispatch::ReloadPage {
            page = page.reload(&store);
        }
    }
    Ok(page)
}

fn row_of(page: &NewTabPage<InMemoryBrowser>, tab_id: TabId) -> Result<NodeHandle, ScenarioError> {
    page.row_for_tab(tab_id).ok_or(ScenarioError::UnknownTab(tab_id))
}

fn apply_step(
    page: &mut NewTabPage<InMemoryBrowser>,
    store: &mut MemorySettingsStore,
    step: &Step,
) -> Result<Dispatch, ScenarioError> {
    match step {
        Step::Row { tab_id, action } => {
            let row = row_of(page, *tab_id)?;
            if let Err(e) = page.row_action(row, *action) {
                warn!("[Scenario] {:?} on tab {} refused: {}", action, tab_id, e);
            }
        }
        Step::Drag { tab_id, onto_tab_id } => {
            let row = row_of(page, *tab_id)?;
            let onto = onto_tab_id.map(|id| row_of(page, id)).transpose()?;
            let (start_y, drop_y) = {
                let layout = page.layout();
                let start_y = layout.row_top(row).unwrap_or_default() + layout.row_height() / 2.0;
                // a few pixels into the target row once the margin probe is applied
                let drop_y = match onto {
                    Some(onto) => layout.row_top(onto).unwrap_or_default() - layout.row_margin() + 2.0,
                    None => {
                        let last = page.state().tree.groups().iter().rev().find_map(|g| {
                            g.children().iter().rev().find_map(|h| layout.row_top(*h))
                        });
                        last.unwrap_or_default() + layout.row_height() + 2.0
                    }
                };
                (start_y, drop_y)
            };
            page.drag_start(row, start_y);
            if let Err(e) = page.drop(1.0, drop_y) {
                warn!("[Scenario] Drop of tab {} aborted: {}", tab_id, e);
            }
        }
        Step::Event { event } => return Ok(page.handle(event)),
        Step::ExternalCreate { window_id, index, title, url } => {
            page.browser_mut().external_create(*window_id, *index, title, url);
        }
        Step::ExternalRemove { tab_id } => page.browser_mut().external_remove(*tab_id),
        Step::ExternalUpdate { tab_id, change } => page.browser_mut().external_update(*tab_id, change.clone()),
        Step::ExternalMove { tab_id, window_id, index } => page.browser_mut().move_tab(
            *tab_id,
            MoveProperties {
                index: *index,
                window_id: *window_id,
            },
        ),
        Step::SetOption { checkbox, checked } => {
            if let Err(e) = options::save_checkbox(store, checkbox, *checked) {
                warn!("[Scenario] {}", e);
            }
            if store.take_change() {
                return Ok(page.handle(&PageEvent::StorageChanged));
            }
        }
        Step::OpenBookmark { bookmark_id } => {
            page.open_bookmark(bookmark_id);
        }
    }
    Ok(Dispatch::Handled)
}
