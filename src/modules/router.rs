// Event router - admits browser notifications for the window(s) this page shows
// and hands them to the sync engine.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::browser::{QueryFilter, TabSubsystem, WindowSubsystem};
use crate::modules::sync;
use crate::state::{AppState, TabEntry, TabId, WindowId};

/// Fields of a tab that changed, as reported alongside an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabChange {
    pub status: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub audible: Option<bool>,
    pub discarded: Option<bool>,
    pub fav_icon_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveInfo {
    pub from_index: usize,
    pub to_index: usize,
    pub window_id: WindowId,
}

/// Attach notifications may arrive without a tab id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachInfo {
    #[serde(default)]
    pub tab_id: Option<TabId>,
    pub new_window_id: WindowId,
    pub new_position: usize,
}

/// Everything the page reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PageEvent {
    Created { tab: TabEntry },
    Removed { tab_id: TabId },
    Updated {
        tab_id: TabId,
        #[serde(default)]
        change: TabChange,
        tab: TabEntry,
    },
    Moved { tab_id: TabId, move_info: MoveInfo },
    Attached { attach_info: AttachInfo },
    Detached { tab_id: TabId },
    /// Result of a discard request. `tab` is None when the discard failed.
    DiscardCompleted {
        tab_id: TabId,
        #[serde(default)]
        tab: Option<TabEntry>,
    },
    /// The settings record changed.
    StorageChanged,
}

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    Ignored,
    /// The page's assumptions broke; rebuild it from scratch.
    ReloadPage,
}

/// Routes one event. Tabs outside the window of interest are ignored unless
/// all windows are shown.
pub fn dispatch<B>(state: &mut AppState, browser: &mut B, event: &PageEvent) -> Dispatch
where
    B: TabSubsystem + WindowSubsystem + ?Sized,
{
    match event {
        PageEvent::Created { tab } => on_created(state, browser, tab),
        PageEvent::Removed { tab_id } => on_removed(state, browser, *tab_id),
        PageEvent::Updated { tab_id, tab, .. } => on_updated(state, *tab_id, tab),
        PageEvent::Moved { tab_id, move_info } => on_moved(state, browser, *tab_id, move_info),
        PageEvent::Attached { attach_info } => on_attached(state, browser, attach_info),
        PageEvent::Detached { tab_id } => on_detached(state, browser, *tab_id),
        PageEvent::DiscardCompleted { tab_id, tab } => {
            debug!("[Router] global onDiscarded {}", tab_id);
            sync::complete_discard(state, *tab_id, tab.as_ref());
            Dispatch::Handled
        }
        PageEvent::StorageChanged => {
            debug!("[Router] settings changed, reloading");
            Dispatch::ReloadPage
        }
    }
}

fn is_tracked_or_all(state: &AppState, tab_id: TabId) -> bool {
    state.registry.contains(tab_id) || state.show_all_windows()
}

fn on_created<B: TabSubsystem + ?Sized>(state: &mut AppState, browser: &B, tab: &TabEntry) -> Dispatch {
    debug!("[Router] global onCreated {}", tab.id);
    if !state.is_window_of_interest(tab.window_id) {
        return Dispatch::Ignored;
    }
    debug!("[Router] local onCreated {}", tab.id);

    if sync::create_tab_node(state, tab).is_some() {
        sync::refresh_indexes(state, browser, tab.window_id);
    }
    Dispatch::Handled
}

/// Removes a tracked row and re-reads the indexes of the window it was in.
fn remove_and_refresh<B: TabSubsystem + ?Sized>(state: &mut AppState, browser: &mut B, tab_id: TabId) {
    let window_id = state
        .tree
        .handle_of(tab_id)
        .and_then(|h| state.tree.row(h))
        .map(|row| row.window_id)
        .or(state.current_window_id);

    sync::remove_tab_node(state, browser, tab_id, false);
    if let Some(window_id) = window_id {
        sync::refresh_indexes(state, browser, window_id);
    }
}

fn on_removed<B: TabSubsystem + ?Sized>(state: &mut AppState, browser: &mut B, tab_id: TabId) -> Dispatch {
    debug!("[Router] global onRemoved {}", tab_id);
    if !is_tracked_or_all(state, tab_id) {
        return Dispatch::Ignored;
    }
    debug!("[Router] local onRemoved {}", tab_id);

    remove_and_refresh(state, browser, tab_id);
    Dispatch::Handled
}

fn on_detached<B: TabSubsystem + ?Sized>(state: &mut AppState, browser: &mut B, tab_id: TabId) -> Dispatch {
    debug!("[Router] global onDetached {}", tab_id);
    if browser.current_tab() == Some(tab_id) {
        debug!("[Router] Detached current tab");
        return Dispatch::ReloadPage;
    }
    if !is_tracked_or_all(state, tab_id) {
        return Dispatch::Ignored;
    }
    debug!("[Router] local onDetached {}", tab_id);

    remove_and_refresh(state, browser, tab_id);
    Dispatch::Handled
}

fn on_attached<B>(state: &mut AppState, browser: &mut B, info: &AttachInfo) -> Dispatch
where
    B: TabSubsystem + WindowSubsystem + ?Sized,
{
    debug!("[Router] global onAttached {:?}", info.tab_id);
    state.current_window_id = browser.current_window();

    if state.current_window_id != Some(info.new_window_id) {
        if info.tab_id.is_none() {
            debug!("[Router] Tab from other window is attached, need to refresh layout");
            return Dispatch::ReloadPage;
        }
        if !state.show_all_windows() {
            return Dispatch::Ignored;
        }
    }
    let Some(tab_id) = info.tab_id else {
        return Dispatch::Ignored;
    };
    debug!("[Router] local onAttached {}", tab_id);

    let tab = browser
        .query(&QueryFilter::window(info.new_window_id))
        .into_iter()
        .find(|t| t.id == tab_id);
    let Some(tab) = tab else {
        debug!("[Router] Attached tab {} is gone from window {}", tab_id, info.new_window_id);
        return Dispatch::Ignored;
    };

    if sync::create_tab_node(state, &tab).is_some() {
        sync::refresh_indexes(state, browser, tab.window_id);
    }
    Dispatch::Handled
}

fn on_updated(state: &mut AppState, tab_id: TabId, tab: &TabEntry) -> Dispatch {
    debug!("[Router] global onUpdated {}", tab_id);
    if !state.is_window_of_interest(tab.window_id) {
        return Dispatch::Ignored;
    }
    debug!("[Router] local onUpdated {}", tab_id);

    sync::update_tab_node(state, tab);
    Dispatch::Handled
}

fn on_moved<B: TabSubsystem + ?Sized>(
    state: &mut AppState,
    browser: &B,
    tab_id: TabId,
    info: &MoveInfo,
) -> Dispatch {
    debug!("[Router] global onMoved {}", tab_id);
    if !state.is_window_of_interest(info.window_id) {
        return Dispatch::Ignored;
    }
    debug!("[Router] local onMoved {}", tab_id);

    sync::move_tab_node(state, tab_id, info.window_id, info.from_index, info.to_index);
    sync::refresh_indexes(state, browser, info.window_id);
    Dispatch::Handled
}
