// The new tab page: owns one page lifetime of state and wires user input and
// browser events into the pure logic modules.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::browser::{Browser, QueryFilter};
use crate::errors::{DiscardError, DropError};
use crate::logging;
use crate::modules::bookmarks::{self, BookmarkMenu, Rect};
use crate::modules::drag::{DragController, MoveRequest};
use crate::modules::layout::{LayoutMetrics, ListLayout};
use crate::modules::markup;
use crate::modules::memory_browser::InMemoryBrowser;
use crate::modules::render_tree::NodeHandle;
use crate::modules::router::{self, Dispatch, PageEvent};
use crate::modules::sync;
use crate::settings::SettingsStore;
use crate::state::{AppState, TabId};

pub const EXTENSION_VERSION: &str = "1.0.9.1";

/// Buttons on a tab row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowAction {
    SwitchTo,
    Reload,
    Discard,
    Close,
}

pub struct NewTabPage<B: Browser> {
    browser: B,
    state: AppState,
    drag: DragController,
    bookmarks: Option<BookmarkMenu>,
    metrics: LayoutMetrics,
}

impl<B: Browser> NewTabPage<B> {
    /// Builds the page: resolves the window of interest, reads settings,
    /// loads bookmarks if enabled, then lists the tabs.
    pub fn load<S: SettingsStore + ?Sized>(browser: B, store: &S) -> Self {
        let settings = store.get();
        logging::apply_settings(&settings);
        debug!("[Page] just loaded");

        let current_window_id = browser.current_window();
        let bookmarks = settings
            .show_bookmarks
            .then(|| bookmarks::load_bookmarks(&browser));
        let metrics = LayoutMetrics::for_settings(&settings);

        let mut page = Self {
            browser,
            state: AppState::new(settings, current_window_id),
            drag: DragController::new(),
            bookmarks,
            metrics,
        };
        page.make_list_of_tabs();
        info!(
            "[Page] TabList v. {} showing {} tabs",
            EXTENSION_VERSION, page.state.tabs_counter
        );
        page
    }

    fn make_list_of_tabs(&mut self) {
        for tab in self.browser.query(&QueryFilter::all()) {
            if !self.state.is_window_of_interest(tab.window_id) {
                continue;
            }
            sync::create_tab_node(&mut self.state, &tab);
        }
        let count = self.state.tabs_counter;
        sync::update_counter(&mut self.state, count);
    }

    /// Throws away all page state and loads again from the browser.
    pub fn reload<S: SettingsStore + ?Sized>(self, store: &S) -> Self {
        info!("[Page] Reloading");
        Self::load(self.browser, store)
    }

    pub fn handle(&mut self, event: &PageEvent) -> Dispatch {
        router::dispatch(&mut self.state, &mut self.browser, event)
    }

    pub fn row_for_tab(&self, tab_id: TabId) -> Option<NodeHandle> {
        self.state.tree.handle_of(tab_id)
    }

    /// Runs a row button. The tab id is read from the row at click time.
    pub fn row_action(&mut self, row: NodeHandle, action: RowAction) -> Result<(), DiscardError> {
        let Some((tab_id, window_id)) = self.state.tree.row(row).map(|r| (r.tab_id, r.window_id)) else {
            debug!("[Page] Row action {:?} on a removed row", action);
            return Ok(());
        };

        match action {
            RowAction::SwitchTo => self.browser.select(tab_id),
            RowAction::Reload => self.browser.reload(tab_id),
            RowAction::Discard => self.discard_tab(tab_id)?,
            RowAction::Close => {
                sync::remove_tab_node(&mut self.state, &mut self.browser, tab_id, true);
                sync::refresh_indexes(&mut self.state, &self.browser, window_id);
            }
        }
        Ok(())
    }

    fn discard_tab(&mut self, tab_id: TabId) -> Result<(), DiscardError> {
        if !self.browser.supports_discard() {
            return Err(DiscardError::Unsupported);
        }
        self.state.discard.begin(tab_id)?;
        self.browser.discard(tab_id);
        Ok(())
    }

    pub fn layout(&self) -> ListLayout<'_> {
        ListLayout::new(&self.state.tree, self.metrics)
    }

    /// Starts dragging a row by its handle. Returns false for a removed row.
    pub fn drag_start(&mut self, row: NodeHandle, page_y: f64) -> bool {
        let Some(tab_id) = self.state.tree.row(row).map(|r| r.tab_id) else {
            return false;
        };
        self.drag.drag_start(tab_id, page_y);
        true
    }

    /// Resolves a drop and asks the browser to move the tab. The rows are
    /// reordered once the browser reports the move.
    pub fn drop(&mut self, x: f64, y: f64) -> Result<MoveRequest, DropError> {
        let layout = ListLayout::new(&self.state.tree, self.metrics);
        let request = self.drag.drop(&self.state.tree, &layout, x, y)?;
        self.browser.move_tab(request.tab_id, request.properties);
        Ok(request)
    }

    /// Opens a bookmark link in a new background tab.
    pub fn open_bookmark(&mut self, bookmark_id: &str) -> bool {
        let Some(url) = self
            .bookmarks
            .as_ref()
            .and_then(|menu| menu.find_link(bookmark_id))
            .and_then(|entry| entry.url())
            .map(str::to_string)
        else {
            debug!("[Bookmarks] No link with id {}", bookmark_id);
            return false;
        };
        self.browser.create(&url, false);
        true
    }

    /// Style that keeps an opened submenu of `folder_id` inside the viewport,
    /// measured after it is shown. None when it already fits.
    pub fn bookmark_submenu_style(
        &self,
        folder_id: &str,
        submenu: Rect,
        parent: Rect,
        viewport_width: f64,
    ) -> Option<String> {
        let folder = self.bookmarks.as_ref()?.find_folder(folder_id)?;
        let offset = bookmarks::overflow_offset(submenu, parent, viewport_width, folder.top_level)?;
        debug!("[Bookmarks] Submenu of {} shifted by {}px", folder_id, offset);
        Some(bookmarks::submenu_style(offset))
    }

    pub fn render_html(&self) -> String {
        markup::render_page(&self.state, self.bookmarks.as_ref(), EXTENSION_VERSION)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn bookmarks(&self) -> Option<&BookmarkMenu> {
        self.bookmarks.as_ref()
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    pub fn into_browser(self) -> B {
        self.browser
    }
}

impl NewTabPage<InMemoryBrowser> {
    /// Delivers every queued browser notification. Stops at the first one
    /// that needs a reload; the reload re-reads whatever was left.
    pub fn pump(&mut self) -> Dispatch {
        let mut outcome = Dispatch::Ignored;
        for event in self.browser.take_events() {
            match self.handle(&event) {
                Dispatch::ReloadPage => return Dispatch::ReloadPage,
                Dispatch::Handled => outcome = Dispatch::Handled,
                Dispatch::Ignored => {}
            }
        }
        outcome
    }
}
