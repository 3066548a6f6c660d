// Render/sync engine - keeps the render tree in step with the registry.
// Pure logic over AppState; the only outside calls go through TabSubsystem.

use log::debug;

use crate::browser::{QueryFilter, TabSubsystem};
use crate::modules::render_tree::{NodeHandle, TabRow};
use crate::state::{AppState, TabEntry, TabId, WindowId};

/// Favicon used by updated rows when the tab reports none.
pub const FALLBACK_FAVICON: &str = "chrome://favicon";

/// "`n` open tab[s]".
///
/// The suffix is dropped when `n % 10 == 1` unless `n == 11`. This is the
/// page's long-standing wording and is kept as is.
pub fn counter_text(n: usize) -> String {
    let plural = !(n % 10 == 1 && n != 11);
    format!("{} open tab{}", n, if plural { "s" } else { "" })
}

pub fn update_counter(state: &mut AppState, n: usize) {
    state.tabs_counter = n;
    state.counter_label = counter_text(n);
}

fn favicon_for_new_row(tab: &TabEntry) -> String {
    let derived = format!("chrome://favicon/size/64@1x/{}", tab.url);
    if tab.incognito {
        tab.favicon_url.clone().unwrap_or(derived)
    } else {
        derived
    }
}

fn row_for(tab: &TabEntry) -> TabRow {
    TabRow {
        tab_id: tab.id,
        index: tab.index,
        window_id: tab.window_id,
        favicon_src: favicon_for_new_row(tab),
        title: tab.title.clone(),
        url: tab.url.clone(),
        audible: tab.is_audible,
        secure: tab.is_secure(),
        hidden: tab.is_hidden(),
        discarded: tab.is_discarded,
    }
}

/// Builds the row for `tab` and places it in its window group: first when
/// `index == 0`, otherwise right after the row recorded at `index - 1`.
///
/// Does nothing when that row is missing (an ordering race that the next
/// index refresh repairs) or when the tab already has a row.
pub fn create_tab_node(state: &mut AppState, tab: &TabEntry) -> Option<NodeHandle> {
    if state.registry.contains(tab.id) {
        debug!("[Sync] Tab {} already has a row", tab.id);
        return None;
    }

    let framed = state.show_all_windows();
    state.tree.ensure_group(tab.window_id, framed);

    let after = match tab.index {
        0 => None,
        index => match state.tree.find_by_index(tab.window_id, index - 1) {
            Some(handle) => Some(handle),
            None => {
                debug!(
                    "[Sync] No row at index {} in window {}, skipping tab {}",
                    index - 1,
                    tab.window_id,
                    tab.id
                );
                return None;
            }
        },
    };

    let handle = state.tree.insert(tab.window_id, after, row_for(tab))?;
    state.registry.add(tab.id);
    let count = state.tabs_counter + 1;
    update_counter(state, count);
    Some(handle)
}

/// Carries the row of a tab being discarded over to the tab's new id.
fn substitute_discarded(state: &mut AppState, previous_id: TabId, tab: &TabEntry) {
    debug!("[Sync] Discarded tab {} came back as {}", previous_id, tab.id);
    state.registry.replace(previous_id, tab.id);
    if let Some(handle) = state.tree.handle_of(previous_id) {
        state.tree.rebind(handle, tab.id);
        if let Some(row) = state.tree.row_mut(handle) {
            row.index = tab.index;
        }
    }
}

fn needs_substitution(state: &AppState, tab: &TabEntry) -> Option<TabId> {
    let previous_id = state.discard.pending_id()?;
    (previous_id != tab.id && state.registry.contains(previous_id) && !state.registry.contains(tab.id))
        .then_some(previous_id)
}

/// Refreshes a row in place. Position is left alone.
/// Returns false when the tab has no row.
pub fn update_tab_node(state: &mut AppState, tab: &TabEntry) -> bool {
    if let Some(previous_id) = needs_substitution(state, tab) {
        substitute_discarded(state, previous_id, tab);
    }

    if !state.registry.contains(tab.id) {
        return false;
    }
    let Some(row) = state.tree.handle_of(tab.id).and_then(|h| state.tree.row_mut(h)) else {
        return false;
    };

    row.favicon_src = tab
        .favicon_url
        .clone()
        .unwrap_or_else(|| FALLBACK_FAVICON.to_string());
    row.title = tab.title.clone();
    row.url = tab.url.clone();
    row.audible = tab.is_audible;
    row.secure = tab.is_secure();
    row.hidden = tab.is_hidden();
    row.discarded = tab.is_discarded;
    true
}

/// Applies the result of a discard request and clears the pending state.
/// A failed discard (`tab` is None) leaves the row as it was.
pub fn complete_discard(state: &mut AppState, tab_id: TabId, tab: Option<&TabEntry>) {
    let Some(tab) = tab else {
        debug!("[Sync] Discard of tab {} failed", tab_id);
        state.discard.finish();
        return;
    };
    if let Some(previous_id) = needs_substitution(state, tab) {
        substitute_discarded(state, previous_id, tab);
    }
    if state.discard.finish().is_none() {
        debug!("[Sync] Discard result for tab {} without a pending discard", tab.id);
    }

    if tab.is_discarded {
        if let Some(row) = state.tree.handle_of(tab.id).and_then(|h| state.tree.row_mut(h)) {
            row.discarded = true;
        }
    }
}

/// Drops the row for `tab_id`, optionally asking the browser to close the tab.
/// Idempotent: a second call for the same id changes nothing locally.
pub fn remove_tab_node<B: TabSubsystem + ?Sized>(
    state: &mut AppState,
    browser: &mut B,
    tab_id: TabId,
    force_close: bool,
) -> bool {
    let tracked = state.registry.remove(tab_id);
    if tracked {
        let count = state.tabs_counter.saturating_sub(1);
        update_counter(state, count);
    }

    if force_close {
        browser.remove(tab_id);
    }

    if let Some(handle) = state.tree.handle_of(tab_id) {
        state.tree.remove(handle);
    }
    tracked
}

/// Rewrites the recorded index of every row in `window_id` from the browser's
/// current order. Returns the number of rows touched.
pub fn refresh_indexes<B: TabSubsystem + ?Sized>(state: &mut AppState, browser: &B, window_id: WindowId) -> usize {
    let tabs = browser.query(&QueryFilter::window(window_id));
    let mut touched = 0;
    for tab in tabs {
        let Some(row) = state.tree.handle_of(tab.id).and_then(|h| state.tree.row_mut(h)) else {
            continue;
        };
        if row.window_id == window_id {
            row.index = tab.index;
            touched += 1;
        }
    }
    touched
}

/// Relocates the row for a tab the browser moved within `window_id`.
///
/// The row lands before the row currently recorded at `to_index`, or before
/// the one after it when moving forward; at the end when there is none.
pub fn move_tab_node(
    state: &mut AppState,
    tab_id: TabId,
    window_id: WindowId,
    from_index: usize,
    to_index: usize,
) -> bool {
    let tree = &state.tree;
    let source = tree
        .handle_of(tab_id)
        .filter(|h| tree.row(*h).map(|r| r.window_id) == Some(window_id))
        .or_else(|| tree.find_by_index(window_id, from_index));
    let Some(source) = source else {
        debug!("[Sync] No row to move for tab {}", tab_id);
        return false;
    };

    let mut target = tree.find_by_index(window_id, to_index);
    if to_index > from_index {
        target = target.and_then(|h| tree.next_sibling(h));
    }
    if target == Some(source) {
        return false;
    }

    state.tree.move_before(source, window_id, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::memory_browser::InMemoryBrowser;
    use crate::settings::Settings;
    use rstest::rstest;

    fn create_test_tab(id: TabId, index: usize) -> TabEntry {
        TabEntry::new(id, 1, index, &format!("Tab {}", id), &format!("https://example.com/{}", id))
    }

    fn order(state: &AppState, window_id: WindowId) -> Vec<(TabId, usize)> {
        state.tree.rows_in(window_id).map(|(_, r)| (r.tab_id, r.index)).collect()
    }

    #[rstest]
    #[case(0, "0 open tabs")]
    #[case(1, "1 open tab")]
    #[case(2, "2 open tabs")]
    #[case(5, "5 open tabs")]
    #[case(11, "11 open tabs")]
    // n % 10 == 1 reads singular except 11, so 21 is "21 open tab"
    #[case(21, "21 open tab")]
    #[case(101, "101 open tab")]
    #[case(111, "111 open tab")]
    fn test_counter_text(#[case] n: usize, #[case] expected: &str) {
        assert_eq!(counter_text(n), expected);
    }

    #[test]
    fn test_create_places_rows_by_index() {
        let mut state = AppState::new(Settings::default(), Some(1));
        create_tab_node(&mut state, &create_test_tab(10, 0)).unwrap();
        create_tab_node(&mut state, &create_test_tab(11, 1)).unwrap();
        // lands after index 0, ahead of the stale index-1 row
        create_tab_node(&mut state, &create_test_tab(12, 1)).unwrap();

        assert_eq!(order(&state, 1), vec![(10, 0), (12, 1), (11, 1)]);
        assert_eq!(state.registry.len(), 3);
        assert_eq!(state.counter_label, "3 open tabs");
    }

    #[test]
    fn test_create_without_sibling_is_noop() {
        let mut state = AppState::new(Settings::default(), Some(1));
        assert!(create_tab_node(&mut state, &create_test_tab(10, 3)).is_none());
        assert!(state.registry.is_empty());
        assert!(state.tree.is_empty());
        assert_eq!(state.tabs_counter, 0);
    }

    #[test]
    fn test_create_marks_hidden_and_incognito_favicon() {
        let mut state = AppState::new(Settings::default(), Some(1));
        let mut tab = TabEntry::new(1, 1, 0, "New Tab", "chrome://newtab/");
        tab.incognito = true;
        tab.favicon_url = Some("data:icon".to_string());
        let handle = create_tab_node(&mut state, &tab).unwrap();

        let row = state.tree.row(handle).unwrap();
        assert!(row.hidden);
        assert_eq!(row.favicon_src, "data:icon");

        let plain = create_tab_node(&mut state, &create_test_tab(2, 1)).unwrap();
        assert_eq!(
            state.tree.row(plain).unwrap().favicon_src,
            "chrome://favicon/size/64@1x/https://example.com/2"
        );
    }

    #[test]
    fn test_update_refreshes_in_place() {
        let mut state = AppState::new(Settings::default(), Some(1));
        create_tab_node(&mut state, &create_test_tab(10, 0)).unwrap();
        create_tab_node(&mut state, &create_test_tab(11, 1)).unwrap();

        let mut tab = create_test_tab(10, 0);
        tab.title = "Renamed".to_string();
        tab.url = "http://plain.example/".to_string();
        tab.is_audible = true;
        assert!(update_tab_node(&mut state, &tab));

        let row = state.tree.row(state.tree.handle_of(10).unwrap()).unwrap();
        assert_eq!(row.title, "Renamed");
        assert_eq!(row.favicon_src, FALLBACK_FAVICON);
        assert!(row.audible);
        assert!(!row.secure);
        assert_eq!(order(&state, 1), vec![(10, 0), (11, 1)]);

        assert!(!update_tab_node(&mut state, &create_test_tab(99, 0)));
    }

    #[test]
    fn test_discard_round_trip() {
        let mut state = AppState::new(Settings::default(), Some(1));
        create_tab_node(&mut state, &create_test_tab(5, 0)).unwrap();
        let handle = state.tree.handle_of(5).unwrap();

        state.discard.begin(5).unwrap();
        let mut replaced = create_test_tab(9, 0);
        replaced.is_discarded = true;
        assert!(update_tab_node(&mut state, &replaced));
        complete_discard(&mut state, 5, Some(&replaced));

        assert_eq!(state.registry.ids(), &[9]);
        assert_eq!(state.tree.len(), 1);
        assert_eq!(state.tree.handle_of(9), Some(handle));
        assert!(state.tree.row(handle).unwrap().discarded);
        assert!(!state.discard.is_pending());
    }

    #[test]
    fn test_discard_result_without_update_still_substitutes() {
        let mut state = AppState::new(Settings::default(), Some(1));
        create_tab_node(&mut state, &create_test_tab(5, 0)).unwrap();
        state.discard.begin(5).unwrap();

        let mut replaced = create_test_tab(9, 0);
        replaced.is_discarded = true;
        complete_discard(&mut state, 5, Some(&replaced));

        assert_eq!(state.registry.ids(), &[9]);
        assert!(state.tree.row(state.tree.handle_of(9).unwrap()).unwrap().discarded);
    }

    #[test]
    fn test_failed_discard_clears_pending() {
        let mut state = AppState::new(Settings::default(), Some(1));
        create_tab_node(&mut state, &create_test_tab(5, 0)).unwrap();
        state.discard.begin(5).unwrap();

        complete_discard(&mut state, 5, None);
        assert!(!state.discard.is_pending());
        assert_eq!(state.registry.ids(), &[5]);
        assert!(!state.tree.row(state.tree.handle_of(5).unwrap()).unwrap().discarded);
        assert!(state.discard.begin(5).is_ok());
    }

    #[test]
    fn test_update_of_other_tracked_tab_during_discard_keeps_ids() {
        let mut state = AppState::new(Settings::default(), Some(1));
        create_tab_node(&mut state, &create_test_tab(5, 0)).unwrap();
        create_tab_node(&mut state, &create_test_tab(6, 1)).unwrap();
        state.discard.begin(5).unwrap();

        assert!(update_tab_node(&mut state, &create_test_tab(6, 1)));
        assert_eq!(state.registry.ids(), &[5, 6]);
        assert!(state.discard.is_pending());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut browser = InMemoryBrowser::new();
        let mut state = AppState::new(Settings::default(), Some(1));
        create_tab_node(&mut state, &create_test_tab(10, 0)).unwrap();
        create_tab_node(&mut state, &create_test_tab(11, 1)).unwrap();

        assert!(remove_tab_node(&mut state, &mut browser, 10, true));
        assert!(!remove_tab_node(&mut state, &mut browser, 10, false));
        assert_eq!(state.counter_label, "1 open tab");
        assert_eq!(state.registry.ids(), &[11]);
        assert!(state.tree.handle_of(10).is_none());
        assert_eq!(browser.commands().len(), 1);
    }

    #[test]
    fn test_move_reconciliation() {
        let mut browser = InMemoryBrowser::new();
        let ids: Vec<TabId> = (0..4)
            .map(|i| browser.open_tab(1, &format!("Tab {}", i), &format!("https://example.com/{}", i)))
            .collect();
        let mut state = AppState::new(Settings::default(), Some(1));
        for tab in browser.query(&QueryFilter::window(1)) {
            create_tab_node(&mut state, &tab).unwrap();
        }

        browser.move_tab(ids[3], crate::browser::MoveProperties { index: 1, window_id: 1 });
        assert!(move_tab_node(&mut state, ids[3], 1, 3, 1));
        refresh_indexes(&mut state, &browser, 1);

        assert_eq!(
            order(&state, 1),
            vec![(ids[0], 0), (ids[3], 1), (ids[1], 2), (ids[2], 3)]
        );
    }

    #[test]
    fn test_move_forward_and_to_end() {
        let mut state = AppState::new(Settings::default(), Some(1));
        for i in 0..4 {
            create_tab_node(&mut state, &create_test_tab(10 + i as TabId, i)).unwrap();
        }

        assert!(move_tab_node(&mut state, 10, 1, 0, 2));
        let ids: Vec<TabId> = order(&state, 1).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![11, 12, 10, 13]);

        assert!(move_tab_node(&mut state, 11, 1, 1, 3));
        let ids: Vec<TabId> = order(&state, 1).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![12, 10, 13, 11]);
    }
}
