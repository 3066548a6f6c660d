// Options page binding: one checkbox per exposed setting.
// allowDebugLogs has no checkbox; saving keeps whatever is stored for it.

use crate::errors::SettingsError;
use crate::settings::{Settings, SettingsStore};

pub const SHOW_BOOKMARKS: &str = "show-bookmarks";
pub const SHOW_ALL_WINDOWS: &str = "show-all-windows";
pub const SHOW_PAGE_HEADER: &str = "show-page-header";

pub const CHECKBOX_IDS: [&str; 3] = [SHOW_BOOKMARKS, SHOW_ALL_WINDOWS, SHOW_PAGE_HEADER];

/// Checked state of every checkbox, in page order.
pub fn checkbox_states(settings: &Settings) -> Vec<(&'static str, bool)> {
    vec![
        (SHOW_BOOKMARKS, settings.show_bookmarks),
        (SHOW_ALL_WINDOWS, settings.show_all_windows),
        (SHOW_PAGE_HEADER, settings.show_page_header),
    ]
}

pub fn apply_checkbox(settings: &mut Settings, checkbox_id: &str, checked: bool) -> Result<(), SettingsError> {
    let field = match checkbox_id {
        SHOW_BOOKMARKS => &mut settings.show_bookmarks,
        SHOW_ALL_WINDOWS => &mut settings.show_all_windows,
        SHOW_PAGE_HEADER => &mut settings.show_page_header,
        other => return Err(SettingsError::UnknownOption(other.to_string())),
    };
    *field = checked;
    Ok(())
}

/// Handles a checkbox click: writes the updated record back to the store.
pub fn save_checkbox<S: SettingsStore + ?Sized>(
    store: &mut S,
    checkbox_id: &str,
    checked: bool,
) -> Result<Settings, SettingsError> {
    let mut settings = store.get();
    apply_checkbox(&mut settings, checkbox_id, checked)?;
    store.set(&settings)?;
    log::info!("[Settings] {} set to {}", checkbox_id, checked);
    Ok(settings)
}
