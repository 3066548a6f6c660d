// TabList Library Entry Point
// This file exposes all modules so they can be imported by main.rs
// and tested independently.

pub mod browser;
pub mod errors;
pub mod logging;
pub mod settings;

// Shared state
pub mod state;

// Pure logic modules (no host imports)
pub mod modules;

// Page lifecycle and the replay host
pub mod page;
pub mod scenario;

pub use modules::router::{Dispatch, PageEvent};
pub use page::{NewTabPage, RowAction};
pub use settings::Settings;
pub use state::{TabEntry, TabId, WindowId};
