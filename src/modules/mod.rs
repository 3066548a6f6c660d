// Module exports for pure logic
pub mod registry;            // Which tab ids the page renders
pub mod render_tree;         // Rows and window groups
pub mod sync;                // Render/sync engine
pub mod router;              // Browser event admission + dispatch
pub mod layout;              // Geometry and hit testing
pub mod drag;                // Drag-and-drop reordering
pub mod bookmarks;           // Bookmarks menu
pub mod markup;              // HTML output
pub mod options;             // Options page checkboxes
pub mod memory_browser;      // In-memory browser for replay and tests
