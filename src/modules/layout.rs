// Page geometry for hit testing.
// The list is a vertical stack: page chrome, then each window group (optional
// header, then rows with a bottom margin), then the footer.

use crate::modules::render_tree::{NodeHandle, RenderTree};
use crate::settings::Settings;
use crate::state::WindowId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub width: f64,
    /// Where the first window group starts (below header and bookmarks bar).
    pub content_top: f64,
    pub window_header_height: f64,
    pub row_height: f64,
    pub row_margin: f64,
    pub footer_height: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            width: 960.0,
            content_top: 16.0,
            window_header_height: 40.0,
            row_height: 56.0,
            row_margin: 8.0,
            footer_height: 48.0,
        }
    }
}

impl LayoutMetrics {
    const PAGE_HEADER_HEIGHT: f64 = 64.0;
    const BOOKMARKS_BAR_HEIGHT: f64 = 32.0;

    pub fn for_settings(settings: &Settings) -> Self {
        let mut metrics = Self::default();
        if settings.show_page_header {
            metrics.content_top += Self::PAGE_HEADER_HEIGHT;
        }
        if settings.show_bookmarks {
            metrics.content_top += Self::BOOKMARKS_BAR_HEIGHT;
        }
        metrics
    }
}

/// What sits under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Header, bookmarks bar or anything else above the list.
    PageChrome,
    WindowHeader { window_id: WindowId },
    /// Bare window frame, i.e. the margin between rows.
    WindowFrame { window_id: WindowId },
    /// Content inside a row; the row is the element's parent.
    Row { row: NodeHandle },
    Footer,
    Body,
}

pub trait HitTest {
    fn element_from_point(&self, x: f64, y: f64) -> Hit;
    fn row_margin(&self) -> f64;
    fn row_height(&self) -> f64;
}

pub struct ListLayout<'a> {
    tree: &'a RenderTree,
    metrics: LayoutMetrics,
}

impl<'a> ListLayout<'a> {
    pub fn new(tree: &'a RenderTree, metrics: LayoutMetrics) -> Self {
        Self { tree, metrics }
    }

    /// Vertical bands in page order.
    fn bands(&self) -> Vec<(f64, f64, Hit)> {
        let m = &self.metrics;
        let mut bands = Vec::new();
        let mut y = m.content_top;

        for group in self.tree.groups() {
            let window_id = group.window_id;
            if group.framed {
                bands.push((y, y + m.window_header_height, Hit::WindowHeader { window_id }));
                y += m.window_header_height;
            }
            for handle in group.children() {
                // hidden rows are not displayed
                if self.tree.row(*handle).map_or(true, |r| r.hidden) {
                    continue;
                }
                bands.push((y, y + m.row_height, Hit::Row { row: *handle }));
                bands.push((
                    y + m.row_height,
                    y + m.row_height + m.row_margin,
                    Hit::WindowFrame { window_id },
                ));
                y += m.row_height + m.row_margin;
            }
        }
        bands.push((y, y + m.footer_height, Hit::Footer));
        bands
    }

    /// Top edge of a row, if displayed.
    pub fn row_top(&self, handle: NodeHandle) -> Option<f64> {
        self.bands().into_iter().find_map(|(top, _, hit)| match hit {
            Hit::Row { row } if row == handle => Some(top),
            _ => None,
        })
    }
}

impl HitTest for ListLayout<'_> {
    fn element_from_point(&self, x: f64, y: f64) -> Hit {
        if x < 0.0 || x >= self.metrics.width {
            return Hit::Body;
        }
        if y < self.metrics.content_top {
            return Hit::PageChrome;
        }
        self.bands()
            .into_iter()
            .find(|(top, bottom, _)| y >= *top && y < *bottom)
            .map_or(Hit::Body, |(_, _, hit)| hit)
    }

    fn row_margin(&self) -> f64 {
        self.metrics.row_margin
    }

    fn row_height(&self) -> f64 {
        self.metrics.row_height
    }
}
