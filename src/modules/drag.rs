// Drag-and-drop reordering.
// A drop only issues a move request; the row is relocated when the browser's
// moved event comes back through the router.

use log::debug;

use crate::browser::MoveProperties;
use crate::errors::DropError;
use crate::modules::layout::{Hit, HitTest};
use crate::modules::render_tree::RenderTree;
use crate::state::{TabId, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { tab_id: TabId, start_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub tab_id: TabId,
    pub properties: MoveProperties,
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn drag_start(&mut self, tab_id: TabId, page_y: f64) {
        debug!("[Drag] Start dragging tab {} at y={}", tab_id, page_y);
        self.state = DragState::Dragging {
            tab_id,
            start_y: page_y,
        };
    }

    /// Resolves a drop at (`x`, `y`) into a move request. The controller is
    /// idle again afterwards whatever the outcome.
    pub fn drop<H: HitTest + ?Sized>(
        &mut self,
        tree: &RenderTree,
        hit_test: &H,
        x: f64,
        y: f64,
    ) -> Result<MoveRequest, DropError> {
        let DragState::Dragging { tab_id, start_y } = std::mem::take(&mut self.state) else {
            return Err(DropError::NotDragging);
        };
        let moving_forward = y > start_y;
        let properties = drop_target(tree, hit_test, x, y, moving_forward)?;
        debug!(
            "[Drag] Drop tab {} at index {} of window {}",
            tab_id, properties.index, properties.window_id
        );
        Ok(MoveRequest { tab_id, properties })
    }
}

/// Window of the nearest ancestor carrying a window id. Only row content has one.
fn closest_window(tree: &RenderTree, hit: Hit) -> Option<WindowId> {
    match hit {
        Hit::Row { row } => tree.row(row).map(|r| r.window_id),
        _ => None,
    }
}

/// Logical position for a drop at (`x`, `y`).
///
/// Probes one row margin below the pointer. Over a row, the target is that
/// row's index, or its predecessor's when moving forward. Past the list (footer
/// or empty page) it probes one row height above the pointer and targets the
/// last row of the window found there.
pub fn drop_target<H: HitTest + ?Sized>(
    tree: &RenderTree,
    hit_test: &H,
    x: f64,
    y: f64,
    moving_forward: bool,
) -> Result<MoveProperties, DropError> {
    let hit = hit_test.element_from_point(x, y + hit_test.row_margin());

    if matches!(hit, Hit::Footer | Hit::Body) {
        let above = hit_test.element_from_point(x, y - hit_test.row_height());
        let window_id = closest_window(tree, above).ok_or(DropError::NoTargetWindow)?;
        let (_, last) = tree.rows_in(window_id).last().ok_or(DropError::NoTargetWindow)?;
        return Ok(MoveProperties {
            index: last.index,
            window_id,
        });
    }

    let Hit::Row { row } = hit else {
        return Err(DropError::UnparseableIndex);
    };
    let index_row = if moving_forward {
        tree.previous_sibling(row)
    } else {
        Some(row)
    };
    let index = index_row
        .and_then(|h| tree.row(h))
        .map(|r| r.index)
        .ok_or(DropError::UnparseableIndex)?;
    let window_id = closest_window(tree, hit).ok_or(DropError::NoTargetWindow)?;

    Ok(MoveProperties { index, window_id })
}
