use serde::Serialize;

pub const DEFAULT_WINDOW_RADIUS: u32 = 2;

/// One slot in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageButton {
    Page(u32),
    Ellipsis,
}

/// Derived pagination state; recomputed on every render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageModel {
    pub current_page: u32,
    pub total_pages: u32,
    pub buttons: Vec<PageButton>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageModel {
    pub fn is_active(&self, button: &PageButton) -> bool {
        *button == PageButton::Page(self.current_page)
    }
}

/// Builds the bounded, ellipsis-compressed page bar
///
/// The window `[current - radius, current + radius]` is clipped to `1..=total_pages`. Page 1
/// and the last page are pinned at either end, with an ellipsis wherever a gap is left. The
/// provider cap on `total_pages` is the caller's job (see [`clamp_total_pages`]).
pub fn compute_page_model(current_page: u32, total_pages: u32, window_radius: u32) -> PageModel {
    let has_prev = current_page > 1;
    let has_next = current_page < total_pages;

    if total_pages <= 1 {
        return PageModel {
            current_page,
            total_pages,
            buttons: Vec::new(),
            has_prev,
            has_next,
        };
    }

    let start = current_page.saturating_sub(window_radius).max(1);
    let end = current_page.saturating_add(window_radius).min(total_pages);

    let mut buttons = Vec::new();

    if start > 1 {
        buttons.push(PageButton::Page(1));
        if start > 2 {
            buttons.push(PageButton::Ellipsis);
        }
    }

    buttons.extend((start..=end).map(PageButton::Page));

    if end < total_pages {
        if end < total_pages - 1 {
            buttons.push(PageButton::Ellipsis);
        }
        buttons.push(PageButton::Page(total_pages));
    }

    PageModel {
        current_page,
        total_pages,
        buttons,
        has_prev,
        has_next,
    }
}

/// Applies the provider's page ceiling
pub fn clamp_total_pages(total_pages: u32, max_total_pages: u32) -> u32 {
    total_pages.min(max_total_pages)
}
