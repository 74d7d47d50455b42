//! Pagination window computation for the pager control.

/// One slot in a pagination control: a concrete page number or a gap
/// where page numbers were elided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Ten interior pages are kept visible around the current one.
const MAX_VISIBLE: i64 = 10;

/// Compute the page-number window to render around `current`.
///
/// Page 1 and page `total` are always present, a run of interior pages is
/// kept near `current`, and an [`PageItem::Ellipsis`] marks every gap.
/// Adjacent numbers are never separated by an ellipsis and no number
/// appears twice. `total == 0` yields an empty window; callers floor
/// their totals at 1.
pub fn page_window(current: u32, total: u32) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }

    let current = i64::from(current);
    let total = i64::from(total);

    let mut pages = vec![1i64];

    let mut start = (current - 4).max(2);
    let mut end = (current + 5).min(total - 1);

    // Near the beginning: pin the window to the front.
    if current <= 6 {
        start = 2;
        end = MAX_VISIBLE.min(total - 1);
    }

    // Near the end: pin the window to the back. Applied after the front
    // rule; for small totals the back rule wins.
    if current >= total - 6 {
        start = (total - 9).max(2);
        end = total - 1;
    }

    for page in start..=end {
        pages.push(page);
    }

    if total > 1 {
        pages.push(total);
    }

    let mut window = Vec::with_capacity(pages.len() + 2);
    for (i, &page) in pages.iter().enumerate() {
        if i > 0 && page != pages[i - 1] + 1 {
            window.push(PageItem::Ellipsis);
        }
        window.push(PageItem::Page(page as u32));
    }
    window
}
