use std::ops::Range;

/// Number of pages needed for `len` items. An empty collection still has one
/// (empty) page.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Clamps a requested 1-based page into `[1, total_pages]`.
pub fn clamp_page(len: usize, page_size: usize, requested: usize) -> usize {
    requested.clamp(1, total_pages(len, page_size))
}

/// Index range of the items shown on `page`, after clamping.
pub fn page_bounds(len: usize, page_size: usize, page: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let page = clamp_page(len, page_size, page);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(len);
    start.min(len)..end
}
