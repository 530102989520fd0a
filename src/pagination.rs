/// Page position for a paginated view. `page_count` is always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page_index: u32,
    page_size: u32,
    total_count: Option<u64>,
}

impl PageState {
    /// A zero `page_size` is bumped to 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 1,
            page_size: page_size.max(1),
            total_count: None,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// `None` until the backend reports an authoritative total.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// `max(1, ceil(total / page_size))`.
    pub fn page_count(&self) -> u32 {
        let total = self.total_count.unwrap_or(0);
        let pages = total.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Moves to page `n`. Returns false and changes nothing when `n` is out
    /// of `[1, page_count]` or already current.
    pub fn go_to_page(&mut self, n: u32) -> bool {
        if n < 1 || n > self.page_count() || n == self.page_index {
            return false;
        }
        self.page_index = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page_index.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.page_index.saturating_sub(1))
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    /// Back to page 1. Returns true if the index changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.page_index != 1;
        self.page_index = 1;
        changed
    }

    /// Record a new total (or clear it) and re-clamp the page index.
    /// Returns true if the index moved.
    pub fn set_total(&mut self, total: Option<u64>) -> bool {
        self.total_count = total;
        let clamped = self.page_index.clamp(1, self.page_count());
        let moved = clamped != self.page_index;
        self.page_index = clamped;
        moved
    }
}
