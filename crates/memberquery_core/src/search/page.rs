//! Page requests, sort orders and page results.
//!
//! # Invariants
//! - `Page::total_elements()` is never smaller than what the page itself
//!   proves exists (`offset + content.len()` for a non-empty short page).
//! - `Page::with_count` only calls the count closure when the total cannot
//!   be derived from the content.

use crate::search::predicate::Column;
use serde::Serialize;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Order {
    pub column: Column,
    pub direction: Direction,
}

/// Ordered list of sort terms. Unsorted means "by member id".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(column: Column, direction: Direction) -> Self {
        Self::unsorted().then(column, direction)
    }

    pub fn then(mut self, column: Column, direction: Direction) -> Self {
        self.orders.push(Order { column, direction });
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Renders ` ORDER BY ...`; `m.member_id ASC` is appended as tiebreaker
    /// unless the member id is already ordered on.
    pub fn order_by_clause(&self) -> String {
        let mut terms = self
            .orders
            .iter()
            .map(|order| format!("{} {}", order.column.sql(), order.direction.sql()))
            .collect::<Vec<_>>();

        if !self
            .orders
            .iter()
            .any(|order| order.column == Column::MemberId)
        {
            terms.push(format!("{} ASC", Column::MemberId.sql()));
        }

        format!(" ORDER BY {}", terms.join(", "))
    }
}

/// Zero-based page index plus page size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: Sort::unsorted(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Bounded slice of a result set plus total-count metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    content: Vec<T>,
    request: PageRequest,
    total: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total: u64) -> Self {
        let size = u64::from(request.size);
        let total = if !content.is_empty() && request.offset() + size > total {
            request.offset() + content.len() as u64
        } else {
            total
        };

        Self {
            content,
            request,
            total,
        }
    }

    /// Builds a page, calling `count` only when the content does not already
    /// determine the total.
    pub fn with_count<F, E>(content: Vec<T>, request: PageRequest, count: F) -> Result<Self, E>
    where
        F: FnOnce() -> Result<u64, E>,
    {
        let total = match derived_total(content.len(), &request) {
            Some(total) => total,
            None => count()?,
        };
        Ok(Self::new(content, request, total))
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    /// Zero-based page index.
    pub fn number(&self) -> u32 {
        self.request.page
    }

    /// Requested page size (not the number of rows returned).
    pub fn size(&self) -> u32 {
        self.request.size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_elements(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        if self.request.size == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.request.size))
    }

    pub fn is_first(&self) -> bool {
        self.request.page == 0
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.request.page) + 1 < self.total_pages()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
        }
    }
}

/// Total implied by the page content alone, if any.
///
/// - First page shorter than the page size: the content is everything.
/// - Later, non-empty page shorter than the page size: it is the last page.
pub(crate) fn derived_total(content_len: usize, request: &PageRequest) -> Option<u64> {
    let content_len = content_len as u64;
    let size = u64::from(request.size);

    if request.offset() == 0 {
        return (size > content_len).then_some(content_len);
    }

    if content_len != 0 && size > content_len {
        return Some(request.offset() + content_len);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{derived_total, Direction, Page, PageRequest, Sort};
    use crate::search::predicate::Column;
    use std::cell::Cell;

    #[test]
    fn offset_is_page_times_size() {
        assert_eq!(PageRequest::of(0, 3).offset(), 0);
        assert_eq!(PageRequest::of(2, 3).offset(), 6);
        assert_eq!(PageRequest::of(2, 3).next().offset(), 9);
    }

    #[test]
    fn page_metadata_reflects_total() {
        let page = Page::new(vec![1, 2, 3], PageRequest::of(0, 3), 4);
        assert_eq!(page.size(), 3);
        assert_eq!(page.number_of_elements(), 3);
        assert_eq!(page.total_elements(), 4);
        assert_eq!(page.total_pages(), 2);
        assert!(page.is_first());
        assert!(page.has_next());
        assert!(!page.is_last());
    }

    #[test]
    fn short_page_raises_stale_total() {
        let page = Page::new(vec![7], PageRequest::of(1, 3), 2);
        assert_eq!(page.total_elements(), 4);
        assert!(page.is_last());
    }

    #[test]
    fn empty_page_keeps_reported_total() {
        let page: Page<i32> = Page::new(Vec::new(), PageRequest::of(5, 3), 4);
        assert_eq!(page.total_elements(), 4);
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn derived_total_covers_complete_pages_only() {
        assert_eq!(derived_total(2, &PageRequest::of(0, 3)), Some(2));
        assert_eq!(derived_total(3, &PageRequest::of(0, 3)), None);
        assert_eq!(derived_total(1, &PageRequest::of(1, 3)), Some(4));
        assert_eq!(derived_total(3, &PageRequest::of(1, 3)), None);
        assert_eq!(derived_total(0, &PageRequest::of(1, 3)), None);
    }

    #[test]
    fn with_count_skips_count_for_short_first_page() {
        let calls = Cell::new(0);
        let page = Page::with_count(vec!["a", "b"], PageRequest::of(0, 5), || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(99)
        })
        .unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(page.total_elements(), 2);
    }

    #[test]
    fn with_count_calls_count_for_full_page() {
        let calls = Cell::new(0);
        let page = Page::with_count(vec!["a", "b"], PageRequest::of(0, 2), || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(10)
        })
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(page.total_elements(), 10);
        assert_eq!(page.total_pages(), 5);
    }

    #[test]
    fn with_count_propagates_count_error() {
        let result = Page::with_count(vec![1, 2], PageRequest::of(0, 2), || Err("boom"));
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::of(0, 2), 6).map(|v| v * 10);
        assert_eq!(page.content(), &[10, 20]);
        assert_eq!(page.total_elements(), 6);
    }

    #[test]
    fn order_by_appends_member_id_tiebreaker() {
        assert_eq!(Sort::unsorted().order_by_clause(), " ORDER BY m.member_id ASC");
        assert_eq!(
            Sort::by(Column::MemberAge, Direction::Desc).order_by_clause(),
            " ORDER BY m.age DESC, m.member_id ASC"
        );
        assert_eq!(
            Sort::by(Column::MemberId, Direction::Desc).order_by_clause(),
            " ORDER BY m.member_id DESC"
        );
    }
}
