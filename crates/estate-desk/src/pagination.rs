//! Page-number pagination with forgiving page parsing.
//!
//! A requested page is never an error: missing or malformed values land on the
//! first page and values past the end land on the last one.

use serde::Serialize;
use std::num::IntErrorKind;

/// Number of listings shown per catalog page.
pub const LISTINGS_PER_PAGE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(LISTINGS_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Total pages for `count` items. An empty result still has one (empty) page.
    pub fn num_pages(&self, count: usize) -> usize {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.per_page)
        }
    }

    /// Resolve a raw `page` parameter to a valid 1-based page number.
    pub fn page_number(&self, raw: Option<&str>, count: usize) -> usize {
        let last = self.num_pages(count);
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return 1;
        };

        match value.parse::<i64>() {
            Ok(number) if number < 1 => 1,
            Ok(number) => usize::try_from(number).map_or(last, |number| number.min(last)),
            Err(err) => match err.kind() {
                IntErrorKind::PosOverflow => last,
                _ => 1,
            },
        }
    }

    /// Slice `items` down to the requested page.
    pub fn get_page<T>(&self, items: Vec<T>, raw: Option<&str>) -> Page<T> {
        let count = items.len();
        let num_pages = self.num_pages(count);
        let number = self.page_number(raw, count);
        let offset = (number - 1) * self.per_page;

        let items = items
            .into_iter()
            .skip(offset)
            .take(self.per_page)
            .collect();

        Page {
            items,
            number,
            num_pages,
            count,
            per_page: self.per_page,
            has_previous: number > 1,
            has_next: number < num_pages,
            previous_page: (number > 1).then(|| number - 1),
            next_page: (number < num_pages).then(|| number + 1),
        }
    }
}

/// One page of results plus the metadata a pager control needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub per_page: usize,
    pub has_previous: bool,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<usize>,
}

impl<T> Page<T> {
    /// 1-based index of the first item on this page, or 0 when the page is empty.
    pub fn start_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }
}
