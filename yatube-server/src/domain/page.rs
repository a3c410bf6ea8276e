use std::num::IntErrorKind;

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page math over a result set of known size.
///
/// Out-of-range page numbers are clamped to the last page instead of
/// producing an empty page, and a result set always has at least one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    page_size: u32,
}

impl Paginator {
    pub fn new(count: u64, page_size: u32) -> Self {
        Self {
            count,
            page_size: page_size.max(1),
        }
    }

    pub fn num_pages(&self) -> u32 {
        let pages = self.count.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Missing page → first page; anything outside `1..=num_pages` → last page.
    pub fn resolve(&self, requested: PageNumber) -> u32 {
        match requested {
            PageNumber::First => 1,
            PageNumber::Exact(n) if n >= 1 && n <= i64::from(self.num_pages()) => n as u32,
            PageNumber::Exact(_) => self.num_pages(),
        }
    }

    /// `(limit, offset)` of the given 1-based page.
    pub fn window(&self, number: u32) -> (i64, i64) {
        let limit = i64::from(self.page_size);
        let offset = i64::from(number.saturating_sub(1)) * limit;
        (limit, offset)
    }

    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        Page {
            items,
            number,
            num_pages,
            count: self.count,
            page_size: self.page_size,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

/// Page number as requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageNumber {
    #[default]
    First,
    Exact(i64),
}

impl PageNumber {
    /// Non-numeric input falls back to the first page; a number too large
    /// for `i64` is still a number and lands past the end.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return PageNumber::First;
        };
        match raw.trim().parse::<i64>() {
            Ok(n) => PageNumber::Exact(n),
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                PageNumber::Exact(i64::MAX)
            }
            Err(_) => PageNumber::First,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub count: u64,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
}
