// core/src/models/pagination.rs

use serde::{Deserialize, Serialize};

pub const MAX_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// A 1-based page request as it arrives from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
  #[serde(default = "first_page")]
  pub page: i64,
  #[serde(default)]
  pub limit: i64,
}

fn first_page() -> i64 {
  1
}

impl PageRequest {
  pub fn new(page: i64, limit: i64) -> Self {
    Self { page, limit }
  }

  /// Pages below 1 become 1, limits below 1 become `default_limit`, limits
  /// above [`MAX_PAGE_LIMIT`] are capped.
  pub fn normalized(self, default_limit: i64) -> Self {
    let page = self.page.max(1);
    let limit = if self.limit < 1 {
      default_limit
    } else {
      self.limit.min(MAX_PAGE_LIMIT)
    };
    Self { page, limit }
  }

  /// Rows to skip. Saturates instead of overflowing for absurd page numbers,
  /// which then simply yield an empty page.
  pub fn offset(&self) -> i64 {
    (self.page.max(1) - 1).saturating_mul(self.limit.max(0))
  }

  /// Slices an already-sorted in-memory collection.
  pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
    let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(self.limit).unwrap_or(0);
    items.iter().skip(start).take(take).cloned().collect()
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self {
      page: 1,
      limit: DEFAULT_PAGE_LIMIT,
    }
  }
}

/// One page of results plus the total row count across all pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: i64,
  pub page: i64,
  pub limit: i64,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total: i64, req: PageRequest) -> Self {
    Self {
      items,
      total,
      page: req.page,
      limit: req.limit,
    }
  }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items: self.items.into_iter().map(f).collect(),
      total: self.total,
      page: self.page,
      limit: self.limit,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalizes_out_of_range_values() {
    assert_eq!(PageRequest::new(0, 0).normalized(10), PageRequest::new(1, 10));
    assert_eq!(PageRequest::new(-3, 500).normalized(10), PageRequest::new(1, 100));
    assert_eq!(PageRequest::new(2, 0).normalized(20), PageRequest::new(2, 20));
    assert_eq!(PageRequest::new(4, 25).normalized(10), PageRequest::new(4, 25));
  }

  #[test]
  fn slices_by_offset() {
    let items: Vec<i32> = (1..=25).collect();
    let req = PageRequest::new(3, 10);
    assert_eq!(req.offset(), 20);
    assert_eq!(req.slice(&items), vec![21, 22, 23, 24, 25]);
    assert!(PageRequest::new(9, 10).slice(&items).is_empty());
  }

  #[test]
  fn huge_page_numbers_saturate_to_an_empty_page() {
    let items: Vec<i32> = (1..=25).collect();
    let req = PageRequest::new(i64::MAX, 10).normalized(10);
    assert_eq!(req.offset(), i64::MAX);
    assert!(req.slice(&items).is_empty());
    assert_eq!(PageRequest::new(i64::MIN, 10).offset(), 0);
  }
}
