//! Page-number pagination.
//!
//! Clients send `page_number` (1-based) and optionally `page_size`; the
//! response is a [`Page`] envelope whose `page_results` field holds the rows.

use serde::Serialize;

use crate::{Error, Result};

/// Page requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page_number: u64,
  pub page_size:   Option<u64>,
}

impl Default for PageRequest {
  fn default() -> Self { Self { page_number: 1, page_size: None } }
}

impl PageRequest {
  /// Read `page_number` and `page_size` out of the query parameters.
  pub fn parse<'a, I>(params: I) -> Result<Self>
  where
    I: IntoIterator<Item = (&'a str, &'a str)>,
  {
    let mut request = Self::default();
    for (key, raw) in params {
      match key {
        "page_number" => request.page_number = positive(key, raw)?,
        "page_size" => request.page_size = Some(positive(key, raw)?),
        _ => {}
      }
    }
    Ok(request)
  }
}

fn positive(key: &str, raw: &str) -> Result<u64> {
  raw
    .parse::<u64>()
    .ok()
    .filter(|n| *n > 0)
    .ok_or_else(|| Error::Parse(format!("{key} must be a positive integer, got {raw:?}")))
}

/// The `OFFSET` / `LIMIT` pair a store applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  pub offset: u64,
  pub limit:  u64,
}

/// Pagination settings for a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
  pub default_page_size: u64,
  pub max_page_size:     u64,
}

impl Default for Paginator {
  fn default() -> Self { Self { default_page_size: 20, max_page_size: 100 } }
}

impl Paginator {
  /// Effective page size for `request`, clamped to `max_page_size`.
  pub fn page_size(&self, request: &PageRequest) -> u64 {
    request
      .page_size
      .unwrap_or(self.default_page_size)
      .clamp(1, self.max_page_size.max(1))
  }

  pub fn window(&self, request: &PageRequest) -> Window {
    let limit = self.page_size(request);
    Window {
      offset: request.page_number.saturating_sub(1).saturating_mul(limit),
      limit,
    }
  }

  /// Wrap one page of rows in the response envelope.
  ///
  /// Fails with [`Error::InvalidPage`] when `page_number` lies beyond the last
  /// page; page 1 of an empty listing is always valid.
  pub fn page<T>(&self, request: &PageRequest, total_count: u64, page_results: Vec<T>) -> Result<Page<T>> {
    let page_size   = self.page_size(request);
    let page_count  = total_count.div_ceil(page_size).max(1);
    let page_number = request.page_number;

    if page_number > page_count {
      return Err(Error::InvalidPage);
    }

    Ok(Page {
      total_count,
      page_count,
      page_number,
      page_size,
      next: (page_number < page_count).then(|| page_number + 1),
      previous: (page_number > 1).then(|| page_number - 1),
      page_results,
    })
  }
}

/// Paginated response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
  pub total_count:  u64,
  pub page_count:   u64,
  pub page_number:  u64,
  pub page_size:    u64,
  pub next:         Option<u64>,
  pub previous:     Option<u64>,
  pub page_results: Vec<T>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn paginator() -> Paginator { Paginator { default_page_size: 2, max_page_size: 5 } }

  #[test]
  fn defaults_to_first_page() {
    let req = PageRequest::parse([("name", "x")]).unwrap();
    assert_eq!(req, PageRequest::default());
    assert_eq!(paginator().window(&req), Window { offset: 0, limit: 2 });
  }

  #[test]
  fn page_size_is_clamped() {
    let req = PageRequest::parse([("page_number", "3"), ("page_size", "50")]).unwrap();
    assert_eq!(paginator().window(&req), Window { offset: 10, limit: 5 });
  }

  #[test]
  fn rejects_zero_and_garbage() {
    assert!(PageRequest::parse([("page_number", "0")]).is_err());
    assert!(PageRequest::parse([("page_size", "-1")]).is_err());
    assert!(PageRequest::parse([("page_number", "two")]).is_err());
  }

  #[test]
  fn envelope_links() {
    let p   = paginator();
    let req = PageRequest { page_number: 2, page_size: None };
    let page = p.page(&req, 5, vec!['c', 'd']).unwrap();
    assert_eq!(page.page_count, 3);
    assert_eq!(page.next, Some(3));
    assert_eq!(page.previous, Some(1));
  }

  #[test]
  fn empty_listing_has_one_page() {
    let page = paginator().page::<u8>(&PageRequest::default(), 0, vec![]).unwrap();
    assert_eq!(page.page_count, 1);
    assert_eq!(page.next, None);
    assert_eq!(page.previous, None);
  }

  #[test]
  fn page_past_the_end_is_invalid() {
    let req = PageRequest { page_number: 4, page_size: None };
    let err = paginator().page::<u8>(&req, 5, vec![]).unwrap_err();
    assert!(matches!(err, Error::InvalidPage));
  }

  #[test]
  fn envelope_serialises_with_page_results() {
    let page = paginator().page(&PageRequest::default(), 1, vec!["only"]).unwrap();
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["page_results"], serde_json::json!(["only"]));
    assert!(json["next"].is_null());
  }
}
