use axum::http::{HeaderMap, HeaderValue, header::CONTENT_RANGE};
use serde::Serialize;

use crate::models::ControlParameters;

/// Which slice of the result the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Resolve `page`/`per_page`, falling back to page 1 and `default_per_page`.
    /// Zero values count as absent.
    #[must_use]
    pub fn from_control(control: &ControlParameters, default_per_page: u64) -> Self {
        Self {
            page: control.page.filter(|p| *p > 0).unwrap_or(1),
            per_page: control
                .per_page
                .filter(|p| *p > 0)
                .unwrap_or(default_per_page.max(1)),
        }
    }

    /// Zero-based page index, as sea-orm's paginator counts pages. Page 0 is
    /// treated as page 1.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.page.saturating_sub(1)
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.index().saturating_mul(self.per_page)
    }
}

/// A page of results with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            per_page: request.per_page,
            current_page: request.page,
            last_page: total.div_ceil(request.per_page.max(1)).max(1),
        }
    }

    /// `Content-Range` header describing this page.
    #[must_use]
    pub fn content_range(&self, resource_name: &str) -> HeaderMap {
        let offset = self.current_page.saturating_sub(1).saturating_mul(self.per_page);
        calculate_content_range(offset, self.data.len() as u64, self.total, resource_name)
    }

    /// Convert the items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            last_page: self.last_page,
        }
    }
}

/// A page of results without a total count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimplePage<T> {
    pub data: Vec<T>,
    pub per_page: u64,
    pub current_page: u64,
    pub has_more: bool,
}

fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build a `Content-Range: <resource> <first>-<last>/<total>` header.
///
/// Control characters in the resource name are dropped so the header value is
/// always valid.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    count: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let last = offset
        .saturating_add(count)
        .saturating_sub(1)
        .min(total_count.saturating_sub(1))
        .max(offset.min(total_count));
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {offset}-{last}/{total_count}");

    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&content_range)
        .unwrap_or_else(|_| HeaderValue::from_static("items 0-0/0"));
    headers.insert(CONTENT_RANGE, value);
    headers
}
