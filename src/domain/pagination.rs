//! Page requests and paged results shared by every list operation.

/// Default number of items per page.
pub const DEFAULT_LIMIT: u32 = 20;

/// Upper bound on items per page.
pub const MAX_LIMIT: u32 = 100;

/// A validated, 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u32,
    /// Items per page, within `1..=MAX_LIMIT`.
    pub limit: u32,
}

impl PageRequest {
    /// Builds a page window, clamping `page` to at least 1 and `limit` to
    /// `1..=MAX_LIMIT`. Missing values take the defaults.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Applies this window to an already ordered iterator.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(skip)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    /// Items on the requested page.
    pub items: Vec<T>,
    /// Total matches across all pages.
    pub total: u64,
}

impl<T> Paged<T> {
    /// Converts the items, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(PageRequest::default(), PageRequest { page: 1, limit: 20 });
        assert_eq!(
            PageRequest::new(Some(0), Some(500)),
            PageRequest { page: 1, limit: 100 }
        );
        assert_eq!(PageRequest::new(Some(3), Some(0)).limit, 1);
    }

    #[test]
    fn offset_and_slice() {
        let page = PageRequest::new(Some(2), Some(3));
        assert_eq!(page.offset(), 3);
        assert_eq!(page.slice(1..=10), vec![4, 5, 6]);
        assert!(PageRequest::new(Some(5), Some(3)).slice(1..=10).is_empty());
    }
}
