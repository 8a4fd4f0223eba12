//! Offset pagination

/// Page size used when none is requested
pub const DEFAULT_LIMIT: u64 = 100;

/// Largest page size served
pub const MAX_LIMIT: u64 = 1000;

/// A window over an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Build a page from raw query values.
    ///
    /// Negative values are rejected; the limit is clamped to `1..=MAX_LIMIT`.
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> Result<Self, String> {
        let limit = match limit {
            Some(l) if l < 0 => return Err(format!("limit must be >= 0, got {}", l)),
            Some(l) => (l as u64).clamp(1, MAX_LIMIT),
            None => DEFAULT_LIMIT,
        };
        let offset = match offset {
            Some(o) if o < 0 => return Err(format!("offset must be >= 0, got {}", o)),
            Some(o) => o as u64,
            None => 0,
        };
        Ok(Self { limit, offset })
    }

    /// Apply the window to an in-memory iterator
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let page = PageRequest::from_query(None, None).unwrap();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn clamps_limit() {
        assert_eq!(PageRequest::from_query(Some(0), None).unwrap().limit, 1);
        assert_eq!(
            PageRequest::from_query(Some(50_000), None).unwrap().limit,
            MAX_LIMIT
        );
    }

    #[test]
    fn rejects_negative_values() {
        assert!(PageRequest::from_query(Some(-1), None).is_err());
        assert!(PageRequest::from_query(None, Some(-5)).is_err());
    }

    #[test]
    fn apply_windows_items() {
        let page = PageRequest {
            limit: 2,
            offset: 1,
        };
        assert_eq!(page.apply(vec![1, 2, 3, 4]), vec![2, 3]);
    }
}
