use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Largest page any list operation will return.
pub const MAX_LIMIT: i64 = 100;

/// Query parameters accepted by the list endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    MAX_LIMIT
}

/// A validated pagination window. `limit` is always within `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    skip: i64,
    limit: i64,
}

impl Page {
    pub fn new(skip: i64, limit: i64) -> Result<Self, AppError> {
        if skip < 0 || limit <= 0 {
            return Err(AppError::BadRequest(
                "Skip and limit must be positive numbers.".into(),
            ));
        }
        Ok(Self {
            skip,
            limit: limit.min(MAX_LIMIT),
        })
    }

    pub fn skip(&self) -> i64 {
        self.skip
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

impl TryFrom<PageQuery> for Page {
    type Error = AppError;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        Page::new(query.skip, query.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: MAX_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(Page::new(0, 500).unwrap(), Page::new(0, 100).unwrap());
        assert_eq!(Page::new(3, 100).unwrap().limit(), 100);
        assert_eq!(Page::new(3, 7).unwrap().limit(), 7);
    }

    #[test]
    fn test_bounds_are_rejected() {
        assert!(matches!(Page::new(-1, 10), Err(AppError::BadRequest(_))));
        assert!(matches!(Page::new(0, 0), Err(AppError::BadRequest(_))));
        assert!(matches!(Page::new(0, -5), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_query_defaults() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(Page::try_from(query).unwrap(), Page::default());
    }
}
