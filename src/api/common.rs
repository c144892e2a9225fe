//! Common API utilities and shared types

use serde::Deserialize;

use crate::models::ListParams;

fn default_page() -> u32 {
    1
}

/// Pagination query parameters. The page size falls back to the
/// configured listing default when the client does not pass one.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    pub page_size: Option<u32>,
}

impl PaginationQuery {
    /// Resolve into list parameters using the configured default size
    pub fn params(&self, default_page_size: u32) -> ListParams {
        ListParams::new(self.page, self.page_size.unwrap_or(default_page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_uses_configured_default() {
        let query = PaginationQuery {
            page: 2,
            page_size: None,
        };
        let params = query.params(10);
        assert_eq!(params.page, 2);
        assert_eq!(params.per_page, 10);
    }

    #[test]
    fn test_params_prefers_explicit_size() {
        let query = PaginationQuery {
            page: 1,
            page_size: Some(25),
        };
        assert_eq!(query.params(10).per_page, 25);
    }
}
