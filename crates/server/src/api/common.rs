// Common DTOs and extractors for the public API
//
// These types are shared across multiple API endpoints.

use axum::extract::FromRequest;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;

/// JSON body extractor whose rejections render as a validation envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidJson<T>(pub T);

/// Liveness probe payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// "postgres" or "memory"
    pub storage: &'static str,
}

/// Response body for list endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_counts() {
        let list: ListResponse<u8> = vec![1, 2, 3].into();
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["items"].as_array().unwrap().len(), 3);
    }
}
