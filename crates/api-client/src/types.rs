//! Wire types for the yard operations REST API.

use muster_core::sync::Page;
use serde::Deserialize;

/// Paged envelope returned by every list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub content: Vec<T>,
    pub page: PageMeta,
}

/// Pagination block nested in [`PagedResponse`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub size: u32,
    pub number: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// Body the API attaches to non-2xx responses. Every field is optional
/// because gateways in front of the API answer with their own shapes.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

impl<T> From<PagedResponse<T>> for Page<T> {
    fn from(response: PagedResponse<T>) -> Self {
        Page {
            items: response.content,
            page_number: response.page.number,
            total_pages: response.page.total_pages,
            total_elements: response.page.total_elements,
            page_size: response.page.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_envelope_maps_onto_the_core_page() {
        let body = r#"{
            "content": [10, 20, 30],
            "page": {"size": 9, "number": 1, "totalElements": 14, "totalPages": 2}
        }"#;
        let envelope: PagedResponse<u32> = serde_json::from_str(body).unwrap();
        let page: Page<u32> = envelope.into();

        assert_eq!(page.items, vec![10, 20, 30]);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_elements, 14);
        assert_eq!(page.page_size, 9);
    }

    #[test]
    fn error_body_tolerates_unknown_shapes() {
        let parsed: ApiErrorBody = serde_json::from_str(r#"{"error": "nope"}"#).unwrap();
        assert_eq!(parsed.message, None);

        let parsed: ApiErrorBody =
            serde_json::from_str(r#"{"message": "yard not found"}"#).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("yard not found"));
    }
}
