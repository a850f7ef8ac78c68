// Uniform success envelope: `{message, success, data}`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            message: "success".to_string(),
            success: true,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            success: true,
            data,
        }
    }
}

/// Paginated listing wrapper, newest-first ordering is the caller's concern.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
    pub pages: u32,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, page: u32, size: u32, total: i64) -> Self {
        let pages = if size == 0 {
            0
        } else {
            ((total as f64) / (size as f64)).ceil() as u32
        };
        Self {
            items,
            page,
            size,
            total,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        let page: Page<u32> = Page::new(vec![1, 2, 3], 1, 3, 7);
        assert_eq!(page.pages, 3);

        let page: Page<u32> = Page::new(vec![], 1, 10, 0);
        assert_eq!(page.pages, 0);

        let page: Page<u32> = Page::new(vec![1], 1, 5, 5);
        assert_eq!(page.pages, 1);
    }

    #[test]
    fn test_envelope_defaults() {
        let resp = ApiResponse::new(42);
        assert!(resp.success);
        assert_eq!(resp.message, "success");

        let resp = ApiResponse::with_message("Checkout", "url");
        assert_eq!(resp.message, "Checkout");
    }
}
