use serde::{Deserialize, Serialize};

/// `{"detail": "..."}` 消息响应
#[derive(Debug, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// 分页响应格式
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    pub fn resolve(page: Option<usize>, page_size: Option<usize>, default_size: usize, max_size: usize) -> Self {
        let size = page_size.unwrap_or(default_size).clamp(1, max_size.max(1));
        Self {
            number: page.unwrap_or(1).max(1),
            size,
        }
    }

    pub fn offset(&self) -> usize {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

impl<T> Paginated<T> {
    /// Slice an already ordered result set into one page.
    pub fn from_items(items: Vec<T>, page: Page, path: &str) -> Self {
        let count = items.len();
        let results: Vec<T> = items.into_iter().skip(page.offset()).take(page.size).collect();

        let next = if page.offset().saturating_add(page.size) < count {
            Some(format!("{}?page={}&page_size={}", path, page.number + 1, page.size))
        } else {
            None
        };
        let previous = if page.number > 1 {
            Some(format!("{}?page={}&page_size={}", path, page.number - 1, page.size))
        } else {
            None
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_links() {
        let page = Page::resolve(None, Some(2), 10, 100);
        let p = Paginated::from_items(vec![1, 2, 3, 4, 5], page, "/articles/");
        assert_eq!(p.count, 5);
        assert_eq!(p.results, vec![1, 2]);
        assert_eq!(p.next.as_deref(), Some("/articles/?page=2&page_size=2"));
        assert!(p.previous.is_none());
    }

    #[test]
    fn test_last_page_links() {
        let page = Page::resolve(Some(3), Some(2), 10, 100);
        let p = Paginated::from_items(vec![1, 2, 3, 4, 5], page, "/articles/");
        assert_eq!(p.results, vec![5]);
        assert!(p.next.is_none());
        assert_eq!(p.previous.as_deref(), Some("/articles/?page=2&page_size=2"));
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = Page::resolve(Some(9), None, 10, 100);
        let p = Paginated::from_items(vec![1, 2, 3], page, "/x/");
        assert_eq!(p.count, 3);
        assert!(p.results.is_empty());
    }

    #[test]
    fn test_huge_page_number_saturates() {
        let page = Page::resolve(Some(usize::MAX), Some(10), 10, 100);
        assert_eq!(page.offset(), usize::MAX);
        let p = Paginated::from_items(vec![1, 2, 3], page, "/x/");
        assert_eq!(p.count, 3);
        assert!(p.results.is_empty());
        assert!(p.next.is_none());
    }

    #[test]
    fn test_page_size_is_capped() {
        let page = Page::resolve(Some(0), Some(1000), 10, 100);
        assert_eq!(page, Page { number: 1, size: 100 });
    }
}
