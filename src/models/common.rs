use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::calendar::CalendarProvider;

// Define pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

pub fn default_page() -> usize {
    1
}

pub fn default_page_size() -> usize {
    20
}

impl PaginationParams {
    /// Slice one page out of `items`; page numbers start at 1
    pub fn paginate<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let page = self.page.max(1);
        let page_size = self.page_size.clamp(1, 100);
        items
            .iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub date: NaiveDate,
    pub times: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub provider: Option<CalendarProvider>,
}
