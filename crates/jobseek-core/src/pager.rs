use crate::models::{JobPosting, JobRecord, validate_job_record};

pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Fixed-size pages over the active result set. Pages are 1-based.
/// `go_to_page` stores whatever it is given; out-of-range pages are simply
/// empty.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultPager {
    active_results: Vec<JobRecord>,
    page_size: usize,
    current_page: i64,
}

impl Default for ResultPager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultPager {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            active_results: Vec::new(),
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn set_results(&mut self, results: Vec<JobRecord>) {
        self.active_results = results;
        self.current_page = 1;
    }

    pub fn clear(&mut self) {
        self.set_results(Vec::new());
    }

    pub fn go_to_page(&mut self, page: i64) {
        self.current_page = page;
    }

    pub fn current_page(&self) -> i64 {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn active_results(&self) -> &[JobRecord] {
        &self.active_results
    }

    pub fn total_results(&self) -> usize {
        self.active_results.len()
    }

    pub fn page_count(&self) -> usize {
        self.active_results.len().div_ceil(self.page_size)
    }

    pub fn current_slice(&self) -> &[JobRecord] {
        let Some(page_index) = usize::try_from(self.current_page)
            .ok()
            .and_then(|page| page.checked_sub(1))
        else {
            return &[];
        };

        let len = self.active_results.len();
        let start = page_index.saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        &self.active_results[start..end]
    }

    pub fn renderable_slice(&self) -> Vec<JobPosting> {
        self.current_slice()
            .iter()
            .filter_map(|record| validate_job_record(record).into_posting())
            .collect()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        usize::try_from(self.current_page)
            .map(|page| page < self.page_count())
            .unwrap_or(self.page_count() > 0)
    }
}
