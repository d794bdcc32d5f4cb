pub mod http;

pub use http::{HttpJobSearchService, parse_health_response, parse_jobs_response};

use crate::models::{CoreResult, JobRecord, SearchKey};

/// The remote job search endpoint. Calls block; the controller runs them on
/// the blocking pool.
pub trait JobSearchService: Send + Sync {
    fn fetch_jobs(&self, key: &SearchKey) -> CoreResult<Vec<JobRecord>>;
}
