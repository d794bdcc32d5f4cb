pub mod error;
pub mod job;
pub mod search;
pub mod theme;

pub use error::{CoreError, CoreErrorKind, CoreResult, FETCH_FAILURE_MESSAGE};
pub use job::{JobPosting, JobRecord, JobValidation, RejectionReason, validate_job_record};
pub use search::{CacheEntry, SearchKey, SearchRequest};
pub use theme::ThemePreference;
