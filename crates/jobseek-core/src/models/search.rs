use std::time::SystemTime;

use crate::models::JobRecord;

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SearchKey {
    pub query: String,
    pub location: String,
    pub job_type: String,
    pub experience_level: String,
}

impl SearchKey {
    pub fn new(
        query: impl Into<String>,
        location: Option<&str>,
        job_type: Option<&str>,
        experience_level: Option<&str>,
    ) -> Self {
        Self {
            query: query.into(),
            location: location.unwrap_or_default().to_string(),
            job_type: job_type.unwrap_or_default().to_string(),
            experience_level: experience_level.unwrap_or_default().to_string(),
        }
    }

    pub fn query_only(query: impl Into<String>) -> Self {
        Self::new(query, None, None, None)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = job_type.into();
        self
    }

    pub fn with_experience_level(mut self, experience_level: impl Into<String>) -> Self {
        self.experience_level = experience_level.into();
        self
    }

    /// Wire parameters for the job search endpoint. `q` is always present,
    /// empty filters are omitted.
    pub fn query_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![("q", self.query.as_str())];
        for (name, value) in [
            ("location", self.location.as_str()),
            ("job_type", self.job_type.as_str()),
            ("experience_level", self.experience_level.as_str()),
        ] {
            if !value.is_empty() {
                params.push((name, value));
            }
        }
        params
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchRequest {
    pub key: SearchKey,
    pub issued_at: SystemTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub key: SearchKey,
    pub results: Vec<JobRecord>,
    pub timestamp: SystemTime,
}
