use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::models::{CoreError, CoreErrorKind, CoreResult, JobRecord, SearchKey};
use crate::service::JobSearchService;

const JOBS_PATH: &str = "jobs";
const HEALTH_PATH: &str = "health";
const HEALTHY_STATUS: &str = "healthy";
pub const DEFAULT_USER_AGENT: &str = concat!("jobseek/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct JobsResponse {
    jobs: Vec<Value>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

pub struct HttpJobSearchService {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpJobSearchService {
    pub fn with_options(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn jobs_url(&self) -> String {
        format!("{}/{JOBS_PATH}", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/{HEALTH_PATH}", self.base_url)
    }

    pub fn check_health(&self) -> CoreResult<()> {
        let url = self.health_url();
        let body = self.get_text(self.agent.get(&url), &url)?;
        parse_health_response(&body)
    }

    fn get_text(&self, request: ureq::Request, url: &str) -> CoreResult<String> {
        let response = request.call().map_err(|error| request_error(url, error))?;
        response.into_string().map_err(|error| CoreError {
            kind: CoreErrorKind::Transport,
            message: format!("failed to read response body from '{url}': {error}"),
        })
    }
}

impl JobSearchService for HttpJobSearchService {
    fn fetch_jobs(&self, key: &SearchKey) -> CoreResult<Vec<JobRecord>> {
        let url = self.jobs_url();
        let mut request = self.agent.get(&url);
        for (name, value) in key.query_params() {
            request = request.query(name, value);
        }

        tracing::debug!(
            url = %url,
            query = %key.query,
            location = %key.location,
            job_type = %key.job_type,
            experience_level = %key.experience_level,
            "requesting jobs"
        );
        let body = self.get_text(request, &url)?;
        parse_jobs_response(&body)
    }
}

/// The `jobs` field must be an array; its elements are kept as-is.
pub fn parse_jobs_response(body: &str) -> CoreResult<Vec<JobRecord>> {
    let response: JobsResponse = serde_json::from_str(body).map_err(|error| CoreError {
        kind: CoreErrorKind::ParseFailure,
        message: format!("invalid jobs response: {error}"),
    })?;
    Ok(response.jobs.into_iter().map(JobRecord::new).collect())
}

pub fn parse_health_response(body: &str) -> CoreResult<()> {
    let response: HealthResponse = serde_json::from_str(body).map_err(|error| CoreError {
        kind: CoreErrorKind::ParseFailure,
        message: format!("invalid health response: {error}"),
    })?;
    if response.status == HEALTHY_STATUS {
        Ok(())
    } else {
        Err(CoreError {
            kind: CoreErrorKind::HttpStatus,
            message: format!("job search service reported status '{}'", response.status),
        })
    }
}

fn request_error(url: &str, error: ureq::Error) -> CoreError {
    match error {
        ureq::Error::Status(code, _) => CoreError {
            kind: CoreErrorKind::HttpStatus,
            message: format!("'{url}' answered with HTTP {code}"),
        },
        ureq::Error::Transport(transport) => {
            let kind = if is_timeout(&transport) {
                CoreErrorKind::Timeout
            } else {
                CoreErrorKind::Transport
            };
            CoreError {
                kind,
                message: format!("request to '{url}' failed: {transport}"),
            }
        }
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    if !matches!(
        transport.kind(),
        ureq::ErrorKind::Io | ureq::ErrorKind::ConnectionFailed
    ) {
        return false;
    }
    std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .is_some_and(|io| {
            matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        })
}
