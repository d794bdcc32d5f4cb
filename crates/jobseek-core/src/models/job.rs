use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A posting exactly as the backend returned it. Records are stored and
/// paged verbatim; only rendering goes through [`validate_job_record`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobRecord(pub Value);

impl JobRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub link: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RejectionReason {
    NotAnObject,
    MissingStringField(&'static str),
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "job record is not a JSON object"),
            Self::MissingStringField(field) => {
                write!(f, "job record field '{field}' is missing or not a string")
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JobValidation {
    Valid(JobPosting),
    Rejected(RejectionReason),
}

impl JobValidation {
    pub fn into_posting(self) -> Option<JobPosting> {
        match self {
            Self::Valid(posting) => Some(posting),
            Self::Rejected(_) => None,
        }
    }
}

pub fn validate_job_record(record: &JobRecord) -> JobValidation {
    let Some(object) = record.0.as_object() else {
        return JobValidation::Rejected(RejectionReason::NotAnObject);
    };

    match posting_from_object(object) {
        Ok(posting) => JobValidation::Valid(posting),
        Err(reason) => JobValidation::Rejected(reason),
    }
}

fn posting_from_object(object: &Map<String, Value>) -> Result<JobPosting, RejectionReason> {
    let required = |field: &'static str| {
        object
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(RejectionReason::MissingStringField(field))
    };

    Ok(JobPosting {
        title: required("title")?,
        company: required("company")?,
        link: required("link")?,
        source: required("source")?,
        // Non-string descriptions render as empty rather than rejecting the card.
        description: object
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
