pub mod controller;
pub mod guard;

pub use controller::{PageSnapshot, SearchController, SearchOutcome, ViewState};
pub use guard::{InFlightGuard, SearchTicket};

use crate::models::CoreError;

pub type OrchestrationResult<T> = Result<T, CoreError>;
