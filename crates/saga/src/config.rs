//! Coordinator configuration.

use serde::{Deserialize, Serialize};

use crate::compensation::CompensationMode;
use crate::retry::ActivityOptions;

/// Settings applied to every saga run of a coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SagaConfig {
    /// Retry policy and timeout for each booking and compensation call.
    pub activity: ActivityOptions,
    pub compensation_mode: CompensationMode,
}

impl SagaConfig {
    pub fn with_compensation_mode(mut self, mode: CompensationMode) -> Self {
        self.compensation_mode = mode;
        self
    }

    pub fn with_activity_options(mut self, activity: ActivityOptions) -> Self {
        self.activity = activity;
        self
    }
}
