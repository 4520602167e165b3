use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::env;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Stop the inference pass at the first failing binding.
    pub fail_fast: bool,
}

impl InferenceConfig {
    pub fn from_json_str(src: &str) -> Result<Self> {
        serde_json::from_str(src).context("invalid inference config")
    }

    /// Defaults overridden by `RELAX_RS_FAIL_FAST` when it is set.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(fail_fast) = env::fail_fast_override() {
            self.fail_fast = fail_fast;
        }
        self
    }
}
