use crate::{DispatchError, DispatchResult, InstructionBatch, SequenceType};
use serde::Deserialize;

/// Per-transaction batch ceiling when any batch must run in strict order
pub const SEQUENTIAL_MAX_TXES_IN_BATCH: usize = 20;

/// Per-transaction batch ceiling otherwise
pub const DEFAULT_MAX_TXES_IN_BATCH: usize = 30;

/// Configuration handed to the sign-and-confirm primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Maximum number of transactions signed and sent as one physical batch
    pub max_txes_in_batch: usize,

    /// Whether the primitive should retry failed transactions on its own
    pub auto_retry: bool,

    /// Retry ceiling when `auto_retry` is on
    pub max_retries: u32,

    /// Retries already spent
    pub retried: u32,

    /// Whether flow information is logged
    pub log_flow_info: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_txes_in_batch: DEFAULT_MAX_TXES_IN_BATCH,
            auto_retry: false,
            max_retries: 5,
            retried: 0,
            log_flow_info: true,
        }
    }
}

impl DispatchConfig {
    /// Defaults for a given request, with the batch ceiling derived from its sequencing modes
    pub fn for_batches(batches: &[InstructionBatch]) -> Self {
        Self {
            max_txes_in_batch: max_txes_in_batch(batches),
            ..Default::default()
        }
    }

    /// Apply caller overrides; every present field replaces the current value
    pub fn merged(mut self, overrides: &DispatchConfigOverrides) -> Self {
        if let Some(v) = overrides.max_txes_in_batch {
            self.max_txes_in_batch = v;
        }
        if let Some(v) = overrides.auto_retry {
            self.auto_retry = v;
        }
        if let Some(v) = overrides.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = overrides.retried {
            self.retried = v;
        }
        if let Some(v) = overrides.log_flow_info {
            self.log_flow_info = v;
        }
        self
    }
}

/// Caller-supplied overrides for [`DispatchConfig`]
///
/// Accepts both snake_case and camelCase keys; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfigOverrides {
    /// Replaces the sequencing-derived batch ceiling
    #[serde(alias = "maxTxesInBatch")]
    pub max_txes_in_batch: Option<usize>,

    /// Lets the primitive retry failed transactions on its own
    #[serde(alias = "autoRetry")]
    pub auto_retry: Option<bool>,

    /// Retry ceiling when `auto_retry` is on
    #[serde(alias = "maxRetries")]
    pub max_retries: Option<u32>,

    /// Retries already spent, when resuming a previous attempt
    pub retried: Option<u32>,

    /// Whether flow information is logged
    #[serde(alias = "logFlowInfo")]
    pub log_flow_info: Option<bool>,
}

impl DispatchConfigOverrides {
    /// Parse overrides from a JSON object
    pub fn from_json_str(s: &str) -> DispatchResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| DispatchError::Config(format!("invalid JSON overrides: {}", e)))
    }

    /// Parse overrides from a YAML mapping
    pub fn from_yaml_str(s: &str) -> DispatchResult<Self> {
        serde_yaml::from_str(s)
            .map_err(|e| DispatchError::Config(format!("invalid YAML overrides: {}", e)))
    }
}

/// Batch ceiling for a request: smaller when any batch is sequential
pub fn max_txes_in_batch(batches: &[InstructionBatch]) -> usize {
    if batches
        .iter()
        .any(|b| b.sequence_type == SequenceType::Sequential)
    {
        SEQUENTIAL_MAX_TXES_IN_BATCH
    } else {
        DEFAULT_MAX_TXES_IN_BATCH
    }
}
