//! Engine configuration.
//!
//! Plain struct with environment-variable overrides. The `asynchronous`
//! flag reflects whether the surrounding deployment runs in an
//! asynchronous/multi-instance configuration; it governs whether escalated
//! background tasks are marked `require_new_transaction` (see
//! [`crate::events::escalation`]).

use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Identifier of this process instance; stamped onto every task it
    /// owns so cluster nodes can tell their work apart.
    pub instance_id: String,
    /// True when the deployment runs asynchronous/multi-instance.
    pub asynchronous: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            instance_id: format!("idgov-{}", std::process::id()),
            asynchronous: false,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(instance_id) = std::env::var("IDGOV_INSTANCE_ID") {
            config.instance_id = instance_id;
        }

        if let Ok(asynchronous) = std::env::var("IDGOV_ASYNC_ENABLED") {
            config.asynchronous = asynchronous.parse().map_err(|e| {
                CoreError::Configuration(format!("invalid IDGOV_ASYNC_ENABLED: {e}"))
            })?;
        }

        Ok(config)
    }
}
