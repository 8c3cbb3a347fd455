use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{FocusLossPolicy, HostContext};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Receiver of the focus-loss signal.
#[async_trait]
pub trait FocusLossSink: Send + Sync {
    async fn focus_lost(&self);
}

/// Turns host stop events into focus-loss signals according to a policy.
pub struct LifecycleAdapter {
    sink: Arc<dyn FocusLossSink>,
    policy: RwLock<FocusLossPolicy>,
}

impl LifecycleAdapter {
    pub fn new(sink: Arc<dyn FocusLossSink>, policy: FocusLossPolicy) -> Self {
        Self {
            sink,
            policy: RwLock::new(policy),
        }
    }

    pub fn policy(&self) -> FocusLossPolicy {
        match self.policy.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_policy(&self, policy: FocusLossPolicy) {
        let mut guard = match self.policy.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = policy;
    }

    /// Called by the host when the app stops being visible. Returns whether
    /// the focus-loss signal fired.
    pub async fn on_host_stopped(&self, ctx: HostContext) -> bool {
        if !self.policy().is_focus_loss(&ctx) {
            log_debug!("host stop is exempt: {ctx:?}");
            return false;
        }

        log_info!("focus lost (screen on, no exemption applies)");
        self.sink.focus_lost().await;
        true
    }
}
