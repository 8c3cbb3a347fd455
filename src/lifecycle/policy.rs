use serde::{Deserialize, Serialize};

/// What the host observed when the app stopped being visible.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostContext {
    /// The app itself is closing.
    pub finishing: bool,
    /// Rotation or another configuration change is recreating the UI.
    pub changing_configuration: bool,
    pub screen_on: bool,
    /// A call is ringing or in progress.
    pub phone_active: bool,
}

impl HostContext {
    /// User switched to another app with the screen on.
    pub fn switched_away() -> Self {
        Self {
            screen_on: true,
            ..Self::default()
        }
    }
}

/// Which host situations are exempt from failing the session.
///
/// Termination and a locked screen are always exempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusLossPolicy {
    pub exempt_phone_activity: bool,
    pub exempt_configuration_changes: bool,
}

impl Default for FocusLossPolicy {
    fn default() -> Self {
        Self {
            exempt_phone_activity: true,
            exempt_configuration_changes: true,
        }
    }
}

impl FocusLossPolicy {
    /// Strict variant: only termination and a locked screen are forgiven.
    pub fn strict() -> Self {
        Self {
            exempt_phone_activity: false,
            exempt_configuration_changes: false,
        }
    }

    pub fn is_focus_loss(&self, ctx: &HostContext) -> bool {
        if ctx.finishing || !ctx.screen_on {
            return false;
        }
        if ctx.changing_configuration && self.exempt_configuration_changes {
            return false;
        }
        if ctx.phone_active && self.exempt_phone_activity {
            return false;
        }
        true
    }
}
