//! Embedded browser view seam.

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::protocol::ScriptCall;
use crate::shim::UserScript;

// ============================================================================
// WebView
// ============================================================================

/// The browser view hosting the page.
///
/// Views that execute JavaScript evaluate [`ScriptCall::to_script`]; an
/// in-process page can apply the call directly (see
/// [`PageView`](crate::transport::PageView)).
pub trait WebView: Send + 'static {
    /// Installs a script that runs on every page load.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the bridge refuses to start on failure.
    fn inject_user_script(&self, script: &UserScript) -> Result<()>;

    /// Evaluates a call in the page without waiting for a result.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the bridge logs and drops failures.
    fn evaluate(&self, call: &ScriptCall) -> Result<()>;
}
