//! Builder pattern for bridge configuration.
//!
//! # Example
//!
//! ```ignore
//! use webview_geolocation::{AuthorizationKind, Bridge, DesiredAccuracy};
//!
//! let bridge = Bridge::builder()
//!     .authorization_kind(AuthorizationKind::WhenInUse)
//!     .desired_accuracy(DesiredAccuracy::Best)
//!     .page_url("https://maps.example.com")
//!     .build(provider, view)?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};
use crate::shim::{InjectionTime, UserScript};
use crate::shim::assets::WEBKIT_HANDLER_ROOT;

use super::controller::BridgeController;
use super::runner::Bridge;
use super::provider::{AuthorizationKind, DesiredAccuracy, LocationProvider};
use super::view::WebView;

// ============================================================================
// Constants
// ============================================================================

/// URL schemes a host may load into the view.
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "file"];

// ============================================================================
// BridgeOptions
// ============================================================================

/// Validated bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Permission requested when the status is undetermined.
    pub authorization_kind: AuthorizationKind,
    /// Accuracy requested when sensing starts.
    pub desired_accuracy: DesiredAccuracy,
    /// Page the host loads, if the bridge is told about it.
    pub page_url: Option<Url>,
    /// JavaScript expression holding the script message handlers.
    pub handler_root: String,
    /// When the shim script runs.
    pub injection_time: InjectionTime,
    /// Skip iframes.
    pub main_frame_only: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            authorization_kind: AuthorizationKind::default(),
            desired_accuracy: DesiredAccuracy::default(),
            page_url: None,
            handler_root: WEBKIT_HANDLER_ROOT.to_string(),
            injection_time: InjectionTime::DocumentEnd,
            main_frame_only: true,
        }
    }
}

impl BridgeOptions {
    /// The shim script to inject with these options.
    #[must_use]
    pub fn user_script(&self) -> UserScript {
        UserScript::shim(&self.handler_root, self.injection_time, self.main_frame_only)
    }
}

// ============================================================================
// BridgeBuilder
// ============================================================================

/// Builder for configuring a [`Bridge`].
///
/// Use [`Bridge::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct BridgeBuilder {
    authorization_kind: AuthorizationKind,
    desired_accuracy: DesiredAccuracy,
    page_url: Option<String>,
    handler_root: Option<String>,
    injection_time: InjectionTime,
    include_subframes: bool,
}

impl BridgeBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the permission to request.
    #[inline]
    #[must_use]
    pub fn authorization_kind(mut self, kind: AuthorizationKind) -> Self {
        self.authorization_kind = kind;
        self
    }

    /// Sets the accuracy requested from the provider.
    #[inline]
    #[must_use]
    pub fn desired_accuracy(mut self, accuracy: DesiredAccuracy) -> Self {
        self.desired_accuracy = accuracy;
        self
    }

    /// Sets the page the host loads.
    #[inline]
    #[must_use]
    pub fn page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }

    /// Sets where the page finds the script message handlers.
    ///
    /// Defaults to `window.webkit.messageHandlers`.
    #[inline]
    #[must_use]
    pub fn handler_root(mut self, root: impl Into<String>) -> Self {
        self.handler_root = Some(root.into());
        self
    }

    /// Sets when the shim script runs.
    #[inline]
    #[must_use]
    pub fn injection_time(mut self, time: InjectionTime) -> Self {
        self.injection_time = time;
        self
    }

    /// Also installs the shim in iframes.
    #[inline]
    #[must_use]
    pub fn include_subframes(mut self) -> Self {
        self.include_subframes = true;
        self
    }

    /// Validates the configuration into [`BridgeOptions`].
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the page URL does not parse
    /// - [`Error::Config`] if the page URL scheme is not allowed
    /// - [`Error::Config`] if the handler root is blank
    pub fn options(&self) -> Result<BridgeOptions> {
        let page_url = self.validate_page_url()?;
        let handler_root = self.validate_handler_root()?;

        Ok(BridgeOptions {
            authorization_kind: self.authorization_kind,
            desired_accuracy: self.desired_accuracy,
            page_url,
            handler_root,
            injection_time: self.injection_time,
            main_frame_only: !self.include_subframes,
        })
    }

    /// Builds the bridge and installs the shim in `view`.
    ///
    /// # Errors
    ///
    /// - anything [`BridgeBuilder::options`] returns
    /// - the view's error if the script cannot be injected
    pub fn build<P, V>(self, provider: P, view: V) -> Result<Bridge<P, V>>
    where
        P: LocationProvider,
        V: WebView,
    {
        let options = self.options()?;
        let controller = BridgeController::new(provider, view, options);
        controller.install()?;
        Ok(Bridge::new(controller))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BridgeBuilder {
    fn validate_page_url(&self) -> Result<Option<Url>> {
        let Some(raw) = self.page_url.as_deref() else {
            return Ok(None);
        };

        let url = Url::parse(raw)?;
        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(Error::config(format!(
                "Unsupported page URL scheme '{}'. Use one of: {}",
                url.scheme(),
                ALLOWED_SCHEMES.join(", ")
            )));
        }

        Ok(Some(url))
    }

    fn validate_handler_root(&self) -> Result<String> {
        match self.handler_root.as_deref().map(str::trim) {
            None => Ok(WEBKIT_HANDLER_ROOT.to_string()),
            Some("") => Err(Error::config(
                "Message handler root must not be empty.\n\
                 Example: Bridge::builder().handler_root(\"window.webkit.messageHandlers\")",
            )),
            Some(root) => Ok(root.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
