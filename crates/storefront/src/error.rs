//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for everything a page controller or
//! the CLI can fail with. Shoppers see [`AppError::user_message`]; server-side
//! failures are captured to Sentry by [`AppError::report`].

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text safe to show a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => api_user_message(err).to_string(),
            Self::Storage(_) => "Could not save to this device".to_string(),
            Self::Config(_) | Self::Internal(_) => "Something went wrong, please try again".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Whether the failure is ours or the backend's rather than the shopper's.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => {
                err.is_server_error() || matches!(err, ApiError::Parse(_) | ApiError::InvalidUrl(_))
            }
            Self::Storage(_) | Self::Config(_) | Self::Internal(_) => true,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }

    /// Log the error, capturing server-side failures to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront error");
        }
    }
}

fn api_user_message(err: &ApiError) -> &'static str {
    match err {
        ApiError::Unauthorized { .. } => "Your session has expired, please log in again",
        ApiError::NotFound(_) => "We couldn't find what you were looking for",
        ApiError::Http(_) => "Could not reach Lindo, check your connection and try again",
        _ if err.is_server_error() => "Lindo is having trouble right now, please try again shortly",
        _ => "Something went wrong talking to Lindo",
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after a successful login to associate errors with the shopper.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the shopper.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("reconcile", "Replayed guest cart", Some(&[("replayed", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product P9".to_string());
        assert_eq!(err.to_string(), "Not found: Product P9");
        assert_eq!(err.user_message(), "Product P9 not found");

        let err = AppError::BadRequest("Your cart is empty".to_string());
        assert_eq!(err.to_string(), "Bad request: Your cart is empty");
        assert_eq!(err.user_message(), "Your cart is empty");
    }

    #[test]
    fn test_api_errors_map_to_friendly_messages() {
        let expired = AppError::from(ApiError::Unauthorized { status: 401 });
        assert_eq!(
            expired.user_message(),
            "Your session has expired, please log in again"
        );
        assert!(!expired.is_server_error());

        let outage = AppError::from(ApiError::Status {
            status: 503,
            message: "upstream down".to_string(),
        });
        assert!(outage.is_server_error());
        assert!(!outage.user_message().contains("upstream"));

        let rejected = AppError::from(ApiError::Status {
            status: 422,
            message: "bad".to_string(),
        });
        assert!(!rejected.is_server_error());
    }

    #[test]
    fn test_report_without_sentry_client() {
        AppError::Internal("boom".to_string()).report();
        AppError::BadRequest("nope".to_string()).report();
    }
}
