//! Error types and handling for the `ambiental` service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the `ambiental` service
#[derive(Error, Debug)]
pub enum AmbientalError {
    /// Latitude or longitude outside the valid range
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Nothing matched the query
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Upstream open-data feed errors
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AmbientalError {
    /// Create a new invalid coordinate error
    #[must_use]
    pub fn invalid_coordinate(latitude: f64, longitude: f64) -> Self {
        Self::InvalidCoordinate {
            latitude,
            longitude,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AmbientalError::InvalidCoordinate { .. } => {
                "Coordinates out of range. Latitude must be within [-90, 90] and longitude within [-180, 180]."
                    .to_string()
            }
            AmbientalError::Validation { message } => format!("Invalid input: {message}"),
            AmbientalError::NotFound { message } => message.clone(),
            AmbientalError::Upstream { .. } => {
                "Unable to reach the open data providers. Please try again later.".to_string()
            }
            AmbientalError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            AmbientalError::Cache { .. } => "Cache operation failed.".to_string(),
            AmbientalError::Io { .. } => "File operation failed.".to_string(),
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            AmbientalError::InvalidCoordinate { .. } | AmbientalError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            AmbientalError::NotFound { .. } => StatusCode::NOT_FOUND,
            AmbientalError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AmbientalError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AmbientalError>() {
            Ok(inner) => inner,
            Err(err) => AmbientalError::upstream(format!("{err:#}")),
        }
    }
}

impl IntoResponse for AmbientalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = json!({
            "error": self.user_message(),
            "details": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = AmbientalError::validation("missing lat");
        assert!(matches!(validation_err, AmbientalError::Validation { .. }));

        let upstream_err = AmbientalError::upstream("connection failed");
        assert!(matches!(upstream_err, AmbientalError::Upstream { .. }));

        let coordinate_err = AmbientalError::invalid_coordinate(91.0, 0.0);
        assert!(matches!(
            coordinate_err,
            AmbientalError::InvalidCoordinate { latitude, .. } if latitude == 91.0
        ));
    }

    #[test]
    fn test_user_messages() {
        let validation_err = AmbientalError::validation("lat must be a number");
        assert!(validation_err.user_message().contains("lat must be a number"));

        let upstream_err = AmbientalError::upstream("timeout");
        assert!(upstream_err.user_message().contains("Unable to reach"));

        let not_found = AmbientalError::not_found("No air quality data found for this location");
        assert_eq!(
            not_found.user_message(),
            "No air quality data found for this location"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AmbientalError::invalid_coordinate(0.0, 200.0).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AmbientalError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AmbientalError::upstream("x").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AmbientalError::cache("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_anyhow_conversion_keeps_domain_error() {
        let wrapped = anyhow::Error::new(AmbientalError::invalid_coordinate(95.0, 0.0));
        let err: AmbientalError = wrapped.into();
        assert!(matches!(err, AmbientalError::InvalidCoordinate { .. }));

        let other = anyhow::anyhow!("socket closed").context("Failed to fetch stations");
        let err: AmbientalError = other.into();
        assert!(matches!(err, AmbientalError::Upstream { .. }));
        assert!(err.to_string().contains("Failed to fetch stations"));
        assert!(err.to_string().contains("socket closed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AmbientalError = io_err.into();
        assert!(matches!(err, AmbientalError::Io { .. }));
    }
}
