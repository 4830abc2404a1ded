//! Error handling utilities for route handlers

use axum::http::StatusCode;
use tracing::error;

/// Extension trait for logging errors and converting to StatusCode
pub trait LogErr<T> {
    /// Log error with context and return INTERNAL_SERVER_ERROR
    fn log_500(self, context: &str) -> Result<T, StatusCode>;

    /// Log error with context and return a custom StatusCode
    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, StatusCode> {
        self.log_status(context, StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode> {
        self.map_err(|e| {
            error!(error = %e, status = status.as_u16(), "{}", context);
            status
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_requested_status() {
        let failed: Result<(), &str> = Err("upstream down");
        assert_eq!(failed.log_500("ctx"), Err(StatusCode::INTERNAL_SERVER_ERROR));

        let failed: Result<(), &str> = Err("bad gateway");
        assert_eq!(
            failed.log_status("ctx", StatusCode::BAD_GATEWAY),
            Err(StatusCode::BAD_GATEWAY)
        );

        let ok: Result<u8, &str> = Ok(3);
        assert_eq!(ok.log_500("ctx"), Ok(3));
    }
}
