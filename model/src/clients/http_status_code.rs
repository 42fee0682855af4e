pub use http::StatusCode;
use kube::Error;

/// The `reason` the API server reports when creating an object that already exists.
const REASON_ALREADY_EXISTS: &str = "AlreadyExists";

pub trait HttpStatusCode {
    fn status_code(&self) -> Option<StatusCode>;

    /// The machine readable reason reported by the API server, if any.
    fn reason(&self) -> Option<&str> {
        None
    }

    fn is_status_code(&self, status_code: StatusCode) -> bool {
        self.status_code()
            .map(|some| some == status_code)
            .unwrap_or_default()
    }

    fn is_not_found(&self) -> bool {
        self.is_status_code(StatusCode::NOT_FOUND)
    }

    /// A `409 Conflict` is also returned for stale updates, so the reason is checked when the
    /// server provides one.
    fn is_already_exists(&self) -> bool {
        self.is_status_code(StatusCode::CONFLICT)
            && self
                .reason()
                .map(|reason| reason.is_empty() || reason == REASON_ALREADY_EXISTS)
                .unwrap_or(true)
    }
}

impl HttpStatusCode for kube::Error {
    fn status_code(&self) -> Option<StatusCode> {
        if let Error::Api(error_response) = self {
            StatusCode::from_u16(error_response.code).ok()
        } else {
            None
        }
    }

    fn reason(&self) -> Option<&str> {
        if let Error::Api(error_response) = self {
            Some(error_response.reason.as_str())
        } else {
            None
        }
    }
}

impl<T, E> HttpStatusCode for std::result::Result<T, E>
where
    E: HttpStatusCode,
{
    fn status_code(&self) -> Option<StatusCode> {
        self.as_ref().err().and_then(|e| e.status_code())
    }

    fn reason(&self) -> Option<&str> {
        self.as_ref().err().and_then(|e| e.reason())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use kube::error::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "test".to_string(),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn not_found() {
        assert!(api_error(404, "NotFound").is_not_found());
        assert!(!api_error(500, "InternalError").is_not_found());
        assert!(!api_error(404, "NotFound").is_already_exists());
    }

    #[test]
    fn already_exists() {
        assert!(api_error(409, "AlreadyExists").is_already_exists());
        assert!(!api_error(409, "Conflict").is_already_exists());
        assert!(Err::<(), _>(api_error(409, "AlreadyExists")).is_already_exists());
        assert!(!Ok::<(), kube::Error>(()).is_already_exists());
    }
}
