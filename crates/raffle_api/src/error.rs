use http::StatusCode;
use thiserror::Error;

const NOT_FOUND_MARKERS: [&str; 3] = ["não encontrado", "nao encontrado", "not found"];

#[derive(Debug, Error)]
pub enum StorefrontApiError {
    #[error("storefront api error: {status} for {endpoint}: {message}")]
    Http {
        status: StatusCode,
        endpoint: String,
        message: String,
    },
    #[error("invalid json from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorefrontApiError {
    pub fn status(
        status: StatusCode,
        endpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            StorefrontApiError::Http { status, .. } => Some(*status),
            StorefrontApiError::Decode { .. } => None,
        }
    }

    /// The backend's own explanation, suitable for a user-facing notice.
    pub fn message(&self) -> Option<&str> {
        match self {
            StorefrontApiError::Http { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Lookups answer "missing" either with 404 or with a message saying so.
    pub fn is_not_found(&self) -> bool {
        match self {
            StorefrontApiError::Http {
                status, message, ..
            } => {
                if *status == StatusCode::NOT_FOUND {
                    return true;
                }
                let lowered = message.to_lowercase();
                NOT_FOUND_MARKERS
                    .iter()
                    .any(|marker| lowered.contains(marker))
            }
            StorefrontApiError::Decode { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_by_status_or_message() {
        assert!(StorefrontApiError::status(StatusCode::NOT_FOUND, "user", "").is_not_found());
        assert!(StorefrontApiError::status(
            StatusCode::BAD_REQUEST,
            "user",
            "Usuário não encontrado."
        )
        .is_not_found());
        assert!(
            !StorefrontApiError::status(StatusCode::INTERNAL_SERVER_ERROR, "user", "boom")
                .is_not_found()
        );
    }
}
