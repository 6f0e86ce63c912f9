use crate::types::TokenType;

/// Why a token was rejected (or could not be produced).
///
/// Variants are distinguished in logs only; clients see a single generic
/// authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("expected {expected} token, got {found}")]
    TypeMismatch {
        expected: TokenType,
        found: TokenType,
    },

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl TokenError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            TokenError::Expired => "expired",
            TokenError::Malformed(_) => "malformed",
            TokenError::TypeMismatch { .. } => "type_mismatch",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::Encoding(_) => "encoding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no authenticated identity on request")]
    MissingIdentity,
}

impl AuthError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::Token(e) => e.reason_code(),
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingIdentity => "missing_identity",
        }
    }
}
