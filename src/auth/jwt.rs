use crate::auth::TokenError;
use crate::types::{Claims, Identity, TokenPair, TokenType};
use crate::utils::config::{
    AuthConfig, ConfigError, MAX_ACCESS_EXPIRY_HOURS, MAX_LEEWAY_SECS, MAX_REFRESH_EXPIRY_DAYS,
    check_secret_strength,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use tracing::debug;
use uuid::Uuid;

/// Lifetimes and clock tolerance for issued tokens.
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub access_expiry: Duration,
    pub refresh_expiry: Duration,
    pub leeway: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_expiry: Duration::hours(24),
            refresh_expiry: Duration::days(7),
            leeway: Duration::seconds(60),
        }
    }
}

impl TryFrom<&AuthConfig> for TokenSettings {
    type Error = ConfigError;

    fn try_from(config: &AuthConfig) -> Result<Self, Self::Error> {
        let out_of_range = |field: &str| {
            ConfigError::ValidationError(format!("auth.{field} is out of range"))
        };

        let leeway_secs = i64::try_from(config.clock_skew_leeway_secs)
            .map_err(|_| out_of_range("clock_skew_leeway_secs"))?;

        Ok(Self {
            access_expiry: Duration::try_hours(config.access_token_expiry_hours)
                .ok_or_else(|| out_of_range("access_token_expiry_hours"))?,
            refresh_expiry: Duration::try_days(config.refresh_token_expiry_days)
                .ok_or_else(|| out_of_range("refresh_token_expiry_days"))?,
            leeway: Duration::try_seconds(leeway_secs)
                .ok_or_else(|| out_of_range("clock_skew_leeway_secs"))?,
        })
    }
}

/// Issues and verifies HS256 JWT access/refresh tokens.
///
/// Verification is stateless: everything needed is in the token and the
/// signing secret, which is fixed for the lifetime of the issuer.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    settings: TokenSettings,
}

impl TokenIssuer {
    /// Creates an issuer, rejecting secrets shorter than 32 characters and
    /// lifetimes outside the range the config accepts.
    pub fn new(secret: &str, settings: TokenSettings) -> Result<Self, ConfigError> {
        check_secret_strength(secret)?;

        if settings.access_expiry <= Duration::zero()
            || settings.access_expiry > Duration::hours(MAX_ACCESS_EXPIRY_HOURS)
        {
            return Err(ConfigError::ValidationError(format!(
                "access token expiry must be between 1 hour and {MAX_ACCESS_EXPIRY_HOURS} hours"
            )));
        }
        if settings.refresh_expiry <= Duration::zero()
            || settings.refresh_expiry > Duration::days(MAX_REFRESH_EXPIRY_DAYS)
        {
            return Err(ConfigError::ValidationError(format!(
                "refresh token expiry must be between 1 day and {MAX_REFRESH_EXPIRY_DAYS} days"
            )));
        }
        if settings.leeway < Duration::zero()
            || settings.leeway > Duration::seconds(MAX_LEEWAY_SECS as i64)
        {
            return Err(ConfigError::ValidationError(format!(
                "clock skew leeway must be between 0 and {MAX_LEEWAY_SECS} seconds"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            settings,
        })
    }

    /// Issues a fresh access + refresh pair for `identity`.
    pub fn issue(&self, identity: Identity) -> Result<TokenPair, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: Identity, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let access_token = self.encode_token(identity, TokenType::Access, now)?;
        let refresh_token = self.encode_token(identity, TokenType::Refresh, now)?;

        debug!(
            user_id = %identity.id,
            role = %identity.role,
            "issued token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.settings.access_expiry.num_seconds(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Verifies `token` and returns the identity it carries.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Identity, TokenError> {
        self.verify_at(token, expected, Utc::now())
    }

    /// Verification against an explicit clock.
    ///
    /// Checks, in order: structure and signature, token type, expiry (with
    /// the configured leeway).
    pub fn verify_at(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<Identity, TokenError> {
        let claims = self.decode_claims(token)?;

        if claims.typ != expected {
            return Err(TokenError::TypeMismatch {
                expected,
                found: claims.typ,
            });
        }

        let deadline = claims.exp.saturating_add(self.settings.leeway.num_seconds());
        if now.timestamp() > deadline {
            return Err(TokenError::Expired);
        }

        Ok(claims.identity())
    }

    /// Rotates a refresh token into a brand new pair.
    ///
    /// The identity (including role) is copied from the old refresh token
    /// without consulting storage, so a role change only takes effect once
    /// the user logs in again.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        self.refresh_at(refresh_token, Utc::now())
    }

    pub fn refresh_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let identity = self.verify_at(refresh_token, TokenType::Refresh, now)?;
        self.issue_at(identity, now)
    }

    fn encode_token(
        &self,
        identity: Identity,
        typ: TokenType,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let lifetime = match typ {
            TokenType::Access => self.settings.access_expiry,
            TokenType::Refresh => self.settings.refresh_expiry,
        };

        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| TokenError::Encoding("token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: identity.id,
            role: identity.role,
            typ,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by verify_at against the injected clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}
