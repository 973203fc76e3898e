//! Supabase JWT validation

use igrejas_access::VerifiedIdentity;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience Supabase puts on user tokens
const SUPABASE_AUDIENCE: &str = "authenticated";

/// JWT claims structure for Supabase-issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseClaims {
    /// Subject (user ID as string, will be parsed to UUID)
    pub sub: String,
    pub email: Option<String>,
    /// Role (authenticated, anon, etc.)
    pub role: Option<String>,
    pub aud: Option<String>,
    pub iat: Option<i64>,
    pub exp: i64,
    /// Data captured at signup
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Signup data the user can edit; only the display name is read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    pub nome: Option<String>,
}

impl SupabaseClaims {
    pub fn into_identity(self) -> Result<VerifiedIdentity, JwtError> {
        let user_id = Uuid::parse_str(&self.sub).map_err(|_| JwtError::Invalid)?;
        Ok(VerifiedIdentity {
            user_id,
            email: self.email.filter(|e| !e.trim().is_empty()),
            name: self.user_metadata.nome,
        })
    }
}

/// Verifier for tokens issued by the hosted auth
#[derive(Clone)]
pub struct SupabaseVerifier {
    decoding_key: DecodingKey,
}

impl SupabaseVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validate a Supabase-issued JWT token.
    /// Algorithm and audience are explicit, no fallback.
    pub fn validate(&self, token: &str) -> Result<SupabaseClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60; // 60 second clock skew tolerance
        validation.set_audience(&[SUPABASE_AUDIENCE]);

        match decode::<SupabaseClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(JwtError::Expired),
                jsonwebtoken::errors::ErrorKind::InvalidToken => Err(JwtError::Invalid),
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Err(JwtError::Invalid),
                jsonwebtoken::errors::ErrorKind::InvalidSignature => Err(JwtError::Invalid),
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    tracing::warn!("Supabase JWT audience validation failed - rejecting token");
                    Err(JwtError::Invalid)
                }
                _ => Err(JwtError::Validation(e.to_string())),
            },
        }
    }

    /// Validate and turn the claims into a verified identity
    pub fn verify_identity(&self, token: &str) -> Result<VerifiedIdentity, JwtError> {
        self.validate(token)?.into_identity()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Token validation failed: {0}")]
    Validation(String),
}
