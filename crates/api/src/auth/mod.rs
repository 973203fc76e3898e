//! Authentication against the hosted Supabase auth

pub mod jwt;
pub mod middleware;

pub use jwt::{JwtError, SupabaseClaims, SupabaseVerifier};
pub use middleware::{require_auth, require_super_admin, AuthSession, PREFERRED_ROLE_HEADER};
