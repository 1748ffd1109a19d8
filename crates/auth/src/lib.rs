//! `stockdesk-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: role policy
//! and claim validation are pure, token decoding is the only IO-adjacent part.

pub mod authorize;
pub mod claims;
pub mod roles;

pub use authorize::{authorize, AuthzError, Principal};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use roles::{Capability, Role};
