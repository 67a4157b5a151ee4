//! Credential verification: token issuing, validation and the request
//! extractor that turns `Authorization: Bearer <token>` into an [`AuthUser`].

pub mod extract;
pub mod jwt;

pub use jwt::{AuthUser, Claims, generate_token, validate_token};
