//! Credential exchange and bearer decoration for outbound requests

pub mod password_grant;
pub mod transport;

pub use password_grant::PasswordGrantProvider;
pub use transport::BearerAuthenticator;
