// Accounts: registration and login for both roles, password hashing,
// bearer tokens and the `AuthUser` extractor used by every protected route.

pub mod credentials;
pub mod extractor;
pub mod handlers;
pub mod password;
pub mod token;

pub use extractor::AuthUser;
pub use token::TokenKeys;
