//! Authentication: register, login, password hashing, JWT.

mod handlers;
mod jwt;
mod password;

pub use handlers::{login, me, register};
pub use jwt::{Claims, TokenIssuer, VerifiedToken, TOKEN_TTL_SECS};
pub use password::PasswordHasher;
