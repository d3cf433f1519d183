//! Authentication module
//!
//! Session tokens (HS256 JWT), bcrypt password hashing, the session cookie
//! and the request extractor guarding protected routes.

mod cookie;
mod jwt;
mod middleware;
mod password;

pub use cookie::{removal_cookie, session_cookie, SESSION_COOKIE};
pub use jwt::{SessionClaims, SessionTokenCodec, TokenError, SESSION_TTL_SECS};
pub use middleware::{session_token, Session};
pub use password::{PasswordService, BCRYPT_COST};
