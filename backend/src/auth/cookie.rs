//! Session cookie construction
//!
//! Setting and clearing must use the same attributes, otherwise browsers keep
//! the old cookie around.

use super::jwt::SESSION_TTL_SECS;
use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

fn base(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build()
}

/// Cookie holding a freshly issued session token
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = base(token, secure);
    cookie.set_max_age(time::Duration::seconds(SESSION_TTL_SECS));
    cookie
}

/// Cookie to hand to `CookieJar::remove`
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    base(String::new(), secure)
}
