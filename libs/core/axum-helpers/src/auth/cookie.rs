/// Name of the session cookie set at login.
pub const AUTH_COOKIE: &str = "token";

/// `Set-Cookie` value carrying a freshly issued token.
pub fn auth_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let secure_flag = if secure { " Secure;" } else { "" };
    format!(
        "{}={}; HttpOnly;{} SameSite=Strict; Path=/; Max-Age={}",
        AUTH_COOKIE, token, secure_flag, max_age_seconds
    )
}

/// `Set-Cookie` value that expires the session cookie.
pub fn clear_auth_cookie(secure: bool) -> String {
    let secure_flag = if secure { " Secure;" } else { "" };
    format!(
        "{}=; HttpOnly;{} SameSite=Strict; Path=/; Max-Age=0",
        AUTH_COOKIE, secure_flag
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie_flags() {
        let cookie = auth_cookie("abc", 60, true);
        assert_eq!(
            cookie,
            "token=abc; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=60"
        );
        assert!(!auth_cookie("abc", 60, false).contains("Secure"));
    }

    #[test]
    fn test_clear_auth_cookie_expires_immediately() {
        assert!(clear_auth_cookie(false).ends_with("Max-Age=0"));
    }
}
