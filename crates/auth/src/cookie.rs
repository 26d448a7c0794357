//! Session cookie carrying the `sid` half of a credential pair.

use chrono::Duration;

pub const DEFAULT_SESSION_COOKIE: &str = "SLOTLEDGER_SID";

/// How the session cookie is named and rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookieSpec {
    pub name: String,
    pub secure: bool,
    pub max_age: Duration,
}

impl SessionCookieSpec {
    pub fn new(name: impl Into<String>, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            secure: false,
            max_age,
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Render a `Set-Cookie` header value for `sid`.
    pub fn render(&self, sid: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name,
            sid,
            self.max_age.num_seconds()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Find this cookie's value in a `Cookie` request header.
    pub fn extract<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        cookie_header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == self.name).then(|| value.trim())
        })
    }
}
