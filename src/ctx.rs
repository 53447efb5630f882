//! Per-request context: who is asking, and the one-shot notices travelling
//! between a redirect and the page that follows it.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use maud::Markup;
use serde::{Deserialize, Serialize};

use crate::{AppState, config::clamp_ttl_days, entities::user, error::AppError, templates};

pub const SESSION_COOKIE: &str = "sessionid";
pub const MESSAGES_COOKIE: &str = "messages";
pub const LOGIN_GATE: &str = "/become_user/";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

pub fn encode_notices(notices: &[Notice]) -> String {
    let json = serde_json::to_string(notices).unwrap_or_default();
    urlencoding::encode(&json).into_owned()
}

/// Anything unreadable decodes to no notices.
pub fn decode_notices(raw: &str) -> Vec<Notice> {
    urlencoding::decode(raw)
        .ok()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

#[derive(Debug)]
pub struct Ctx {
    pub user: Option<user::Model>,
    jar: CookieJar,
    incoming: Vec<Notice>,
    outgoing: Vec<Notice>,
    path: String,
    secure: bool,
    session_ttl_days: i64,
}

impl FromRequestParts<Arc<AppState>> for Ctx {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let user = match jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
            Some(token) if !token.is_empty() => state.store.session_user(&token).await?,
            _ => None,
        };

        let incoming =
            jar.get(MESSAGES_COOKIE).map(|c| decode_notices(c.value())).unwrap_or_default();

        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        Ok(Self {
            user,
            jar,
            incoming,
            outgoing: Vec::new(),
            path,
            secure: state.config.secure_cookies,
            session_ttl_days: state.config.session_ttl_days,
        })
    }
}

impl Ctx {
    pub fn user_id(&self) -> Option<i32> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_staff(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_staff)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn session_token(&self) -> Option<String> {
        self.jar.get(SESSION_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty())
    }

    pub fn notify(&mut self, level: Level, text: impl Into<String>) {
        self.outgoing.push(Notice { level, text: text.into() });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.notify(Level::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.notify(Level::Success, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.notify(Level::Warning, text);
    }

    pub fn start_session(&mut self, token: String) {
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::days(clamp_ttl_days(self.session_ttl_days)));
        self.jar = self.jar.clone().add(cookie);
    }

    pub fn end_session(&mut self) {
        self.user = None;
        self.jar = self.jar.clone().remove(Cookie::build(SESSION_COOKIE).path("/"));
    }

    /// 302 to `location`. Unseen notices, old and new, ride along in the
    /// cookie until some page renders them.
    pub fn redirect(mut self, location: &str) -> Response {
        let mut pending = std::mem::take(&mut self.incoming);
        pending.append(&mut self.outgoing);
        let jar = if pending.is_empty() {
            self.jar
        } else {
            self.jar.add(
                Cookie::build((MESSAGES_COOKIE, encode_notices(&pending)))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax),
            )
        };
        (StatusCode::FOUND, jar, [(header::LOCATION, location.to_string())]).into_response()
    }

    /// Sends the visitor to the login gate, remembering where they were.
    pub fn login_gate(self) -> Response {
        let location = format!("{LOGIN_GATE}?next={}", urlencoding::encode(&self.path));
        self.redirect(&location)
    }

    pub fn render(self, title: &str, body: Markup) -> Response {
        self.render_with_status(StatusCode::OK, title, body)
    }

    /// Renders a full page and consumes every pending notice.
    pub fn render_with_status(
        mut self,
        status: StatusCode,
        title: &str,
        body: Markup,
    ) -> Response {
        let mut notices = std::mem::take(&mut self.incoming);
        notices.append(&mut self.outgoing);
        let jar = if self.jar.get(MESSAGES_COOKIE).is_some() {
            self.jar.remove(Cookie::build(MESSAGES_COOKIE).path("/"))
        } else {
            self.jar
        };
        let page = templates::page(title, self.user.as_ref(), &notices, body);
        (status, jar, Html(page)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_survive_the_cookie_codec() {
        let notices = vec![
            Notice {
                level: Level::Warning,
                text: "You cannot have more than one rating per movie".into(),
            },
            Notice { level: Level::Success, text: "Welcome back; \"quoted\", 100%".into() },
        ];
        let encoded = encode_notices(&notices);
        assert!(!encoded.contains(';'));
        assert!(!encoded.contains(' '));
        assert_eq!(decode_notices(&encoded), notices);
    }

    #[test]
    fn garbage_decodes_to_nothing() {
        assert!(decode_notices("").is_empty());
        assert!(decode_notices("%7Bnot-json").is_empty());
    }
}
