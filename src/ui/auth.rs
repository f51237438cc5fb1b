//! Login, logout and the admin route guard.
//!
//! A browser is identified by an opaque session id cookie. The id addresses
//! the persisted [`SessionStore`] entry, so identity and token survive
//! reloads and server restarts until logout.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use maud::{html, Markup};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::form::{render_form, SubmitLabels};
use super::layout::{public_page, Notice};
use crate::forms::{login, FieldErrors, RawForm};
use crate::guard::{self, Access, RequiredRole, ADMIN_ROUTE, LOGIN_ROUTE};
use crate::models::{LoginResponse, User};
use crate::session::SessionStore;
use crate::AppState;

const SUBMIT: SubmitLabels = SubmitLabels {
    idle: "Login",
    busy: "Logging in…",
};

/// The session behind the request's session cookie, if any.
pub struct BrowserSession {
    store: Option<SessionStore>,
}

impl BrowserSession {
    pub fn resolve(jar: &CookieJar, state: &AppState) -> Self {
        let store = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value())
            .filter(|sid| !sid.is_empty())
            .map(|sid| state.session(sid));
        Self { store }
    }

    pub fn user(&self) -> Option<User> {
        self.store.as_ref().and_then(SessionStore::current_user)
    }

    pub fn store(&self) -> Option<&SessionStore> {
        self.store.as_ref()
    }

    pub fn into_store(self) -> Option<SessionStore> {
        self.store
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for BrowserSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self::resolve(&jar, state))
    }
}

/// Identity and token of an admin, attached to guarded requests.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user: User,
    pub token: String,
}

/// Middleware for the `/admin` tree.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = BrowserSession::resolve(&jar, &state)
        .store()
        .and_then(SessionStore::session);
    let access = guard::authorize(session.as_ref().map(|s| &s.user), RequiredRole::Admin);

    match (access, session) {
        (Access::Allow, Some(session)) => {
            request.extensions_mut().insert(AdminSession {
                user: session.user,
                token: session.token,
            });
            next.run(request).await
        }
        (Access::Redirect(target), _) => {
            debug!(path = %request.uri().path(), to = target, "Guard redirect");
            redirect(&request, target)
        }
        (Access::Allow, None) => redirect(&request, LOGIN_ROUTE),
    }
}

/// HTMX fragment requests get `HX-Redirect` so the whole page navigates
/// instead of the fragment swapping in a redirect target.
fn redirect(request: &Request, target: &'static str) -> Response {
    if request.headers().contains_key("hx-request") {
        let mut response = StatusCode::OK.into_response();
        response
            .headers_mut()
            .insert("hx-redirect", HeaderValue::from_static(target));
        response
    } else {
        Redirect::to(target).into_response()
    }
}

fn login_view(values: &RawForm, errors: &FieldErrors, notice: Option<&Notice>) -> Markup {
    let mut values = values.clone();
    values.remove("password");

    public_page(
        "Login",
        notice,
        html! {
            section class="container narrow" {
                div class="card" {
                    h1 { "Admin Login" }
                    (render_form(&login::SCHEMA, LOGIN_ROUTE, &values, errors, &SUBMIT))
                }
            }
        },
    )
}

pub async fn login_page(session: BrowserSession) -> Response {
    if session.user().is_some() {
        return Redirect::to(ADMIN_ROUTE).into_response();
    }
    login_view(&RawForm::new(), &FieldErrors::default(), None).into_response()
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let raw = RawForm::from_pairs(pairs);
    let credentials = match login::validate(&raw) {
        Ok(credentials) => credentials,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                login_view(&raw, &errors, None),
            )
                .into_response();
        }
    };

    let LoginResponse { user, token } = match state.api.login(&credentials).await {
        Ok(response) => response,
        Err(e) => {
            let status = match e.status() {
                Some(401) | Some(400) => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            };
            let notice = Notice::error("Login Failed", e.user_message());
            return (
                status,
                login_view(&raw, &FieldErrors::default(), Some(&notice)),
            )
                .into_response();
        }
    };

    let sid = uuid::Uuid::new_v4().to_string();
    let store = state.session(&sid);
    let persisted = tokio::task::spawn_blocking(move || store.login(user, token))
        .await
        .map_err(|e| e.to_string())
        .and_then(|r| r.map_err(|e| e.to_string()));
    if let Err(e) = persisted {
        error!(error = %e, "Failed to persist session");
        let notice = Notice::error(
            "Login Failed",
            "Your session could not be saved. Please try again.",
        );
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            login_view(&raw, &FieldErrors::default(), Some(&notice)),
        )
            .into_response();
    }

    let cookie = Cookie::build((state.config.session.cookie_name.clone(), sid))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), Redirect::to(ADMIN_ROUTE)).into_response()
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    session: BrowserSession,
) -> Response {
    if let Some(store) = session.into_store() {
        match tokio::task::spawn_blocking(move || store.logout()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to clear persisted session"),
            Err(e) => warn!(error = %e, "Session cleanup task failed"),
        }
    }
    let jar = jar.remove(Cookie::build((state.config.session.cookie_name.clone(), "")).path("/"));
    (jar, Redirect::to(LOGIN_ROUTE)).into_response()
}
