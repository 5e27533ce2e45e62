//! Login, logout, registration, password recovery and the admin guard.

use tracing::{info, warn};

use super::{require, AppContext, Outcome, StatusMessage};
use crate::error::{ClientError, Result};
use crate::models::{ForgotPasswordRequest, LoginRequest, RegisterRequest};
use crate::session::{SessionStore, ROLE_ADMIN, ROLE_USER};

/// Where a freshly logged-in user is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Admin,
    Storefront,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Sent whether or not the address is registered.
pub const RECOVERY_MESSAGE: &str = "If the email is registered, a reset link will be sent.";

pub async fn login(ctx: &AppContext, form: &LoginForm) -> Outcome<Landing> {
    match try_login(ctx, form).await {
        Ok(landing) => Outcome::done(landing, StatusMessage::success("Login successful!")),
        Err(e) => Outcome::failed(e),
    }
}

async fn try_login(ctx: &AppContext, form: &LoginForm) -> Result<Landing> {
    let username = require(&form.username, "Username and password are required.")?;
    let password = require(&form.password, "Username and password are required.")?;

    let response = ctx.catalog.login(&LoginRequest { username, password }).await?;

    let token = response.token.filter(|t| !t.is_empty());
    let username = response.username.filter(|u| !u.is_empty());
    let (Some(token), Some(username)) = (token, username) else {
        return Err(ClientError::InvalidResponse("login response lacks token or username".to_string()));
    };

    let roles = response.roles.unwrap_or_else(|| vec![ROLE_USER.to_string()]);
    ctx.session.set_session(&token, &username, &roles)?;
    info!(%username, ?roles, "Logged in");

    Ok(if roles.iter().any(|r| r == ROLE_ADMIN) {
        Landing::Admin
    } else {
        Landing::Storefront
    })
}

pub fn logout(ctx: &AppContext) -> Outcome<()> {
    match ctx.session.clear_session() {
        Ok(()) => Outcome::done((), StatusMessage::success("Logged out.")),
        Err(e) => Outcome::failed(e),
    }
}

pub async fn register(ctx: &AppContext, form: &RegisterForm) -> Outcome<()> {
    let result = async {
        let request = RegisterRequest {
            full_name: require(&form.full_name, "Full name is required.")?,
            username: require(&form.username, "Username is required.")?,
            email: require(&form.email, "Email is required.")?,
            password: require(&form.password, "Password is required.")?,
        };
        ctx.catalog.register(&request).await
    }
    .await;

    match result {
        Ok(reply) => Outcome::done((), StatusMessage::success(reply.message)),
        Err(e) => Outcome::failed(e),
    }
}

/// Password recovery.
///
/// Unless `password_recovery_endpoint` is enabled no request is made; either
/// way the reply is the same for known and unknown addresses.
pub async fn recover_password(ctx: &AppContext, email: &str) -> Outcome<()> {
    let email = match require(email, "Email is required.") {
        Ok(email) => email,
        Err(e) => return Outcome::failed(e),
    };

    if ctx.config.password_recovery_endpoint {
        if let Err(e) = ctx.catalog.forgot_password(&ForgotPasswordRequest { email }).await {
            return Outcome::failed(e);
        }
    } else {
        info!("Password recovery requested; endpoint disabled, not contacting server");
    }
    Outcome::done((), StatusMessage::success(RECOVERY_MESSAGE))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed { username: Option<String> },
    NotLoggedIn,
    Forbidden,
}

/// Decide whether admin commands are offered.
///
/// Display gating only: the roles come from the login response and are not
/// verified here. The backend checks every admin request itself.
pub fn admin_guard(session: &SessionStore) -> AccessDecision {
    if !session.is_authenticated() {
        return AccessDecision::NotLoggedIn;
    }
    if !session.has_role(ROLE_ADMIN) {
        warn!(username = ?session.username(), "Admin access denied");
        return AccessDecision::Forbidden;
    }
    AccessDecision::Allowed { username: session.username() }
}

/// The guard as a `Result`, for admin controllers to bail out early.
pub(crate) fn require_admin(session: &SessionStore) -> Result<Option<String>> {
    match admin_guard(session) {
        AccessDecision::Allowed { username } => Ok(username),
        AccessDecision::NotLoggedIn => Err(ClientError::AuthRequired),
        AccessDecision::Forbidden => Err(ClientError::AccessDenied(
            "only administrators can use admin commands".to_string(),
        )),
    }
}

/// Who is logged in, for the `whoami` command and the navigation header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub username: Option<String>,
    pub roles: Vec<String>,
    pub is_admin: bool,
}

pub fn whoami(session: &SessionStore) -> Outcome<SessionSummary> {
    if !session.is_authenticated() {
        return Outcome::done(
            SessionSummary { username: None, roles: vec![], is_admin: false },
            StatusMessage::info("Not logged in."),
        );
    }
    let summary = SessionSummary {
        username: session.username(),
        roles: session.roles().into_iter().collect(),
        is_admin: session.has_role(ROLE_ADMIN),
    };
    let name = summary.username.clone().unwrap_or_default();
    Outcome::done(summary, StatusMessage::info(format!("Hello, {name}!")))
}
