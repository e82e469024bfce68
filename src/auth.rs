use crate::settings::Settings;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::error::ApiError;

/// Caller roles, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Staff,
    Admin,
}

pub fn authenticate(
    settings: &Settings,
    auth: Option<Authorization<Bearer>>,
    query_token: Option<&str>,
) -> Result<Role, ApiError> {
    let provided_token = auth
        .map(|a| a.token().to_string())
        .or_else(|| query_token.map(|s| s.to_string()));
    match provided_token {
        Some(token) if token == settings.admin_token => Ok(Role::Admin),
        Some(token) if token == settings.staff_token => Ok(Role::Staff),
        _ => Err(ApiError::Unauthorized(
            "Invalid authentication token".into(),
        )),
    }
}

/// Authenticates the caller and checks it holds at least `required`.
pub fn authorize(
    settings: &Settings,
    auth: Option<Authorization<Bearer>>,
    query_token: Option<&str>,
    required: Role,
) -> Result<Role, ApiError> {
    let role = authenticate(settings, auth, query_token)?;
    if role >= required {
        Ok(role)
    } else {
        Err(ApiError::Forbidden(format!("{required:?} role required")))
    }
}
