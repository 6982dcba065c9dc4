use super::auth::{AuthContext, AuthUser};
use crate::error::ApiError;

/// Passes iff authentication populated the context.
pub fn require_logged_in(context: &AuthContext) -> Result<&AuthUser, ApiError> {
    context
        .user()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

/// Passes iff the acting user is an admin. Implies login.
pub fn require_admin(context: &AuthContext) -> Result<&AuthUser, ApiError> {
    let user = require_logged_in(context)?;
    if user.is_admin {
        Ok(user)
    } else {
        Err(ApiError::unauthorized("Admin access required"))
    }
}

/// Passes iff the acting user is an admin or is the target user itself.
pub fn require_admin_or_self<'a>(context: &'a AuthContext, username: &str) -> Result<&'a AuthUser, ApiError> {
    let user = require_logged_in(context)?;
    if user.is_admin || user.username == username {
        Ok(user)
    } else {
        Err(ApiError::unauthorized("Admin or same-user access required"))
    }
}
