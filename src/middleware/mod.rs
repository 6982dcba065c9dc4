pub mod auth;
pub mod policy;
pub mod response;

pub use auth::{authenticate, AuthContext, AuthUser};
pub use policy::{require_admin, require_admin_or_self, require_logged_in};
pub use response::{ApiResponse, ApiResult};
