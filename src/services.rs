pub mod admin_service;
pub mod auth_service;

pub use admin_service::AdminUserService;
pub use auth_service::{AuthService, Authenticated};
