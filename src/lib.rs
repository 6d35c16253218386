pub mod auth;
pub mod clock;
pub mod config;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod password;
pub mod repos;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

pub use config::Config;
pub use errors::AppError;
pub use routes::app_router;
pub use state::AppState;
