pub mod jwt;
pub mod user;
