pub mod jwt;
pub mod tokens;

pub use jwt::TokenCodec;
pub use tokens::{issue_session_tokens, IssuedTokens};
