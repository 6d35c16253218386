pub mod context;
pub mod cookies;
pub mod monitor;
pub mod store;
pub mod verifier;

pub use context::Session;
pub use cookies::CookieSession;
pub use monitor::{SessionMonitor, SessionStatus};
pub use store::{CookieOptions, MemorySessionStore, SessionKey, SessionStore};
pub use verifier::{SessionState, SessionVerifier, Verified};
