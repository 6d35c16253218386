#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use portfolio_auth::{
    clock::ManualClock,
    dto::auth::RegisterRequest,
    mailer::LogMailer,
    models::user::Identity,
    repos::{MemoryUserRepository, UserRepository},
    session::{MemorySessionStore, Session},
    AppState, Config,
};

pub const PASSWORD: &str = "correct-horse-battery";

pub struct Harness {
    pub state: Arc<AppState>,
    pub users: Arc<MemoryUserRepository>,
    pub clock: Arc<ManualClock>,
}

pub fn test_config() -> Config {
    Config {
        jwt_access_secret: Some("access-secret-for-tests".into()),
        jwt_refresh_secret: Some("refresh-secret-for-tests".into()),
        contact_inbox: Some("inbox@example.com".into()),
        ..Config::default()
    }
}

pub fn start() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

pub fn harness() -> Harness {
    harness_with(test_config())
}

pub fn harness_with(cfg: Config) -> Harness {
    let users = Arc::new(MemoryUserRepository::new());
    let clock = Arc::new(ManualClock::new(start()));
    let state = AppState::from_parts(
        cfg,
        users.clone() as Arc<dyn UserRepository>,
        Arc::new(LogMailer),
        clock.clone(),
    );
    Harness {
        state: Arc::new(state),
        users,
        clock,
    }
}

impl Harness {
    pub async fn register(&self, name: &str, email: &str) -> Identity {
        self.state
            .auth
            .register(RegisterRequest {
                full_name: name.into(),
                email: email.into(),
                password: PASSWORD.into(),
            })
            .await
            .expect("register")
    }

    pub fn advance(&self, secs: i64) {
        self.clock.advance(Duration::seconds(secs));
    }
}

pub fn memory_session() -> (Arc<MemorySessionStore>, Session) {
    let store = Arc::new(MemorySessionStore::new());
    let session = Session::new(store.clone());
    (store, session)
}
