use std::sync::Arc;

use mongodb::{options::ClientOptions, Client};

use crate::{
    auth::jwt::TokenCodec,
    clock::{Clock, SystemClock},
    config::Config,
    errors::AppError,
    mailer::{self, Mailer},
    repos::{MongoUserRepository, UserRepository},
    services::{AdminUserService, AuthService},
    session::{Session, SessionMonitor, SessionVerifier},
};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub auth: AuthService,
    pub admin: AdminUserService,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn new(cfg: &Config) -> Result<Self, AppError> {
        let mut opts = ClientOptions::parse(&cfg.mongodb_uri)
            .await
            .map_err(AppError::storage("mongo.connect"))?;
        opts.app_name = Some("portfolio-auth".to_string());
        let client = Client::with_options(opts).map_err(AppError::storage("mongo.connect"))?;
        let db = client.database(&cfg.db_name);

        let users = MongoUserRepository::new(&db);
        users.ensure_indexes().await?;

        Ok(Self::from_parts(
            cfg.clone(),
            Arc::new(users),
            mailer::from_config(cfg),
            Arc::new(SystemClock),
        ))
    }

    pub fn from_parts(
        cfg: Config,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::from_config(&cfg));
        let verifier = SessionVerifier::new(codec, clock.clone(), &cfg);
        Self {
            auth: AuthService::new(users.clone(), verifier),
            admin: AdminUserService::new(users, clock),
            mailer,
            cfg: Arc::new(cfg),
        }
    }

    /// For embedders holding a long-lived session. Browsers poll `/auth/me` instead.
    pub fn monitor_session(&self, session: Arc<Session>) -> SessionMonitor {
        self.auth.monitor(session, self.cfg.session_check_interval())
    }
}
