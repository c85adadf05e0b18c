use std::{fmt, sync::Arc};

use anyhow::Context;
use chrono::TimeDelta;
use roster_config::Config;
use roster_core::{
    AuthenticationGate, PasswordVerify, TokenCodec,
    database::UsersRepository,
};

pub type DirectoryGate = AuthenticationGate<Arc<dyn UsersRepository>>;

/// Shared, immutable application state. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UsersRepository>,
    pub passwords: Arc<dyn PasswordVerify>,
    pub tokens: Arc<TokenCodec>,
    pub gate: Arc<DirectoryGate>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        users: Arc<dyn UsersRepository>,
        passwords: Arc<dyn PasswordVerify>,
    ) -> anyhow::Result<Self> {
        let ttl = TimeDelta::from_std(config.auth.token_ttl)
            .context("token TTL is out of range")?;
        let tokens = Arc::new(TokenCodec::new(&config.auth.token_secret, ttl));
        let gate = Arc::new(AuthenticationGate::new(
            Arc::clone(&tokens),
            Arc::clone(&users),
        ));

        Ok(Self {
            config,
            users,
            passwords,
            tokens,
            gate,
        })
    }
}
