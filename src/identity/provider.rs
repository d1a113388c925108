use std::path::PathBuf;
use thiserror::Error;
use crate::tprintln;

use super::principal::Principal;
use super::session::{Session, SessionManager};

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub session: Session,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong secret; callers must surface a single generic
    /// message and never say which half was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Guarded operation reached without a valid session.
    #[error("not authenticated")]
    Unauthenticated,
    #[error("credential store error: {0}")]
    Store(#[source] anyhow::Error),
}

pub trait AuthProvider: Send + Sync {
    fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AuthError>;
}

/// Verifies against the users.json credential store and issues a session.
pub struct LocalAuthProvider {
    pub state_root: PathBuf,
    pub sm: SessionManager,
}

impl LocalAuthProvider {
    pub fn new(state_root: PathBuf, sm: SessionManager) -> Self {
        Self { state_root, sm }
    }
}

impl AuthProvider for LocalAuthProvider {
    fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let ok = crate::security::authenticate(&self.state_root, &req.username, &req.password)
            .map_err(AuthError::Store)?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }
        let principal = Principal::operator(req.username.clone());
        let session = self.sm.issue(principal);
        tprintln!("auth.login user={} sid={}", req.username, session.session_id);
        Ok(LoginResponse { session })
    }
}
