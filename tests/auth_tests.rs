//! Credential store and login tests: positive and negative paths through the
//! Argon2-backed users.json store and the local auth provider.

use anyhow::Result;
use tempfile::tempdir;

use netveil_console::identity::{AuthError, AuthProvider, LocalAuthProvider, LoginRequest, SessionManager};
use netveil_console::security;

#[test]
fn default_admin_is_provisioned_once() -> Result<()> {
    let tmp = tempdir()?;
    security::ensure_default_admin(tmp.path())?;
    assert!(tmp.path().join("users.json").exists());

    // The default secret honors the same env override the server uses
    let pw = std::env::var("NETVEIL_ADMIN_PASSWORD").unwrap_or_else(|_| "netveil".to_string());
    assert!(security::authenticate(tmp.path(), "admin", &pw)?);
    assert!(!security::authenticate(tmp.path(), "admin", "not-the-secret")?);

    // Re-provisioning must not reset an existing store
    security::add_user(tmp.path(), "admin", "rotated")?;
    security::ensure_default_admin(tmp.path())?;
    assert!(security::authenticate(tmp.path(), "admin", "rotated")?);
    Ok(())
}

#[test]
fn unknown_user_and_wrong_secret_both_fail_closed() -> Result<()> {
    let tmp = tempdir()?;
    security::add_user(tmp.path(), "operator", "s3cr3t!")?;

    assert!(security::authenticate(tmp.path(), "operator", "s3cr3t!")?);
    assert!(!security::authenticate(tmp.path(), "operator", "wrong")?);
    assert!(!security::authenticate(tmp.path(), "nobody", "s3cr3t!")?);
    // Empty store: nothing authenticates
    let empty = tempdir()?;
    assert!(!security::authenticate(empty.path(), "operator", "s3cr3t!")?);
    Ok(())
}

#[test]
fn login_issues_a_validatable_session() -> Result<()> {
    let tmp = tempdir()?;
    security::add_user(tmp.path(), "operator", "s3cr3t!")?;
    let provider = LocalAuthProvider::new(tmp.path().to_path_buf(), SessionManager::default());

    let resp = provider
        .login(&LoginRequest { username: "operator".into(), password: "s3cr3t!".into() })
        .expect("login with correct secret should succeed");
    let principal = provider
        .sm
        .validate(&resp.session.token)
        .expect("freshly issued session must validate");
    assert_eq!(principal.user_id, "operator");
    Ok(())
}

#[test]
fn login_failure_is_invalid_credentials_either_way() -> Result<()> {
    let tmp = tempdir()?;
    security::add_user(tmp.path(), "operator", "s3cr3t!")?;
    let provider = LocalAuthProvider::new(tmp.path().to_path_buf(), SessionManager::default());

    let wrong_secret = provider.login(&LoginRequest { username: "operator".into(), password: "nope".into() });
    assert!(matches!(wrong_secret, Err(AuthError::InvalidCredentials)));

    let unknown_user = provider.login(&LoginRequest { username: "ghost".into(), password: "s3cr3t!".into() });
    assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    Ok(())
}
