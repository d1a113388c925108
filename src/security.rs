//! Operator credential store.
//! Users live in users.json under the state root as Argon2 PHC hashes; the
//! console never stores a plaintext secret. A default admin is provisioned on
//! first run so a fresh install is immediately reachable.

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub password_hash: String,
}

fn users_path(state_root: &Path) -> PathBuf {
    state_root.join("users.json")
}

fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))?
        .to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else {
        false
    }
}

fn read_users(path: &Path) -> Result<Vec<UserEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    let users: Vec<UserEntry> = serde_json::from_str(&raw)?;
    Ok(users)
}

fn write_users(path: &Path, users: &[UserEntry]) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(users)?;
    std::fs::write(path, raw)?;
    Ok(())
}

/// Provision the single default operator on first run. No-op once users.json
/// exists, so a changed admin password survives restarts.
pub fn ensure_default_admin(state_root: &Path) -> Result<()> {
    let p = users_path(state_root);
    if p.exists() {
        return Ok(());
    }
    let password = std::env::var("NETVEIL_ADMIN_PASSWORD").unwrap_or_else(|_| "netveil".to_string());
    let entry = UserEntry { username: "admin".to_string(), password_hash: hash_password(&password)? };
    write_users(&p, &[entry])
}

/// Add or replace a user with a freshly hashed password.
pub fn add_user(state_root: &Path, username: &str, password: &str) -> Result<()> {
    let p = users_path(state_root);
    let mut users = read_users(&p)?;
    users.retain(|u| u.username != username);
    users.push(UserEntry { username: username.to_string(), password_hash: hash_password(password)? });
    write_users(&p, &users)
}

/// Check a username/secret pair against the store. Unknown usernames and
/// wrong secrets both come back as Ok(false); only store corruption errors.
pub fn authenticate(state_root: &Path, username: &str, password: &str) -> Result<bool> {
    let users = read_users(&users_path(state_root))?;
    for u in &users {
        if u.username == username {
            return Ok(verify_password(&u.password_hash, password));
        }
    }
    Ok(false)
}
