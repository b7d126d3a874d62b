//! crates/scrible_core/src/identity.rs
//!
//! The two identity sources: a fixed guest, or local accounts backed by a
//! credential store. Exactly one is active in a deployment.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::domain::{UserCredentials, UserProfile, GUEST_USER_ID};
use crate::ids::draw_unused_id;
use crate::ports::{IdGenerator, IdentityProvider, PortError, PortResult, SlotStorage};
use crate::store::{RecordStore, CURRENT_USER_SLOT, USERS_SLOT};

//=========================================================================================
// Guest
//=========================================================================================

/// Everyone is the guest.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuestIdentity;

impl IdentityProvider for GuestIdentity {
    fn current_user_id(&self) -> PortResult<Option<String>> {
        Ok(Some(GUEST_USER_ID.to_string()))
    }
}

//=========================================================================================
// Local Accounts
//=========================================================================================

/// Accounts kept in local storage, with a single signed-in profile.
///
/// This is a convenience login for a personal device, not a security boundary.
pub struct AccountIdentity {
    storage: Arc<dyn SlotStorage>,
    users: RecordStore<UserCredentials>,
    ids: Arc<dyn IdGenerator>,
    cycle: Mutex<()>,
}

impl AccountIdentity {
    pub fn new(storage: Arc<dyn SlotStorage>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            users: RecordStore::new(storage.clone(), USERS_SLOT),
            storage,
            ids,
            cycle: Mutex::new(()),
        }
    }

    /// Creates an account and signs it in. `None` if the email is taken.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> PortResult<Option<UserProfile>> {
        let _cycle = self
            .cycle
            .lock()
            .map_err(|_| PortError::Unexpected("account mutex poisoned".to_string()))?;
        let mut users = self.users.read_all()?;

        if users.iter().any(|u| u.email == email) {
            info!("Registration refused, {} is already registered", email);
            return Ok(None);
        }

        let id = draw_unused_id(self.ids.as_ref(), |candidate| {
            users.iter().any(|u| u.id == candidate)
        })?;

        let credentials = UserCredentials {
            id,
            email: email.to_string(),
            name: name.to_string(),
            password: hash_password(password)?,
        };
        let profile = credentials.profile();

        users.push(credentials);
        self.users.write_all(&users)?;
        self.set_current(&profile)?;
        info!("Registered user {}", profile.id);
        Ok(Some(profile))
    }

    /// Signs in. `None` for an unknown email or a wrong password.
    pub fn login(&self, email: &str, password: &str) -> PortResult<Option<UserProfile>> {
        let users = self.users.read_all()?;
        let Some(user) = users.iter().find(|u| u.email == email) else {
            return Ok(None);
        };

        if !verify_password(password, &user.password) {
            return Ok(None);
        }

        let profile = user.profile();
        self.set_current(&profile)?;
        info!("User {} signed in", profile.id);
        Ok(Some(profile))
    }

    pub fn logout(&self) -> PortResult<()> {
        self.storage.remove(CURRENT_USER_SLOT)
    }

    /// The signed-in profile. A corrupt slot counts as signed out and is cleared.
    pub fn current_user(&self) -> PortResult<Option<UserProfile>> {
        let Some(raw) = self.storage.get(CURRENT_USER_SLOT)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("Clearing unreadable current user: {}", e);
                self.storage.remove(CURRENT_USER_SLOT)?;
                Ok(None)
            }
        }
    }

    fn set_current(&self, profile: &UserProfile) -> PortResult<()> {
        let raw = serde_json::to_string(profile)
            .map_err(|e| PortError::Unexpected(format!("Failed to encode profile: {}", e)))?;
        self.storage.set(CURRENT_USER_SLOT, &raw)
    }
}

impl IdentityProvider for AccountIdentity {
    fn current_user_id(&self) -> PortResult<Option<String>> {
        Ok(self.current_user()?.map(|profile| profile.id))
    }
}

fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}
