//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::{Config, IdStrategy, IdentityMode};
use scrible_core::{
    AccountIdentity, Clock, GuestIdentity, IdGenerator, IdentityProvider, NotebookRepository,
    ScanConverter, SlotStorage, SystemClock, TextExtractionService, TimestampIds, UuidIds,
};
use std::sync::Arc;

//=========================================================================================
// Identity
//=========================================================================================

/// The identity source active in this deployment.
#[derive(Clone)]
pub enum Identity {
    Guest(GuestIdentity),
    Accounts(Arc<AccountIdentity>),
}

impl Identity {
    pub fn provider(&self) -> &dyn IdentityProvider {
        match self {
            Identity::Guest(guest) => guest,
            Identity::Accounts(accounts) => &**accounts,
        }
    }

    /// The account store, when accounts are enabled.
    pub fn accounts(&self) -> Option<&AccountIdentity> {
        match self {
            Identity::Guest(_) => None,
            Identity::Accounts(accounts) => Some(&**accounts),
        }
    }
}

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub notebooks: Arc<NotebookRepository>,
    pub identity: Identity,
    pub extractor: Arc<dyn TextExtractionService>,
    pub converter: Arc<dyn ScanConverter>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires the repository and identity source over `storage` as `config` asks.
    pub fn new(
        config: &Config,
        storage: Arc<dyn SlotStorage>,
        extractor: Arc<dyn TextExtractionService>,
        converter: Arc<dyn ScanConverter>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let ids: Arc<dyn IdGenerator> = match config.id_strategy {
            IdStrategy::Timestamp => Arc::new(TimestampIds::new()),
            IdStrategy::Uuid => Arc::new(UuidIds),
        };

        let identity = match config.identity_mode {
            IdentityMode::Guest => Identity::Guest(GuestIdentity),
            IdentityMode::Accounts => Identity::Accounts(Arc::new(AccountIdentity::new(
                storage.clone(),
                ids.clone(),
            ))),
        };

        Self {
            notebooks: Arc::new(NotebookRepository::new(storage, clock.clone(), ids)),
            identity,
            extractor,
            converter,
            clock,
        }
    }
}
