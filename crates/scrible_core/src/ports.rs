//! crates/scrible_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the storage medium, the clock and the OCR backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ScanFile;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// Ordinary domain outcomes (a missing notebook, a blank append) are never errors.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable key/value slots, modelled on browser local storage.
///
/// Each `set` replaces the whole value of a slot; implementations must not let a
/// reader observe a half-written value.
pub trait SlotStorage: Send + Sync {
    fn get(&self, slot: &str) -> PortResult<Option<String>>;

    fn set(&self, slot: &str, value: &str) -> PortResult<()>;

    fn remove(&self, slot: &str) -> PortResult<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Produces candidate record ids. Callers still check candidates against the
/// ids already stored.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Resolves whose notebooks the current caller may see.
pub trait IdentityProvider: Send + Sync {
    /// `None` means nobody is signed in.
    fn current_user_id(&self) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Extracts the text visible in an image.
    async fn extract_text(&self, file: &ScanFile) -> PortResult<String>;
}

/// Turns documents the extraction backend cannot read into images it can.
#[async_trait]
pub trait ScanConverter: Send + Sync {
    /// Renders the first page of a PDF as an image file.
    async fn first_page_image(&self, file: &ScanFile) -> PortResult<ScanFile>;
}
