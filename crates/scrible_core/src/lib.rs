pub mod capture;
pub mod clock;
pub mod domain;
pub mod identity;
pub mod ids;
pub mod ports;
pub mod repository;
pub mod store;

pub use capture::{capture_text, default_title, CaptureError};
pub use clock::{ManualClock, SystemClock};
pub use domain::{
    FontStyle, NewNotebook, Notebook, NotebookPatch, PaperStyle, ScanFile, ScanKind,
    UserCredentials, UserProfile, GUEST_USER_ID,
};
pub use identity::{AccountIdentity, GuestIdentity};
pub use ids::{TimestampIds, UuidIds};
pub use ports::{
    Clock, IdGenerator, IdentityProvider, PortError, PortResult, ScanConverter, SlotStorage,
    TextExtractionService,
};
pub use repository::NotebookRepository;
pub use store::{MemoryStorage, RecordStore};
