//! plausch-store – Vertraege der externen Kollaborateure
//!
//! Der Relay-Kern persistiert selbst nichts: Authentifizierung,
//! Nachrichten-History und Freundschaftsdaten gehoeren der externen
//! REST-Schicht. Dieses Crate definiert die Trait-Naehte dorthin und
//! liefert In-Memory-Implementierungen fuer den Standalone-Betrieb
//! und fuer Tests.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

// Bequeme Re-Exporte
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryAuthProvider, MemoryFriendStore, MemoryMessageStore};
pub use models::{NachrichtRecord, NeueNachricht};
pub use repository::{AuthProvider, FriendStore, MessageStore};
