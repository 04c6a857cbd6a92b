//! plausch-relay – Presence-, Raum- und Zustellungs-Kern
//!
//! Dieser Crate implementiert den Koordinations-Kern des Relay-Dienstes:
//!
//! ```text
//! PresenceRegistry      – Wer ist online, mit welchen Verbindungen (Tabs)
//! RoomDirectory         – Kanonische Raeume pro ungeordnetem Benutzerpaar,
//!                         zweiseitiger Verifikations-Handshake
//! MessageRelay          – Zustellung an die Live-Verbindungen des
//!                         Gegenuebers, in Reihenfolge, Persistenz danach
//! FriendEventBroadcaster – Gezielter Push von Freundschafts-Ereignissen
//! ```
//!
//! Alle Zustands-Manager sind thread-safe via Arc + DashMap; Clone teilt
//! den inneren Zustand. Kein Manager blockiert unter einem Schloss auf
//! externem I/O.

pub mod error;
pub mod friends;
pub mod handle;
pub mod presence;
pub mod relay;
pub mod rooms;

// Bequeme Re-Exporte
pub use error::{RelayError, RelayResult};
pub use friends::FriendEventBroadcaster;
pub use handle::ConnectionHandle;
pub use presence::PresenceRegistry;
pub use relay::{MessageRelay, Zustellbericht};
pub use rooms::{Raum, RaumAnmeldung, RoomDirectory};
