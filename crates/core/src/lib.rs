//! plausch-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Plausch-Crates gemeinsam genutzt werden: Identitaets-Newtypes
//! und die Freundschafts-Datentypen der externen REST-Schicht.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{ConnectionId, FriendRelation, FriendStatus, RoomId, UserId};
