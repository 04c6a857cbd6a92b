//! Datensaetze der externen Nachrichten-Persistenz

use chrono::{DateTime, Utc};
use plausch_core::types::{RoomId, UserId};
use uuid::Uuid;

/// Eine neu zu persistierende Chat-Nachricht
///
/// Wird vom MessageRelay nach dem Live-Fan-out an den MessageStore
/// uebergeben, damit der Empfaenger sie beim naechsten History-Abruf
/// erhaelt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeueNachricht {
    pub raum_id: RoomId,
    pub sender: UserId,
    pub empfaenger: UserId,
    pub inhalt: String,
    pub gesendet_am: DateTime<Utc>,
}

/// Persistierter Nachrichten-Datensatz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NachrichtRecord {
    pub id: Uuid,
    pub raum_id: RoomId,
    pub sender: UserId,
    pub empfaenger: UserId,
    pub inhalt: String,
    pub gesendet_am: DateTime<Utc>,
}

impl NachrichtRecord {
    /// Erstellt einen Datensatz aus einer neuen Nachricht
    pub fn aus(nachricht: NeueNachricht) -> Self {
        Self {
            id: Uuid::new_v4(),
            raum_id: nachricht.raum_id,
            sender: nachricht.sender,
            empfaenger: nachricht.empfaenger,
            inhalt: nachricht.inhalt,
            gesendet_am: nachricht.gesendet_am,
        }
    }
}
