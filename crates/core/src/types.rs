//! Gemeinsame Identifikations- und Domaenentypen fuer Plausch
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Benutzer-Identitaet
///
/// Wird vom externen Auth-System vergeben und hier nur weitergereicht –
/// der Inhalt ist fuer den Relay-Kern ein opaker String.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Erstellt eine UserId aus einer externen Identitaet
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt die Identitaet als String-Slice zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// Kanonische Raum-Identitaet
///
/// Eine reine Funktion des ungeordneten Teilnehmer-Paars: beide Seiten
/// leiten fuer dasselbe Paar dieselbe RoomId ab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    /// Leitet die kanonische RoomId aus einem ungeordneten Paar ab
    ///
    /// Sortiert die beiden Identitaeten lexikografisch und verbindet sie,
    /// sodass `from_pair(a, b) == from_pair(b, a)` gilt.
    pub fn from_pair(a: &UserId, b: &UserId) -> Self {
        let (erster, zweiter) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{}#{}", erster.as_str(), zweiter.as_str()))
    }

    /// Gibt die Raum-Identitaet als String-Slice zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room:{}", self.0)
    }
}

/// Eindeutige Verbindungs-ID
///
/// Wird von der Transportschicht beim Accept vergeben, eine pro Link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Status einer Freundschaftsbeziehung (Vokabular der externen REST-Schicht)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Blocked,
}

/// Freundschaftsbeziehung wie sie die externe REST-Schicht persistiert
///
/// `user_id` ist der Anfragesteller, `friend_id` der Empfaenger der
/// Anfrage. Das Feld `_id` stammt aus dem externen Datenbestand und wird
/// unveraendert durchgereicht.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRelation {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: FriendStatus,
}
