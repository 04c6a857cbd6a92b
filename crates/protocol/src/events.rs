//! Ereignis-Definitionen fuer das Socket-Protokoll
//!
//! Reproduziert die Ereignisoberflaeche des bestehenden Web-Clients:
//! drei Client-Ereignisse (`registerUser`, `registerRoom`, `sendMessage`)
//! und fuenf Server-Ereignisse (`message`, `receivedMessage`,
//! `friendRequest`, `acceptedFriendRequest`, `deleteFriendRequest`).
//! Zusaetzlich ein `error`-Ereignis fuer Fehlerantworten an die
//! ausloesende Verbindung.
//!
//! ## Design
//! - JSON-Serialisierung via serde (TCP, nicht zeitkritisch)
//! - Tagged Enums fuer typsichere Ereignistypen; das `type`-Feld traegt
//!   den Ereignisnamen des Client-Vertrags
//! - Payload-Felder in camelCase, wie vom Client erwartet

use plausch_core::types::{FriendRelation, RoomId, UserId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer Error-Ereignisse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Allgemein
    InternalError,
    InvalidRequest,
    // Session
    NotRegistered,
    AuthFailed,
    // Raum
    RoomNotFound,
    RoomNotVerified,
    NotParticipant,
}

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Bindet die Verbindung an eine Benutzer-Identitaet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    /// Identitaets-Token aus der externen Auth-Schicht
    pub user_id: String,
}

/// Meldet einen Raum fuer das Paar (userId, friendId) an
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRoom {
    /// Eigene Identitaet laut Client (die Session-Bindung ist massgeblich)
    pub user_id: UserId,
    /// Identitaet des Gegenuebers
    pub friend_id: UserId,
}

/// Sendet eine Chat-Nachricht in einen verifizierten Raum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub room_id: RoomId,
    pub message: String,
    /// Anzeigename des Absenders, wird unveraendert weitergereicht
    pub sender_username: String,
}

/// Alle Ereignisse die der Client an den Relay-Kern sendet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    RegisterUser(RegisterUser),
    RegisterRoom(RegisterRoom),
    SendMessage(SendMessage),
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Raum-Zustand fuer das `message`-Ereignis
///
/// Jeder Teilnehmer sieht das Gegenueber als `friendId`; die `roomId`
/// ist fuer beide Seiten identisch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub friend_id: UserId,
    pub room_verified: bool,
}

/// Zugestellte Chat-Nachricht (`receivedMessage`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub room_id: RoomId,
    pub message: String,
    pub sender_username: String,
}

/// Freundschafts-Ereignis mit der Beziehung aus der REST-Schicht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEventPayload {
    pub message: String,
    pub data: FriendRelation,
}

/// Fehlerantwort an die ausloesende Verbindung
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub code: ErrorCode,
    pub message: String,
}

/// Alle Ereignisse die der Relay-Kern an Clients sendet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Raum wurde verifiziert bzw. Raum-Zustand zur Resynchronisation
    Message(RoomInfo),
    /// Chat-Nachricht vom Gegenueber
    ReceivedMessage(ReceivedMessage),
    /// Neue Freundschaftsanfrage (nur an den Empfaenger)
    FriendRequest(FriendEventPayload),
    /// Anfrage angenommen (nur an den Anfragesteller)
    AcceptedFriendRequest(FriendEventPayload),
    /// Beziehung geloescht (nur an die nicht-ausloesende Seite)
    DeleteFriendRequest(FriendEventPayload),
    /// Fehlerantwort, nie broadcast
    Error(ErrorEvent),
}

impl ServerEvent {
    /// Erstellt ein `message`-Ereignis fuer einen Teilnehmer
    pub fn room(room_id: RoomId, friend_id: UserId, room_verified: bool) -> Self {
        Self::Message(RoomInfo {
            room_id,
            friend_id,
            room_verified,
        })
    }

    /// Erstellt ein `receivedMessage`-Ereignis
    pub fn received(room_id: RoomId, message: impl Into<String>, sender_username: impl Into<String>) -> Self {
        Self::ReceivedMessage(ReceivedMessage {
            room_id,
            message: message.into(),
            sender_username: sender_username.into(),
        })
    }

    /// Erstellt eine Fehlerantwort
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ErrorEvent {
            code,
            message: message.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
