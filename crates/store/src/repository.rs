//! Trait-Vertraege der externen Kollaborateure
//!
//! Entkoppeln den Relay-Kern von der konkreten REST/Datenbank-Schicht.
//! Die Traits verwenden async fn ohne Send-Garantie (async_fn_in_trait);
//! die Verbindungs-Tasks laufen deshalb in einer `LocalSet`, siehe
//! plausch-session.

use plausch_core::types::{FriendRelation, UserId};

use crate::error::StoreResult;
use crate::models::{NachrichtRecord, NeueNachricht};

/// Prueft Identitaets-Token der externen Auth-Schicht
#[allow(async_fn_in_trait)]
pub trait AuthProvider: Send + Sync {
    /// Prueft ein Token und gibt die zugehoerige Identitaet zurueck
    ///
    /// Lehnt mit `StoreError::IdentitaetUngueltig` ab wenn das Token
    /// unbekannt oder gesperrt ist.
    async fn identitaet_pruefen(&self, token: &str) -> StoreResult<UserId>;
}

/// Persistenz fuer Chat-Nachrichten
///
/// Der Relay-Kern haengt jede Nachricht genau einmal an; die History
/// dient dem Empfaenger als Quelle nach Reconnect oder Offline-Phasen.
#[allow(async_fn_in_trait)]
pub trait MessageStore: Send + Sync {
    /// Haengt eine Nachricht an den Bestand an
    async fn anhaengen(&self, nachricht: NeueNachricht) -> StoreResult<NachrichtRecord>;

    /// Laedt alle Nachrichten zwischen zwei Benutzern, aelteste zuerst
    async fn verlauf(&self, a: &UserId, b: &UserId) -> StoreResult<Vec<NachrichtRecord>>;
}

/// Lesender Zugriff auf Freundschaftsbeziehungen
///
/// Der Relay-Kern mutiert Freundschaftsdaten nie – er reicht nur die von
/// der REST-Schicht erzeugten Ereignisse weiter.
#[allow(async_fn_in_trait)]
pub trait FriendStore: Send + Sync {
    /// Laedt eine Beziehung anhand ihrer externen ID
    async fn beziehung(&self, id: &str) -> StoreResult<Option<FriendRelation>>;

    /// Laedt alle Beziehungen an denen ein Benutzer beteiligt ist
    async fn beziehungen_von(&self, benutzer: &UserId) -> StoreResult<Vec<FriendRelation>>;
}
