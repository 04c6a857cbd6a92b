//! In-Memory-Implementierungen der Kollaborator-Vertraege
//!
//! Fuer den Standalone-Betrieb des Servers und fuer Tests. Die echte
//! Persistenz liegt in der externen REST-Schicht; diese Implementierungen
//! bilden nur deren Vertragsverhalten nach.

use parking_lot::RwLock;
use std::collections::HashSet;

use plausch_core::types::{FriendRelation, UserId};

use crate::error::{StoreError, StoreResult};
use crate::models::{NachrichtRecord, NeueNachricht};
use crate::repository::{AuthProvider, FriendStore, MessageStore};

// ---------------------------------------------------------------------------
// MemoryAuthProvider
// ---------------------------------------------------------------------------

/// Durchlaessiger Auth-Provider: Token und Identitaet sind identisch
///
/// Die Socket-Schicht uebernimmt damit die vom Client gemeldete
/// Benutzer-ID unveraendert. Einzelne Tokens koennen fuer Tests gesperrt
/// werden.
#[derive(Default)]
pub struct MemoryAuthProvider {
    gesperrte: RwLock<HashSet<String>>,
}

impl MemoryAuthProvider {
    /// Erstellt einen neuen durchlaessigen Auth-Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Sperrt ein Token; nachfolgende Pruefungen schlagen fehl
    pub fn sperren(&self, token: impl Into<String>) {
        self.gesperrte.write().insert(token.into());
    }
}

impl AuthProvider for MemoryAuthProvider {
    async fn identitaet_pruefen(&self, token: &str) -> StoreResult<UserId> {
        if token.trim().is_empty() {
            return Err(StoreError::IdentitaetUngueltig("leeres Token".into()));
        }
        if self.gesperrte.read().contains(token) {
            return Err(StoreError::IdentitaetUngueltig(token.to_string()));
        }
        Ok(UserId::new(token))
    }
}

// ---------------------------------------------------------------------------
// MemoryMessageStore
// ---------------------------------------------------------------------------

/// Nachrichten-Persistenz im Speicher, Einfuege-Reihenfolge = Chronologie
#[derive(Default)]
pub struct MemoryMessageStore {
    nachrichten: RwLock<Vec<NachrichtRecord>>,
}

impl MemoryMessageStore {
    /// Erstellt einen leeren Nachrichten-Store
    pub fn new() -> Self {
        Self::default()
    }

    /// Gibt alle persistierten Nachrichten zurueck (Testzugriff)
    pub fn alle(&self) -> Vec<NachrichtRecord> {
        self.nachrichten.read().clone()
    }

    /// Gibt die Anzahl der persistierten Nachrichten zurueck
    pub fn anzahl(&self) -> usize {
        self.nachrichten.read().len()
    }
}

impl MessageStore for MemoryMessageStore {
    async fn anhaengen(&self, nachricht: NeueNachricht) -> StoreResult<NachrichtRecord> {
        let record = NachrichtRecord::aus(nachricht);
        self.nachrichten.write().push(record.clone());
        Ok(record)
    }

    async fn verlauf(&self, a: &UserId, b: &UserId) -> StoreResult<Vec<NachrichtRecord>> {
        let nachrichten = self.nachrichten.read();
        Ok(nachrichten
            .iter()
            .filter(|n| {
                (&n.sender == a && &n.empfaenger == b) || (&n.sender == b && &n.empfaenger == a)
            })
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryFriendStore
// ---------------------------------------------------------------------------

/// Freundschaftsbeziehungen im Speicher (lesend fuer den Kern)
#[derive(Default)]
pub struct MemoryFriendStore {
    beziehungen: RwLock<Vec<FriendRelation>>,
}

impl MemoryFriendStore {
    /// Erstellt einen leeren Freunde-Store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fuegt eine Beziehung ein (Testzugriff – im Betrieb schreibt die
    /// externe REST-Schicht)
    pub fn einfuegen(&self, beziehung: FriendRelation) {
        self.beziehungen.write().push(beziehung);
    }
}

impl FriendStore for MemoryFriendStore {
    async fn beziehung(&self, id: &str) -> StoreResult<Option<FriendRelation>> {
        Ok(self.beziehungen.read().iter().find(|b| b.id == id).cloned())
    }

    async fn beziehungen_von(&self, benutzer: &UserId) -> StoreResult<Vec<FriendRelation>> {
        Ok(self
            .beziehungen
            .read()
            .iter()
            .filter(|b| &b.user_id == benutzer || &b.friend_id == benutzer)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use plausch_core::types::{FriendStatus, RoomId};

    fn neue_nachricht(sender: &str, empfaenger: &str, inhalt: &str) -> NeueNachricht {
        let s = UserId::new(sender);
        let e = UserId::new(empfaenger);
        NeueNachricht {
            raum_id: RoomId::from_pair(&s, &e),
            sender: s,
            empfaenger: e,
            inhalt: inhalt.into(),
            gesendet_am: Utc::now(),
        }
    }

    #[tokio::test]
    async fn auth_token_ist_identitaet() {
        let auth = MemoryAuthProvider::new();
        let identitaet = auth.identitaet_pruefen("anna").await.unwrap();
        assert_eq!(identitaet, UserId::new("anna"));
    }

    #[tokio::test]
    async fn auth_lehnt_gesperrte_tokens_ab() {
        let auth = MemoryAuthProvider::new();
        auth.sperren("anna");
        let fehler = auth.identitaet_pruefen("anna").await.unwrap_err();
        assert!(matches!(fehler, StoreError::IdentitaetUngueltig(_)));
    }

    #[tokio::test]
    async fn auth_lehnt_leeres_token_ab() {
        let auth = MemoryAuthProvider::new();
        assert!(auth.identitaet_pruefen("").await.is_err());
        assert!(auth.identitaet_pruefen("   ").await.is_err());
    }

    #[tokio::test]
    async fn verlauf_filtert_das_paar_in_beide_richtungen() {
        let store = MemoryMessageStore::new();
        store.anhaengen(neue_nachricht("anna", "bernd", "hi")).await.unwrap();
        store.anhaengen(neue_nachricht("bernd", "anna", "hallo")).await.unwrap();
        store.anhaengen(neue_nachricht("anna", "clara", "du nicht")).await.unwrap();

        let verlauf = store
            .verlauf(&UserId::new("anna"), &UserId::new("bernd"))
            .await
            .unwrap();
        assert_eq!(verlauf.len(), 2);
        assert_eq!(verlauf[0].inhalt, "hi");
        assert_eq!(verlauf[1].inhalt, "hallo");
    }

    #[tokio::test]
    async fn verlauf_ist_kommutativ() {
        let store = MemoryMessageStore::new();
        store.anhaengen(neue_nachricht("anna", "bernd", "hi")).await.unwrap();

        let hin = store.verlauf(&UserId::new("anna"), &UserId::new("bernd")).await.unwrap();
        let her = store.verlauf(&UserId::new("bernd"), &UserId::new("anna")).await.unwrap();
        assert_eq!(hin, her);
    }

    #[tokio::test]
    async fn friend_store_findet_beziehungen_beider_seiten() {
        let store = MemoryFriendStore::new();
        store.einfuegen(FriendRelation {
            id: "1".into(),
            user_id: UserId::new("anna"),
            friend_id: UserId::new("bernd"),
            status: FriendStatus::Pending,
        });

        let von_anna = store.beziehungen_von(&UserId::new("anna")).await.unwrap();
        let von_bernd = store.beziehungen_von(&UserId::new("bernd")).await.unwrap();
        assert_eq!(von_anna.len(), 1);
        assert_eq!(von_bernd.len(), 1);
        assert!(store.beziehung("1").await.unwrap().is_some());
        assert!(store.beziehung("99").await.unwrap().is_none());
    }
}
