//! Presence-Registry – Verwaltet Online-Status und Verbindungen
//!
//! Bildet jede dauerhafte Benutzer-Identitaet auf die Menge ihrer aktuell
//! lebenden Verbindungen ab. Ein Benutzer darf mehrere Verbindungen haben
//! (mehrere Tabs oder Geraete); eine Verbindung gehoert zu hoechstens
//! einer Identitaet.

use dashmap::DashMap;
use plausch_core::types::{ConnectionId, UserId};
use std::sync::Arc;

use crate::handle::ConnectionHandle;

/// Verwaltet den Online-Status aller verbundenen Clients
///
/// Thread-safe via Arc + DashMap, gestript nach UserId. Clone der Registry
/// teilt den inneren Zustand.
#[derive(Clone)]
pub struct PresenceRegistry {
    inner: Arc<PresenceRegistryInner>,
}

struct PresenceRegistryInner {
    /// Live-Verbindungen pro Benutzer
    benutzer: DashMap<UserId, Vec<ConnectionHandle>>,
    /// Rueckwaerts-Index: welche Identitaet haelt eine Verbindung
    verbindungen: DashMap<ConnectionId, UserId>,
}

impl PresenceRegistry {
    /// Erstellt eine neue leere PresenceRegistry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(PresenceRegistryInner {
                benutzer: DashMap::new(),
                verbindungen: DashMap::new(),
            }),
        }
    }

    /// Registriert eine Verbindung fuer einen Benutzer
    ///
    /// Idempotent pro Verbindungs-ID: wiederholte Registrierung derselben
    /// Verbindung ist kein Fehler. War die Verbindung zuvor an eine andere
    /// Identitaet gebunden, wird die alte Bindung geloest (Rebind).
    /// Die Registrierung ist fuer Lookups sofort sichtbar.
    pub fn registrieren(&self, benutzer: &UserId, handle: ConnectionHandle) {
        let verbindung = handle.id;

        if let Some(alt) = self.inner.verbindungen.insert(verbindung, benutzer.clone()) {
            if &alt != benutzer {
                self.aus_menge_entfernen(&alt, &verbindung);
                tracing::debug!(verbindung = %verbindung, von = %alt, zu = %benutzer, "Verbindung umgebunden");
            }
        }

        let mut handles = self.inner.benutzer.entry(benutzer.clone()).or_default();
        if !handles.iter().any(|h| h.id == verbindung) {
            handles.push(handle);
        }
        drop(handles);

        tracing::debug!(benutzer = %benutzer, verbindung = %verbindung, "Verbindung registriert");
    }

    /// Entfernt eine Verbindung, egal zu welchem Benutzer sie gehoert
    ///
    /// Kein Fehler wenn die Verbindung nie registriert war – Disconnect-
    /// Rennen duerfen doppelt aufraeumen.
    pub fn abmelden(&self, verbindung: &ConnectionId) {
        if let Some((_, benutzer)) = self.inner.verbindungen.remove(verbindung) {
            self.aus_menge_entfernen(&benutzer, verbindung);
            tracing::debug!(benutzer = %benutzer, verbindung = %verbindung, "Verbindung abgemeldet");
        }
    }

    /// Gibt einen Schnappschuss der Live-Verbindungen eines Benutzers zurueck
    ///
    /// Leere Liste, kein Fehler, wenn der Benutzer offline ist.
    pub fn verbindungen_von(&self, benutzer: &UserId) -> Vec<ConnectionHandle> {
        self.inner
            .benutzer
            .get(benutzer)
            .map(|handles| handles.clone())
            .unwrap_or_default()
    }

    /// Prueft ob ein Benutzer mindestens eine Live-Verbindung hat
    pub fn ist_online(&self, benutzer: &UserId) -> bool {
        self.inner
            .benutzer
            .get(benutzer)
            .map(|handles| !handles.is_empty())
            .unwrap_or(false)
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn verbindungs_anzahl(&self) -> usize {
        self.inner.verbindungen.len()
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    fn aus_menge_entfernen(&self, benutzer: &UserId, verbindung: &ConnectionId) {
        if let Some(mut handles) = self.inner.benutzer.get_mut(benutzer) {
            handles.retain(|h| &h.id != verbindung);
            let ist_leer = handles.is_empty();
            drop(handles);
            if ist_leer {
                self.inner.benutzer.remove_if(benutzer, |_, v| v.is_empty());
            }
        }
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
