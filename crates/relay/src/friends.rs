//! Freundschafts-Broadcaster – Pusht Lebenszyklus-Ereignisse gezielt
//!
//! Die externe REST-Schicht mutiert Freundschaftsdaten und ruft danach
//! hier an, damit die betroffene Seite sofort ein Push-Ereignis erhaelt.
//! Offline-Ziele werden fallen gelassen – die REST-Schicht bleibt die
//! Quelle der Wahrheit und wird beim naechsten Laden befragt.

use plausch_core::types::{FriendRelation, UserId};
use plausch_protocol::events::{FriendEventPayload, ServerEvent};

use crate::presence::PresenceRegistry;

/// Pusht Freundschafts-Ereignisse an die Live-Verbindungen der Betroffenen
#[derive(Clone)]
pub struct FriendEventBroadcaster {
    presence: PresenceRegistry,
}

impl FriendEventBroadcaster {
    /// Erstellt einen neuen FriendEventBroadcaster
    pub fn neu(presence: PresenceRegistry) -> Self {
        Self { presence }
    }

    /// Neue Anfrage: nur der Empfaenger der Anfrage wird benachrichtigt
    ///
    /// Gibt die Anzahl der erreichten Verbindungen zurueck.
    pub fn anfrage_erstellt(&self, beziehung: &FriendRelation) -> usize {
        let ereignis = ServerEvent::FriendRequest(FriendEventPayload {
            message: "New friend request".into(),
            data: beziehung.clone(),
        });
        self.an_benutzer(&beziehung.friend_id, ereignis)
    }

    /// Anfrage angenommen: nur der urspruengliche Anfragesteller
    pub fn anfrage_angenommen(&self, beziehung: &FriendRelation) -> usize {
        let ereignis = ServerEvent::AcceptedFriendRequest(FriendEventPayload {
            message: "Friend request accepted".into(),
            data: beziehung.clone(),
        });
        self.an_benutzer(&beziehung.user_id, ereignis)
    }

    /// Beziehung geloescht: nur die Seite die nicht ausgeloest hat
    ///
    /// So konvergieren beide Enden auf dieselbe Freundesliste, ohne dass
    /// der Ausloeser sein eigenes Loeschen gemeldet bekommt.
    pub fn anfrage_geloescht(&self, beziehung: &FriendRelation, ausloeser: &UserId) -> usize {
        let ziel = if &beziehung.user_id == ausloeser {
            &beziehung.friend_id
        } else {
            &beziehung.user_id
        };
        let ereignis = ServerEvent::DeleteFriendRequest(FriendEventPayload {
            message: "Friend request deleted".into(),
            data: beziehung.clone(),
        });
        self.an_benutzer(ziel, ereignis)
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    fn an_benutzer(&self, ziel: &UserId, ereignis: ServerEvent) -> usize {
        let verbindungen = self.presence.verbindungen_von(ziel);
        if verbindungen.is_empty() {
            tracing::debug!(ziel = %ziel, "Freundschafts-Ereignis verworfen (offline)");
            return 0;
        }

        let mut erreicht = 0;
        for handle in &verbindungen {
            if handle.senden(ereignis.clone()) {
                erreicht += 1;
            }
        }
        tracing::debug!(ziel = %ziel, erreicht, "Freundschafts-Ereignis gepusht");
        erreicht
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
