//! Raum-Verzeichnis – Kanonische Raeume pro ungeordnetem Benutzerpaar
//!
//! Ein Raum entsteht beim ersten `raum_sicherstellen` eines Paars und ist
//! zunaechst unverifiziert. Erst wenn auch der zweite Teilnehmer den Raum
//! anmeldet, gilt der zweiseitige Handshake als abgeschlossen und der Raum
//! wird verifiziert – vorher nimmt der MessageRelay keine Nachrichten an.
//!
//! ## Nebenlaeufigkeit
//! Die Read-Check-Create-Sequenz laeuft als ein Entry-Zugriff auf die nach
//! RoomId gestripte Map: zwei gleichzeitig anmeldende Teilnehmer landen
//! im selben Raum, einer von beiden schliesst die Verifikation ab.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use plausch_core::types::{RoomId, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{RelayError, RelayResult};

// ---------------------------------------------------------------------------
// Raum
// ---------------------------------------------------------------------------

/// Schnappschuss eines Raums
///
/// `teilnehmer` ist lexikografisch sortiert; die RoomId ist eine reine
/// Funktion dieses Paars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raum {
    pub id: RoomId,
    pub teilnehmer: (UserId, UserId),
    pub verifiziert: bool,
    pub erstellt_am: DateTime<Utc>,
}

impl Raum {
    /// Gibt das Gegenueber eines Teilnehmers zurueck
    ///
    /// `None` wenn der Benutzer nicht zum Paar gehoert.
    pub fn gegenueber(&self, benutzer: &UserId) -> Option<&UserId> {
        if benutzer == &self.teilnehmer.0 {
            Some(&self.teilnehmer.1)
        } else if benutzer == &self.teilnehmer.1 {
            Some(&self.teilnehmer.0)
        } else {
            None
        }
    }

    /// Prueft ob ein Benutzer Teilnehmer des Raums ist
    pub fn ist_teilnehmer(&self, benutzer: &UserId) -> bool {
        self.gegenueber(benutzer).is_some()
    }
}

/// Ergebnis einer Raum-Anmeldung
#[derive(Debug, Clone)]
pub struct RaumAnmeldung {
    pub raum: Raum,
    /// true genau bei dem Aufruf der die Verifikation abgeschlossen hat
    pub soeben_verifiziert: bool,
}

// ---------------------------------------------------------------------------
// RoomDirectory
// ---------------------------------------------------------------------------

struct RaumEintrag {
    raum: Raum,
    /// Teilnehmer die den Raum bereits angemeldet haben
    registriert_von: HashSet<UserId>,
    /// Serialisiert die Zustellung pro Raum (siehe MessageRelay)
    sende_ordnung: Arc<Mutex<()>>,
    letzte_aktivitaet: Instant,
}

impl RaumEintrag {
    fn neu(id: RoomId, anmelder: &UserId, partner: &UserId) -> Self {
        let (erster, zweiter) = if anmelder <= partner {
            (anmelder.clone(), partner.clone())
        } else {
            (partner.clone(), anmelder.clone())
        };
        let mut registriert_von = HashSet::new();
        registriert_von.insert(anmelder.clone());
        Self {
            raum: Raum {
                id,
                teilnehmer: (erster, zweiter),
                verifiziert: false,
                erstellt_am: Utc::now(),
            },
            registriert_von,
            sende_ordnung: Arc::new(Mutex::new(())),
            letzte_aktivitaet: Instant::now(),
        }
    }
}

/// Verzeichnis aller Raeume, indiziert nach kanonischer RoomId
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct RoomDirectory {
    inner: Arc<DashMap<RoomId, RaumEintrag>>,
}

impl RoomDirectory {
    /// Erstellt ein neues leeres RoomDirectory
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Meldet einen Raum fuer das Paar (anmelder, partner) an
    ///
    /// Idempotent und kommutativ: beide Seiten loesen dieselbe RoomId auf.
    /// Der erste Aufruf erstellt den Raum unverifiziert; der Aufruf des
    /// zweiten, anderen Teilnehmers verifiziert ihn. Wiederholte Anmeldung
    /// durch dieselbe Seite aendert nichts.
    pub fn raum_sicherstellen(
        &self,
        anmelder: &UserId,
        partner: &UserId,
    ) -> RelayResult<RaumAnmeldung> {
        if anmelder == partner {
            return Err(RelayError::UngueltigesPaar(anmelder.clone()));
        }

        let id = RoomId::from_pair(anmelder, partner);
        let mut eintrag = self
            .inner
            .entry(id.clone())
            .or_insert_with(|| RaumEintrag::neu(id.clone(), anmelder, partner));

        eintrag.letzte_aktivitaet = Instant::now();

        let mut soeben_verifiziert = false;
        if !eintrag.raum.verifiziert
            && eintrag.registriert_von.insert(anmelder.clone())
            && eintrag.registriert_von.len() == 2
        {
            eintrag.raum.verifiziert = true;
            soeben_verifiziert = true;
            tracing::info!(raum = %eintrag.raum.id, "Raum verifiziert");
        }

        Ok(RaumAnmeldung {
            raum: eintrag.raum.clone(),
            soeben_verifiziert,
        })
    }

    /// Gibt einen Schnappschuss eines Raums zurueck
    pub fn raum(&self, id: &RoomId) -> Option<Raum> {
        self.inner.get(id).map(|eintrag| eintrag.raum.clone())
    }

    /// Setzt einen Raum direkt auf verifiziert
    ///
    /// Fuer Einbettungen die eine andere Verifikationsregel fahren als den
    /// zweiseitigen Handshake (etwa: verifiziert sobald die erste Nachricht
    /// geflossen ist). Gibt `true` zurueck wenn der Raum existierte und
    /// vorher unverifiziert war.
    pub fn verifizieren(&self, id: &RoomId) -> bool {
        match self.inner.get_mut(id) {
            Some(mut eintrag) if !eintrag.raum.verifiziert => {
                eintrag.raum.verifiziert = true;
                eintrag.letzte_aktivitaet = Instant::now();
                tracing::info!(raum = %id, "Raum verifiziert");
                true
            }
            _ => false,
        }
    }

    /// Gibt das Sende-Ordnungsschloss eines Raums zurueck
    ///
    /// Der MessageRelay haelt dieses Schloss waehrend des Einreihens, damit
    /// konkurrierende Sender desselben Raums nicht verschraenkt zustellen.
    pub fn sende_ordnung(&self, id: &RoomId) -> Option<Arc<Mutex<()>>> {
        self.inner
            .get(id)
            .map(|eintrag| Arc::clone(&eintrag.sende_ordnung))
    }

    /// Frischt den Aktivitaets-Zeitstempel eines Raums auf
    pub fn beruehren(&self, id: &RoomId) {
        if let Some(mut eintrag) = self.inner.get_mut(id) {
            eintrag.letzte_aktivitaet = Instant::now();
        }
    }

    /// Entfernt Raeume deren letzte Aktivitaet laenger als `max_leerlauf`
    /// zurueckliegt
    ///
    /// Gibt die Anzahl der entfernten Raeume zurueck. Raeume verschwinden
    /// sonst nie; die naechste Anmeldung des Paars erstellt sie neu.
    pub fn verwaiste_entfernen(&self, max_leerlauf: Duration) -> usize {
        let vorher = self.inner.len();
        self.inner
            .retain(|_, eintrag| eintrag.letzte_aktivitaet.elapsed() <= max_leerlauf);
        let entfernt = vorher - self.inner.len();
        if entfernt > 0 {
            tracing::debug!(entfernt, "Verwaiste Raeume entfernt");
        }
        entfernt
    }

    /// Gibt die Anzahl der bekannten Raeume zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.len()
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
