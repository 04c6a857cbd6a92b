//! Message-Relay – Stellt Chat-Nachrichten an das Gegenueber zu
//!
//! Zustellpfad pro `senden`:
//! 1. Raum aufloesen und Verifikation pruefen (sonst Fehler, keine
//!    Zustellung, keine Persistenz)
//! 2. Unter dem Sende-Ordnungsschloss des Raums die Live-Verbindungen des
//!    Gegenuebers einsammeln und das Ereignis nicht-blockierend einreihen
//! 3. Nach Freigabe des Schlosses die Nachricht an den externen
//!    MessageStore anhaengen – ein offliner Empfaenger ist kein Fehler,
//!    die Nachricht wartet dann in der History
//!
//! Das Ordnungsschloss stellt sicher, dass Nachrichten desselben Raums in
//! Einreichungsreihenfolge in jeder Empfaenger-Queue landen. Unter dem
//! Schloss passieren nur In-Memory-Enqueues, kein I/O.

use chrono::Utc;
use plausch_core::types::{ConnectionId, RoomId, UserId};
use plausch_protocol::events::ServerEvent;
use plausch_store::{MessageStore, NeueNachricht};
use std::sync::Arc;

use crate::error::{RelayError, RelayResult};
use crate::presence::PresenceRegistry;
use crate::rooms::RoomDirectory;

// ---------------------------------------------------------------------------
// Zustellbericht
// ---------------------------------------------------------------------------

/// Ergebnis einer Zustellung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zustellbericht {
    /// Identitaet des Gegenuebers
    pub empfaenger: UserId,
    /// Erfolgreich eingereihte Zustellungen (inklusive Echo-Tabs)
    pub zustellungen: usize,
    /// Verbindungen deren Queue voll oder geschlossen war
    pub fehlgeschlagen: usize,
    /// true wenn das Gegenueber zum Sendezeitpunkt keine Verbindung hatte
    pub empfaenger_offline: bool,
}

// ---------------------------------------------------------------------------
// MessageRelay
// ---------------------------------------------------------------------------

/// Stellt Nachrichten eines Raums an die Gegenseite zu und reicht sie an
/// die externe Persistenz weiter
#[derive(Clone)]
pub struct MessageRelay<M> {
    presence: PresenceRegistry,
    raeume: RoomDirectory,
    store: Arc<M>,
    /// Zustellung auch an die uebrigen Tabs des Absenders
    ///
    /// Standardmaessig aus: der Web-Client aktualisiert die eigene Ansicht
    /// optimistisch. Einschaltbar fuer Multi-Tab-Konsistenz.
    echo_an_eigene_tabs: bool,
}

impl<M: MessageStore> MessageRelay<M> {
    /// Erstellt einen neuen MessageRelay
    pub fn neu(
        presence: PresenceRegistry,
        raeume: RoomDirectory,
        store: Arc<M>,
        echo_an_eigene_tabs: bool,
    ) -> Self {
        Self {
            presence,
            raeume,
            store,
            echo_an_eigene_tabs,
        }
    }

    /// Sendet eine Nachricht in einen verifizierten Raum
    ///
    /// `ausloeser_verbindung` ist die Verbindung die das Senden ausgeloest
    /// hat; sie erhaelt nie ein Echo.
    pub async fn senden(
        &self,
        raum_id: &RoomId,
        sender: &UserId,
        ausloeser_verbindung: &ConnectionId,
        inhalt: &str,
        sender_anzeigename: &str,
    ) -> RelayResult<Zustellbericht> {
        let raum = self
            .raeume
            .raum(raum_id)
            .ok_or_else(|| RelayError::RaumNichtGefunden(raum_id.clone()))?;

        if !raum.verifiziert {
            return Err(RelayError::RaumNichtVerifiziert(raum_id.clone()));
        }

        let empfaenger = raum
            .gegenueber(sender)
            .cloned()
            .ok_or_else(|| RelayError::KeinTeilnehmer {
                raum: raum_id.clone(),
                benutzer: sender.clone(),
            })?;

        let ereignis = ServerEvent::received(raum_id.clone(), inhalt, sender_anzeigename);

        let bericht = {
            // Raum kann zwischen Lookup und hier weggeraeumt worden sein
            let ordnung = self
                .raeume
                .sende_ordnung(raum_id)
                .ok_or_else(|| RelayError::RaumNichtGefunden(raum_id.clone()))?;
            let _fuehrung = ordnung.lock();

            let verbindungen = self.presence.verbindungen_von(&empfaenger);
            let empfaenger_offline = verbindungen.is_empty();

            let mut zustellungen = 0;
            let mut fehlgeschlagen = 0;
            for handle in &verbindungen {
                if handle.senden(ereignis.clone()) {
                    zustellungen += 1;
                } else {
                    fehlgeschlagen += 1;
                }
            }

            if self.echo_an_eigene_tabs {
                for handle in &self.presence.verbindungen_von(sender) {
                    if handle.id == *ausloeser_verbindung {
                        continue;
                    }
                    if handle.senden(ereignis.clone()) {
                        zustellungen += 1;
                    } else {
                        fehlgeschlagen += 1;
                    }
                }
            }

            self.raeume.beruehren(raum_id);

            Zustellbericht {
                empfaenger: empfaenger.clone(),
                zustellungen,
                fehlgeschlagen,
                empfaenger_offline,
            }
        };

        if bericht.empfaenger_offline {
            tracing::debug!(raum = %raum_id, empfaenger = %empfaenger, "Empfaenger offline – nur Persistenz");
        }

        // Persistenz ausserhalb des Ordnungsschlosses
        self.store
            .anhaengen(NeueNachricht {
                raum_id: raum_id.clone(),
                sender: sender.clone(),
                empfaenger,
                inhalt: inhalt.to_string(),
                gesendet_am: Utc::now(),
            })
            .await?;

        Ok(bericht)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
