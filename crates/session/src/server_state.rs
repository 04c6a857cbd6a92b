//! Gemeinsamer Server-Zustand fuer den Relay-Dienst
//!
//! Haelt alle geteilten Registries und Kollaborateure als Arc-Referenzen,
//! die sicher zwischen Verbindungs-Tasks geteilt werden koennen.

use plausch_relay::{FriendEventBroadcaster, MessageRelay, PresenceRegistry, RoomDirectory};
use plausch_store::{AuthProvider, FriendStore, MessageStore};
use std::sync::Arc;
use std::time::Instant;

/// Konfiguration fuer den Relay-Dienst
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximale gleichzeitige Clients
    pub max_clients: u32,
    /// Groesse der Send-Queue pro Verbindung
    pub sende_queue_groesse: usize,
    /// Zustellung auch an die uebrigen Tabs des Absenders
    pub echo_an_eigene_tabs: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_clients: 512,
            sende_queue_groesse: 64,
            echo_an_eigene_tabs: false,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
///
/// Alle Registries teilen ihren inneren Zustand via Clone; die
/// Kollaborateure (Auth, Nachrichten, Freunde) sind als Arc gehalten.
pub struct RelayState<A, M, F>
where
    A: AuthProvider + 'static,
    M: MessageStore + 'static,
    F: FriendStore + 'static,
{
    /// Dienst-Konfiguration
    pub config: Arc<RelayConfig>,
    /// Auth-Schicht (Token -> Identitaet)
    pub auth: Arc<A>,
    /// Externe Nachrichten-Persistenz
    pub nachrichten: Arc<M>,
    /// Externe Freundschaftsdaten (lesend)
    pub freunde_store: Arc<F>,
    /// Presence-Registry (Wer ist online, mit welchen Verbindungen)
    pub presence: PresenceRegistry,
    /// Raum-Verzeichnis (kanonische Raeume, Handshake-Zustand)
    pub raeume: RoomDirectory,
    /// Nachrichten-Zustellung
    pub relay: MessageRelay<M>,
    /// Freundschafts-Ereignis-Push (Einstiegspunkt der REST-Schicht)
    pub freunde: FriendEventBroadcaster,
    /// Startzeitpunkt des Dienstes (fuer Uptime-Berechnung)
    pub start_zeit: Instant,
}

impl<A, M, F> RelayState<A, M, F>
where
    A: AuthProvider + 'static,
    M: MessageStore + 'static,
    F: FriendStore + 'static,
{
    /// Erstellt einen neuen RelayState
    pub fn neu(
        config: RelayConfig,
        auth: Arc<A>,
        nachrichten: Arc<M>,
        freunde_store: Arc<F>,
    ) -> Arc<Self> {
        let presence = PresenceRegistry::neu();
        let raeume = RoomDirectory::neu();
        let relay = MessageRelay::neu(
            presence.clone(),
            raeume.clone(),
            Arc::clone(&nachrichten),
            config.echo_an_eigene_tabs,
        );
        let freunde = FriendEventBroadcaster::neu(presence.clone());

        Arc::new(Self {
            config: Arc::new(config),
            auth,
            nachrichten,
            freunde_store,
            presence,
            raeume,
            relay,
            freunde,
            start_zeit: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_zeit.elapsed().as_secs()
    }
}
