//! Verbindungs-Session – Zustandsmaschine einer einzelnen Verbindung
//!
//! Bindet eine Transportverbindung an eine Benutzer-Identitaet und
//! hoechstens einen aktiven Raum; besitzt das Aufraeumen beim Disconnect.
//!
//! ## State Machine
//! ```text
//! Anonym --registerUser--> Identifiziert --registerRoom--> Identifiziert (+Raum)
//!   |                           |                               |
//!   +-------- Disconnect ------>+<------------------------------+
//!                               v
//!                          Geschlossen (terminal)
//! ```
//!
//! `registerUser` ist re-entrant: ein Aufruf mit anderer Identitaet bindet
//! die Verbindung um. `schliessen` ist idempotent und auch aus `Anonym`
//! sicher – die Presence-Abmeldung laeuft genau einmal.

use plausch_core::types::{ConnectionId, RoomId, UserId};
use plausch_protocol::events::ServerEvent;
use plausch_relay::{ConnectionHandle, Raum, Zustellbericht};
use plausch_store::{AuthProvider, FriendStore, MessageStore};
use std::sync::Arc;

use crate::error::{SessionError, SessionResult};
use crate::server_state::RelayState;

/// Zustand einer Verbindungs-Session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitzungsZustand {
    /// Transport verbunden, keine Identitaet gebunden
    Anonym,
    /// Identitaet via registerUser gebunden
    Identifiziert { benutzer: UserId },
    /// Terminal – Verbindung getrennt und abgemeldet
    Geschlossen,
}

/// Session einer einzelnen Client-Verbindung
pub struct ConnectionSession<A, M, F>
where
    A: AuthProvider + 'static,
    M: MessageStore + 'static,
    F: FriendStore + 'static,
{
    state: Arc<RelayState<A, M, F>>,
    handle: ConnectionHandle,
    zustand: SitzungsZustand,
    /// Zuletzt angemeldeter Raum (fuer schnellen Zugriff beim Aufraeumen)
    raum: Option<RoomId>,
}

impl<A, M, F> ConnectionSession<A, M, F>
where
    A: AuthProvider + 'static,
    M: MessageStore + 'static,
    F: FriendStore + 'static,
{
    /// Erstellt eine neue Session im Zustand `Anonym`
    pub fn neu(state: Arc<RelayState<A, M, F>>, handle: ConnectionHandle) -> Self {
        Self {
            state,
            handle,
            zustand: SitzungsZustand::Anonym,
            raum: None,
        }
    }

    /// Gibt die Verbindungs-ID der Session zurueck
    pub fn verbindung(&self) -> ConnectionId {
        self.handle.id
    }

    /// Gibt die gebundene Identitaet zurueck, falls identifiziert
    pub fn benutzer(&self) -> Option<&UserId> {
        match &self.zustand {
            SitzungsZustand::Identifiziert { benutzer } => Some(benutzer),
            _ => None,
        }
    }

    /// Gibt den aktuellen Session-Zustand zurueck
    pub fn zustand(&self) -> &SitzungsZustand {
        &self.zustand
    }

    /// Gibt den zuletzt angemeldeten Raum zurueck
    pub fn aktiver_raum(&self) -> Option<&RoomId> {
        self.raum.as_ref()
    }

    /// Bindet die Verbindung an eine Benutzer-Identitaet (registerUser)
    ///
    /// Prueft das Token gegen den AuthProvider; bei Ablehnung bleibt der
    /// Zustand unveraendert. Ein erneuter Aufruf mit anderer Identitaet
    /// bindet um (die alte Presence-Bindung wird geloest).
    pub async fn benutzer_registrieren(&mut self, token: &str) -> SessionResult<UserId> {
        if self.zustand == SitzungsZustand::Geschlossen {
            return Err(SessionError::VerbindungGeschlossen);
        }

        let benutzer = self
            .state
            .auth
            .identitaet_pruefen(token)
            .await
            .map_err(SessionError::Auth)?;

        if let SitzungsZustand::Identifiziert { benutzer: alt } = &self.zustand {
            if alt != &benutzer {
                tracing::info!(von = %alt, zu = %benutzer, verbindung = %self.handle.id, "Session umgebunden");
                self.raum = None;
            }
        }

        // Die Registry loest eine bestehende Bindung derselben Verbindung
        self.state.presence.registrieren(&benutzer, self.handle.clone());
        tracing::info!(benutzer = %benutzer, verbindung = %self.handle.id, "Benutzer registriert");

        self.zustand = SitzungsZustand::Identifiziert {
            benutzer: benutzer.clone(),
        };
        Ok(benutzer)
    }

    /// Meldet einen Raum mit dem Gegenueber `freund` an (registerRoom)
    ///
    /// Schliesst der Aufruf den zweiseitigen Handshake ab, erhalten beide
    /// Teilnehmer auf allen Verbindungen ein `message`-Ereignis. Ist der
    /// Raum bereits verifiziert (Reconnect), erhaelt nur die anmeldende
    /// Verbindung den Raum-Zustand erneut. Vor dem Handshake gibt es
    /// keinen Push.
    pub fn raum_registrieren(&mut self, freund: &UserId) -> SessionResult<Raum> {
        let benutzer = self.identifiziert()?.clone();

        let anmeldung = self.state.raeume.raum_sicherstellen(&benutzer, freund)?;
        self.raum = Some(anmeldung.raum.id.clone());

        if anmeldung.soeben_verifiziert {
            // Beide Seiten erfahren vom fertigen Handshake, jede sieht ihr Gegenueber
            let (erster, zweiter) = &anmeldung.raum.teilnehmer;
            for (teilnehmer, gegenueber) in [(erster, zweiter), (zweiter, erster)] {
                let ereignis = ServerEvent::room(
                    anmeldung.raum.id.clone(),
                    gegenueber.clone(),
                    true,
                );
                for handle in &self.state.presence.verbindungen_von(teilnehmer) {
                    handle.senden(ereignis.clone());
                }
            }
        } else if anmeldung.raum.verifiziert {
            // Reconnect-Resync: nur die anmeldende Verbindung
            self.handle.senden(ServerEvent::room(
                anmeldung.raum.id.clone(),
                freund.clone(),
                true,
            ));
        }

        tracing::debug!(
            benutzer = %benutzer,
            raum = %anmeldung.raum.id,
            verifiziert = anmeldung.raum.verifiziert,
            "Raum angemeldet"
        );
        Ok(anmeldung.raum)
    }

    /// Sendet eine Chat-Nachricht ueber den MessageRelay (sendMessage)
    pub async fn nachricht_senden(
        &self,
        raum_id: &RoomId,
        inhalt: &str,
        sender_anzeigename: &str,
    ) -> SessionResult<Zustellbericht> {
        let benutzer = self.identifiziert()?.clone();

        let bericht = self
            .state
            .relay
            .senden(raum_id, &benutzer, &self.handle.id, inhalt, sender_anzeigename)
            .await?;
        Ok(bericht)
    }

    /// Schliesst die Session (Transport-Disconnect)
    ///
    /// Idempotent; sicher aus jedem Zustand, auch wenn registerUser nie
    /// gelaufen ist. Bereits aufgezaehlte Zustellungen anderer Sessions
    /// duerfen noch ins Leere laufen – sie werden dort gezaehlt und
    /// verworfen.
    pub fn schliessen(&mut self) {
        if self.zustand == SitzungsZustand::Geschlossen {
            return;
        }

        self.state.presence.abmelden(&self.handle.id);

        if let SitzungsZustand::Identifiziert { benutzer } = &self.zustand {
            tracing::info!(benutzer = %benutzer, verbindung = %self.handle.id, "Session geschlossen");
        } else {
            tracing::debug!(verbindung = %self.handle.id, "Anonyme Session geschlossen");
        }
        self.zustand = SitzungsZustand::Geschlossen;
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    fn identifiziert(&self) -> SessionResult<&UserId> {
        match &self.zustand {
            SitzungsZustand::Identifiziert { benutzer } => Ok(benutzer),
            SitzungsZustand::Anonym => Err(SessionError::NichtRegistriert),
            SitzungsZustand::Geschlossen => Err(SessionError::VerbindungGeschlossen),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_state::RelayConfig;
    use plausch_core::types::ConnectionId;
    use plausch_protocol::events::ServerEvent;
    use plausch_store::{MemoryAuthProvider, MemoryFriendStore, MemoryMessageStore};
    use tokio::sync::mpsc;

    type TestState = RelayState<MemoryAuthProvider, MemoryMessageStore, MemoryFriendStore>;
    type TestSession =
        ConnectionSession<MemoryAuthProvider, MemoryMessageStore, MemoryFriendStore>;

    fn test_state() -> Arc<TestState> {
        RelayState::neu(
            RelayConfig::default(),
            Arc::new(MemoryAuthProvider::new()),
            Arc::new(MemoryMessageStore::new()),
            Arc::new(MemoryFriendStore::new()),
        )
    }

    fn neue_session(state: &Arc<TestState>) -> (TestSession, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = ConnectionHandle::neu(ConnectionId::new(), tx);
        (ConnectionSession::neu(Arc::clone(state), handle), rx)
    }

    fn alle_ereignisse(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut ereignisse = Vec::new();
        while let Ok(e) = rx.try_recv() {
            ereignisse.push(e);
        }
        ereignisse
    }

    #[tokio::test]
    async fn vollstaendiger_chat_ablauf() {
        let state = test_state();
        let (mut anna, mut rx_anna) = neue_session(&state);
        let (mut bernd, mut rx_bernd) = neue_session(&state);

        anna.benutzer_registrieren("anna").await.unwrap();
        bernd.benutzer_registrieren("bernd").await.unwrap();

        // Anna meldet zuerst an: Raum unverifiziert, noch kein Push
        let raum = anna.raum_registrieren(&UserId::new("bernd")).unwrap();
        assert!(!raum.verifiziert);
        assert!(alle_ereignisse(&mut rx_anna).is_empty());
        assert!(alle_ereignisse(&mut rx_bernd).is_empty());

        // Bernd schliesst den Handshake ab: beide Seiten erhalten `message`
        let raum = bernd.raum_registrieren(&UserId::new("anna")).unwrap();
        assert!(raum.verifiziert);

        let bei_anna = alle_ereignisse(&mut rx_anna);
        let bei_bernd = alle_ereignisse(&mut rx_bernd);
        assert_eq!(bei_anna.len(), 1);
        assert_eq!(bei_bernd.len(), 1);
        match (&bei_anna[0], &bei_bernd[0]) {
            (ServerEvent::Message(fuer_anna), ServerEvent::Message(fuer_bernd)) => {
                assert_eq!(fuer_anna.room_id, raum.id);
                assert_eq!(fuer_bernd.room_id, raum.id);
                assert_eq!(fuer_anna.friend_id, UserId::new("bernd"));
                assert_eq!(fuer_bernd.friend_id, UserId::new("anna"));
                assert!(fuer_anna.room_verified);
            }
            andere => panic!("message-Ereignisse erwartet, erhalten: {:?}", andere),
        }

        // Anna sendet "hi": Bernd empfaengt, Persistenz genau einmal
        let bericht = anna.nachricht_senden(&raum.id, "hi", "Anna").await.unwrap();
        assert_eq!(bericht.zustellungen, 1);
        assert!(!bericht.empfaenger_offline);

        let bei_bernd = alle_ereignisse(&mut rx_bernd);
        match &bei_bernd[..] {
            [ServerEvent::ReceivedMessage(nachricht)] => {
                assert_eq!(nachricht.room_id, raum.id);
                assert_eq!(nachricht.message, "hi");
                assert_eq!(nachricht.sender_username, "Anna");
            }
            andere => panic!("receivedMessage erwartet, erhalten: {:?}", andere),
        }
        assert!(alle_ereignisse(&mut rx_anna).is_empty(), "kein Echo an Anna");

        let records = state.nachrichten.alle();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sender, UserId::new("anna"));
        assert_eq!(records[0].empfaenger, UserId::new("bernd"));
        assert_eq!(records[0].inhalt, "hi");
    }

    #[tokio::test]
    async fn offline_gegenueber_nur_persistenz() {
        let state = test_state();
        let (mut anna, _rx_anna) = neue_session(&state);
        let (mut bernd, rx_bernd) = neue_session(&state);

        anna.benutzer_registrieren("anna").await.unwrap();
        bernd.benutzer_registrieren("bernd").await.unwrap();
        anna.raum_registrieren(&UserId::new("bernd")).unwrap();
        let raum = bernd.raum_registrieren(&UserId::new("anna")).unwrap();

        // Bernd trennt die Verbindung
        bernd.schliessen();
        drop(rx_bernd);

        let bericht = anna.nachricht_senden(&raum.id, "hi", "Anna").await.unwrap();
        assert!(bericht.empfaenger_offline);
        assert_eq!(bericht.zustellungen, 0);
        assert_eq!(state.nachrichten.anzahl(), 1, "Persistenz trotz Offline");
    }

    #[tokio::test]
    async fn anonym_darf_nicht_senden() {
        let state = test_state();
        let (anna, _rx) = neue_session(&state);
        let raum_id = RoomId::from_pair(&UserId::new("anna"), &UserId::new("bernd"));

        let fehler = anna.nachricht_senden(&raum_id, "hi", "Anna").await.unwrap_err();
        assert!(matches!(fehler, SessionError::NichtRegistriert));
        assert_eq!(state.nachrichten.anzahl(), 0);
    }

    #[tokio::test]
    async fn anonym_darf_keinen_raum_anmelden() {
        let state = test_state();
        let (mut anna, _rx) = neue_session(&state);

        let fehler = anna.raum_registrieren(&UserId::new("bernd")).unwrap_err();
        assert!(matches!(fehler, SessionError::NichtRegistriert));
        assert_eq!(state.raeume.anzahl(), 0);
    }

    #[tokio::test]
    async fn abgelehntes_token_laesst_zustand_unveraendert() {
        let state = test_state();
        state.auth.sperren("anna");
        let (mut anna, _rx) = neue_session(&state);

        let fehler = anna.benutzer_registrieren("anna").await.unwrap_err();
        assert!(matches!(fehler, SessionError::Auth(_)));
        assert_eq!(anna.zustand(), &SitzungsZustand::Anonym);
        assert!(!state.presence.ist_online(&UserId::new("anna")));
    }

    #[tokio::test]
    async fn rebind_loest_alte_presence() {
        let state = test_state();
        let (mut session, _rx) = neue_session(&state);

        session.benutzer_registrieren("anna").await.unwrap();
        assert!(state.presence.ist_online(&UserId::new("anna")));

        session.benutzer_registrieren("bernd").await.unwrap();
        assert!(!state.presence.ist_online(&UserId::new("anna")));
        assert!(state.presence.ist_online(&UserId::new("bernd")));
        assert_eq!(session.benutzer(), Some(&UserId::new("bernd")));
        assert!(session.aktiver_raum().is_none(), "Raum-Bindung verfaellt beim Rebind");
    }

    #[tokio::test]
    async fn schliessen_ist_idempotent() {
        let state = test_state();
        let (mut anna, _rx) = neue_session(&state);

        anna.benutzer_registrieren("anna").await.unwrap();
        anna.schliessen();
        assert!(!state.presence.ist_online(&UserId::new("anna")));
        assert_eq!(anna.zustand(), &SitzungsZustand::Geschlossen);

        // Zweites Schliessen ist ein No-op
        anna.schliessen();
        assert_eq!(anna.zustand(), &SitzungsZustand::Geschlossen);
    }

    #[tokio::test]
    async fn schliessen_aus_anonym_ist_sicher() {
        let state = test_state();
        let (mut session, _rx) = neue_session(&state);
        session.schliessen();
        assert_eq!(session.zustand(), &SitzungsZustand::Geschlossen);

        let fehler = session.benutzer_registrieren("anna").await.unwrap_err();
        assert!(matches!(fehler, SessionError::VerbindungGeschlossen));
    }

    #[tokio::test]
    async fn reconnect_erhaelt_raum_zustand_erneut() {
        let state = test_state();
        let (mut anna, mut rx_anna) = neue_session(&state);
        let (mut bernd, mut rx_bernd) = neue_session(&state);

        anna.benutzer_registrieren("anna").await.unwrap();
        bernd.benutzer_registrieren("bernd").await.unwrap();
        anna.raum_registrieren(&UserId::new("bernd")).unwrap();
        bernd.raum_registrieren(&UserId::new("anna")).unwrap();
        alle_ereignisse(&mut rx_anna);
        alle_ereignisse(&mut rx_bernd);

        // Bernd verbindet sich neu und meldet den Raum erneut an
        bernd.schliessen();
        let (mut bernd_neu, mut rx_neu) = neue_session(&state);
        bernd_neu.benutzer_registrieren("bernd").await.unwrap();
        let raum = bernd_neu.raum_registrieren(&UserId::new("anna")).unwrap();
        assert!(raum.verifiziert);

        // Nur die neue Verbindung erhaelt den Resync, Anna bleibt still
        let bei_bernd = alle_ereignisse(&mut rx_neu);
        assert_eq!(bei_bernd.len(), 1);
        assert!(matches!(bei_bernd[0], ServerEvent::Message(_)));
        assert!(alle_ereignisse(&mut rx_anna).is_empty());
    }

    #[tokio::test]
    async fn freundes_ereignis_ueber_den_geteilten_zustand() {
        use plausch_core::types::{FriendRelation, FriendStatus};

        let state = test_state();
        let (mut anna, mut rx_anna) = neue_session(&state);
        let (mut bernd, mut rx_bernd) = neue_session(&state);
        anna.benutzer_registrieren("anna").await.unwrap();
        bernd.benutzer_registrieren("bernd").await.unwrap();

        // Die REST-Schicht legt die Beziehung ab und pusht danach
        let beziehung = FriendRelation {
            id: "b1".into(),
            user_id: UserId::new("anna"),
            friend_id: UserId::new("bernd"),
            status: FriendStatus::Pending,
        };
        state.freunde_store.einfuegen(beziehung.clone());
        let gespeichert = state
            .freunde_store
            .beziehung("b1")
            .await
            .unwrap()
            .expect("Beziehung muss auffindbar sein");
        let erreicht = state.freunde.anfrage_erstellt(&gespeichert);

        assert_eq!(erreicht, 1);
        assert!(alle_ereignisse(&mut rx_anna).is_empty());
        assert!(matches!(
            alle_ereignisse(&mut rx_bernd)[..],
            [ServerEvent::FriendRequest(_)]
        ));
    }
}
