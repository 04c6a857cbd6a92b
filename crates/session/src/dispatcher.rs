//! Ereignis-Dispatcher – Routet Client-Ereignisse an die Session
//!
//! Wandelt jedes eingehende `ClientEvent` in den passenden Session-Aufruf
//! um und uebersetzt Fehler in ein `error`-Ereignis, das ausschliesslich
//! an die ausloesende Verbindung zurueckgeht – nie broadcast.

use plausch_protocol::events::{ClientEvent, ServerEvent};
use plausch_store::{AuthProvider, FriendStore, MessageStore};

use crate::error::SessionError;
use crate::session::ConnectionSession;

/// Verarbeitet ein Client-Ereignis und gibt die Fehlerantwort zurueck
///
/// Gibt `None` zurueck wenn keine Antwort gesendet werden soll – der
/// Web-Client erwartet auf erfolgreiche Ereignisse keine direkte
/// Bestaetigung (Raum- und Nachrichten-Pushes laufen ueber die Send-Queues
/// der betroffenen Verbindungen).
pub async fn abfertigen<A, M, F>(
    ereignis: ClientEvent,
    sitzung: &mut ConnectionSession<A, M, F>,
) -> Option<ServerEvent>
where
    A: AuthProvider + 'static,
    M: MessageStore + 'static,
    F: FriendStore + 'static,
{
    match ereignis {
        ClientEvent::RegisterUser(anfrage) => {
            match sitzung.benutzer_registrieren(&anfrage.user_id).await {
                Ok(_) => None,
                Err(e) => Some(fehler_antwort(&e)),
            }
        }

        ClientEvent::RegisterRoom(anfrage) => {
            // Die Session-Bindung ist massgeblich, nicht die im Payload
            // mitgeschickte Benutzer-ID
            if let Some(benutzer) = sitzung.benutzer() {
                if benutzer != &anfrage.user_id {
                    tracing::warn!(
                        gemeldet = %anfrage.user_id,
                        gebunden = %benutzer,
                        "registerRoom mit fremder Benutzer-ID – Session-Bindung gilt"
                    );
                }
            }
            match sitzung.raum_registrieren(&anfrage.friend_id) {
                Ok(_) => None,
                Err(e) => Some(fehler_antwort(&e)),
            }
        }

        ClientEvent::SendMessage(anfrage) => {
            match sitzung
                .nachricht_senden(&anfrage.room_id, &anfrage.message, &anfrage.sender_username)
                .await
            {
                Ok(bericht) => {
                    tracing::debug!(
                        raum = %anfrage.room_id,
                        zustellungen = bericht.zustellungen,
                        offline = bericht.empfaenger_offline,
                        "Nachricht verarbeitet"
                    );
                    None
                }
                Err(e) => Some(fehler_antwort(&e)),
            }
        }
    }
}

/// Uebersetzt einen Session-Fehler in das Wire-Ereignis
fn fehler_antwort(fehler: &SessionError) -> ServerEvent {
    ServerEvent::error(fehler.fehler_code(), fehler.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_state::{RelayConfig, RelayState};
    use plausch_core::types::{ConnectionId, RoomId, UserId};
    use plausch_protocol::events::{
        ErrorCode, RegisterRoom, RegisterUser, SendMessage,
    };
    use plausch_relay::ConnectionHandle;
    use plausch_store::{MemoryAuthProvider, MemoryFriendStore, MemoryMessageStore};
    use std::sync::Arc;
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

    fn register_user(token: &str) -> ClientEvent {
        ClientEvent::RegisterUser(RegisterUser {
            user_id: token.into(),
        })
    }

    fn send_message(raum_id: &RoomId, text: &str) -> ClientEvent {
        ClientEvent::SendMessage(SendMessage {
            room_id: raum_id.clone(),
            message: text.into(),
            sender_username: "Anna".into(),
        })
    }

    #[tokio::test]
    async fn erfolgreiche_ereignisse_bleiben_ohne_antwort() {
        let state = test_state();
        let (mut anna, _rx) = neue_session(&state);

        let antwort = abfertigen(register_user("anna"), &mut anna).await;
        assert!(antwort.is_none());
        assert!(state.presence.ist_online(&UserId::new("anna")));

        let antwort = abfertigen(
            ClientEvent::RegisterRoom(RegisterRoom {
                user_id: UserId::new("anna"),
                friend_id: UserId::new("bernd"),
            }),
            &mut anna,
        )
        .await;
        assert!(antwort.is_none());
        assert_eq!(state.raeume.anzahl(), 1);
    }

    #[tokio::test]
    async fn anonymes_senden_erhaelt_not_registered() {
        let state = test_state();
        let (mut anna, _rx) = neue_session(&state);
        let raum_id = RoomId::from_pair(&UserId::new("anna"), &UserId::new("bernd"));

        let antwort = abfertigen(send_message(&raum_id, "hi"), &mut anna).await;
        match antwort {
            Some(ServerEvent::Error(fehler)) => {
                assert_eq!(fehler.code, ErrorCode::NotRegistered);
            }
            andere => panic!("Fehlerantwort erwartet, erhalten: {:?}", andere),
        }
    }

    #[tokio::test]
    async fn senden_in_unverifizierten_raum_wird_gemeldet() {
        let state = test_state();
        let (mut anna, _rx) = neue_session(&state);

        assert!(abfertigen(register_user("anna"), &mut anna).await.is_none());
        let raum = anna.raum_registrieren(&UserId::new("bernd")).unwrap();

        let antwort = abfertigen(send_message(&raum.id, "hi"), &mut anna).await;
        match antwort {
            Some(ServerEvent::Error(fehler)) => {
                assert_eq!(fehler.code, ErrorCode::RoomNotVerified);
            }
            andere => panic!("Fehlerantwort erwartet, erhalten: {:?}", andere),
        }
        assert_eq!(state.nachrichten.anzahl(), 0);
    }

    #[tokio::test]
    async fn unbekannter_raum_wird_gemeldet() {
        let state = test_state();
        let (mut anna, _rx) = neue_session(&state);
        assert!(abfertigen(register_user("anna"), &mut anna).await.is_none());

        let fremd = RoomId::from_pair(&UserId::new("x"), &UserId::new("y"));
        let antwort = abfertigen(send_message(&fremd, "hi"), &mut anna).await;
        match antwort {
            Some(ServerEvent::Error(fehler)) => {
                assert_eq!(fehler.code, ErrorCode::RoomNotFound);
            }
            andere => panic!("Fehlerantwort erwartet, erhalten: {:?}", andere),
        }
    }

    #[tokio::test]
    async fn abgelehntes_token_erhaelt_auth_failed() {
        let state = test_state();
        state.auth.sperren("anna");
        let (mut anna, _rx) = neue_session(&state);

        let antwort = abfertigen(register_user("anna"), &mut anna).await;
        match antwort {
            Some(ServerEvent::Error(fehler)) => {
                assert_eq!(fehler.code, ErrorCode::AuthFailed);
            }
            andere => panic!("Fehlerantwort erwartet, erhalten: {:?}", andere),
        }
    }

    #[tokio::test]
    async fn fremde_benutzer_id_im_payload_aendert_bindung_nicht() {
        let state = test_state();
        let (mut anna, _rx) = neue_session(&state);
        assert!(abfertigen(register_user("anna"), &mut anna).await.is_none());

        // Payload behauptet "clara" – die Session bleibt anna
        let antwort = abfertigen(
            ClientEvent::RegisterRoom(RegisterRoom {
                user_id: UserId::new("clara"),
                friend_id: UserId::new("bernd"),
            }),
            &mut anna,
        )
        .await;
        assert!(antwort.is_none());

        let raum_id = RoomId::from_pair(&UserId::new("anna"), &UserId::new("bernd"));
        assert!(state.raeume.raum(&raum_id).is_some(), "Raum gehoert zur Session-Identitaet");
    }
}
