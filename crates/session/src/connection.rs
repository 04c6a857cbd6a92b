//! Client-Verbindung – Verwaltet eine einzelne Transportverbindung
//!
//! Jede akzeptierte Verbindung bekommt eine `ClientVerbindung` in einem
//! eigenen tokio-Task. Der Task liest Frames, dispatcht sie an die
//! Session und schreibt sowohl direkte Fehlerantworten als auch die vom
//! Relay-Kern eingereihten Pushes zurueck auf den Socket.
//!
//! Disconnect ist implizit: Stream-Ende oder Lesefehler beendet den Task;
//! `schliessen` raeumt die Presence-Bindung genau einmal ab.

use futures_util::{SinkExt, StreamExt};
use plausch_core::types::ConnectionId;
use plausch_protocol::wire::ServerCodec;
use plausch_relay::ConnectionHandle;
use plausch_store::{AuthProvider, FriendStore, MessageStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

use crate::dispatcher::abfertigen;
use crate::server_state::RelayState;
use crate::session::ConnectionSession;

/// Verarbeitet eine einzelne Transportverbindung
///
/// Liest Frames via `ServerCodec`, dispatcht an die Session und sendet
/// Antworten zurueck. Laeuft in einem eigenen tokio-Task.
pub struct ClientVerbindung<A, M, F>
where
    A: AuthProvider + 'static,
    M: MessageStore + 'static,
    F: FriendStore + 'static,
{
    state: Arc<RelayState<A, M, F>>,
    peer_addr: SocketAddr,
}

impl<A, M, F> ClientVerbindung<A, M, F>
where
    A: AuthProvider + 'static,
    M: MessageStore + 'static,
    F: FriendStore + 'static,
{
    /// Erstellt eine neue ClientVerbindung
    pub fn neu(state: Arc<RelayState<A, M, F>>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht. Der Stream ist generisch, damit Tests mit In-Memory-
    /// Duplex-Streams arbeiten koennen.
    pub async fn verarbeiten<S>(
        self,
        stream: S,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let peer_addr = self.peer_addr;
        tracing::info!(peer = %peer_addr, "Neue Verbindung");

        let mut framed = Framed::new(stream, ServerCodec::new());

        // Send-Queue der Verbindung: der Relay-Kern reiht ein, dieser Task
        // schreibt auf den Socket
        let (sende_tx, mut sende_rx) =
            mpsc::channel(self.state.config.sende_queue_groesse);
        let handle = ConnectionHandle::neu(ConnectionId::new(), sende_tx);
        let mut sitzung = ConnectionSession::neu(Arc::clone(&self.state), handle);

        loop {
            tokio::select! {
                // Eingehendes Ereignis vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(ereignis)) => {
                            if let Some(antwort) = abfertigen(ereignis, &mut sitzung).await {
                                if let Err(e) = framed.send(antwort).await {
                                    tracing::warn!(
                                        peer = %peer_addr,
                                        fehler = %e,
                                        "Senden der Fehlerantwort fehlgeschlagen"
                                    );
                                    break;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehendes Ereignis aus dem Relay-Kern
                Some(ausgehend) = sende_rx.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(peer = %peer_addr, fehler = %e, "Push-Senden fehlgeschlagen");
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        // Cleanup beim Verbindungsende, genau einmal
        sitzung.schliessen();
        tracing::info!(peer = %peer_addr, "Verbindungs-Task beendet");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
