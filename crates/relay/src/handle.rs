//! Verbindungs-Handle – Send-Queue einer einzelnen Client-Verbindung
//!
//! Jede akzeptierte Transportverbindung bekommt genau ein Handle. Der
//! Verbindungs-Task liest aus der zugehoerigen Queue und schreibt auf den
//! Socket; der Relay-Kern reiht Ereignisse nur nicht-blockierend ein.

use plausch_core::types::ConnectionId;
use plausch_protocol::events::ServerEvent;
use tokio::sync::mpsc;

/// Handle auf die Send-Queue einer verbundenen Client-Verbindung
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    /// Erstellt ein neues Handle fuer eine Verbindung
    pub fn neu(id: ConnectionId, tx: mpsc::Sender<ServerEvent>) -> Self {
        Self { id, tx }
    }

    /// Reiht ein Ereignis nicht-blockierend in die Send-Queue ein
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    /// Ein fehlgeschlagener Einzelversand bricht nie einen Fan-out ab;
    /// der Aufrufer zaehlt und faehrt fort.
    pub fn senden(&self, ereignis: ServerEvent) -> bool {
        match self.tx.try_send(ereignis) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.id, "Send-Queue voll – Ereignis verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plausch_protocol::events::ErrorCode;

    fn test_ereignis() -> ServerEvent {
        ServerEvent::error(ErrorCode::InternalError, "test")
    }

    #[test]
    fn senden_reiht_ereignis_ein() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::neu(ConnectionId::new(), tx);

        assert!(handle.senden(test_ereignis()));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn volle_queue_meldet_fehlschlag() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::neu(ConnectionId::new(), tx);

        assert!(handle.senden(test_ereignis()));
        assert!(!handle.senden(test_ereignis()), "Queue-Kapazitaet ist 1");
    }

    #[test]
    fn geschlossene_queue_meldet_fehlschlag() {
        let (tx, rx) = mpsc::channel(1);
        let handle = ConnectionHandle::neu(ConnectionId::new(), tx);
        drop(rx);

        assert!(!handle.senden(test_ereignis()));
    }
}
