//! plausch-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und stellt den oeffentlichen
//! Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use config::ServerConfig;
use plausch_session::{RelayConfig, RelayServer, RelayState};
use plausch_store::{MemoryAuthProvider, MemoryFriendStore, MemoryMessageStore};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Kollaborateure verdrahten (In-Memory-Staende; die echte
    ///    Persistenz liegt bei der externen REST-Schicht)
    /// 2. Raum-Sweep-Task starten (falls konfiguriert)
    /// 3. Ctrl-C auf das Shutdown-Signal verdrahten
    /// 4. TCP-Listener starten und bis zum Shutdown laufen
    pub async fn starten(self) -> Result<()> {
        let bind_addr: SocketAddr = self
            .config
            .tcp_bind_adresse()
            .parse()
            .map_err(|e| anyhow::anyhow!("Ungueltige Bind-Adresse: {e}"))?;

        let relay_config = RelayConfig {
            max_clients: self.config.server.max_clients,
            sende_queue_groesse: self.config.relay.sende_queue_groesse,
            echo_an_eigene_tabs: self.config.relay.echo_an_eigene_tabs,
        };
        let state = RelayState::neu(
            relay_config,
            Arc::new(MemoryAuthProvider::new()),
            Arc::new(MemoryMessageStore::new()),
            Arc::new(MemoryFriendStore::new()),
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        // Raum-Sweep: verwaiste Raeume periodisch wegraeumen
        if self.config.relay.raum_leerlauf_sek > 0 {
            let raeume = state.raeume.clone();
            let leerlauf = Duration::from_secs(self.config.relay.raum_leerlauf_sek);
            let mut sweep_shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                let mut takt = tokio::time::interval(leerlauf);
                takt.tick().await; // der erste Tick feuert sofort
                loop {
                    tokio::select! {
                        _ = takt.tick() => {
                            raeume.verwaiste_entfernen(leerlauf);
                        }
                        Ok(()) = sweep_shutdown.changed() => {
                            if *sweep_shutdown.borrow() {
                                break;
                            }
                        }
                    }
                }
            });
            tracing::info!(
                leerlauf_sek = self.config.relay.raum_leerlauf_sek,
                "Raum-Sweep aktiviert"
            );
        }

        // Ctrl-C loest das Shutdown-Signal aus
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                let _ = shutdown_tx.send(true);
            }
        });

        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %self.config.tcp_bind_adresse(),
            max_clients = self.config.server.max_clients,
            "Server startet"
        );

        let server = RelayServer::neu(state, bind_addr);
        server.starten(shutdown_rx).await?;

        Ok(())
    }
}
