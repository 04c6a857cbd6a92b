//! plausch-session – Verbindungs-Orchestrierung
//!
//! Dieser Crate verbindet Transportschicht und Relay-Kern. Er verwaltet
//! TCP-Verbindungen, die Session-Zustandsmaschine pro Verbindung und das
//! Routing der Client-Ereignisse.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (RelayServer)
//!     |
//!     v
//! ClientVerbindung (pro Verbindung ein Task)
//!     |  State Machine: Anonym -> Identifiziert -> Geschlossen
//!     |
//!     v
//! abfertigen (Dispatcher)
//!     |
//!     +-- registerUser  -> AuthProvider + PresenceRegistry
//!     +-- registerRoom  -> RoomDirectory (+ message-Push bei Verifikation)
//!     +-- sendMessage   -> MessageRelay
//!
//! RelayState – geteilte Registries und Kollaborateure
//! ```
//!
//! ## Concurrency-Modell
//! Die Kollaborator-Traits verwenden async fn ohne Send-Garantie
//! (async_fn_in_trait); alle Verbindungs-Tasks laufen deshalb in einer
//! `tokio::task::LocalSet` auf einem single-threaded Executor. Das ist
//! korrekt fuer einen einzelnen Server-Prozess.

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod server_state;
pub mod session;
pub mod tcp;

// Bequeme Re-Exporte
pub use connection::ClientVerbindung;
pub use dispatcher::abfertigen;
pub use error::{SessionError, SessionResult};
pub use server_state::{RelayConfig, RelayState};
pub use session::{ConnectionSession, SitzungsZustand};
pub use tcp::RelayServer;
