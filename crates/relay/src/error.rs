//! Fehlertypen fuer den Relay-Kern

use plausch_core::types::{RoomId, UserId};
use plausch_store::StoreError;
use thiserror::Error;

/// Fehlertyp fuer den Relay-Kern
#[derive(Debug, Error)]
pub enum RelayError {
    /// Kein Raum unter dieser Identitaet
    #[error("Raum nicht gefunden: {0}")]
    RaumNichtGefunden(RoomId),

    /// Raum existiert, aber der Handshake ist noch einseitig
    #[error("Raum nicht verifiziert: {0}")]
    RaumNichtVerifiziert(RoomId),

    /// Absender gehoert nicht zum Teilnehmerpaar des Raums
    #[error("{benutzer} ist kein Teilnehmer von {raum}")]
    KeinTeilnehmer { raum: RoomId, benutzer: UserId },

    /// Raum mit sich selbst ist nicht zulaessig
    #[error("Ungueltiges Teilnehmerpaar: {0} mit sich selbst")]
    UngueltigesPaar(UserId),

    /// Persistenz beim externen MessageStore fehlgeschlagen
    #[error("Speicherfehler: {0}")]
    Speicher(#[from] StoreError),
}

/// Result-Typ fuer den Relay-Kern
pub type RelayResult<T> = Result<T, RelayError>;
