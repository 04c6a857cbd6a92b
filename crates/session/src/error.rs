//! Fehlertypen fuer die Session-Schicht

use plausch_protocol::events::ErrorCode;
use plausch_relay::RelayError;
use plausch_store::StoreError;
use thiserror::Error;

/// Fehlertyp fuer Session-Operationen
#[derive(Debug, Error)]
pub enum SessionError {
    /// Operation erfordert eine identifizierte Session
    #[error("Nicht registriert – zuerst registerUser senden")]
    NichtRegistriert,

    /// Session ist bereits terminal geschlossen
    #[error("Verbindung bereits geschlossen")]
    VerbindungGeschlossen,

    /// Auth-Schicht hat das Identitaets-Token abgelehnt
    #[error("Authentifizierung fehlgeschlagen: {0}")]
    Auth(#[source] StoreError),

    /// Fehler aus dem Relay-Kern
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl SessionError {
    /// Ordnet den Fehler dem Wire-Fehlercode zu
    pub fn fehler_code(&self) -> ErrorCode {
        match self {
            Self::NichtRegistriert => ErrorCode::NotRegistered,
            Self::VerbindungGeschlossen => ErrorCode::InvalidRequest,
            Self::Auth(_) => ErrorCode::AuthFailed,
            Self::Relay(RelayError::RaumNichtGefunden(_)) => ErrorCode::RoomNotFound,
            Self::Relay(RelayError::RaumNichtVerifiziert(_)) => ErrorCode::RoomNotVerified,
            Self::Relay(RelayError::KeinTeilnehmer { .. }) => ErrorCode::NotParticipant,
            Self::Relay(RelayError::UngueltigesPaar(_)) => ErrorCode::InvalidRequest,
            Self::Relay(RelayError::Speicher(_)) => ErrorCode::InternalError,
        }
    }
}

/// Result-Typ fuer Session-Operationen
pub type SessionResult<T> = Result<T, SessionError>;
