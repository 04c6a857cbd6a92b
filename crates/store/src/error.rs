//! Fehlertypen fuer die Kollaborator-Vertraege

use thiserror::Error;

/// Alle moeglichen Fehler der externen Kollaborateure
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identitaets-Token vom Auth-System abgelehnt
    #[error("Identitaet ungueltig: {0}")]
    IdentitaetUngueltig(String),

    /// Datensatz nicht vorhanden
    #[error("Nicht gefunden: {0}")]
    NichtGefunden(String),

    /// Backend-Fehler (Netzwerk, Datenbank der externen Schicht)
    #[error("Speicherfehler: {0}")]
    Speicher(String),
}

impl StoreError {
    /// Erstellt einen Backend-Fehler aus einer beliebigen Nachricht
    pub fn speicher(msg: impl Into<String>) -> Self {
        Self::Speicher(msg.into())
    }
}

/// Result-Alias fuer Store-Operationen
pub type StoreResult<T> = Result<T, StoreError>;
