//! plausch-protocol – Socket-Protokoll-Definitionen
//!
//! Dieses Crate definiert alle Ereignisse die zwischen Browser-Client und
//! Relay-Kern ausgetauscht werden, sowie das Frame-Format fuer die
//! TCP-Verbindung.
//!
//! Die Ereignisnamen sind Bestandteil des Vertrags mit dem bestehenden
//! Web-Client und duerfen nicht umbenannt werden.

pub mod events;
pub mod wire;

pub use events::{ClientEvent, ErrorCode, ServerEvent};
pub use wire::{ClientCodec, ServerCodec};
