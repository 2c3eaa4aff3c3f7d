//! # Errores del servidor
//! src/error.rs
//!
//! Solo los errores de arranque llegan al llamador. Los errores de cada
//! conexión (`FramingError`, `HandlerError`, fallos de escritura) se
//! contienen en el worker que la procesa.

use std::any::Any;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// No se pudo hacer bind/listen en la dirección pedida
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No se pudo crear un thread (listener o worker)
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] io::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Extrae el mensaje de un panic capturado con `catch_unwind`
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
