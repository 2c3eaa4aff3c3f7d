//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Núcleo concurrente del servidor:
//! 1. `listener`: acepta conexiones y las encola
//! 2. `queue`: cola FIFO compartida con `pop` bloqueante
//! 3. `pool`: N workers que drenan la cola
//! 4. `connection`: framing → routing → respuesta → cierre
//! 5. `tcp`: arma todo lo anterior y coordina arranque y apagado

pub mod connection;
pub mod listener;
pub mod pool;
pub mod queue;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{ConnectionContext, ConnectionOutcome};
pub use listener::Listener;
pub use pool::WorkerPool;
pub use queue::ConnectionQueue;
pub use tcp::{Server, ServerHandle};
