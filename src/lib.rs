//! # Pool HTTP Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 bloqueante con un pool fijo de workers. Un thread
//! acepta conexiones y las deja en una cola FIFO; N workers las sacan de a
//! una, enmarcan el request, lo enrutan y responden. Cada conexión atiende
//! exactamente un request y se cierra.
//!
//! ## Arquitectura
//!
//! - `http`: métodos, estados, framing del request y serialización de la respuesta
//! - `router`: tabla `(path, método) → handler`
//! - `server`: listener, cola, pool de workers y ciclo de cada conexión
//! - `metrics`: contadores atómicos del servidor
//! - `files`: carga de archivos estáticos por nombre
//! - `routes`: rutas de demostración del binario
//! - `config`: configuración CLI / variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use pool_http_server::config::Config;
//! use pool_http_server::http::{content_type, Method};
//! use pool_http_server::router::Router;
//! use pool_http_server::server::Server;
//!
//! let mut router = Router::new();
//! router.register(
//!     "/api/greet",
//!     Method::GET,
//!     || Ok(br#"{"message":"hi"}"#.to_vec()),
//!     content_type::APPLICATION_JSON,
//! );
//!
//! Server::new(Config::default(), router)
//!     .run()
//!     .expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod metrics;
pub mod router;
pub mod routes;
pub mod server;

pub use config::Config;
pub use error::ServerError;
pub use router::Router;
pub use server::{Server, ServerHandle};
