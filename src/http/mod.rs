//! # Módulo HTTP
//!
//! Protocolo HTTP/1.1 mínimo implementado desde cero:
//!
//! - Framing de requests (headers + body declarado por `Content-Length`)
//! - Métodos y códigos de estado
//! - Construcción de responses
//!
//! Fuera de alcance: keep-alive, pipelining, chunked transfer-encoding y
//! query strings. Cada conexión lleva exactamente un request.
//!
//! ### Formato de Request
//!
//! ```text
//! POST /api/post HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Length: 13\r\n
//! \r\n
//! {"ok": true}
//! ```

pub mod framer;
pub mod method;
pub mod request;
pub mod response;
pub mod status;

pub use framer::{FramerLimits, FramingError, RequestFramer};
pub use method::Method;
pub use request::Request;
pub use response::Response;
pub use status::StatusCode;

/// Tipos de contenido usados por las rutas del servidor
pub mod content_type {
    pub const TEXT_HTML: &str = "text/html";
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const APPLICATION_JSON: &str = "application/json";
    pub const APPLICATION_XML: &str = "application/xml";
}
