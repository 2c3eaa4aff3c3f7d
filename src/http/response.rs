//! # Construcción de Respuestas HTTP
//!
//! Cada respuesta se construye de cero por request y se serializa con el
//! formato fijo del servidor:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 16\r\n
//! \r\n
//! {"message":"hi"}
//! ```

use super::content_type;
use super::StatusCode;

/// Respuesta HTTP completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Valor del header `Content-Type`
    content_type: String,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta con estado, tipo de contenido y body
    ///
    /// # Ejemplo
    /// ```
    /// use pool_http_server::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok, "text/plain", b"hola".to_vec());
    /// assert_eq!(response.body(), b"hola");
    /// ```
    pub fn new(status: StatusCode, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body,
        }
    }

    /// 200 OK con el body que produjo un handler
    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        Self::new(StatusCode::Ok, content_type, body)
    }

    /// Respuesta de error sin body, como `text/plain`
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, content_type::TEXT_PLAIN, Vec::new())
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// # Ejemplo
    /// ```
    /// use pool_http_server::http::{Response, StatusCode};
    ///
    /// let bytes = Response::empty(StatusCode::NotFound).to_bytes();
    /// assert!(bytes.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            self.status,
            self.content_type,
            self.body.len()
        );

        let mut result = Vec::with_capacity(head.len() + self.body.len());
        result.extend_from_slice(head.as_bytes());
        result.extend_from_slice(&self.body);
        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
