//! # Requests HTTP/1.1
//! src/http/request.rs
//!
//! Representación inmutable de un request ya enmarcado (headers + body).
//! El parsing de la cabecera es tolerante a propósito:
//!
//! 1. **Request Line**: `METHOD PATH VERSION`. Los campos faltantes quedan
//!    vacíos y un método desconocido se clasifica como `Method::Invalid`.
//! 2. **Headers**: pares `Name: Value`. Las líneas sin `:` se ignoran.
//! 3. **Content-Length**: ausente o no numérico equivale a 0.
//!
//! Decidir qué hacer con un path vacío o un método inválido es trabajo del
//! router, no del parser.

use super::framer::{FramingError, RequestFramer};
use super::Method;

/// Request HTTP completamente enmarcado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método HTTP (o `Invalid`)
    method: Method,

    /// Path tal como llegó en la request line (puede ser vacío)
    path: String,

    /// Versión HTTP declarada (ej: "HTTP/1.1")
    version: String,

    /// Headers en orden de llegada
    headers: Vec<(String, String)>,

    /// Longitud declarada por `Content-Length` (0 por defecto)
    content_length: usize,

    /// Body del request, exactamente `content_length` bytes
    body: Vec<u8>,
}

/// Cabecera parseada, antes de leer el body
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestHead {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) version: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) content_length: usize,
}

impl RequestHead {
    /// Parsea la cabecera (sin el `\r\n\r\n` final)
    pub(crate) fn parse(head: &[u8]) -> Self {
        let text = String::from_utf8_lossy(head);
        let mut lines = text.split("\r\n");

        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split_whitespace();
        let method = Method::parse(parts.next().unwrap_or_default());
        let path = parts.next().unwrap_or_default().to_string();
        let version = parts.next().unwrap_or_default().to_string();

        let headers: Vec<(String, String)> = lines
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();

        let content_length = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);

        Self {
            method,
            path,
            version,
            headers,
            content_length,
        }
    }

    pub(crate) fn into_request(self, body: Vec<u8>) -> Request {
        Request {
            method: self.method,
            path: self.path,
            version: self.version,
            headers: self.headers,
            content_length: self.content_length,
            body,
        }
    }
}

impl Request {
    /// Enmarca un request desde un buffer completo en memoria
    ///
    /// Usa el framer con límites por defecto; un buffer sin `\r\n\r\n`
    /// falla igual que un peer que cierra antes de terminar los headers.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use pool_http_server::http::{Method, Request};
    ///
    /// let raw = b"POST /api/post HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::POST);
    /// assert_eq!(request.path(), "/api/post");
    /// assert_eq!(request.body(), b"hi");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, FramingError> {
        let mut reader = buffer;
        RequestFramer::default().frame(&mut reader)
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene un header, sin distinguir mayúsculas de minúsculas en el nombre
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body como String, si es UTF-8 válido
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }
}
