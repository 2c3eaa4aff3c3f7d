//! # Métodos HTTP
//! src/http/method.rs
//!
//! Un token de método desconocido no es un error de parsing: se clasifica
//! como `Method::Invalid` y el router responde 405 antes de buscar la ruta.

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,

    /// Cualquier otro token (incluye minúsculas y el token vacío)
    Invalid,
}

impl Method {
    /// Todos los métodos válidos, en el orden en que se listan en logs
    pub const ALL: [Method; 7] = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::OPTIONS,
        Method::HEAD,
    ];

    /// Clasifica un token de la request line
    ///
    /// # Ejemplo
    /// ```
    /// use pool_http_server::http::Method;
    ///
    /// assert_eq!(Method::parse("PATCH"), Method::PATCH);
    /// assert_eq!(Method::parse("get"), Method::Invalid);
    /// ```
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "PATCH" => Method::PATCH,
            "OPTIONS" => Method::OPTIONS,
            "HEAD" => Method::HEAD,
            _ => Method::Invalid,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
            Method::HEAD => "HEAD",
            Method::Invalid => "INVALID",
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != Method::Invalid
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
