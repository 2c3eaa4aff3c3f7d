//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración con soporte para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./pool_http_server --port 8080 --workers 8 --max-body-bytes 65536
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 HTTP_WORKERS=8 ./pool_http_server
//! ```

use crate::error::ServerError;
use crate::http::{FramerLimits, RequestFramer};
use clap::Parser;
use std::time::Duration;

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "pool_http_server")]
#[command(about = "Servidor HTTP/1.1 con pool fijo de workers")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Número de workers del pool
    #[arg(short, long, default_value = "4", env = "HTTP_WORKERS")]
    pub workers: usize,

    // === Framing ===

    /// Bytes pedidos en cada lectura del socket
    #[arg(long = "chunk-size", default_value = "1024", env = "HTTP_CHUNK_SIZE")]
    pub chunk_size: usize,

    /// Tamaño máximo de la cabecera del request (0 = sin límite)
    #[arg(long = "max-header-bytes", default_value = "16384", env = "HTTP_MAX_HEADER_BYTES")]
    pub max_header_bytes: usize,

    /// Tamaño máximo del body declarado (0 = sin límite)
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "HTTP_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Timeout de lectura/escritura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "0", env = "HTTP_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    // === Archivos y logging ===

    /// Directorio con los archivos estáticos (index.html, notfound.html, ...)
    #[arg(long = "public-dir", default_value = "./public", env = "PUBLIC_DIR")]
    pub public_dir: String,

    /// Nivel de log por defecto si RUST_LOG no está definido
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use pool_http_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn framer_limits(&self) -> FramerLimits {
        FramerLimits {
            chunk_size: self.chunk_size,
            max_header_bytes: self.max_header_bytes,
            max_body_bytes: self.max_body_bytes,
        }
    }

    pub fn framer(&self) -> RequestFramer {
        RequestFramer::new(self.framer_limits())
    }

    /// Timeout de socket, `None` si está deshabilitado
    pub fn io_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.port == 0 {
            return Err(ServerError::InvalidConfig("port must be a positive integer".to_string()));
        }
        if self.workers == 0 {
            return Err(ServerError::InvalidConfig("workers must be >= 1".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(ServerError::InvalidConfig("chunk size must be >= 1".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(ServerError::InvalidConfig("host must not be empty".to_string()));
        }

        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            workers: 4,
            chunk_size: 1024,
            max_header_bytes: 16 * 1024,
            max_body_bytes: 1024 * 1024,
            read_timeout_ms: 0,
            public_dir: "./public".to_string(),
            log_level: "info".to_string(),
        }
    }
}
