//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea `(path, método)` a un handler y al `Content-Type` de su respuesta.
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! La tabla se construye una sola vez antes de arrancar los workers y después
//! se comparte como `Arc<Router>` de solo lectura, sin locks.
//!
//! Orden de decisión en `dispatch`:
//!
//! 1. Método inválido → 405 (antes de mirar la tabla)
//! 2. Path vacío o que no empieza con `/` → 400
//! 3. `(path, método)` registrado → 200 con el body del handler (500 si falla)
//! 4. Path registrado con otro método → 405
//! 5. Cualquier otro caso → 404 vía el handler de not-found

use crate::error::panic_message;
use crate::http::{content_type, Method, Request, Response, StatusCode};
use std::collections::HashMap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Error de un handler al producir el body
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }
}

/// Resultado de un handler: el body de la respuesta
pub type HandlerResult = Result<Vec<u8>, HandlerError>;

/// Un handler no recibe argumentos y produce el body de la respuesta
pub type Handler = Arc<dyn Fn() -> HandlerResult + Send + Sync>;

/// Handler registrado junto con el tipo de contenido que devuelve
#[derive(Clone)]
pub struct RouteEntry {
    handler: Handler,
    content_type: String,
}

impl RouteEntry {
    fn new(handler: Handler, content_type: &str) -> Self {
        Self {
            handler,
            content_type: content_type.to_string(),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Ejecuta el handler en el thread actual, convirtiendo un panic en error
    fn invoke(&self) -> HandlerResult {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.handler)())) {
            Ok(result) => result,
            Err(payload) => Err(HandlerError::new(format!(
                "handler panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Tabla de rutas: path → (método → handler)
#[derive(Debug)]
pub struct Router {
    routes: HashMap<String, HashMap<Method, RouteEntry>>,
    not_found: RouteEntry,
}

impl Router {
    /// Crea un router vacío con el handler de not-found por defecto
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            not_found: RouteEntry::new(
                Arc::new(|| Ok(b"<h1>404 Not Found</h1>".to_vec())),
                content_type::TEXT_HTML,
            ),
        }
    }

    /// Registra una ruta con su handler
    ///
    /// Si ya existía un handler para `(path, method)`, se reemplaza.
    ///
    /// # Ejemplo
    /// ```
    /// use pool_http_server::http::{content_type, Method};
    /// use pool_http_server::router::Router;
    ///
    /// let mut router = Router::new();
    /// router.register(
    ///     "/api/greet",
    ///     Method::GET,
    ///     || Ok(br#"{"message":"hi"}"#.to_vec()),
    ///     content_type::APPLICATION_JSON,
    /// );
    /// assert!(router.contains("/api/greet", Method::GET));
    /// ```
    pub fn register<F>(&mut self, path: &str, method: Method, handler: F, content_type: &str)
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        if !method.is_valid() {
            warn!(path, "ignorando ruta registrada con método inválido");
            return;
        }

        let entry = RouteEntry::new(Arc::new(handler), content_type);
        let previous = self
            .routes
            .entry(path.to_string())
            .or_default()
            .insert(method, entry);

        if previous.is_some() {
            debug!(path, %method, "ruta reemplazada");
        }
    }

    /// Reemplaza el handler que genera el body de los 404
    pub fn set_not_found<F>(&mut self, handler: F, content_type: &str)
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        self.not_found = RouteEntry::new(Arc::new(handler), content_type);
    }

    /// Resuelve un request a una respuesta. Nunca falla.
    pub fn dispatch(&self, request: &Request) -> Response {
        let method = request.method();
        let path = request.path();

        if !method.is_valid() {
            return Response::empty(StatusCode::MethodNotAllowed);
        }

        if !is_routable_path(path) {
            return Response::empty(StatusCode::BadRequest);
        }

        let Some(by_method) = self.routes.get(path) else {
            return self.not_found_response();
        };

        match by_method.get(&method) {
            Some(entry) => match entry.invoke() {
                Ok(body) => Response::ok(entry.content_type(), body),
                Err(e) => {
                    error!(%method, path, error = %e, "el handler falló");
                    Response::empty(StatusCode::InternalServerError)
                }
            },
            None => Response::empty(StatusCode::MethodNotAllowed),
        }
    }

    fn not_found_response(&self) -> Response {
        let body = self.not_found.invoke().unwrap_or_else(|e| {
            warn!(error = %e, "el handler de not-found falló");
            Vec::new()
        });
        Response::new(StatusCode::NotFound, self.not_found.content_type(), body)
    }

    /// Métodos registrados para un path, en orden estable
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let Some(by_method) = self.routes.get(path) else {
            return Vec::new();
        };
        Method::ALL
            .into_iter()
            .filter(|method| by_method.contains_key(method))
            .collect()
    }

    pub fn contains(&self, path: &str, method: Method) -> bool {
        self.routes
            .get(path)
            .is_some_and(|by_method| by_method.contains_key(&method))
    }

    /// Número de pares `(path, método)` registrados
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn is_routable_path(path: &str) -> bool {
    path.starts_with('/')
}
