//! # Archivos Estáticos
//! src/files.rs
//!
//! Capacidad "cargar bytes por nombre" que usan las rutas de páginas HTML.
//! El servidor no sabe de dónde salen los bytes: `PublicDir` los lee de
//! disco, los tests pueden usar cualquier otra implementación.

use crate::router::{HandlerError, HandlerResult};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Fuente de archivos estáticos compartida entre workers
pub trait AssetSource: Send + Sync {
    /// Lee el contenido completo de `name`
    fn load(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Directorio en disco con los archivos públicos
#[derive(Debug, Clone)]
pub struct PublicDir {
    root: PathBuf,
}

impl PublicDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resuelve `name` dentro del directorio raíz
    ///
    /// Rechaza rutas absolutas y cualquier componente `..`.
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));

        if name.is_empty() || escapes {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("asset name outside public dir: {name:?}"),
            ));
        }

        Ok(self.root.join(relative))
    }
}

impl AssetSource for PublicDir {
    fn load(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(name)?)
    }
}

/// Adapta un archivo de la fuente a un handler de ruta
///
/// Un archivo inexistente produce un body vacío; cualquier otro error de
/// lectura es un fallo del handler.
///
/// # Ejemplo
/// ```no_run
/// use pool_http_server::files::{asset_handler, PublicDir};
/// use pool_http_server::http::{content_type, Method};
/// use pool_http_server::router::Router;
/// use std::sync::Arc;
///
/// let assets = Arc::new(PublicDir::new("./public"));
/// let mut router = Router::new();
/// router.register("/", Method::GET, asset_handler(assets, "index.html"), content_type::TEXT_HTML);
/// ```
pub fn asset_handler(
    assets: Arc<dyn AssetSource>,
    name: &str,
) -> impl Fn() -> HandlerResult + Send + Sync + 'static {
    let name = name.to_string();
    move || match assets.load(&name) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(HandlerError::Io(e)),
    }
}
