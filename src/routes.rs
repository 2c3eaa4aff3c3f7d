//! # Rutas de Demostración
//! src/routes.rs
//!
//! Tabla de rutas con la que arranca el binario:
//!
//! | Método | Path            | Respuesta                          |
//! |--------|-----------------|------------------------------------|
//! | GET    | `/`             | `index.html`                       |
//! | GET    | `/index.html`   | `index.html`                       |
//! | GET    | `/dummy.html`   | `dummy.html`                       |
//! | GET    | `/api/greet`    | saludo en JSON                     |
//! | POST   | `/api/post`     | confirmación en JSON               |
//! | GET    | `/api/stats`    | snapshot de estadísticas           |
//! | *      | (otro)          | 404 con `notfound.html`            |

use crate::files::{asset_handler, AssetSource};
use crate::http::{content_type, Method};
use crate::metrics::ServerStats;
use crate::router::{HandlerError, HandlerResult, Router};
use serde_json::json;
use std::sync::Arc;

/// Construye el router de la aplicación
pub fn default_router(assets: Arc<dyn AssetSource>, stats: Arc<ServerStats>) -> Router {
    let mut router = Router::new();

    for (path, file) in [
        ("/", "index.html"),
        ("/index.html", "index.html"),
        ("/dummy.html", "dummy.html"),
    ] {
        router.register(
            path,
            Method::GET,
            asset_handler(Arc::clone(&assets), file),
            content_type::TEXT_HTML,
        );
    }

    router.register("/api/greet", Method::GET, greet, content_type::APPLICATION_JSON);
    router.register("/api/post", Method::POST, post_received, content_type::APPLICATION_JSON);
    router.register(
        "/api/stats",
        Method::GET,
        move || stats_json(&stats),
        content_type::APPLICATION_JSON,
    );

    router.set_not_found(asset_handler(assets, "notfound.html"), content_type::TEXT_HTML);
    router
}

fn greet() -> HandlerResult {
    Ok(json!({ "message": "Greetings from the server!" }).to_string().into_bytes())
}

fn post_received() -> HandlerResult {
    Ok(json!({ "message": "POST request received!", "status": "success" })
        .to_string()
        .into_bytes())
}

fn stats_json(stats: &ServerStats) -> HandlerResult {
    stats
        .snapshot()
        .to_json()
        .map(String::into_bytes)
        .map_err(|e| HandlerError::new(format!("stats serialization failed: {e}")))
}
