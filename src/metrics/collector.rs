//! # Estadísticas del Servidor
//! src/metrics/collector.rs
//!
//! Contadores atómicos compartidos entre el listener y los workers. No hay
//! lock: cada contador se incrementa de forma independiente y un snapshot
//! puede mezclar valores de instantes ligeramente distintos.

use crate::http::StatusCode;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Contadores del ciclo de vida de las conexiones
#[derive(Debug)]
pub struct ServerStats {
    start_time: Instant,

    /// Conexiones aceptadas por el listener
    accepted: AtomicU64,

    /// Conexiones a las que se les escribió una respuesta completa
    served: AtomicU64,

    /// Conexiones cerradas sin respuesta por error de framing
    framing_failures: AtomicU64,

    /// Respuestas que no se pudieron escribir
    write_failures: AtomicU64,

    /// Respuestas por clase de estado
    responses_2xx: AtomicU64,
    responses_4xx: AtomicU64,
    responses_5xx: AtomicU64,
}

/// Snapshot serializable de las estadísticas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub uptime_secs: u64,
    pub accepted: u64,
    pub served: u64,
    pub framing_failures: u64,
    pub write_failures: u64,
    pub responses_2xx: u64,
    pub responses_4xx: u64,
    pub responses_5xx: u64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            accepted: AtomicU64::new(0),
            served: AtomicU64::new(0),
            framing_failures: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            responses_2xx: AtomicU64::new(0),
            responses_4xx: AtomicU64::new(0),
            responses_5xx: AtomicU64::new(0),
        }
    }

    pub fn record_accept(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Registra una respuesta escrita completa
    pub fn record_response(&self, status: StatusCode) {
        self.served.fetch_add(1, Ordering::Relaxed);

        let counter = if status.is_success() {
            &self.responses_2xx
        } else if status.is_client_error() {
            &self.responses_4xx
        } else {
            &self.responses_5xx
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_framing_failure(&self) {
        self.framing_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            accepted: self.accepted.load(Ordering::Relaxed),
            served: self.served.load(Ordering::Relaxed),
            framing_failures: self.framing_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            responses_2xx: self.responses_2xx.load(Ordering::Relaxed),
            responses_4xx: self.responses_4xx.load(Ordering::Relaxed),
            responses_5xx: self.responses_5xx.load(Ordering::Relaxed),
        }
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSnapshot {
    /// Snapshot en formato JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
