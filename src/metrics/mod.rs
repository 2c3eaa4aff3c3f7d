//! # Estadísticas
//! src/metrics/mod.rs
//!
//! Contadores de conexiones aceptadas, respondidas y fallidas. Los tests de
//! integración los usan para verificar que cada conexión se procesa una vez.

pub mod collector;

pub use collector::{ServerStats, StatsSnapshot};
