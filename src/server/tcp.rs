//! # Servidor TCP con Pool de Workers
//! src/server/tcp.rs
//!
//! Raíz de composición: une listener, cola, pool y router.
//!
//! ```text
//! listener ──push──▶ ConnectionQueue ──pop──▶ worker-0..N ──▶ Router ──▶ respuesta
//! ```
//!
//! Un thread acepta conexiones y N workers las atienden de a una. El router
//! se congela en un `Arc` antes de lanzar los workers.
//!
//! Orden de apagado: detener el listener (no entran más conexiones), cerrar
//! la cola, esperar a que los workers drenen lo pendiente y terminen.

use super::connection::ConnectionContext;
use super::listener::Listener;
use super::pool::WorkerPool;
use super::queue::ConnectionQueue;
use crate::config::Config;
use crate::error::ServerError;
use crate::metrics::{ServerStats, StatsSnapshot};
use crate::router::Router;
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Servidor HTTP/1.1 con pool fijo de workers
#[derive(Debug)]
pub struct Server {
    config: Config,
    router: Arc<Router>,
    stats: Arc<ServerStats>,
}

impl Server {
    /// Crea el servidor. Las rutas quedan fijas a partir de aquí.
    pub fn new(config: Config, router: Router) -> Self {
        Self::with_stats(config, router, Arc::new(ServerStats::new()))
    }

    /// Igual que `new`, compartiendo contadores ya creados (ej: con una ruta `/api/stats`)
    pub fn with_stats(config: Config, router: Router, stats: Arc<ServerStats>) -> Self {
        Self {
            config,
            router: Arc::new(router),
            stats,
        }
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        Arc::clone(&self.stats)
    }

    /// Hace bind, lanza el pool y el thread del listener, y retorna enseguida
    ///
    /// Un error de bind es fatal y se reporta aquí.
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        let address = self.config.address();
        info!(%address, workers = self.config.workers, "iniciando servidor");

        let listener = Arc::new(Listener::bind(&address)?);
        let local_addr = listener.local_addr();

        let queue: Arc<ConnectionQueue<TcpStream>> = Arc::new(ConnectionQueue::new());
        let context = ConnectionContext {
            router: Arc::clone(&self.router),
            framer: self.config.framer(),
            stats: Arc::clone(&self.stats),
            io_timeout: self.config.io_timeout(),
        };

        let pool = WorkerPool::spawn(self.config.workers, Arc::clone(&queue), move |stream| {
            context.serve(stream)
        })?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let spawned = thread::Builder::new().name("listener".to_string()).spawn({
            let listener = Arc::clone(&listener);
            let queue = Arc::clone(&queue);
            let shutdown = Arc::clone(&shutdown);
            let stats = Arc::clone(&self.stats);
            move || listener.accept_loop(&queue, &shutdown, &stats)
        });

        let acceptor = match spawned {
            Ok(acceptor) => acceptor,
            Err(e) => {
                queue.close();
                pool.join();
                return Err(ServerError::Spawn(e));
            }
        };

        info!(%local_addr, workers = pool.size(), "servidor listo");
        Ok(ServerHandle {
            local_addr,
            listener,
            acceptor,
            queue,
            pool,
            shutdown,
            stats: self.stats,
        })
    }

    /// Arranca y bloquea el thread actual mientras el servidor corra
    pub fn run(self) -> Result<(), ServerError> {
        self.start()?.wait();
        Ok(())
    }
}

/// Servidor en marcha
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    listener: Arc<Listener>,
    acceptor: JoinHandle<()>,
    queue: Arc<ConnectionQueue<TcpStream>>,
    pool: WorkerPool,
    shutdown: Arc<AtomicBool>,
    stats: Arc<ServerStats>,
}

impl ServerHandle {
    /// Dirección real en la que escucha (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Workers ocupados en este momento
    pub fn busy_workers(&self) -> usize {
        self.pool.busy()
    }

    pub fn worker_count(&self) -> usize {
        self.pool.size()
    }

    /// Conexiones aceptadas que todavía esperan un worker
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Detiene el servidor en orden y espera a que todo termine
    ///
    /// Un cliente conectado que no envía nada retiene a su worker, y sin
    /// `--read-timeout-ms` esta llamada espera por él indefinidamente.
    pub fn shutdown(self) {
        info!(local_addr = %self.local_addr, "apagando servidor");
        self.shutdown.store(true, Ordering::SeqCst);
        self.listener.wake();
        self.finish();
    }

    /// Bloquea hasta que el listener termine, luego apaga el pool
    pub fn wait(self) {
        self.finish();
    }

    fn finish(self) {
        if self.acceptor.join().is_err() {
            error!("el thread del listener terminó con panic");
        }

        self.queue.close();
        self.pool.join();
        info!(stats = ?self.stats.snapshot(), "servidor detenido");
    }
}
