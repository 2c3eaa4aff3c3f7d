//! # Pool de Workers
//! src/server/pool.rs
//!
//! N threads de larga vida que repiten el mismo ciclo:
//!
//! ```text
//! pop() → procesar el item completo → pop() → ...
//! ```
//!
//! Un panic mientras se procesa un item queda contenido en ese item: el
//! worker lo registra y vuelve a la cola, así el pool nunca se achica.

use super::queue::ConnectionQueue;
use crate::error::{panic_message, ServerError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

#[derive(Debug)]
struct Worker {
    id: usize,
    thread: JoinHandle<()>,
}

/// Contadores compartidos por todos los workers del pool
#[derive(Debug, Default)]
struct PoolCounters {
    busy: AtomicUsize,
    panicked: AtomicU64,
}

/// Pool de tamaño fijo que consume una `ConnectionQueue`
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<Worker>,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// Lanza `size` workers que procesan items de `queue` con `process`
    ///
    /// Los workers terminan cuando la cola se cierra y queda vacía.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use pool_http_server::server::{ConnectionQueue, WorkerPool};
    /// use std::sync::Arc;
    ///
    /// let queue = Arc::new(ConnectionQueue::new());
    /// let pool = WorkerPool::spawn(2, Arc::clone(&queue), |n: u32| assert!(n < 10)).unwrap();
    ///
    /// queue.push(3).unwrap();
    /// queue.close();
    /// pool.join();
    /// ```
    pub fn spawn<T, F>(
        size: usize,
        queue: Arc<ConnectionQueue<T>>,
        process: F,
    ) -> Result<Self, ServerError>
    where
        T: Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        if size == 0 {
            return Err(ServerError::InvalidConfig(
                "worker pool size must be >= 1".to_string(),
            ));
        }

        let process = Arc::new(process);
        let counters = Arc::new(PoolCounters::default());
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let spawned = thread::Builder::new().name(format!("worker-{id}")).spawn({
                let queue = Arc::clone(&queue);
                let process = Arc::clone(&process);
                let counters = Arc::clone(&counters);
                move || worker_loop(id, &queue, process.as_ref(), &counters)
            });

            match spawned {
                Ok(thread) => workers.push(Worker { id, thread }),
                Err(e) => {
                    // Los workers ya lanzados quedarían bloqueados en pop()
                    queue.close();
                    Self { workers, counters }.join();
                    return Err(ServerError::Spawn(e));
                }
            }
        }

        debug!(size, "pool de workers iniciado");
        Ok(Self { workers, counters })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Workers que están procesando un item en este momento
    pub fn busy(&self) -> usize {
        self.counters.busy.load(Ordering::SeqCst)
    }

    /// Panics contenidos desde que arrancó el pool
    pub fn panicked(&self) -> u64 {
        self.counters.panicked.load(Ordering::SeqCst)
    }

    /// Espera a que terminen todos los workers
    ///
    /// La cola debe estar cerrada antes, si no esto bloquea para siempre.
    pub fn join(self) {
        for worker in self.workers {
            if worker.thread.join().is_err() {
                error!(worker = worker.id, "el worker terminó con panic");
            }
        }
    }
}

fn worker_loop<T, F>(id: usize, queue: &ConnectionQueue<T>, process: &F, counters: &PoolCounters)
where
    F: Fn(T),
{
    debug!(worker = id, "worker listo");

    while let Some(item) = queue.pop() {
        counters.busy.fetch_add(1, Ordering::SeqCst);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| process(item)));
        counters.busy.fetch_sub(1, Ordering::SeqCst);

        if let Err(payload) = outcome {
            counters.panicked.fetch_add(1, Ordering::SeqCst);
            error!(
                worker = id,
                panic = panic_message(payload.as_ref()),
                "panic contenido, la conexión se descarta"
            );
        }
    }

    debug!(worker = id, "worker terminado");
}
