//! # Cola de Conexiones
//! src/server/queue.rs
//!
//! Cola FIFO thread-safe entre el listener (productor) y los workers
//! (consumidores). `push` nunca bloquea; `pop` bloquea mientras la cola esté
//! vacía. Al cerrarla, los workers drenan lo que quede y después `pop`
//! devuelve `None`.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Cola FIFO sin límite con `pop` bloqueante
pub struct ConnectionQueue<T> {
    state: Mutex<QueueState<T>>,

    /// Notifica a los workers cuando hay items nuevos o la cola se cierra
    available: Condvar,
}

impl<T> ConnectionQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    // Un panic nunca ocurre con el lock tomado, así que el estado sigue siendo válido
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola un item y despierta a un consumidor
    ///
    /// Si la cola ya fue cerrada, devuelve el item al llamador.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.lock();
        if state.closed {
            return Err(item);
        }
        state.items.push_back(item);
        drop(state);

        self.available.notify_one();
        Ok(())
    }

    /// Desencola el item más antiguo
    ///
    /// Bloquea hasta que haya un item. Devuelve `None` solo cuando la cola
    /// está cerrada y vacía.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Cierra la cola y despierta a todos los consumidores
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> std::fmt::Debug for ConnectionQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ConnectionQueue")
            .field("len", &state.items.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<T> Default for ConnectionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
