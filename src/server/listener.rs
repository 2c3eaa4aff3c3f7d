//! # Listener TCP
//! src/server/listener.rs
//!
//! Dueño del socket del servidor. Acepta conexiones de a una y las encola;
//! nunca procesa un request. Un error de `accept` se registra y el loop
//! sigue; solo el bind es fatal.

use super::queue::ConnectionQueue;
use crate::error::ServerError;
use crate::metrics::ServerStats;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Hace bind y listen en `address` (ej: "127.0.0.1:8080")
    ///
    /// Con puerto 0 el sistema elige uno libre; ver `local_addr`.
    pub fn bind(address: &str) -> Result<Self, ServerError> {
        let inner = TcpListener::bind(address).map_err(|source| ServerError::Bind {
            address: address.to_string(),
            source,
        })?;
        let local_addr = inner.local_addr()?;

        info!(%local_addr, "servidor escuchando");
        Ok(Self { inner, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Acepta conexiones hasta que `shutdown` se active
    ///
    /// El flag se revisa después de cada `accept`; quien detiene el servidor
    /// debe llamar a `wake` para desbloquear el `accept` en curso.
    pub fn accept_loop(
        &self,
        queue: &ConnectionQueue<TcpStream>,
        shutdown: &AtomicBool,
        stats: &ServerStats,
    ) {
        for stream in self.inner.incoming() {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => {
                    stats.record_accept();
                    let peer = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    debug!(peer = %peer, "nueva conexión");

                    if queue.push(stream).is_err() {
                        // La cola se cerró: la conexión se cierra al soltarla
                        warn!(peer = %peer, "cola cerrada, conexión descartada");
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "error al aceptar conexión");
                }
            }
        }

        info!(local_addr = %self.local_addr, "listener detenido");
    }

    /// Desbloquea un `accept` pendiente conectándose al propio socket
    pub fn wake(&self) {
        let target = wake_address(self.local_addr);
        if let Err(e) = TcpStream::connect_timeout(&target, WAKE_TIMEOUT) {
            debug!(%target, error = %e, "no se pudo despertar al listener");
        }
    }
}

/// Una dirección no especificada (0.0.0.0 / ::) no sirve para conectarse
fn wake_address(local_addr: SocketAddr) -> SocketAddr {
    let ip = match local_addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local_addr.port())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_bind_ephemeral_port() {
        let listener = Listener::bind("127.0.0.1:0").unwrap();
        assert_ne!(listener.local_addr().port(), 0);
    }

    #[test]
    fn test_bind_failure_is_reported() {
        let first = Listener::bind("127.0.0.1:0").unwrap();
        let taken = first.local_addr().to_string();

        match Listener::bind(&taken) {
            Err(ServerError::Bind { address, .. }) => assert_eq!(address, taken),
            other => panic!("expected bind error, got {:?}", other),
        }
    }

    #[test]
    fn test_bind_invalid_address() {
        let result = Listener::bind("not-an-address");
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }

    #[test]
    fn test_accept_loop_enqueues_in_order_and_stops() {
        let listener = Arc::new(Listener::bind("127.0.0.1:0").unwrap());
        let queue = Arc::new(ConnectionQueue::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(ServerStats::new());

        let acceptor = thread::spawn({
            let listener = Arc::clone(&listener);
            let queue = Arc::clone(&queue);
            let shutdown = Arc::clone(&shutdown);
            let stats = Arc::clone(&stats);
            move || listener.accept_loop(&queue, &shutdown, &stats)
        });

        let clients: Vec<TcpStream> = (0..3)
            .map(|_| TcpStream::connect(listener.local_addr()).unwrap())
            .collect();

        let mut accepted = Vec::new();
        for _ in 0..3 {
            accepted.push(queue.pop().unwrap());
        }

        shutdown.store(true, Ordering::SeqCst);
        listener.wake();
        acceptor.join().unwrap();

        // FIFO: el orden de la cola respeta el orden de llegada
        let client_ports: Vec<_> = clients.iter().map(|c| c.local_addr().unwrap().port()).collect();
        let accepted_ports: Vec<_> = accepted.iter().map(|s| s.peer_addr().unwrap().port()).collect();
        assert_eq!(client_ports, accepted_ports);

        assert_eq!(stats.snapshot().accepted, 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wake_address_for_unspecified() {
        let any: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        assert_eq!(wake_address(any), "127.0.0.1:8080".parse().unwrap());

        let any_v6: SocketAddr = "[::]:9000".parse().unwrap();
        assert_eq!(wake_address(any_v6), "[::1]:9000".parse().unwrap());

        let specific: SocketAddr = "10.0.0.5:80".parse().unwrap();
        assert_eq!(wake_address(specific), specific);
    }
}
