//! # Ciclo de una Conexión
//! src/server/connection.rs
//!
//! Lo que hace un worker con cada conexión que saca de la cola:
//!
//! ```text
//! Idle → Framing → Routing → Responding → Closed
//! Idle → Framing → (error) → Closed          (sin respuesta)
//! ```
//!
//! El routing nunca falla la conexión: una ruta inexistente produce un 404/405/400,
//! no un error. La conexión se cierra siempre al terminar, sin keep-alive.

use crate::http::{FramingError, RequestFramer, StatusCode};
use crate::metrics::ServerStats;
use crate::router::Router;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Resultado del ciclo de una conexión
#[derive(Debug)]
pub enum ConnectionOutcome {
    /// Se escribió una respuesta completa
    Responded(StatusCode),

    /// El request no se pudo enmarcar; no se envió respuesta
    FramingFailed(FramingError),

    /// La respuesta no se pudo escribir
    WriteFailed(io::Error),
}

/// Todo lo que un worker necesita para atender conexiones
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub router: Arc<Router>,
    pub framer: RequestFramer,
    pub stats: Arc<ServerStats>,

    /// Timeout de lectura/escritura del socket (`None` = sin límite)
    pub io_timeout: Option<Duration>,
}

impl ConnectionContext {
    /// Atiende una conexión TCP completa y la cierra
    pub fn serve(&self, mut stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        if let Err(e) = stream
            .set_read_timeout(self.io_timeout)
            .and_then(|()| stream.set_write_timeout(self.io_timeout))
        {
            warn!(peer = %peer, error = %e, "no se pudo configurar el timeout del socket");
        }

        self.handle(&mut stream, &peer);

        // Cierre explícito; el drop del stream libera el descriptor
        if let Err(e) = stream.shutdown(Shutdown::Both) {
            debug!(peer = %peer, error = %e, "no se pudo cerrar el socket");
        }
    }

    /// Enmarca, enruta y responde sobre cualquier stream bidireccional
    pub fn handle<S: Read + Write>(&self, stream: &mut S, peer: &str) -> ConnectionOutcome {
        let start = Instant::now();

        let request = match self.framer.frame(stream) {
            Ok(request) => request,
            Err(e) => {
                debug!(peer, error = %e, "request incompleto, se cierra sin respuesta");
                self.stats.record_framing_failure();
                return ConnectionOutcome::FramingFailed(e);
            }
        };

        let response = self.router.dispatch(&request);
        let status = response.status();

        let written = stream
            .write_all(&response.to_bytes())
            .and_then(|()| stream.flush());
        if let Err(e) = written {
            warn!(peer, error = %e, "no se pudo escribir la respuesta");
            self.stats.record_write_failure();
            return ConnectionOutcome::WriteFailed(e);
        }

        self.stats.record_response(status);
        debug!(
            peer,
            method = %request.method(),
            path = request.path(),
            status = status.as_u16(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "request atendido"
        );
        ConnectionOutcome::Responded(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{content_type, FramerLimits, Method};
    use std::io::Cursor;
    use std::net::TcpListener;
    use std::thread;

    /// Stream en memoria: lee de `input`, acumula lo escrito en `output`
    struct MemoryStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl MemoryStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
            }
        }

        fn output_text(&self) -> String {
            String::from_utf8_lossy(&self.output).to_string()
        }
    }

    impl Read for MemoryStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MemoryStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Stream que lee bien pero rechaza toda escritura
    struct BrokenPipe(Cursor<Vec<u8>>);

    impl Read for BrokenPipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn context() -> ConnectionContext {
        let mut router = Router::new();
        router.register(
            "/api/greet",
            Method::GET,
            || Ok(br#"{"message":"hi"}"#.to_vec()),
            content_type::APPLICATION_JSON,
        );

        ConnectionContext {
            router: Arc::new(router),
            framer: RequestFramer::new(FramerLimits::default()),
            stats: Arc::new(ServerStats::new()),
            io_timeout: Some(Duration::from_secs(5)),
        }
    }

    #[test]
    fn test_handle_greet_ok() {
        let ctx = context();
        let mut stream = MemoryStream::new(b"GET /api/greet HTTP/1.1\r\nHost: x\r\n\r\n");

        let outcome = ctx.handle(&mut stream, "test");

        assert!(matches!(outcome, ConnectionOutcome::Responded(StatusCode::Ok)));
        let text = stream.output_text();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with(r#"{"message":"hi"}"#));
        assert_eq!(ctx.stats.snapshot().served, 1);
    }

    #[test]
    fn test_handle_method_not_allowed() {
        let ctx = context();
        let mut stream = MemoryStream::new(b"POST /api/greet HTTP/1.1\r\n\r\n");

        let outcome = ctx.handle(&mut stream, "test");

        assert!(matches!(outcome, ConnectionOutcome::Responded(StatusCode::MethodNotAllowed)));
        assert!(stream.output_text().starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    }

    #[test]
    fn test_partial_request_sends_nothing() {
        let ctx = context();
        let mut stream = MemoryStream::new(b"GET /api/gr");

        let outcome = ctx.handle(&mut stream, "test");

        assert!(matches!(
            outcome,
            ConnectionOutcome::FramingFailed(FramingError::ConnectionClosed)
        ));
        assert!(stream.output.is_empty());
        assert_eq!(ctx.stats.snapshot().framing_failures, 1);
        assert_eq!(ctx.stats.snapshot().served, 0);
    }

    #[test]
    fn test_write_failure_is_contained() {
        let ctx = context();
        let mut stream = BrokenPipe(Cursor::new(b"GET /api/greet HTTP/1.1\r\n\r\n".to_vec()));

        let outcome = ctx.handle(&mut stream, "test");

        assert!(matches!(outcome, ConnectionOutcome::WriteFailed(_)));
        assert_eq!(ctx.stats.snapshot().write_failures, 1);
    }

    #[test]
    fn test_serve_over_tcp_closes_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let ctx = context();

        let server = thread::spawn({
            let ctx = ctx.clone();
            move || {
                let (stream, _) = listener.accept().unwrap();
                ctx.serve(stream);
            }
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"GET /unknown HTTP/1.1\r\n\r\n").unwrap();

        // read_to_end solo termina si el servidor cerró la conexión
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);

        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Type: text/html\r\n"));
        server.join().unwrap();
    }

    #[test]
    fn test_serve_peer_closed_immediately() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let ctx = context();

        let server = thread::spawn({
            let ctx = ctx.clone();
            move || {
                let (stream, _) = listener.accept().unwrap();
                ctx.serve(stream);
            }
        });

        drop(TcpStream::connect(addr).unwrap());
        server.join().unwrap();

        assert_eq!(ctx.stats.snapshot().framing_failures, 1);
    }
}
