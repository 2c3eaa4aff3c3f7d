//! # Framing de Requests
//! src/http/framer.rs
//!
//! Reconstruye un request completo a partir de lecturas de tamaño arbitrario:
//!
//! ```text
//! read → buffer → ¿"\r\n\r\n"? → cabecera → Content-Length → read hasta completar body
//! ```
//!
//! El framer es genérico sobre `Read`, así que el mismo código enmarca un
//! `TcpStream`, un slice en memoria o un lector de prueba que entrega los
//! bytes de a poco.

use super::request::{Request, RequestHead};
use std::io::{self, Read};
use thiserror::Error;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Errores de framing. Ninguno produce respuesta: el worker cierra la conexión.
#[derive(Debug, Error)]
pub enum FramingError {
    /// El peer cerró antes de completar los headers
    #[error("connection closed before the request headers were complete")]
    ConnectionClosed,

    /// El peer cerró antes de enviar todo el body declarado
    #[error("connection closed after {received} of {expected} body bytes")]
    IncompleteBody { expected: usize, received: usize },

    /// Error de I/O leyendo del socket (incluye timeouts de lectura)
    #[error("read error: {0}")]
    Read(#[from] io::Error),

    #[error("request headers exceed {limit} bytes")]
    HeadersTooLarge { limit: usize },

    #[error("declared body of {declared} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { declared: usize, limit: usize },
}

/// Límites del framer. Un límite en 0 queda deshabilitado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramerLimits {
    /// Bytes pedidos en cada `read`
    pub chunk_size: usize,

    /// Tamaño máximo de la cabecera (request line + headers)
    pub max_header_bytes: usize,

    /// Tamaño máximo del body declarado
    pub max_body_bytes: usize,
}

impl Default for FramerLimits {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            max_header_bytes: 16 * 1024,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Enmarca requests HTTP desde cualquier fuente de bytes
#[derive(Debug, Clone, Default)]
pub struct RequestFramer {
    limits: FramerLimits,
}

impl RequestFramer {
    pub fn new(limits: FramerLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &FramerLimits {
        &self.limits
    }

    /// Lee hasta tener un request completo
    ///
    /// Primero acumula chunks hasta encontrar `\r\n\r\n`, después sigue
    /// leyendo hasta que el body tenga al menos `Content-Length` bytes.
    /// El body se recorta a la longitud declarada.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use pool_http_server::http::{FramerLimits, RequestFramer};
    ///
    /// let framer = RequestFramer::new(FramerLimits { chunk_size: 4, ..FramerLimits::default() });
    /// let mut raw: &[u8] = b"POST /api/post HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    ///
    /// let request = framer.frame(&mut raw).unwrap();
    /// assert_eq!(request.body(), b"hello");
    /// ```
    pub fn frame<R: Read + ?Sized>(&self, reader: &mut R) -> Result<Request, FramingError> {
        let mut chunk = vec![0u8; self.limits.chunk_size.max(1)];
        let mut buffer = Vec::with_capacity(chunk.len());
        let mut scan_from = 0;

        // 1. Acumular hasta el fin de los headers
        let header_end = loop {
            if let Some(pos) = find_header_end(&buffer, scan_from) {
                break pos;
            }
            self.check_header_size(buffer.len().saturating_sub(HEADER_TERMINATOR.len() - 1))?;

            let bytes_read = read_chunk(reader, &mut chunk)?;
            if bytes_read == 0 {
                return Err(FramingError::ConnectionClosed);
            }

            // El terminador puede quedar partido entre dos chunks
            scan_from = buffer.len().saturating_sub(HEADER_TERMINATOR.len() - 1);
            buffer.extend_from_slice(&chunk[..bytes_read]);
        };
        self.check_header_size(header_end)?;

        // 2. Parsear la cabecera
        let head = RequestHead::parse(&buffer[..header_end]);
        let declared = head.content_length;
        if self.limits.max_body_bytes > 0 && declared > self.limits.max_body_bytes {
            return Err(FramingError::BodyTooLarge {
                declared,
                limit: self.limits.max_body_bytes,
            });
        }

        // 3. Completar el body con lo que falte
        let mut body = buffer.split_off(header_end + HEADER_TERMINATOR.len());
        while body.len() < declared {
            let bytes_read = read_chunk(reader, &mut chunk)?;
            if bytes_read == 0 {
                return Err(FramingError::IncompleteBody {
                    expected: declared,
                    received: body.len(),
                });
            }
            body.extend_from_slice(&chunk[..bytes_read]);
        }
        body.truncate(declared);

        Ok(head.into_request(body))
    }

    fn check_header_size(&self, size: usize) -> Result<(), FramingError> {
        let limit = self.limits.max_header_bytes;
        if limit > 0 && size > limit {
            return Err(FramingError::HeadersTooLarge { limit });
        }
        Ok(())
    }
}

/// Posición donde empieza `\r\n\r\n`, buscando desde `from`
fn find_header_end(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
        .map(|pos| pos + from)
}

/// Un `read`, reintentando si fue interrumpido por una señal
fn read_chunk<R: Read + ?Sized>(reader: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(chunk) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use std::collections::VecDeque;

    /// Lector que entrega los bytes en los pedazos indicados
    struct ChunkedReader {
        chunks: VecDeque<Vec<u8>>,
    }

    impl ChunkedReader {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            }
        }

        fn byte_by_byte(raw: &[u8]) -> Self {
            Self {
                chunks: raw.iter().map(|b| vec![*b]).collect(),
            }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(mut chunk) = self.chunks.pop_front() else {
                return Ok(0);
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            Ok(n)
        }
    }

    /// Lector que interrumpe una vez y luego delega
    struct InterruptedOnce<R> {
        interrupted: bool,
        inner: R,
    }

    impl<R: Read> Read for InterruptedOnce<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
        }
    }

    const POST_RAW: &[u8] =
        b"POST /api/post HTTP/1.1\r\nHost: x\r\nContent-Length: 11\r\n\r\nhello world";

    #[test]
    fn test_frame_single_read() {
        let mut reader = ChunkedReader::new(&[POST_RAW]);
        let request = RequestFramer::default().frame(&mut reader).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), "/api/post");
        assert_eq!(request.content_length(), 11);
        assert_eq!(request.body(), b"hello world");
    }

    #[test]
    fn test_multi_chunk_frames_identically() {
        let framer = RequestFramer::default();

        let single = framer.frame(&mut ChunkedReader::new(&[POST_RAW])).unwrap();
        let split = framer
            .frame(&mut ChunkedReader::new(&[
                b"POST /api/po",
                b"st HTTP/1.1\r\nHost: x\r\nContent-Len",
                b"gth: 11\r\n\r",
                b"\nhello",
                b" wor",
                b"ld",
            ]))
            .unwrap();
        let tiny = framer.frame(&mut ChunkedReader::byte_by_byte(POST_RAW)).unwrap();

        assert_eq!(single, split);
        assert_eq!(single, tiny);
    }

    #[test]
    fn test_small_chunk_size() {
        let framer = RequestFramer::new(FramerLimits {
            chunk_size: 3,
            ..FramerLimits::default()
        });
        let mut raw = POST_RAW;
        let request = framer.frame(&mut raw).unwrap();
        assert_eq!(request.body(), b"hello world");
    }

    #[test]
    fn test_no_body_when_length_absent() {
        let mut reader = ChunkedReader::new(&[b"GET /api/greet HTTP/1.1\r\nHost: x\r\n\r\n"]);
        let request = RequestFramer::default().frame(&mut reader).unwrap();
        assert_eq!(request.content_length(), 0);
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_extra_bytes_are_truncated() {
        let mut reader = ChunkedReader::new(&[b"POST /x HTTP/1.1\r\nContent-Length: 2\r\n\r\nabcdef"]);
        let request = RequestFramer::default().frame(&mut reader).unwrap();
        assert_eq!(request.body(), b"ab");
    }

    #[test]
    fn test_partial_request_line_then_close() {
        let mut reader = ChunkedReader::new(&[b"GET /api/gr"]);
        let result = RequestFramer::default().frame(&mut reader);
        assert!(matches!(result, Err(FramingError::ConnectionClosed)));
    }

    #[test]
    fn test_close_mid_body() {
        let mut reader = ChunkedReader::new(&[b"POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc"]);
        let result = RequestFramer::default().frame(&mut reader);
        assert!(matches!(
            result,
            Err(FramingError::IncompleteBody { expected: 10, received: 3 })
        ));
    }

    #[test]
    fn test_read_error() {
        let result = RequestFramer::default().frame(&mut FailingReader);
        match result {
            Err(FramingError::Read(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let mut reader = InterruptedOnce {
            interrupted: false,
            inner: ChunkedReader::new(&[b"GET / HTTP/1.1\r\n\r\n"]),
        };
        let request = RequestFramer::default().frame(&mut reader).unwrap();
        assert_eq!(request.path(), "/");
    }

    #[test]
    fn test_headers_too_large() {
        let framer = RequestFramer::new(FramerLimits {
            chunk_size: 8,
            max_header_bytes: 16,
            max_body_bytes: 0,
        });
        let mut raw: &[u8] = b"GET /a/very/long/path/that/never/ends HTTP/1.1\r\n\r\n";
        let result = framer.frame(&mut raw);
        assert!(matches!(result, Err(FramingError::HeadersTooLarge { limit: 16 })));
    }

    #[test]
    fn test_body_too_large() {
        let framer = RequestFramer::new(FramerLimits {
            max_body_bytes: 4,
            ..FramerLimits::default()
        });
        let mut raw: &[u8] = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let result = framer.frame(&mut raw);
        assert!(matches!(
            result,
            Err(FramingError::BodyTooLarge { declared: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_zero_limits_are_unbounded() {
        let framer = RequestFramer::new(FramerLimits {
            chunk_size: 64,
            max_header_bytes: 0,
            max_body_bytes: 0,
        });
        let long_header = format!("X-Filler: {}\r\n", "a".repeat(40_000));
        let body = "b".repeat(70_000);
        let raw = format!(
            "POST /big HTTP/1.1\r\n{}Content-Length: {}\r\n\r\n{}",
            long_header,
            body.len(),
            body
        );
        let request = framer.frame(&mut raw.as_bytes()).unwrap();
        assert_eq!(request.body().len(), 70_000);
    }

    #[test]
    fn test_find_header_end_across_boundary() {
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n\r\n", 0), Some(14));
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n\r\n", 13), Some(14));
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n", 0), None);
        assert_eq!(find_header_end(b"", 5), None);
    }
}
