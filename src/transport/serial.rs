// src/transport/serial.rs
//! Hardware UART reader

use super::framer::LineFramer;
use super::WindowRead;
use crate::error::GpsError;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time::{sleep, timeout, Instant},
};
use tokio_serial::SerialPortBuilderExt;

/// Upper bound on a single blocking read
pub const READ_POLL: Duration = Duration::from_millis(1000);

/// Pause after a read that returned no bytes
const EMPTY_READ_BACKOFF: Duration = Duration::from_millis(50);

/// Reads NMEA lines from a serial device such as `/dev/serial0`
#[derive(Debug, Clone)]
pub struct SerialReader {
    device: String,
    baudrate: u32,
}

impl SerialReader {
    pub fn new(device: impl Into<String>, baudrate: u32) -> Self {
        Self {
            device: device.into(),
            baudrate,
        }
    }

    /// Open the device and collect lines until `window` elapses.
    pub async fn read_lines(&self, window: Duration) -> WindowRead {
        info!("Reading GPS on {} at {} baud for {:?}", self.device, self.baudrate, window);

        let port = match tokio_serial::new(&self.device, self.baudrate)
            .timeout(READ_POLL)
            .open_native_async()
        {
            Ok(port) => port,
            Err(e) => {
                warn!("Could not open {} @ {}: {}", self.device, self.baudrate, e);
                return WindowRead::failed(GpsError::TransportOpen(format!(
                    "{}: {}",
                    self.device, e
                )));
            }
        };

        read_window(port, window, READ_POLL).await
    }
}

/// Poll `reader` until `window` elapses or a read fails.
///
/// Each read is bounded by the smaller of `poll` and the remaining window, so
/// a silent line never holds the caller past the deadline. A zero-byte read
/// means the driver buffer is drained, not that the line has closed.
pub async fn read_window<R>(mut reader: R, window: Duration, poll: Duration) -> WindowRead
where
    R: AsyncRead + Unpin,
{
    let deadline = Instant::now() + window;
    let mut framer = LineFramer::new();
    let mut lines = Vec::new();
    let mut buf = [0u8; 512];

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let wait = poll.min(deadline - now);

        match timeout(wait, reader.read(&mut buf)).await {
            Ok(Ok(0)) => sleep(EMPTY_READ_BACKOFF.min(deadline - now)).await,
            Ok(Ok(n)) => lines.extend(framer.push(&buf[..n])),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Ok(Err(e)) => {
                warn!("Serial read failed: {}", e);
                return WindowRead {
                    lines,
                    error: Some(GpsError::TransportRead(e.to_string())),
                };
            }
            // No bytes within this poll
            Err(_) => continue,
        }
    }

    if framer.pending() > 0 {
        debug!("Dropping {} byte(s) of unterminated input", framer.pending());
    }

    WindowRead { lines, error: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::VecDeque,
        pin::Pin,
        task::{Context, Poll},
    };
    use tokio::io::{AsyncWriteExt, ReadBuf};

    /// Hands out one chunk per read, then stays silent
    struct ChunkedLine {
        chunks: VecDeque<&'static [u8]>,
    }

    impl AsyncRead for ChunkedLine {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            match self.chunks.pop_front() {
                Some(chunk) => {
                    buf.put_slice(chunk);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Pending,
            }
        }
    }

    #[tokio::test]
    async fn test_drained_buffer_keeps_polling_until_window() {
        let data: &[u8] = b"$GPGGA,1\r\n$GPRMC,2\r\n$GPR";
        let started = Instant::now();
        let read = read_window(data, Duration::from_millis(200), Duration::from_millis(100)).await;

        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(read.error.is_none());
        assert_eq!(read.lines, vec!["$GPGGA,1", "$GPRMC,2"]);
    }

    #[tokio::test]
    async fn test_empty_read_does_not_end_window() {
        let line = ChunkedLine {
            chunks: VecDeque::from(vec![
                &b"$GPGGA,1\r\n"[..],
                &b""[..],
                &b"$GPRMC,123519,A,4807.038,N,01131.000,E,0.0,0.0,230394,,\r\n"[..],
            ]),
        };

        let read = read_window(line, Duration::from_millis(300), Duration::from_millis(100)).await;

        assert!(read.error.is_none());
        assert_eq!(
            read.lines,
            vec!["$GPGGA,1", "$GPRMC,123519,A,4807.038,N,01131.000,E,0.0,0.0,230394,,"]
        );
    }

    #[tokio::test]
    async fn test_window_bounds_silent_stream() {
        let (mut tx, rx) = tokio::io::duplex(64);
        tx.write_all(b"$GPGGA,1\r\n").await.unwrap();

        let started = Instant::now();
        let read = read_window(rx, Duration::from_millis(300), Duration::from_secs(5)).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(read.error.is_none());
        assert_eq!(read.lines, vec!["$GPGGA,1"]);
        drop(tx);
    }

    #[tokio::test]
    async fn test_read_error_keeps_framed_lines() {
        let mock = tokio_test::io::Builder::new()
            .read(b"$GPGGA,1\n$GPRMC")
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"))
            .build();

        let read = read_window(mock, Duration::from_secs(2), Duration::from_millis(100)).await;

        assert_eq!(read.lines, vec!["$GPGGA,1"]);
        match read.error {
            Some(GpsError::TransportRead(msg)) => assert!(msg.contains("unplugged")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_open_failure_is_reported() {
        let reader = SerialReader::new("/dev/does-not-exist-gps", 9600);
        let read = reader.read_lines(Duration::from_millis(100)).await;

        assert!(read.lines.is_empty());
        assert!(matches!(read.error, Some(GpsError::TransportOpen(_))));
    }
}
