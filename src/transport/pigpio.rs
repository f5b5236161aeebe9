// src/transport/pigpio.rs
//! Bit-banged serial reception through the pigpio daemon

use super::framer::LineFramer;
use super::WindowRead;
use crate::error::{GpsError, Result};
use log::{debug, info, warn};
use std::{future::Future, io, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    time::{sleep, timeout, Instant},
};

// pigpiod socket command numbers
const CMD_SLRO: u32 = 42;
const CMD_SLR: u32 = 43;
const CMD_SLRC: u32 = 44;

/// Data bits for the receive channel
const DATA_BITS: u32 = 8;

/// Most bytes requested from the daemon per poll
const MAX_CHUNK: u32 = 8192;

/// Delay between polls of the daemon's receive buffer
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long the release of the channel may take once the window has closed
const RELEASE_TIMEOUT: Duration = Duration::from_millis(500);

/// Minimal client for the pigpiod command socket.
///
/// Every request is four little-endian `u32` words (command, p1, p2, length of
/// extension) followed by the extension; every reply echoes three words and
/// ends with a signed result.
pub struct PigpioClient<S> {
    stream: S,
}

impl PigpioClient<TcpStream> {
    /// Connect to a pigpio daemon
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect(format!("{}:{}", host, port))
            .await
            .map_err(|e| GpsError::GpioUnavailable(format!("pigpiod at {}:{}: {}", host, port, e)))?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

impl<S> PigpioClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    async fn command(&mut self, name: &'static str, cmd: u32, p1: u32, p2: u32, ext: &[u8]) -> Result<i32> {
        let mut request = Vec::with_capacity(16 + ext.len());
        for word in [cmd, p1, p2, ext.len() as u32] {
            request.extend_from_slice(&word.to_le_bytes());
        }
        request.extend_from_slice(ext);
        self.stream.write_all(&request).await?;

        let mut reply = [0u8; 16];
        self.stream.read_exact(&mut reply).await?;
        let res = i32::from_le_bytes([reply[12], reply[13], reply[14], reply[15]]);
        if res < 0 {
            return Err(GpsError::Pigpio { command: name, code: res });
        }
        Ok(res)
    }

    /// Claim `gpio` as a bit-banged serial receiver
    pub async fn serial_read_open(&mut self, gpio: u32, baud: u32) -> Result<()> {
        self.command("slro", CMD_SLRO, gpio, baud, &DATA_BITS.to_le_bytes()).await?;
        Ok(())
    }

    /// Drain bytes received on `gpio` since the last call
    pub async fn serial_read(&mut self, gpio: u32) -> Result<Vec<u8>> {
        let count = self.command("slr", CMD_SLR, gpio, MAX_CHUNK, &[]).await? as usize;
        let mut data = vec![0u8; count];
        if count > 0 {
            self.stream.read_exact(&mut data).await?;
        }
        Ok(data)
    }

    /// Release `gpio`
    pub async fn serial_read_close(&mut self, gpio: u32) -> Result<()> {
        self.command("slrc", CMD_SLRC, gpio, 0, &[]).await?;
        Ok(())
    }
}

/// Reads NMEA lines from a GPIO pin sampled by pigpiod
#[derive(Debug, Clone)]
pub struct BitBangReader {
    host: String,
    port: u16,
    gpio: u32,
    baudrate: u32,
}

impl BitBangReader {
    pub fn new(host: impl Into<String>, port: u16, gpio: u32, baudrate: u32) -> Self {
        Self {
            host: host.into(),
            port,
            gpio,
            baudrate,
        }
    }

    /// Connect to the daemon and collect lines until `window` elapses.
    pub async fn read_lines(&self, window: Duration) -> WindowRead {
        info!(
            "Reading GPS on GPIO {} at {} baud via pigpiod {}:{} for {:?}",
            self.gpio, self.baudrate, self.host, self.port, window
        );

        let started = Instant::now();
        let client = match timeout(window, PigpioClient::connect(&self.host, self.port)).await {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => {
                warn!("{}", e);
                return WindowRead::failed(e);
            }
            Err(_) => {
                let e = GpsError::GpioUnavailable(format!(
                    "pigpiod at {}:{} did not answer within {:?}",
                    self.host, self.port, window
                ));
                warn!("{}", e);
                return WindowRead::failed(e);
            }
        };

        let remaining = window.saturating_sub(started.elapsed());
        read_channel(client, self.gpio, self.baudrate, remaining, POLL_INTERVAL).await
    }
}

/// Open the receive channel, poll it for `window`, and release it.
///
/// Every daemon round trip is bounded by what is left of the window. The
/// channel is closed on every path once it has been opened, including when a
/// poll fails or the daemon stops answering; the release gets a short grace
/// period of its own.
pub async fn read_channel<S>(
    mut client: PigpioClient<S>,
    gpio: u32,
    baudrate: u32,
    window: Duration,
    poll: Duration,
) -> WindowRead
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let deadline = Instant::now() + window;

    if let Err(e) = bounded(window, "slro", client.serial_read_open(gpio, baudrate)).await {
        warn!("Could not open bit-banged serial on GPIO {}: {}", gpio, e);
        let e = if matches!(e, GpsError::Pigpio { .. }) {
            e
        } else {
            GpsError::TransportOpen(e.to_string())
        };
        return WindowRead::failed(e);
    }

    let mut read = poll_channel(&mut client, gpio, deadline, poll).await;

    if let Err(e) = bounded(RELEASE_TIMEOUT, "slrc", client.serial_read_close(gpio)).await {
        warn!("Could not release GPIO {}: {}", gpio, e);
        if read.error.is_none() {
            read.error = Some(e);
        }
    } else {
        debug!("Released GPIO {}", gpio);
    }

    read
}

async fn poll_channel<S>(client: &mut PigpioClient<S>, gpio: u32, deadline: Instant, poll: Duration) -> WindowRead
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framer = LineFramer::new();
    let mut lines = Vec::new();

    while Instant::now() < deadline {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match bounded(remaining, "slr", client.serial_read(gpio)).await {
            Ok(bytes) => lines.extend(framer.push(&bytes)),
            Err(e) => {
                warn!("Bit-banged read on GPIO {} failed: {}", gpio, e);
                let e = if matches!(e, GpsError::Pigpio { .. }) {
                    e
                } else {
                    GpsError::TransportRead(e.to_string())
                };
                return WindowRead { lines, error: Some(e) };
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        sleep(poll.min(remaining)).await;
    }

    WindowRead { lines, error: None }
}

/// Run one daemon round trip, failing with `TimedOut` after `limit`.
async fn bounded<T, F>(limit: Duration, command: &'static str, round_trip: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, round_trip).await {
        Ok(result) => result,
        Err(_) => Err(GpsError::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no {} reply from pigpiod within {:?}", command, limit),
        ))),
    }
}
