//! Module about tcp channel. See [TcpStream].
//!
//! The receiver listens on a port and the sender connects to it. Nothing else is negotiated.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use scuttlebutt::SyncChannel;
use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread::sleep;
use std::time::{Duration, Instant};

/// How long [connect] keeps retrying before giving up.
pub const TIMEOUT: Duration = Duration::from_secs(10);

const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Channel over a [TcpStream].
pub type TcpChannel = SyncChannel<BufReader<TcpStream>, BufWriter<TcpStream>>;

fn into_channel(stream: TcpStream) -> Result<TcpChannel> {
    stream
        .set_nodelay(true)
        .with_context(|| format!("@{}:{}", file!(), line!()))?;
    let s = stream
        .try_clone()
        .with_context(|| format!("@{}:{}", file!(), line!()))?;
    Ok(SyncChannel::new(BufReader::new(s), BufWriter::new(stream)))
}

/// Connect to `addr`, retrying until `timeout` so that the peer may start listening later.
pub fn connect<A: ToSocketAddrs>(addr: A, timeout: Duration) -> Result<TcpChannel> {
    let addrs = addr
        .to_socket_addrs()
        .with_context(|| format!("@{}:{}", file!(), line!()))?
        .collect::<Vec<SocketAddr>>();
    if addrs.is_empty() {
        bail!("address resolved to nothing @{}:{}", file!(), line!());
    }

    let deadline = Instant::now() + timeout;
    loop {
        for a in addrs.iter() {
            match TcpStream::connect_timeout(a, timeout) {
                Ok(stream) => {
                    info!("connected to {}", a);
                    return into_channel(stream);
                }
                Err(e) => debug!("connect to {} failed: {}", a, e),
            }
        }

        if Instant::now() >= deadline {
            bail!(
                "could not connect to {:?} within {:?} @{}:{}",
                addrs,
                timeout,
                file!(),
                line!()
            );
        }
        sleep(RETRY_INTERVAL);
    }
}

/// Listen on `0.0.0.0:port` and accept exactly one peer.
pub fn listen(port: u16) -> Result<TcpChannel> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener =
        TcpListener::bind(addr).with_context(|| format!("addr={} @{}:{}", addr, file!(), line!()))?;

    info!("listening on {}", addr);

    let (stream, peer) = listener
        .accept()
        .with_context(|| format!("@{}:{}", file!(), line!()))?;

    info!("accepted {}", peer);

    into_channel(stream)
}

/// Create a connected pair of tcp channels on localhost.
///
/// Return `(sender side, receiver side)`.
pub fn create_tcp_channels(port: u16) -> Result<(TcpChannel, TcpChannel)> {
    let receiver_handle = std::thread::spawn(move || listen(port));

    let sender_channel = connect(("127.0.0.1", port), TIMEOUT)?;
    let receiver_channel = match receiver_handle.join() {
        Ok(res) => res?,
        Err(_) => bail!("listener thread panicked @{}:{}", file!(), line!()),
    };

    Ok((sender_channel, receiver_channel))
}
