//! TCP reachability probing

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::error::{Error, Result};

/// Check whether a TCP connection to `addr` can be established
///
/// `addr` is `host:port`; every resolved address is tried in turn until one
/// connects within `timeout`. The probe connection is closed with linger
/// set to zero so no data or FIN handshake lingers behind it.
///
/// Returns `Ok(false)` when no address accepted the connection and
/// `Err` when `addr` cannot be resolved at all.
pub fn detect(addr: &str, timeout: Duration) -> Result<bool> {
    let addrs: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|e| Error::Resolve(format!("{}: {}", addr, e)))?
        .collect();
    if addrs.is_empty() {
        return Err(Error::Resolve(addr.to_string()));
    }

    for target in addrs {
        match connect(target, timeout) {
            Ok(stream) => {
                drop(stream);
                return Ok(true);
            }
            Err(e) => log::debug!("tcp probe {} failed: {}", target, e),
        }
    }
    Ok(false)
}

fn connect(addr: SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.connect_timeout(&SockAddr::from(addr), timeout)?;
    socket.set_linger(Some(Duration::ZERO))?;
    Ok(socket.into())
}
