//! Listening socket shared between the supervisor and its workers.
//!
//! The supervisor binds once and clears `FD_CLOEXEC` so the descriptor
//! survives `exec`; every worker then accepts on the same socket.

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr, TcpListener};

/// Bind the listening socket.
pub fn bind(interface: IpAddr, port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::new(interface, port);
    TcpListener::bind(addr).with_context(|| format!("failed to bind {addr}"))
}

/// Make `listener` inheritable by child processes and return its descriptor.
#[cfg(unix)]
pub fn share(listener: &TcpListener) -> Result<std::os::fd::RawFd> {
    use nix::fcntl::{FcntlArg, FdFlag, fcntl};
    use std::os::fd::AsRawFd;

    let fd = listener.as_raw_fd();
    let flags = FdFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFD).context("F_GETFD")?);
    fcntl(fd, FcntlArg::F_SETFD(flags - FdFlag::FD_CLOEXEC)).context("F_SETFD")?;
    Ok(fd)
}

/// Adopt the listener passed down by the supervisor.
#[cfg(unix)]
pub fn inherit(fd: std::os::fd::RawFd) -> Result<TcpListener> {
    use nix::fcntl::{FcntlArg, fcntl};
    use std::os::fd::FromRawFd;

    // Reject descriptors that were not actually inherited
    fcntl(fd, FcntlArg::F_GETFD).with_context(|| format!("listen fd {fd} is not open"))?;

    // SAFETY: the descriptor is open and handed to this process exclusively
    // for use as its listening socket; nothing else in the worker owns it.
    let listener = unsafe { TcpListener::from_raw_fd(fd) };
    listener
        .local_addr()
        .with_context(|| format!("listen fd {fd} is not a bound TCP socket"))?;
    Ok(listener)
}

#[cfg(not(unix))]
pub fn share(_listener: &TcpListener) -> Result<i32> {
    anyhow::bail!("sharing a listener with worker processes requires a unix platform")
}

#[cfg(not(unix))]
pub fn inherit(fd: i32) -> Result<TcpListener> {
    anyhow::bail!("cannot adopt listen fd {fd}: worker processes require a unix platform")
}
