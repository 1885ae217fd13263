//! Free port allocation.
//!
//! Best effort: the port is free when probed, but another process may claim
//! it before the container binds it. Nothing here retries or re-verifies.

use std::io;
use std::net::TcpListener;

use nbspace_core::config::PortConfig;

pub trait PortAllocator: Send + Sync {
    fn free_port(&self) -> io::Result<u16>;
}

/// Asks the OS for an ephemeral port by binding port 0 on `host`.
#[derive(Debug, Clone)]
pub struct LocalPortAllocator {
    host: String,
}

impl LocalPortAllocator {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn from_config(cfg: &PortConfig) -> Self {
        Self::new(cfg.host.clone())
    }
}

impl Default for LocalPortAllocator {
    fn default() -> Self {
        Self::from_config(&PortConfig::default())
    }
}

impl PortAllocator for LocalPortAllocator {
    fn free_port(&self) -> io::Result<u16> {
        let listener = TcpListener::bind((self.host.as_str(), 0))?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_port_is_bindable() {
        let allocator = LocalPortAllocator::default();
        let port = allocator.free_port().unwrap();
        assert_ne!(port, 0);
        let listener = TcpListener::bind(("127.0.0.1", port));
        assert!(listener.is_ok());
    }

    #[test]
    fn test_bad_host_is_error() {
        let allocator = LocalPortAllocator::new("definitely.not.a.host.invalid");
        assert!(allocator.free_port().is_err());
    }
}
