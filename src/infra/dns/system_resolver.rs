// Hostname resolution through the operating system resolver.

use crate::core::urls::HostResolver;
use async_trait::async_trait;
use std::io;
use std::net::IpAddr;

/// Resolves with `tokio::net::lookup_host`, preferring IPv4 answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<IpAddr> {
        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await?
            .map(|addr| addr.ip())
            .collect();

        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host has no addresses"))
    }
}
