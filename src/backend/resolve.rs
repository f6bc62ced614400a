use crate::backend::traits::NameResolver;
use std::{
    io,
    net::{IpAddr, Ipv4Addr},
};

/// Resolves through the host's configured resolvers.
pub struct SystemResolver;

impl SystemResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver for SystemResolver {
    async fn lookup_a(&self, host: &str) -> io::Result<Vec<Ipv4Addr>> {
        let mut out = Vec::new();
        for addr in tokio::net::lookup_host((host, 0)).await? {
            if let IpAddr::V4(v4) = addr.ip()
                && !out.contains(&v4)
            {
                out.push(v4);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn literal_address_resolves_without_network() {
        let addrs = SystemResolver::new().lookup_a("127.0.0.1").await.unwrap();
        assert_eq!(addrs, vec![Ipv4Addr::LOCALHOST]);
    }
}
