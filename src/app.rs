use crate::{
    backend::traits::{AdapterBackend, DnsClientBackend, DnsServerBackend, NameResolver},
    domain::{
        adapter::{NetAdapter, select_adapter},
        common::{Invocation, Mode},
    },
    error::SetupError,
    verify::{Resolution, Verifier},
};
use std::{net::Ipv4Addr, time::Duration};
use tracing::{info, warn};

pub const DEFAULT_EVENT_SOURCE: &str = "dnsprep";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub probe_host: String,
    pub event_source: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(60 * 60),
            probe_host: "www.microsoft.com".to_string(),
            event_source: DEFAULT_EVENT_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub adapter: NetAdapter,
    pub resolved: Vec<Ipv4Addr>,
    pub attempts: u32,
}

pub struct App<B, R> {
    pub config: AppConfig,
    backend: B,
    resolver: R,
}

impl<B, R> App<B, R>
where
    B: AdapterBackend + DnsServerBackend + DnsClientBackend,
    R: NameResolver,
{
    pub fn new(config: AppConfig, backend: B, resolver: R) -> Self {
        Self {
            config,
            backend,
            resolver,
        }
    }

    /// Applies the invocation to the host, then waits for name resolution.
    ///
    /// Steps that already succeeded stay applied when a later one fails.
    pub async fn run(&self, invocation: &Invocation) -> Result<Outcome, SetupError> {
        let adapter = self.find_adapter().await?;
        info!(
            adapter = %adapter.name,
            description = %adapter.interface_description,
            if_index = adapter.if_index,
            mode = %invocation.mode,
            "selected adapter"
        );

        match invocation.mode {
            Mode::Server => self.configure_server(&adapter, invocation).await?,
            Mode::Client => self.configure_client(&adapter, invocation).await?,
        }

        self.backend.flush_cache().await?;
        info!("flushed resolver cache");

        let (resolved, attempts) = self.wait_for_resolution().await?;
        Ok(Outcome {
            adapter,
            resolved,
            attempts,
        })
    }

    async fn find_adapter(&self) -> Result<NetAdapter, SetupError> {
        let adapters = self.backend.list_adapters().await?;
        select_adapter(&adapters)
            .cloned()
            .ok_or(SetupError::NoActiveAdapter)
    }

    async fn configure_server(
        &self,
        adapter: &NetAdapter,
        invocation: &Invocation,
    ) -> Result<(), SetupError> {
        if self.backend.feature_installed().await? {
            info!("DNS Server feature already installed");
        } else {
            info!("installing DNS Server feature");
            self.backend.install_feature().await?;
            info!("DNS Server feature installed; a reboot may be required");
        }

        let resolvers = invocation.resolver_list();
        self.backend.set_resolvers(adapter, &resolvers).await?;
        info!(adapter = %adapter.name, resolvers = ?resolvers, "set interface resolvers");

        let forwarders = invocation.forwarders();
        self.backend.set_forwarders(&forwarders).await?;
        info!(forwarders = ?forwarders, "registered DNS forwarders");
        Ok(())
    }

    async fn configure_client(
        &self,
        adapter: &NetAdapter,
        invocation: &Invocation,
    ) -> Result<(), SetupError> {
        let resolvers = invocation.resolver_list();
        self.backend.set_resolvers(adapter, &resolvers).await?;
        info!(adapter = %adapter.name, resolvers = ?resolvers, "set interface resolvers");
        Ok(())
    }

    async fn wait_for_resolution(&self) -> Result<(Vec<Ipv4Addr>, u32), SetupError> {
        info!(
            host = %self.config.probe_host,
            interval_secs = self.config.poll_interval.as_secs(),
            timeout_secs = self.config.timeout.as_secs(),
            "waiting for name resolution"
        );

        let verdict = Verifier::new(
            &self.resolver,
            &self.config.probe_host,
            self.config.poll_interval,
            self.config.timeout,
        )
        .run()
        .await;

        match verdict.resolution {
            Resolution::Resolved(addrs) => {
                info!(host = %self.config.probe_host, addresses = ?addrs, "resolution verified");
                Ok((addrs, verdict.attempts))
            }
            Resolution::TimedOut => {
                warn!(attempts = verdict.attempts, "giving up on name resolution");
                Err(SetupError::Timeout {
                    host: self.config.probe_host.clone(),
                    elapsed: verdict.elapsed,
                })
            }
        }
    }
}
