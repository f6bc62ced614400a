use crate::{domain::adapter::NetAdapter, error::SetupError};
use std::{io, net::Ipv4Addr, process::Output};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub program: String,
    pub args: Vec<String>,
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn from_output(program: &str, args: &[String], out: &Output) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            status: out.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&out.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

#[allow(async_fn_in_trait)]
pub trait AdapterBackend {
    async fn list_adapters(&self) -> Result<Vec<NetAdapter>, SetupError>;
}

#[allow(async_fn_in_trait)]
pub trait DnsServerBackend {
    async fn feature_installed(&self) -> Result<bool, SetupError>;
    async fn install_feature(&self) -> Result<(), SetupError>;
    async fn set_forwarders(&self, forwarders: &[String]) -> Result<(), SetupError>;
}

#[allow(async_fn_in_trait)]
pub trait DnsClientBackend {
    async fn set_resolvers(
        &self,
        adapter: &NetAdapter,
        resolvers: &[String],
    ) -> Result<(), SetupError>;
    async fn flush_cache(&self) -> Result<(), SetupError>;
}

#[allow(async_fn_in_trait)]
pub trait NameResolver {
    async fn lookup_a(&self, host: &str) -> io::Result<Vec<Ipv4Addr>>;
}
