use crate::{
    backend::traits::{AdapterBackend, CommandResult, DnsClientBackend, DnsServerBackend},
    domain::adapter::NetAdapter,
    error::SetupError,
};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

const POWERSHELL: &str = "powershell.exe";
const DNS_FEATURE: &str = "DNS";

/// Drives the Windows networking and DNS cmdlets through PowerShell.
pub struct WindowsBackend {
    powershell: String,
}

impl WindowsBackend {
    pub fn new() -> Self {
        Self {
            powershell: POWERSHELL.to_string(),
        }
    }

    async fn powershell(&self, step: &'static str, script: &str) -> Result<String, SetupError> {
        let args = vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-ExecutionPolicy".to_string(),
            "Bypass".to_string(),
            "-Command".to_string(),
            format!("$ErrorActionPreference = 'Stop'; {script}"),
        ];
        run_checked(step, &self.powershell, &args).await
    }
}

impl Default for WindowsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterBackend for WindowsBackend {
    async fn list_adapters(&self) -> Result<Vec<NetAdapter>, SetupError> {
        let step = "enumerate network adapters";
        let json = self
            .powershell(
                step,
                "ConvertTo-Json -Compress -InputObject @(Get-NetAdapter | \
                 Select-Object Name, InterfaceDescription, Status, ifIndex)",
            )
            .await?;
        parse_adapters(&json).map_err(|source| SetupError::MalformedOutput { step, source })
    }
}

impl DnsServerBackend for WindowsBackend {
    async fn feature_installed(&self) -> Result<bool, SetupError> {
        let step = "query DNS Server feature";
        let out = self
            .powershell(
                step,
                &format!("(Get-WindowsFeature -Name {}).Installed", ps_quote(DNS_FEATURE)),
            )
            .await?;
        parse_bool(&out).ok_or(SetupError::UnexpectedOutput { step, output: out })
    }

    async fn install_feature(&self) -> Result<(), SetupError> {
        self.powershell(
            "install DNS Server feature",
            &format!(
                "Install-WindowsFeature -Name {} -IncludeManagementTools | Out-Null",
                ps_quote(DNS_FEATURE)
            ),
        )
        .await
        .map(drop)
    }

    async fn set_forwarders(&self, forwarders: &[String]) -> Result<(), SetupError> {
        self.powershell(
            "register DNS forwarders",
            &format!("Set-DnsServerForwarder -IPAddress {}", ps_list(forwarders)),
        )
        .await
        .map(drop)
    }
}

impl DnsClientBackend for WindowsBackend {
    async fn set_resolvers(
        &self,
        adapter: &NetAdapter,
        resolvers: &[String],
    ) -> Result<(), SetupError> {
        self.powershell(
            "set interface resolver addresses",
            &format!(
                "Set-DnsClientServerAddress -InterfaceIndex {} -ServerAddresses {}",
                adapter.if_index,
                ps_list(resolvers)
            ),
        )
        .await
        .map(drop)
    }

    async fn flush_cache(&self) -> Result<(), SetupError> {
        run_checked(
            "flush resolver cache",
            "ipconfig",
            &["/flushdns".to_string()],
        )
        .await
        .map(drop)
    }
}

async fn run_checked(
    step: &'static str,
    program: &str,
    args: &[String],
) -> Result<String, SetupError> {
    debug!(step, program, "running");
    let out = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|source| SetupError::Spawn {
            step,
            program: program.to_string(),
            source,
        })?;

    let result = CommandResult::from_output(program, args, &out);
    if !result.success() {
        return Err(SetupError::Command { step, result });
    }
    Ok(result.stdout)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<NetAdapter>),
    One(NetAdapter),
}

fn parse_adapters(json: &str) -> Result<Vec<NetAdapter>, serde_json::Error> {
    let json = json.trim();
    if json.is_empty() {
        return Ok(Vec::new());
    }
    Ok(match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::Many(list) => list,
        OneOrMany::One(one) => vec![one],
    })
}

fn parse_bool(out: &str) -> Option<bool> {
    match out.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn ps_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| ps_quote(v))
        .collect::<Vec<_>>()
        .join(",")
}
