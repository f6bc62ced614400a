use crate::{
    app::{App, Outcome},
    backend::traits::{AdapterBackend, DnsClientBackend, DnsServerBackend, NameResolver},
    domain::common::{Invocation, Mode},
    error::SetupError,
};
use anyhow::{Result, bail};
use clap::{Parser, error::ErrorKind};
use std::ffi::OsString;
use tracing::{error, info};

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

const KNOWN_FLAGS: [&str; 6] = ["server", "client", "dns1", "dns2", "help", "version"];
const SWITCHES: [&str; 2] = ["server", "client"];

#[derive(Parser, Debug)]
#[command(
    name = "dnsprep",
    version,
    about = "Point this host at upstream resolvers and wait until names resolve"
)]
pub struct Args {
    /// Install the DNS Server role and forward to DNS1/DNS2
    #[arg(long)]
    pub server: bool,

    /// Use DNS1/DNS2 as this host's resolvers
    #[arg(long)]
    pub client: bool,

    /// Primary resolver address
    #[arg(long, value_name = "ADDRESS")]
    pub dns1: String,

    /// Secondary resolver address
    #[arg(long, value_name = "ADDRESS")]
    pub dns2: String,
}

impl Args {
    /// Parses Windows-style (`-Server -DNS1 x`) or GNU-style (`--server --dns1 x`) arguments.
    pub fn parse_from_any<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(argv))
    }

    pub fn into_invocation(self) -> Result<Invocation, SetupError> {
        let mode = Mode::from_flags(self.server, self.client).ok_or_else(|| {
            SetupError::Usage("exactly one of -Server or -Client must be given".to_string())
        })?;
        Ok(Invocation {
            mode,
            dns1: self.dns1,
            dns2: self.dns2,
        })
    }
}

/// Parses `argv`, applies it through `app` and returns the process exit status.
///
/// Nothing reaches the host unless the arguments are valid.
pub async fn run<I, T, B, R>(argv: I, app: &App<B, R>) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    B: AdapterBackend + DnsServerBackend + DnsClientBackend,
    R: NameResolver,
{
    match execute(argv, app).await {
        Ok(Some(outcome)) => {
            info!(
                adapter = %outcome.adapter.name,
                addresses = ?outcome.resolved,
                attempts = outcome.attempts,
                "DNS configuration complete"
            );
            EXIT_OK
        }
        Ok(None) => EXIT_OK,
        Err(e) => {
            error!("{e:#}");
            EXIT_FAILURE
        }
    }
}

/// `Ok(None)` means help or version was printed.
async fn execute<I, T, B, R>(argv: I, app: &App<B, R>) -> Result<Option<Outcome>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    B: AdapterBackend + DnsServerBackend + DnsClientBackend,
    R: NameResolver,
{
    let args = match Args::parse_from_any(argv) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(None);
        }
        Err(e) => bail!("usage: {}", e.to_string().trim()),
    };
    let invocation = args.into_invocation()?;

    info!(
        mode = %invocation.mode,
        dns1 = %invocation.dns1,
        dns2 = %invocation.dns2,
        "starting"
    );
    Ok(Some(app.run(&invocation).await?))
}

fn normalize_args<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    for (i, raw) in argv.into_iter().enumerate() {
        let raw: OsString = raw.into();
        if i == 0 {
            out.push(raw);
            continue;
        }
        match raw.to_str().and_then(normalize_flag) {
            Some(flag) => out.extend(flag.into_iter().map(OsString::from)),
            None => out.push(raw),
        }
    }
    out
}

/// Rewrites a recognised flag token, keeping values and unknown tokens as-is.
fn normalize_flag(token: &str) -> Option<Vec<String>> {
    let name = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))?;
    let (name, value) = match name.split_once(['=', ':']) {
        Some((n, v)) => (n, Some(v)),
        None => (name, None),
    };

    let lower = name.to_ascii_lowercase();
    if !KNOWN_FLAGS.contains(&lower.as_str()) {
        return None;
    }

    let flag = format!("--{lower}");
    if SWITCHES.contains(&lower.as_str()) {
        // PowerShell's explicit switch form: -Server:$true / -Server:$false
        match value.map(str::to_ascii_lowercase).as_deref() {
            None | Some("$true") => return Some(vec![flag]),
            Some("$false") => return Some(Vec::new()),
            Some(_) => {}
        }
    }

    let mut out = vec![flag];
    if let Some(v) = value {
        out.push(v.to_string());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::parse_from_any(argv.iter().copied())
    }

    #[test]
    fn windows_style_flags() {
        let args = parse(&["dnsprep.exe", "-Server", "-DNS1", "10.0.0.2", "-DNS2", "10.0.0.3"]).unwrap();
        assert!(args.server);
        assert!(!args.client);
        assert_eq!(args.dns1, "10.0.0.2");
        assert_eq!(args.dns2, "10.0.0.3");
    }

    #[test]
    fn gnu_style_and_colon_values() {
        let args = parse(&["dnsprep", "--client", "--dns1=1.1.1.1", "-Dns2:8.8.8.8"]).unwrap();
        assert!(args.client);
        assert_eq!(args.dns1, "1.1.1.1");
        assert_eq!(args.dns2, "8.8.8.8");
    }

    #[test]
    fn addresses_are_not_validated() {
        let args = parse(&["dnsprep", "-client", "-dns1", "resolver.lan", "-dns2", "fe80::1"]).unwrap();
        let inv = args.into_invocation().unwrap();
        assert_eq!(inv.mode, Mode::Client);
        assert_eq!(inv.dns1, "resolver.lan");
        assert_eq!(inv.dns2, "fe80::1");
    }

    #[test]
    fn both_modes_is_usage_error() {
        let args = parse(&["dnsprep", "-Server", "-Client", "-DNS1", "a", "-DNS2", "b"]).unwrap();
        assert!(matches!(args.into_invocation(), Err(SetupError::Usage(_))));
    }

    #[test]
    fn no_mode_is_usage_error() {
        let args = parse(&["dnsprep", "-DNS1", "a", "-DNS2", "b"]).unwrap();
        assert!(matches!(args.into_invocation(), Err(SetupError::Usage(_))));
    }

    #[test]
    fn missing_resolver_is_rejected() {
        assert!(parse(&["dnsprep", "-Server", "-DNS1", "a"]).is_err());
    }

    #[test]
    fn explicit_switch_values() {
        let args = parse(&["dnsprep", "-Server:$true", "-Client:$False", "-DNS1", "a", "-DNS2", "b"]).unwrap();
        assert!(args.server);
        assert!(!args.client);
        assert_eq!(args.into_invocation().unwrap().mode, Mode::Server);

        let args = parse(&["dnsprep", "-Server:$false", "-DNS1", "a", "-DNS2", "b"]).unwrap();
        assert!(matches!(args.into_invocation(), Err(SetupError::Usage(_))));

        assert!(parse(&["dnsprep", "-Server:maybe", "-DNS1", "a", "-DNS2", "b"]).is_err());
    }

    #[test]
    fn unknown_tokens_pass_through() {
        assert_eq!(normalize_flag("-Verbose"), None);
        assert_eq!(normalize_flag("10.0.0.1"), None);
        assert_eq!(normalize_flag("-DNS1"), Some(vec!["--dns1".to_string()]));
    }
}
