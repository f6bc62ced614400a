use std::fmt;

pub const LOOPBACK_RESOLVER: &str = "127.0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Server,
    Client,
}

impl Mode {
    /// Exactly one of the two switches must be set.
    pub fn from_flags(server: bool, client: bool) -> Option<Self> {
        match (server, client) {
            (true, false) => Some(Self::Server),
            (false, true) => Some(Self::Client),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => f.write_str("server"),
            Self::Client => f.write_str("client"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    pub dns1: String,
    pub dns2: String,
}

impl Invocation {
    /// Resolver list bound to the interface, in preference order.
    ///
    /// A server prefers itself, so loopback goes first.
    pub fn resolver_list(&self) -> Vec<String> {
        match self.mode {
            Mode::Server => vec![
                LOOPBACK_RESOLVER.to_string(),
                self.dns1.clone(),
                self.dns2.clone(),
            ],
            Mode::Client => vec![self.dns1.clone(), self.dns2.clone()],
        }
    }

    pub fn forwarders(&self) -> Vec<String> {
        vec![self.dns1.clone(), self.dns2.clone()]
    }
}
