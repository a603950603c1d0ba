//! Proxy data models

use std::fmt;

/// Scheme tag taken from a proxy descriptor prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyScheme {
    Socks5,
    Socks4,
    /// Bare `socks://`, kept distinct from the versioned tags
    Socks,
}

impl ProxyScheme {
    /// Literal prefix this scheme is recognized by
    pub fn prefix(&self) -> &'static str {
        match self {
            ProxyScheme::Socks5 => "socks5://",
            ProxyScheme::Socks4 => "socks4://",
            ProxyScheme::Socks => "socks://",
        }
    }
}

impl fmt::Display for ProxyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyScheme::Socks5 => write!(f, "socks5"),
            ProxyScheme::Socks4 => write!(f, "socks4"),
            ProxyScheme::Socks => write!(f, "socks"),
        }
    }
}

/// A parsed SOCKS proxy descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySpec {
    pub scheme: ProxyScheme,
    pub username: String,
    pub password: String,
    pub host_port: String,
}

impl ProxySpec {
    pub fn new(
        scheme: ProxyScheme,
        username: impl Into<String>,
        password: impl Into<String>,
        host_port: impl Into<String>,
    ) -> Self {
        Self {
            scheme,
            username: username.into(),
            password: password.into(),
            host_port: host_port.into(),
        }
    }
}

/// Renders the descriptor exactly as it appeared in the proxy list.
impl fmt::Display for ProxySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}@{}",
            self.scheme.prefix(),
            self.username,
            self.password,
            self.host_port
        )
    }
}

/// Where a probe gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// The proxied client could not be built
    Setup,
    /// Connect, SOCKS handshake or HTTP exchange failed
    Request,
    /// The per-request deadline passed
    Timeout,
    /// The response arrived but its body could not be read
    Body,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Setup => write!(f, "failed to configure proxy"),
            FailureStage::Request => write!(f, "request failed"),
            FailureStage::Timeout => write!(f, "request timed out"),
            FailureStage::Body => write!(f, "failed to read response body"),
        }
    }
}

/// Result of one probe attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Succeeded {
        status_code: u16,
        body: Option<Vec<u8>>,
    },
    Failed {
        stage: FailureStage,
        message: String,
    },
}

/// Outcome of probing one proxy, tagged with its source descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub source: String,
    pub status: ProbeStatus,
}

impl ProbeOutcome {
    pub fn success(source: String, status_code: u16, body: Option<Vec<u8>>) -> Self {
        Self {
            source,
            status: ProbeStatus::Succeeded { status_code, body },
        }
    }

    pub fn failure(source: String, stage: FailureStage, message: String) -> Self {
        Self {
            source,
            status: ProbeStatus::Failed { stage, message },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ProbeStatus::Succeeded { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match &self.status {
            ProbeStatus::Succeeded { status_code, .. } => Some(*status_code),
            ProbeStatus::Failed { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&[u8]> {
        match &self.status {
            ProbeStatus::Succeeded { body, .. } => body.as_deref(),
            ProbeStatus::Failed { .. } => None,
        }
    }

    /// Human-readable failure cause, prefixed with the failing stage
    pub fn error_message(&self) -> Option<String> {
        match &self.status {
            ProbeStatus::Succeeded { .. } => None,
            ProbeStatus::Failed { stage, message } => Some(format!("{}: {}", stage, message)),
        }
    }
}
