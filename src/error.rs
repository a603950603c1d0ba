//! Error types for proxy parsing and run configuration

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The part of a proxy descriptor that failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatIssue {
    /// Prefix is not one of `socks5://`, `socks4://`, `socks://`
    UnknownScheme,
    /// Zero or several `@` after the scheme
    AtSeparator,
    /// Credentials segment without exactly one `:`
    CredentialSeparator,
    /// Nothing after the `@`
    EmptyHost,
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatIssue::UnknownScheme => write!(f, "expected socks5://, socks4:// or socks://"),
            FormatIssue::AtSeparator => write!(f, "expected exactly one '@'"),
            FormatIssue::CredentialSeparator => write!(f, "expected user:pass before '@'"),
            FormatIssue::EmptyHost => write!(f, "missing host after '@'"),
        }
    }
}

/// Error returned when a proxy line cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid proxy format: {0}")]
    InvalidFormat(FormatIssue),
}

impl ParseError {
    pub fn issue(&self) -> FormatIssue {
        match self {
            ParseError::InvalidFormat(issue) => *issue,
        }
    }
}

/// Fatal errors discovered before any probe is dispatched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no target URL given, pass one with -u")]
    MissingUrl,

    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("failed to open proxy file {path:?}: {source}")]
    ProxyList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open output file {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
