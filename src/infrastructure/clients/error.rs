use std::fmt;

/// Which upstream service a request was sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Repairs,
    Sessions,
    MachineName,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Repairs => "repairs",
            Self::Sessions => "sessions",
            Self::MachineName => "machine name",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, DNS, timeout or body read failure
    #[error("failed to fetch {upstream}: {source}")]
    Transport {
        upstream: Upstream,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status
    #[error("failed to fetch {upstream}: {status}")]
    UpstreamStatus {
        upstream: Upstream,
        code: u16,
        status: String,
    },

    /// The body did not match the expected shape
    #[error("failed to decode {upstream} response: {source}")]
    Decode {
        upstream: Upstream,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn status(upstream: Upstream, status: reqwest::StatusCode) -> Self {
        Self::UpstreamStatus {
            upstream,
            code: status.as_u16(),
            status: status.to_string(),
        }
    }

    pub fn upstream(&self) -> Upstream {
        match self {
            Self::Transport { upstream, .. }
            | Self::UpstreamStatus { upstream, .. }
            | Self::Decode { upstream, .. } => *upstream,
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, 429 and 5xx (except 501) are retried. Requests that
    /// could not even be built, other client errors and decode failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { source, .. } => !source.is_builder(),
            Self::UpstreamStatus { code, .. } => {
                *code == 429 || (*code >= 500 && *code != 501)
            }
            Self::Decode { .. } => false,
        }
    }
}
