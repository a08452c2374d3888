//! Termination signals (SIGTERM, SIGHUP) that request an orderly shutdown

use crate::error::{Result, RlpagerError};

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

pub struct ShutdownSignal {
    #[cfg(unix)]
    streams: Option<(Signal, Signal)>,
}

impl ShutdownSignal {
    /// Register handlers for SIGTERM and SIGHUP
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        let register = |kind: SignalKind| {
            signal(kind).map_err(|e| RlpagerError::terminal("installing signal handler", e))
        };
        Ok(Self {
            streams: Some((
                register(SignalKind::terminate())?,
                register(SignalKind::hangup())?,
            )),
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self::none())
    }

    /// A signal source that never fires
    pub fn none() -> Self {
        Self {
            #[cfg(unix)]
            streams: None,
        }
    }

    /// Wait for the next termination signal; returns its name
    pub async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        if let Some((term, hup)) = self.streams.as_mut() {
            return tokio::select! {
                _ = term.recv() => "SIGTERM",
                _ = hup.recv() => "SIGHUP",
            };
        }
        std::future::pending().await
    }
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[cfg(unix)]
        let installed = self.streams.is_some();
        #[cfg(not(unix))]
        let installed = false;
        f.debug_struct("ShutdownSignal")
            .field("installed", &installed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_none_never_fires() {
        let mut signals = ShutdownSignal::none();
        let waited = tokio::time::timeout(Duration::from_millis(20), signals.recv()).await;
        assert!(waited.is_err());
    }
}
