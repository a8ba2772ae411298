//! Language-intelligence access for transitive expansion.
//!
//! A [`SymbolService`] answers relation queries. A [`SymbolSession`] owns
//! one service per project root inside a single actor task, so queries from
//! concurrent resolutions are served one at a time and each is bounded by
//! the configured timeout.

mod graph;
mod table;

pub use graph::GraphSymbolService;
pub use table::{RelationEntry, StaticSymbolService};

use crate::config::ImpactConfig;
use crate::error::SymbolError;
use crate::types::ByteRange;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Symbol relation asked of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Declarations that call the symbol
    Callers,

    /// Methods that redefine the symbol
    Overriders,

    /// Declarations that read the field or name the type
    Readers,
}

impl Relation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Callers => "callers",
            Self::Overriders => "overriders",
            Self::Readers => "readers",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location returned by the symbol service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelatedLocation {
    pub uri: String,
    pub range: ByteRange,
}

impl RelatedLocation {
    pub fn new(uri: impl Into<String>, range: ByteRange) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

/// Backend answering relation queries for the symbol at a byte offset
#[async_trait]
pub trait SymbolService: Send + 'static {
    async fn find_related(
        &mut self,
        uri: &str,
        byte_offset: usize,
        relation: Relation,
    ) -> Result<Vec<RelatedLocation>, SymbolError>;

    /// Release backend resources; called once when the session ends
    async fn shutdown(&mut self) {}
}

enum SessionCommand {
    FindRelated {
        uri: String,
        byte_offset: usize,
        relation: Relation,
        reply: oneshot::Sender<Result<Vec<RelatedLocation>, SymbolError>>,
    },
    Close {
        done: oneshot::Sender<()>,
    },
}

/// Handle to the one symbol session of a project root.
///
/// Cheap to clone; all clones talk to the same actor.
#[derive(Clone)]
pub struct SymbolSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    root: PathBuf,
    command_tx: mpsc::Sender<SessionCommand>,
}

impl SymbolSession {
    /// Start the session actor. Must be called inside a tokio runtime.
    pub fn open<S: SymbolService>(
        root: impl Into<PathBuf>,
        backend: S,
        config: &ImpactConfig,
    ) -> Self {
        let root = root.into();
        let (command_tx, command_rx) = mpsc::channel(config.queue_capacity.max(1));

        spawn_session_loop(root.clone(), backend, command_rx, config.symbol_timeout());
        log::debug!("Opened symbol session for {}", root.display());

        Self {
            inner: Arc::new(SessionInner { root, command_tx }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Actor still accepting requests
    pub fn is_open(&self) -> bool {
        !self.inner.command_tx.is_closed()
    }

    /// Query the backend. Each backend call is bounded by the session
    /// timeout once the actor picks it up; time spent queued behind other
    /// queries does not count. Nothing is retried.
    pub async fn find_related(
        &self,
        uri: &str,
        byte_offset: usize,
        relation: Relation,
    ) -> Result<Vec<RelatedLocation>, SymbolError> {
        let (reply, response) = oneshot::channel();
        let command = SessionCommand::FindRelated {
            uri: uri.to_string(),
            byte_offset,
            relation,
            reply,
        };

        self.inner
            .command_tx
            .send(command)
            .await
            .map_err(|_| SymbolError::Unavailable("session closed".to_string()))?;
        response
            .await
            .map_err(|_| SymbolError::Unavailable("session dropped the request".to_string()))?
    }

    /// Shut the actor down and wait for the backend to be released.
    /// Queued queries finish first, each within the timeout.
    /// Later queries fail with `Unavailable`.
    pub async fn close(&self) {
        let (done, closed) = oneshot::channel();
        if self
            .inner
            .command_tx
            .send(SessionCommand::Close { done })
            .await
            .is_ok()
        {
            let _ = closed.await;
        }
    }
}

fn spawn_session_loop<S: SymbolService>(
    root: PathBuf,
    mut backend: S,
    mut command_rx: mpsc::Receiver<SessionCommand>,
    timeout: Duration,
) {
    tokio::spawn(async move {
        let mut done_tx = None;
        while let Some(command) = command_rx.recv().await {
            match command {
                SessionCommand::FindRelated {
                    uri,
                    byte_offset,
                    relation,
                    reply,
                } => {
                    // Caller went away while queued
                    if reply.is_closed() {
                        continue;
                    }
                    let query = backend.find_related(&uri, byte_offset, relation);
                    let result = match tokio::time::timeout(timeout, query).await {
                        Ok(result) => result,
                        Err(_) => {
                            log::warn!(
                                "Symbol query {relation} at {uri}:{byte_offset} timed out after {timeout:?}"
                            );
                            Err(SymbolError::Timeout(timeout))
                        }
                    };
                    let _ = reply.send(result);
                }
                SessionCommand::Close { done } => {
                    done_tx = Some(done);
                    break;
                }
            }
        }

        command_rx.close();
        if tokio::time::timeout(timeout, backend.shutdown()).await.is_err() {
            log::warn!(
                "Symbol backend for {} did not shut down in {timeout:?}",
                root.display()
            );
        }
        log::debug!("Symbol session for {} closed", root.display());
        if let Some(done) = done_tx {
            let _ = done.send(());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_queries_reach_backend() {
        let backend = StaticSymbolService::new().with_relation(
            "file:///a.java",
            ByteRange::new(0, 10),
            Relation::Callers,
            vec![RelatedLocation::new("file:///b.java", ByteRange::new(4, 8))],
        );
        let session = SymbolSession::open("/project", backend, &ImpactConfig::default());

        let found = session
            .find_related("file:///a.java", 3, Relation::Callers)
            .await
            .unwrap();
        assert_eq!(
            found,
            vec![RelatedLocation::new("file:///b.java", ByteRange::new(4, 8))]
        );
        assert_eq!(session.root(), Path::new("/project"));
    }

    #[tokio::test]
    async fn test_closed_session_is_unavailable() {
        let session =
            SymbolSession::open("/project", StaticSymbolService::new(), &ImpactConfig::default());
        assert!(session.is_open());

        session.close().await;
        assert!(!session.is_open());

        let err = session
            .find_related("file:///a.java", 0, Relation::Readers)
            .await
            .unwrap_err();
        assert!(matches!(err, SymbolError::Unavailable(_)));

        // Closing twice is harmless
        session.close().await;
    }
}
