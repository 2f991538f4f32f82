//! Transaction assembly and submission.
//!
//! The pipeline is strictly ordered; a failure at any stage stops it and
//! surfaces as a stage-tagged [`WorkflowEvent`]. Only the final dispatch
//! stage retries, with a bounded attempt count and per-attempt timeout.

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::client::{ApiClient, Ledger, Transaction};
use crate::constants::{DISPATCH_RETRIES, DISPATCH_TIMEOUT, ORIGIN_PRIVATE_KEY_HEX};
use crate::draft::{TransactionDraft, maybe_hex_seed};
use crate::event::WorkflowEvent;

/// Pipeline stages, used to tag error feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Keychain,
    DeriveAddress,
    LastIndex,
    Build,
    Sign,
    Dispatch,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Connect => "connect",
            Stage::Keychain => "keychain",
            Stage::DeriveAddress => "derive address",
            Stage::LastIndex => "last index",
            Stage::Build => "build",
            Stage::Sign => "sign",
            Stage::Dispatch => "dispatch",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed: {message}")]
pub struct SubmitError {
    pub stage: Stage,
    pub message: String,
}

impl SubmitError {
    fn at(stage: Stage, err: impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

/// Everything gathered by the form before the submit control was reached.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub endpoint: String,
    pub seed: String,
    pub service_name: String,
    pub draft: TransactionDraft,
}

/// Runs stages 3..8 against an already connected client. Split from
/// [`Submitter::submit`] so tests can drive it with a stub ledger.
pub async fn submit<L: Ledger + Sync>(
    client: &L,
    request: &SubmitRequest,
) -> Result<(), SubmitError> {
    let seed = maybe_hex_seed(&request.seed);

    let keychain = client
        .fetch_keychain(&seed)
        .await
        .map_err(|e| SubmitError::at(Stage::Keychain, e))?;
    debug!(version = keychain.version, "keychain resolved");

    let genesis_address = keychain.derive_address(&request.service_name, 0);

    let index = client
        .fetch_last_index(&genesis_address)
        .await
        .map_err(|e| SubmitError::at(Stage::LastIndex, e))?;
    debug!(%genesis_address, index, "chain position resolved");

    let mut transaction =
        keychain.build_transaction(request.draft.clone(), &request.service_name, index);

    transaction
        .origin_sign(ORIGIN_PRIVATE_KEY_HEX)
        .map_err(|e| SubmitError::at(Stage::Sign, e))?;

    dispatch_with_retry(client, &transaction).await
}

/// Final dispatch stage: one attempt plus [`DISPATCH_RETRIES`] more, each
/// bounded by [`DISPATCH_TIMEOUT`].
async fn dispatch_with_retry<L: Ledger + Sync>(
    client: &L,
    transaction: &Transaction,
) -> Result<(), SubmitError> {
    let mut last_error = String::new();
    for attempt in 0..=DISPATCH_RETRIES {
        match timeout(DISPATCH_TIMEOUT, client.dispatch(transaction)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => last_error = e.to_string(),
            Err(_) => last_error = format!("timed out after {DISPATCH_TIMEOUT:?}"),
        }
        warn!(attempt, error = %last_error, "dispatch attempt failed");
    }
    Err(SubmitError {
        stage: Stage::Dispatch,
        message: last_error,
    })
}

/// Spawns workflow tasks and reports their outcome over the main loop's
/// channel. The UI never shares mutable state with these tasks.
pub struct Submitter {
    runtime: tokio::runtime::Handle,
    events: mpsc::Sender<WorkflowEvent>,
}

impl Submitter {
    pub fn new(runtime: tokio::runtime::Handle, events: mpsc::Sender<WorkflowEvent>) -> Self {
        Self { runtime, events }
    }

    /// Fire-and-forget submit. The result comes back as a
    /// [`WorkflowEvent`] drained by the UI thread.
    pub fn submit(&self, request: SubmitRequest) {
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let outcome = match ApiClient::connect(&request.endpoint) {
                Ok(client) => submit(&client, &request).await,
                Err(e) => Err(SubmitError::at(Stage::Connect, e)),
            };
            let event = match outcome {
                Ok(()) => WorkflowEvent::Sent,
                Err(e) => WorkflowEvent::Failed {
                    stage: e.stage,
                    message: e.message,
                },
            };
            let _ = events.send(event).await;
        });
    }

    /// Fetches the network public key for the Ownerships tab.
    pub fn load_network_public_key(&self, endpoint: String) {
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = match ApiClient::connect(&endpoint) {
                Ok(client) => client
                    .fetch_network_public_key()
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            let _ = events.send(WorkflowEvent::NetworkKey(result)).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, Keychain};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Stub ledger that fails at a chosen stage and records dispatches.
    struct StubLedger {
        fail_at: Option<Stage>,
        dispatched: AtomicBool,
        dispatch_attempts: AtomicU32,
    }

    impl StubLedger {
        fn new(fail_at: Option<Stage>) -> Self {
            Self {
                fail_at,
                dispatched: AtomicBool::new(false),
                dispatch_attempts: AtomicU32::new(0),
            }
        }

        fn fails(&self, stage: Stage) -> bool {
            self.fail_at == Some(stage)
        }
    }

    impl Ledger for StubLedger {
        async fn fetch_keychain(&self, seed: &[u8]) -> Result<Keychain, ClientError> {
            if self.fails(Stage::Keychain) {
                return Err(ClientError::Node(500));
            }
            Ok(Keychain::new(1, seed.to_vec()))
        }

        async fn fetch_last_index(&self, _genesis_address: &str) -> Result<u64, ClientError> {
            if self.fails(Stage::LastIndex) {
                return Err(ClientError::Node(503));
            }
            Ok(4)
        }

        async fn fetch_network_public_key(&self) -> Result<String, ClientError> {
            Ok("000102".to_string())
        }

        async fn dispatch(&self, _transaction: &Transaction) -> Result<(), ClientError> {
            self.dispatch_attempts.fetch_add(1, Ordering::SeqCst);
            if self.fails(Stage::Dispatch) {
                return Err(ClientError::Node(500));
            }
            self.dispatched.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn request() -> SubmitRequest {
        SubmitRequest {
            endpoint: "http://localhost:4000".to_string(),
            seed: "00ff".to_string(),
            service_name: "wallet".to_string(),
            draft: TransactionDraft::default(),
        }
    }

    #[tokio::test]
    async fn happy_path_dispatches_once() {
        let ledger = StubLedger::new(None);
        submit(&ledger, &request()).await.unwrap();
        assert!(ledger.dispatched.load(Ordering::SeqCst));
        assert_eq!(ledger.dispatch_attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn index_lookup_failure_is_stage_tagged_and_nothing_dispatched() {
        let ledger = StubLedger::new(Some(Stage::LastIndex));
        let err = submit(&ledger, &request()).await.unwrap_err();
        assert_eq!(err.stage, Stage::LastIndex);
        assert!(err.to_string().contains("last index"));
        assert!(!ledger.dispatched.load(Ordering::SeqCst));
        assert_eq!(ledger.dispatch_attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn keychain_failure_stops_before_index_lookup() {
        let ledger = StubLedger::new(Some(Stage::Keychain));
        let err = submit(&ledger, &request()).await.unwrap_err();
        assert_eq!(err.stage, Stage::Keychain);
        assert!(!ledger.dispatched.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dispatch_failure_is_retried_then_reported() {
        let ledger = StubLedger::new(Some(Stage::Dispatch));
        let err = submit(&ledger, &request()).await.unwrap_err();
        assert_eq!(err.stage, Stage::Dispatch);
        assert_eq!(
            ledger.dispatch_attempts.load(Ordering::SeqCst),
            1 + DISPATCH_RETRIES
        );
    }
}
