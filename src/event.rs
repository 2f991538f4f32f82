//! Actions produced by input handling and events posted back from
//! background workflow tasks.

use crate::workflow::Stage;

/// Results of asynchronous work, re-injected into the single UI thread
/// through the main loop's channel. UI state is only ever written there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// The transaction was accepted by the node.
    Sent,
    /// The submit pipeline failed at `stage`.
    Failed { stage: Stage, message: String },
    /// Result of the network public key fetch.
    NetworkKey(Result<String, String>),
}

/// Application actions triggered by user input or workflow events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Exit to the parent context (Esc).
    Back,
    NextSection,
    PrevSection,
    FocusNext,
    FocusPrev,
    /// Context action for the focused slot (Enter).
    Activate,
    /// Delete the list entry under the cursor.
    DeleteEntry,
    /// Character typed into the focused buffer.
    Input(char),
    Backspace,
    Workflow(WorkflowEvent),
}
