//! Form state and the section controller.
//!
//! `App::update` is the only writer of UI state. Key events arrive as
//! [`Action`]s, asynchronous results as [`Action::Workflow`] drained from
//! the main loop's channel.

use tracing::info;

use crate::constants::{CUSTOM_PRESET, ENDPOINT_PRESETS};
use crate::crypto::{self, CryptoError, SecretKey};
use crate::draft::{
    Address, AuthorizedKey, FieldError, Ownership, Recipient, TokenTransfer, TransactionDraft,
    TransactionKind, UcoTransfer,
};
use crate::event::{Action, WorkflowEvent};
use crate::focus::{self, Dims, MoveDir, PRESET_COUNT, Section, Slot};
use crate::theme::Theme;
use crate::workflow::{SubmitRequest, Submitter};

/// One-line outcome of the last terminal operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Info(String),
    Success(String),
    Error(String),
}

/// Startup parameters from the CLI.
#[derive(Debug, Clone, Default)]
pub struct FormOptions {
    pub endpoint: Option<String>,
    pub seed: Option<String>,
    pub service_name: Option<String>,
}

pub struct App {
    pub section: Section,
    pub cursor: usize,
    /// Set once at startup when a service name was supplied; removes the
    /// endpoint/seed region from the Main tab.
    pub service_mode: bool,
    pub service_name: String,

    // Main tab
    pub endpoint_input: String,
    pub seed_input: String,
    pub selected_preset: Option<usize>,

    // List tab input buffers
    pub uco_inputs: [String; 2],
    pub token_inputs: [String; 4],
    pub recipient_input: String,
    pub secret_input: String,
    pub pending_key_input: String,

    // Content tab
    pub content_inputs: [String; 2],

    /// Authorized keys staged for the next ownership commit.
    pub pending_keys: Vec<String>,
    pub draft: TransactionDraft,

    secret_key: SecretKey,
    network_public_key: Option<String>,

    pub feedback: Option<Feedback>,
    pub field_error: Option<FieldError>,
    pub submitting: bool,
    pub exit: bool,
    pub theme: Theme,
}

impl App {
    pub fn new(options: FormOptions) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::generate()?;
        let service_name = options.service_name.unwrap_or_default();
        let service_mode = !service_name.is_empty();
        Ok(Self {
            section: Section::Main,
            cursor: 0,
            service_mode,
            service_name,
            endpoint_input: options.endpoint.unwrap_or_default(),
            seed_input: options.seed.unwrap_or_default(),
            selected_preset: None,
            uco_inputs: Default::default(),
            token_inputs: Default::default(),
            recipient_input: String::new(),
            secret_input: String::new(),
            pending_key_input: String::new(),
            content_inputs: Default::default(),
            pending_keys: Vec::new(),
            draft: TransactionDraft::default(),
            secret_key,
            network_public_key: None,
            feedback: None,
            field_error: None,
            submitting: false,
            exit: false,
            theme: Theme::default(),
        })
    }

    /// Dynamic sizes of the active section's virtual space.
    pub fn dims(&self) -> Dims {
        match self.section {
            Section::Main => Dims::main(self.service_mode),
            Section::UcoTransfers => Dims::list(self.draft.uco_transfers.len()),
            Section::TokenTransfers => Dims::list(self.draft.token_transfers.len()),
            Section::Recipients => Dims::list(self.draft.recipients.len()),
            Section::Ownerships => {
                Dims::ownerships(self.pending_keys.len(), self.draft.ownerships.len())
            }
            Section::Content => Dims::default(),
        }
    }

    /// Slot currently under the cursor.
    pub fn current_slot(&self) -> Slot {
        focus::resolve(self.section, self.cursor, &self.dims())
    }

    /// Whether typed characters go anywhere for this slot.
    pub fn slot_editable(&self, slot: Slot) -> bool {
        matches!(
            slot,
            Slot::EndpointField | Slot::SeedField | Slot::Field(_) | Slot::TextArea(_)
        )
    }

    /// Whether `d` deletes something at this slot.
    pub fn slot_deletable(&self, slot: Slot) -> bool {
        matches!(slot, Slot::Entry(_) | Slot::PendingKey(_))
    }

    pub fn update(&mut self, action: Action, submitter: &Submitter) {
        match action {
            Action::Quit | Action::Back => self.exit = true,
            Action::NextSection => self.switch_section(self.section.next()),
            Action::PrevSection => self.switch_section(self.section.prev()),
            Action::FocusNext => self.move_cursor(MoveDir::Forward),
            Action::FocusPrev => self.move_cursor(MoveDir::Backward),
            Action::Activate => self.activate(submitter),
            Action::DeleteEntry => self.delete_at_cursor(),
            Action::Input(c) => self.input_char(c),
            Action::Backspace => self.backspace(),
            Action::Workflow(event) => self.on_workflow_event(event),
        }
        // No stale cursor survives an event.
        self.cursor = focus::clamp(self.cursor, focus::virtual_space(self.section, &self.dims()));
    }

    fn switch_section(&mut self, section: Section) {
        if self.section != section {
            self.section = section;
            self.cursor = 0;
            self.field_error = None;
        }
    }

    fn move_cursor(&mut self, dir: MoveDir) {
        let space = focus::virtual_space(self.section, &self.dims());
        self.cursor = focus::step(self.cursor, dir, space);
    }

    // --- Enter dispatch -------------------------------------------------

    fn activate(&mut self, submitter: &Submitter) {
        match self.current_slot() {
            Slot::EndpointPreset(i) => self.select_preset(i),
            Slot::Kind(i) => self.select_kind(i),
            Slot::Submit => self.start_submit(submitter),
            Slot::Add | Slot::Field(_) if self.section == Section::Recipients => {
                let result = self.add_recipient();
                self.report(result);
            }
            Slot::Add => match self.section {
                Section::UcoTransfers => {
                    let result = self.add_uco_transfer();
                    self.report(result);
                }
                Section::TokenTransfers => {
                    let result = self.add_token_transfer();
                    self.report(result);
                }
                _ => {}
            },
            Slot::AddAuthorizedKey => {
                let result = self.add_authorized_key();
                self.report(result);
            }
            Slot::LoadNetworkKey => self.load_network_key(submitter),
            Slot::CommitOwnership => self.commit_ownership(),
            Slot::TextArea(i) => self.content_inputs[i].push('\n'),
            Slot::EndpointField | Slot::SeedField | Slot::Field(_) | Slot::PendingKey(_)
            | Slot::Entry(_) => {}
        }
    }

    fn select_preset(&mut self, index: usize) {
        self.selected_preset = Some(index);
        if index != CUSTOM_PRESET {
            self.endpoint_input = ENDPOINT_PRESETS[index].1.to_string();
        }
        // Jump to the endpoint field, ready to edit or move on.
        self.cursor = PRESET_COUNT;
    }

    fn select_kind(&mut self, index: usize) {
        if let Some(kind) = TransactionKind::ALL.get(index) {
            self.draft.kind = *kind;
        }
        // Jump to the submit control.
        self.cursor = focus::virtual_space(Section::Main, &self.dims()) - 1;
    }

    // --- List mutators --------------------------------------------------

    fn report(&mut self, result: Result<(), FieldError>) {
        match result {
            Ok(()) => self.field_error = None,
            Err(e) => self.field_error = Some(e),
        }
    }

    fn add_uco_transfer(&mut self) -> Result<(), FieldError> {
        let to = Address::from_hex("to", &self.uco_inputs[0])?;
        let amount = crate::draft::parse_amount("amount", &self.uco_inputs[1])?;
        self.draft.add_uco_transfer(UcoTransfer { to, amount });
        self.uco_inputs = Default::default();
        Ok(())
    }

    fn add_token_transfer(&mut self) -> Result<(), FieldError> {
        let to = Address::from_hex("to", &self.token_inputs[0])?;
        let amount = crate::draft::parse_amount("amount", &self.token_inputs[1])?;
        let token_address = Address::from_hex("token address", &self.token_inputs[2])?;
        let token_id = crate::draft::parse_token_id("token id", &self.token_inputs[3])?;
        self.draft.add_token_transfer(TokenTransfer {
            to,
            amount,
            token_address,
            token_id,
        });
        self.token_inputs = Default::default();
        Ok(())
    }

    fn add_recipient(&mut self) -> Result<(), FieldError> {
        let address = Address::from_hex("recipient", &self.recipient_input)?;
        self.draft.add_recipient(Recipient { address });
        self.recipient_input.clear();
        Ok(())
    }

    fn delete_at_cursor(&mut self) {
        let removed = match self.current_slot() {
            Slot::Entry(i) => match self.section {
                Section::UcoTransfers => self.draft.remove_uco_transfer(i),
                Section::TokenTransfers => self.draft.remove_token_transfer(i),
                Section::Recipients => self.draft.remove_recipient(i),
                Section::Ownerships => self.draft.remove_ownership(i),
                _ => false,
            },
            Slot::PendingKey(i) => {
                if i < self.pending_keys.len() {
                    self.pending_keys.remove(i);
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        if removed {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    // --- Ownership workflow ---------------------------------------------

    fn add_authorized_key(&mut self) -> Result<(), FieldError> {
        if self.pending_key_input.trim().is_empty() {
            return Ok(());
        }
        // Validate before staging so commit cannot fail on a stale key.
        Address::from_hex("authorization key", &self.pending_key_input)?;
        self.pending_keys
            .push(self.pending_key_input.trim().to_string());
        self.pending_key_input.clear();
        Ok(())
    }

    fn load_network_key(&mut self, submitter: &Submitter) {
        if let Some(key) = &self.network_public_key {
            self.pending_key_input = key.clone();
            return;
        }
        submitter.load_network_public_key(self.endpoint_input.clone());
        self.feedback = Some(Feedback::Info("Loading network public key...".into()));
    }

    fn commit_ownership(&mut self) {
        // A non-empty pending key is never silently dropped.
        if !self.pending_key_input.trim().is_empty() {
            if let Err(e) = self.add_authorized_key() {
                self.field_error = Some(e);
                return;
            }
        }

        match self.build_ownership() {
            Ok(ownership) => {
                self.draft.add_ownership(ownership);
                self.pending_keys.clear();
                self.secret_input.clear();
                self.field_error = None;
            }
            Err(e) => self.feedback = Some(Feedback::Error(e.to_string())),
        }
    }

    fn build_ownership(&self) -> Result<Ownership, CryptoError> {
        let encrypted_secret =
            crypto::symmetric_encrypt(self.secret_input.as_bytes(), &self.secret_key)?;
        let mut authorized_keys = Vec::with_capacity(self.pending_keys.len());
        for key_hex in &self.pending_keys {
            // Staged keys were hex-validated on entry.
            let public_key = Address::from_hex("authorization key", key_hex)
                .map(|a| a.as_bytes().to_vec())
                .map_err(|_| CryptoError::InvalidKey {
                    expected: "hex encoded public key",
                })?;
            let encrypted_secret_key =
                crypto::asymmetric_encrypt(self.secret_key.as_bytes(), &public_key)?;
            authorized_keys.push(AuthorizedKey {
                public_key,
                encrypted_secret_key,
            });
        }
        Ok(Ownership {
            encrypted_secret,
            authorized_keys,
        })
    }

    // --- Submit ----------------------------------------------------------

    fn start_submit(&mut self, submitter: &Submitter) {
        if self.submitting {
            self.feedback = Some(Feedback::Info("A submission is already running".into()));
            return;
        }
        // Gather the free-text areas into the draft before building.
        self.draft.content = self.content_inputs[0].clone();
        self.draft.code = self.content_inputs[1].clone();

        let request = SubmitRequest {
            endpoint: self.endpoint_input.clone(),
            seed: self.seed_input.clone(),
            service_name: self.service_name.clone(),
            draft: self.draft.clone(),
        };
        info!(endpoint = %request.endpoint, kind = request.draft.kind.as_str(), "submitting");
        submitter.submit(request);
        self.submitting = true;
        self.feedback = Some(Feedback::Info("Submitting transaction...".into()));
    }

    fn on_workflow_event(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::Sent => {
                self.submitting = false;
                self.feedback = Some(Feedback::Success("Transaction sent".into()));
            }
            WorkflowEvent::Failed { stage, message } => {
                self.submitting = false;
                self.feedback = Some(Feedback::Error(format!(
                    "Transaction error [{stage}]: {message}"
                )));
            }
            WorkflowEvent::NetworkKey(Ok(key)) => {
                self.network_public_key = Some(key.clone());
                self.pending_key_input = key;
                self.feedback = None;
            }
            WorkflowEvent::NetworkKey(Err(message)) => {
                self.feedback = Some(Feedback::Error(format!(
                    "Could not load network public key: {message}"
                )));
            }
        }
    }

    // --- Text input -------------------------------------------------------

    fn input_char(&mut self, c: char) {
        if let Some(buffer) = self.focused_buffer_mut() {
            buffer.push(c);
        }
    }

    fn backspace(&mut self) {
        if let Some(buffer) = self.focused_buffer_mut() {
            buffer.pop();
        }
    }

    fn focused_buffer_mut(&mut self) -> Option<&mut String> {
        let slot = self.current_slot();
        match (self.section, slot) {
            (_, Slot::EndpointField) => Some(&mut self.endpoint_input),
            (_, Slot::SeedField) => Some(&mut self.seed_input),
            (Section::UcoTransfers, Slot::Field(i)) => self.uco_inputs.get_mut(i),
            (Section::TokenTransfers, Slot::Field(i)) => self.token_inputs.get_mut(i),
            (Section::Recipients, Slot::Field(0)) => Some(&mut self.recipient_input),
            (Section::Ownerships, Slot::Field(0)) => Some(&mut self.secret_input),
            (Section::Ownerships, Slot::Field(1)) => Some(&mut self.pending_key_input),
            (Section::Content, Slot::TextArea(i)) => self.content_inputs.get_mut(i),
            _ => None,
        }
    }
}
