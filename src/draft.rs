//! Transaction draft: the aggregate assembled by the form, plus the typed
//! validation used by the list mutators.
//!
//! Parsing a field never aborts the process: failures come back as
//! [`FieldError`] values which the renderer shows inline.

use data_encoding::HEXLOWER_PERMISSIVE;
use serde::{Serialize, Serializer};

use crate::focus::KIND_COUNT;

/// Validation failure for a single input field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// A chain address: a non-empty byte sequence decoded from hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(Vec<u8>);

impl Address {
    pub fn from_hex(field: &'static str, input: &str) -> Result<Self, FieldError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FieldError::new(field, "address is required"));
        }
        let bytes = HEXLOWER_PERMISSIVE
            .decode(trimmed.as_bytes())
            .map_err(|_| FieldError::new(field, "not a valid hex address"))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER_PERMISSIVE.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Serializes binary payloads (ciphertexts, keys) as lowercase hex.
pub fn hex_bytes<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&HEXLOWER_PERMISSIVE.encode(bytes))
}

pub fn parse_amount(field: &'static str, input: &str) -> Result<u64, FieldError> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| FieldError::new(field, "amount must be a non-negative integer"))
}

pub fn parse_token_id(field: &'static str, input: &str) -> Result<i64, FieldError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| FieldError::new(field, "token id must be an integer"))
}

/// Accepts a seed either as a hex string or as a raw passphrase.
pub fn maybe_hex_seed(input: &str) -> Vec<u8> {
    let trimmed = input.trim();
    HEXLOWER_PERMISSIVE
        .decode(trimmed.as_bytes())
        .unwrap_or_else(|_| trimmed.as_bytes().to_vec())
}

/// Supported transaction kinds, in the order they appear on the Main tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionKind {
    #[default]
    KeychainAccess,
    Keychain,
    Transfer,
    Hosting,
    Token,
    Data,
    Contract,
    CodeProposal,
    CodeApproval,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; KIND_COUNT] = [
        TransactionKind::KeychainAccess,
        TransactionKind::Keychain,
        TransactionKind::Transfer,
        TransactionKind::Hosting,
        TransactionKind::Token,
        TransactionKind::Data,
        TransactionKind::Contract,
        TransactionKind::CodeProposal,
        TransactionKind::CodeApproval,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::KeychainAccess => "Keychain Access",
            TransactionKind::Keychain => "Keychain",
            TransactionKind::Transfer => "Transfer",
            TransactionKind::Hosting => "Hosting",
            TransactionKind::Token => "Token",
            TransactionKind::Data => "Data",
            TransactionKind::Contract => "Contract",
            TransactionKind::CodeProposal => "Code Proposal",
            TransactionKind::CodeApproval => "Code Approval",
        }
    }

    /// Wire name used in the dispatch payload.
    pub fn wire_name(&self) -> &'static str {
        match self {
            TransactionKind::KeychainAccess => "keychain_access",
            TransactionKind::Keychain => "keychain",
            TransactionKind::Transfer => "transfer",
            TransactionKind::Hosting => "hosting",
            TransactionKind::Token => "token",
            TransactionKind::Data => "data",
            TransactionKind::Contract => "contract",
            TransactionKind::CodeProposal => "code_proposal",
            TransactionKind::CodeApproval => "code_approval",
        }
    }
}

impl Serialize for TransactionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UcoTransfer {
    pub to: Address,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTransfer {
    pub to: Address,
    pub amount: u64,
    #[serde(rename = "tokenAddress")]
    pub token_address: Address,
    #[serde(rename = "tokenId")]
    pub token_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub address: Address,
}

/// A public key granted the ability to decrypt an ownership secret,
/// stored next to a per-key re-encrypted copy of the session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizedKey {
    #[serde(rename = "publicKey", serialize_with = "hex_bytes")]
    pub public_key: Vec<u8>,
    #[serde(rename = "encryptedSecretKey", serialize_with = "hex_bytes")]
    pub encrypted_secret_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ownership {
    #[serde(rename = "secret", serialize_with = "hex_bytes")]
    pub encrypted_secret: Vec<u8>,
    #[serde(rename = "authorizedKeys")]
    pub authorized_keys: Vec<AuthorizedKey>,
}

/// The aggregate being built. Mutated only through the add/remove methods
/// below and the submit-time gather of the content buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(rename = "ucoTransfers")]
    pub uco_transfers: Vec<UcoTransfer>,
    #[serde(rename = "tokenTransfers")]
    pub token_transfers: Vec<TokenTransfer>,
    pub recipients: Vec<Recipient>,
    pub ownerships: Vec<Ownership>,
    pub content: String,
    pub code: String,
}

impl TransactionDraft {
    pub fn add_uco_transfer(&mut self, transfer: UcoTransfer) {
        self.uco_transfers.push(transfer);
    }

    pub fn add_token_transfer(&mut self, transfer: TokenTransfer) {
        self.token_transfers.push(transfer);
    }

    pub fn add_recipient(&mut self, recipient: Recipient) {
        self.recipients.push(recipient);
    }

    pub fn add_ownership(&mut self, ownership: Ownership) {
        self.ownerships.push(ownership);
    }

    /// Bounds-checked removal. Returns false (and leaves the list intact)
    /// when `index` is outside the current length.
    pub fn remove_uco_transfer(&mut self, index: usize) -> bool {
        remove_checked(&mut self.uco_transfers, index)
    }

    pub fn remove_token_transfer(&mut self, index: usize) -> bool {
        remove_checked(&mut self.token_transfers, index)
    }

    pub fn remove_recipient(&mut self, index: usize) -> bool {
        remove_checked(&mut self.recipients, index)
    }

    pub fn remove_ownership(&mut self, index: usize) -> bool {
        remove_checked(&mut self.ownerships, index)
    }
}

fn remove_checked<T>(list: &mut Vec<T>, index: usize) -> bool {
    if index < list.len() {
        list.remove(index);
        true
    } else {
        false
    }
}
