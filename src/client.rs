//! Node API client and the keychain collaborator.
//!
//! The HTTP surface is intentionally loose: GraphQL queries posted to
//! `{endpoint}/api`, responses walked as `serde_json::Value`. The
//! [`Ledger`] trait is the seam that lets the submit workflow run against
//! a stub in tests.

use data_encoding::HEXLOWER_PERMISSIVE;
use serde::Serialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::crypto::{self, CryptoError};
use crate::draft::{TransactionDraft, hex_bytes};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("node returned status {0}")]
    Node(u16),
    #[error("node response missing {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// External client contract consumed by the submit workflow.
pub trait Ledger {
    fn fetch_keychain(
        &self,
        seed: &[u8],
    ) -> impl Future<Output = Result<Keychain, ClientError>> + Send;

    fn fetch_last_index(
        &self,
        genesis_address: &str,
    ) -> impl Future<Output = Result<u64, ClientError>> + Send;

    fn fetch_network_public_key(&self)
    -> impl Future<Output = Result<String, ClientError>> + Send;

    fn dispatch(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    endpoint: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Validates the endpoint URL and builds the HTTP client.
    pub fn connect(endpoint: &str) -> Result<Self, ClientError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        let url = reqwest::Url::parse(trimmed)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{trimmed}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidEndpoint(format!(
                "{trimmed}: scheme must be http or https"
            )));
        }
        Ok(Self {
            endpoint: trimmed.to_string(),
            http: reqwest::Client::new(),
        })
    }

    async fn graphql(&self, query: String) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(format!("{}/api", self.endpoint))
            .json(&json!({ "query": query }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Node(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

impl Ledger for ApiClient {
    /// Resolves the keychain for `seed`. The chain is looked up at the
    /// keychain genesis address; a chain that does not exist yet reports
    /// version 1.
    async fn fetch_keychain(&self, seed: &[u8]) -> Result<Keychain, ClientError> {
        let keychain_address = derive_address_bytes(seed, "keychain", 0);
        let query = format!(
            "{{ lastTransaction(address: \"{}\") {{ version }} }}",
            HEXLOWER_PERMISSIVE.encode(&keychain_address)
        );
        let body = self.graphql(query).await?;
        let version = body["data"]["lastTransaction"]["version"]
            .as_u64()
            .unwrap_or(1) as u32;
        Ok(Keychain {
            version,
            seed: seed.to_vec(),
        })
    }

    async fn fetch_last_index(&self, genesis_address: &str) -> Result<u64, ClientError> {
        let query = format!(
            "{{ lastTransaction(address: \"{genesis_address}\") {{ chainLength }} }}"
        );
        let body = self.graphql(query).await?;
        // A missing chain means the next transaction is the first one.
        Ok(body["data"]["lastTransaction"]["chainLength"]
            .as_u64()
            .unwrap_or(0))
    }

    async fn fetch_network_public_key(&self) -> Result<String, ClientError> {
        let body = self
            .graphql("{ sharedSecrets { storageNoncePublicKey } }".to_string())
            .await?;
        body["data"]["sharedSecrets"]["storageNoncePublicKey"]
            .as_str()
            .map(str::to_string)
            .ok_or(ClientError::MissingField("storageNoncePublicKey"))
    }

    async fn dispatch(&self, transaction: &Transaction) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/api/transaction", self.endpoint))
            .json(transaction)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Node(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Derives deterministic chain addresses and assembles transactions for a
/// seed.
#[derive(Debug, Clone)]
pub struct Keychain {
    pub version: u32,
    seed: Vec<u8>,
}

impl Keychain {
    #[cfg(test)]
    pub fn new(version: u32, seed: Vec<u8>) -> Self {
        Self { version, seed }
    }

    /// Address of `service` at `index`, hex encoded.
    pub fn derive_address(&self, service: &str, index: u64) -> String {
        HEXLOWER_PERMISSIVE.encode(&derive_address_bytes(&self.seed, service, index))
    }

    /// Populates the draft into a transaction chained at `index`.
    pub fn build_transaction(
        &self,
        draft: TransactionDraft,
        service: &str,
        index: u64,
    ) -> Transaction {
        Transaction {
            version: self.version,
            address: self.derive_address(service, index),
            index,
            data: draft,
            origin_signature: Vec::new(),
        }
    }
}

fn derive_address_bytes(seed: &[u8], service: &str, index: u64) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(service.as_bytes());
    hasher.update(index.to_be_bytes());
    // Curve and hash identifiers ahead of the digest, as the chain expects.
    let mut address = vec![0u8, 0u8];
    address.extend_from_slice(&hasher.finalize());
    address
}

/// A fully formed transaction ready for origin signing and dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub version: u32,
    pub address: String,
    pub index: u64,
    pub data: TransactionDraft,
    #[serde(rename = "originSignature", serialize_with = "hex_bytes")]
    pub origin_signature: Vec<u8>,
}

impl Transaction {
    /// Applies the origin signature over the serialized transaction body.
    pub fn origin_sign(&mut self, origin_key_hex: &str) -> Result<(), CryptoError> {
        self.origin_signature.clear();
        let payload = serde_json::to_vec(self).unwrap_or_default();
        self.origin_signature = crypto::origin_sign(&payload, origin_key_hex)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ORIGIN_PRIVATE_KEY_HEX;

    #[test]
    fn connect_rejects_bad_urls() {
        assert!(ApiClient::connect("http://localhost:4000").is_ok());
        assert!(ApiClient::connect("https://testnet.archethic.net/").is_ok());
        assert!(ApiClient::connect("not a url").is_err());
        assert!(ApiClient::connect("ftp://node").is_err());
    }

    #[test]
    fn derive_address_is_deterministic_and_prefixed() {
        let keychain = Keychain::new(1, b"seed".to_vec());
        let a = keychain.derive_address("wallet", 0);
        let b = keychain.derive_address("wallet", 0);
        assert_eq!(a, b);
        assert!(a.starts_with("0000"));
        assert_ne!(a, keychain.derive_address("wallet", 1));
        assert_ne!(a, keychain.derive_address("other", 0));
    }

    #[test]
    fn build_then_sign_produces_signature() {
        let keychain = Keychain::new(2, b"seed".to_vec());
        let mut tx = keychain.build_transaction(TransactionDraft::default(), "wallet", 3);
        assert_eq!(tx.version, 2);
        assert_eq!(tx.index, 3);
        assert!(tx.origin_signature.is_empty());

        tx.origin_sign(ORIGIN_PRIVATE_KEY_HEX).unwrap();
        assert_eq!(tx.origin_signature.len(), 64);

        let json = serde_json::to_value(&tx).unwrap();
        assert!(json["originSignature"].as_str().unwrap().len() == 128);
    }
}
