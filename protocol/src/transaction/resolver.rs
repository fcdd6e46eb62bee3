//! Previous-transaction lookup.
//!
//! The codec never talks to a node. Whenever it needs the output an input
//! spends (to learn its public key or amount) it asks a
//! [`TransactionResolver`] supplied by the caller.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use super::codec::AnyTransaction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("transaction {0} not found")]
    NotFound(String),

    #[error("resolver backend error: {0}")]
    Backend(String),
}

/// Async lookup of a transaction by its hash. No timeout is applied by
/// the callers; implementations own their deadlines.
#[async_trait]
pub trait TransactionResolver: Send + Sync {
    async fn resolve_previous_transaction(
        &self,
        tx_hash: &str,
    ) -> Result<AnyTransaction, ResolveError>;
}

/// Resolver over an in-memory map, for tests and offline tooling.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    transactions: RwLock<HashMap<String, AnyTransaction>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `transaction` under its own hash and return that hash.
    pub fn insert(&self, transaction: impl Into<AnyTransaction>) -> String {
        let transaction = transaction.into();
        let hash = transaction.hash();
        self.transactions.write().insert(hash.clone(), transaction);
        hash
    }

    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.read().is_empty()
    }
}

#[async_trait]
impl TransactionResolver for MemoryResolver {
    async fn resolve_previous_transaction(
        &self,
        tx_hash: &str,
    ) -> Result<AnyTransaction, ResolveError> {
        self.transactions
            .read()
            .get(tx_hash)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(tx_hash.to_string()))
    }
}

/// Resolver that knows nothing. Decoding with it succeeds only when no
/// lookup is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResolver;

#[async_trait]
impl TransactionResolver for NoResolver {
    async fn resolve_previous_transaction(
        &self,
        tx_hash: &str,
    ) -> Result<AnyTransaction, ResolveError> {
        Err(ResolveError::NotFound(tx_hash.to_string()))
    }
}
