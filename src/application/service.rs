use std::future::Future;

use crate::domain::{EntryPoint, Operation, ParsePolicy, encode_balance};
use crate::storage::StateStore;

use super::ChaincodeError;

/// Host-facing entry points of a chaincode.
///
/// The host calls `init` when the chaincode is (re)initialized, `invoke` for
/// state-mutating functions and `query` for read-only ones. Every call is a
/// self-contained unit: the result bytes or an error are handed back to the
/// host, which owns retries and rejection.
pub trait Chaincode: Send + Sync {
    fn init(
        &self,
        function: &str,
        args: &[String],
    ) -> impl Future<Output = Result<Vec<u8>, ChaincodeError>> + Send;

    fn invoke(
        &self,
        function: &str,
        args: &[String],
    ) -> impl Future<Output = Result<Vec<u8>, ChaincodeError>> + Send;

    fn query(
        &self,
        function: &str,
        args: &[String],
    ) -> impl Future<Output = Result<Vec<u8>, ChaincodeError>> + Send;
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Credit,
    Debit,
}

/// Keyed integer balances over an injected state store.
///
/// The service keeps no state of its own between calls; everything lives in
/// the store. Construct one per host (or per test) with [`BalanceService::new`].
#[derive(Debug, Clone)]
pub struct BalanceService<S> {
    store: S,
    policy: ParsePolicy,
}

impl<S: StateStore> BalanceService<S> {
    /// Create a service over the given store with the lenient parse policy.
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: ParsePolicy::default(),
        }
    }

    /// Replace the parse policy.
    pub fn with_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================
    // Operations
    // ========================

    /// Set every bucket in `args[1..]` to zero.
    ///
    /// `args[0]` is a reserved slot and is never written. Existing buckets are
    /// reset without complaint. A failed write stops the loop; buckets written
    /// before it keep their new value.
    pub async fn init_buckets(&self, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        for key in args.iter().skip(1) {
            self.store
                .put(key, encode_balance(0))
                .await
                .map_err(|e| ChaincodeError::storage(format!("Failed to put state: {key}"), e))?;
            tracing::info!(key = %key, "added bucket");
        }
        Ok(Vec::new())
    }

    /// Raw stored bytes for a bucket. A bucket that was never written yields
    /// empty bytes.
    pub async fn balance(&self, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        let [key] = args else {
            return Err(ChaincodeError::Argument {
                expected: 1,
                got: args.len(),
            });
        };

        let stored = self
            .store
            .get(key)
            .await
            .map_err(|e| ChaincodeError::storage("Error retrieving balance", e))?;
        Ok(stored.unwrap_or_default())
    }

    /// Credit `args[1]` to the bucket `args[0]`. Returns the new balance.
    pub async fn add(&self, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        self.apply(Direction::Credit, args).await
    }

    /// Debit `args[1]` from the bucket `args[0]`. Returns the new balance,
    /// which may be negative.
    pub async fn deduct(&self, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        self.apply(Direction::Debit, args).await
    }

    async fn apply(&self, direction: Direction, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        let [key, delta] = args else {
            return Err(ChaincodeError::Argument {
                expected: 2,
                got: args.len(),
            });
        };

        let stored = self
            .store
            .get(key)
            .await
            .map_err(|e| ChaincodeError::storage(format!("Failed to get state: {key}"), e))?
            .ok_or_else(|| ChaincodeError::NotFound(key.clone()))?;

        let value = self.policy.parse_bytes(&stored)?;
        let delta = self.policy.parse(delta)?;

        let new_value = match direction {
            Direction::Credit => value.checked_add(delta),
            Direction::Debit => value.checked_sub(delta),
        }
        .ok_or_else(|| ChaincodeError::Overflow {
            key: key.clone(),
            value,
            delta,
        })?;

        let encoded = encode_balance(new_value);
        self.store
            .put(key, encoded.clone())
            .await
            .map_err(|e| ChaincodeError::storage(format!("Failed to put state: {key}"), e))?;

        tracing::debug!(key = %key, old = value, new = new_value, "balance updated");
        Ok(encoded)
    }

    // ========================
    // Dispatch
    // ========================

    /// Route a named function through the given entry point.
    pub async fn dispatch(
        &self,
        entry: EntryPoint,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ChaincodeError> {
        tracing::info!(entry = %entry, function, "{} is running {}", entry, function);

        match Operation::resolve(entry, function) {
            Some(op) => self.execute(op, args).await,
            None => {
                tracing::warn!(entry = %entry, function, "{} did not find func: {}", entry, function);
                Err(ChaincodeError::UnknownOperation {
                    entry,
                    name: function.to_string(),
                })
            }
        }
    }

    /// Run an already-resolved operation.
    pub async fn execute(&self, op: Operation, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        match op {
            Operation::Init => self.init_buckets(args).await,
            Operation::Add => self.add(args).await,
            Operation::Deduct => self.deduct(args).await,
            Operation::Balance => self.balance(args).await,
        }
    }
}

impl<S: StateStore> Chaincode for BalanceService<S> {
    async fn init(&self, _function: &str, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        self.init_buckets(args).await
    }

    async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        self.dispatch(EntryPoint::Invoke, function, args).await
    }

    async fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        self.dispatch(EntryPoint::Query, function, args).await
    }
}
