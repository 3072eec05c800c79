//! In-memory stores for users and transactions.
//!
//! The stores are the only mutable state in the system. Each is a
//! `parking_lot`-guarded map behind `Arc`, so the store handles are cheap
//! to clone into request handlers.
//!
//! Every transaction accessor takes the owner's id and filters by it; a
//! record owned by someone else is reported exactly like a missing one.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::password;
use crate::transaction::{
    CreateTransactionRequest, Transaction, TransactionId, UpdateTransactionRequest,
};
use crate::user::{User, UserId};

/// Aggregate store handed to the API layer.
#[derive(Debug, Clone, Default)]
pub struct CoreStore {
    /// User storage.
    pub users: UserStore,
    /// Transaction storage.
    pub transactions: TransactionStore,
}

impl CoreStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// User storage.
///
/// Lock order: `username_index` before `users`, everywhere. Any path that
/// takes both must follow it or two requests can block each other forever.
#[derive(Debug, Clone)]
pub struct UserStore {
    /// Users by ID.
    users: Arc<RwLock<HashMap<UserId, User>>>,
    /// Username to ID index.
    username_index: Arc<RwLock<HashMap<String, UserId>>>,
    /// Next user ID.
    next_id: Arc<AtomicU64>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    /// Create a new user store.
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            username_index: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a new account.
    ///
    /// Hashing happens before any lock is taken (it is deliberately slow);
    /// the uniqueness check and insert run under one write lock so two
    /// concurrent registrations of the same name cannot both succeed.
    /// Nothing is mutated on failure.
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        User::validate_username(username).map_err(CoreError::InvalidUsername)?;

        let password_hash = password::hash_password(password)?;

        let mut username_index = self.username_index.write();
        let mut users = self.users.write();

        if username_index.contains_key(username) {
            return Err(CoreError::UsernameTaken(username.to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User::new(id, username.to_string(), password_hash);

        username_index.insert(username.to_string(), id);
        users.insert(id, user.clone());

        Ok(user)
    }

    /// Check a username/password pair and return the matching user.
    ///
    /// An unknown username and a wrong password yield the same error.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .find_by_username(username)
            .ok_or(CoreError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash) {
            return Err(CoreError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get a user by ID.
    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.read().get(&id).cloned()
    }

    /// Get a user by username.
    pub fn find_by_username(&self, username: &str) -> Option<User> {
        let username_index = self.username_index.read();
        let id = username_index.get(username)?;
        self.users.read().get(id).cloned()
    }

    /// Count users.
    pub fn count(&self) -> usize {
        self.users.read().len()
    }
}

/// Transaction storage, owner-scoped on every access.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    /// Transactions by ID.
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
    /// Next transaction ID.
    next_id: Arc<AtomicU64>,
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore {
    /// Create a new transaction store.
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Create a transaction owned by `owner_id`.
    pub fn create(&self, owner_id: UserId, req: CreateTransactionRequest) -> Transaction {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let tx = Transaction::new(id, owner_id, req);

        self.transactions.write().insert(id, tx.clone());
        tx
    }

    /// List the owner's transactions, newest first.
    pub fn list_for_owner(&self, owner_id: UserId) -> Vec<Transaction> {
        let mut txs: Vec<_> = self
            .transactions
            .read()
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        txs.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        txs
    }

    /// Get one of the owner's transactions by ID.
    pub fn get_for_owner(&self, id: TransactionId, owner_id: UserId) -> Option<Transaction> {
        self.transactions
            .read()
            .get(&id)
            .filter(|t| t.owner_id == owner_id)
            .cloned()
    }

    /// Update one of the owner's transactions.
    ///
    /// The scoped fetch runs first, so a foreign transaction produces the
    /// same `NotFound` as a nonexistent one and is left untouched.
    pub fn update_for_owner(
        &self,
        id: TransactionId,
        owner_id: UserId,
        req: UpdateTransactionRequest,
    ) -> Result<Transaction> {
        let mut transactions = self.transactions.write();

        let tx = transactions
            .get_mut(&id)
            .filter(|t| t.owner_id == owner_id)
            .ok_or(CoreError::NotFound)?;

        tx.apply_update(req);
        Ok(tx.clone())
    }

    /// Delete one of the owner's transactions.
    pub fn delete_for_owner(&self, id: TransactionId, owner_id: UserId) -> Result<Transaction> {
        let mut transactions = self.transactions.write();

        let tx = transactions
            .get(&id)
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .ok_or(CoreError::NotFound)?;

        transactions.remove(&id);
        Ok(tx)
    }

    /// Income minus expenses over the owner's transactions.
    pub fn balance_for_owner(&self, owner_id: UserId) -> f64 {
        self.transactions
            .read()
            .values()
            .filter(|t| t.owner_id == owner_id)
            .map(Transaction::signed_amount)
            .sum()
    }

    /// Count all transactions.
    pub fn count(&self) -> usize {
        self.transactions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionKind;

    fn req(title: &str, amount: f64, kind: TransactionKind) -> CreateTransactionRequest {
        CreateTransactionRequest {
            title: title.to_string(),
            amount,
            category: "Misc".to_string(),
            kind,
            date: None,
        }
    }

    #[test]
    fn test_register_and_authenticate() {
        let store = UserStore::new();

        let user = store.register("alice", "pw1").unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "pw1");

        let found = store.authenticate("alice", "pw1").unwrap();
        assert_eq!(found.id, user.id);
    }

    #[test]
    fn test_duplicate_username() {
        let store = UserStore::new();
        store.register("alice", "pw1").unwrap();

        let result = store.register("alice", "pw2");
        assert!(matches!(result, Err(CoreError::UsernameTaken(_))));

        // Exactly one identity for the name remains.
        assert_eq!(store.count(), 1);
        let kept = store.find_by_username("alice").unwrap();
        assert!(crate::password::verify_password("pw1", &kept.password_hash));
    }

    #[test]
    fn test_authenticate_collapses_failures() {
        let store = UserStore::new();
        store.register("alice", "pw1").unwrap();

        let wrong_password = store.authenticate("alice", "wrong").unwrap_err();
        let unknown_user = store.authenticate("nobody", "pw1").unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn test_concurrent_duplicate_registration() {
        use std::sync::Barrier;

        let store = UserStore::new();
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    store.register("alice", "pw1").is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        // Exactly one racer wins; exactly one identity remains.
        assert_eq!(successes, 1);
        assert_eq!(store.count(), 1);
        assert!(store.find_by_username("alice").is_some());
    }

    #[test]
    fn test_register_concurrent_with_lookups() {
        let store = UserStore::new();
        store.register("alice", "pw1").unwrap();

        // Hammer lookups while registrations run; both must make progress.
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        assert!(store.find_by_username("alice").is_some());
                    }
                })
            })
            .collect();

        for i in 0..50 {
            store.register(&format!("user{i}"), "pw").unwrap();
        }

        for h in readers {
            h.join().unwrap();
        }
        assert_eq!(store.count(), 51);
    }

    #[test]
    fn test_invalid_username_rejected() {
        let store = UserStore::new();
        assert!(matches!(
            store.register("", "pw"),
            Err(CoreError::InvalidUsername(_))
        ));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_transactions_scoped_by_owner() {
        let store = TransactionStore::new();

        let alices = store.create(1, req("rent", 1000.0, TransactionKind::Expense));
        store.create(2, req("coffee", 5.0, TransactionKind::Expense));

        assert_eq!(store.list_for_owner(1).len(), 1);
        assert_eq!(store.list_for_owner(2).len(), 1);
        assert_eq!(store.list_for_owner(3).len(), 0);

        // Foreign lookups behave like missing ones.
        assert!(store.get_for_owner(alices.id, 2).is_none());
        assert!(matches!(
            store.delete_for_owner(alices.id, 2),
            Err(CoreError::NotFound)
        ));

        // Nothing was mutated by the failed delete.
        assert!(store.get_for_owner(alices.id, 1).is_some());
    }

    #[test]
    fn test_update_scoped_by_owner() {
        let store = TransactionStore::new();
        let tx = store.create(1, req("rent", 1000.0, TransactionKind::Expense));

        let result = store.update_for_owner(
            tx.id,
            2,
            UpdateTransactionRequest {
                amount: Some(1.0),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CoreError::NotFound)));

        let updated = store
            .update_for_owner(
                tx.id,
                1,
                UpdateTransactionRequest {
                    amount: Some(1200.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, 1200.0);
    }

    #[test]
    fn test_delete_for_owner() {
        let store = TransactionStore::new();
        let tx = store.create(1, req("rent", 1000.0, TransactionKind::Expense));

        let deleted = store.delete_for_owner(tx.id, 1).unwrap();
        assert_eq!(deleted.id, tx.id);
        assert_eq!(store.count(), 0);

        assert!(matches!(
            store.delete_for_owner(tx.id, 1),
            Err(CoreError::NotFound)
        ));
    }

    #[test]
    fn test_balance() {
        let store = TransactionStore::new();
        store.create(1, req("salary", 50_000.0, TransactionKind::Income));
        store.create(1, req("pizza", 650.0, TransactionKind::Expense));
        store.create(1, req("metro", 500.0, TransactionKind::Expense));
        store.create(2, req("salary", 9_999.0, TransactionKind::Income));

        assert_eq!(store.balance_for_owner(1), 48_850.0);
        assert_eq!(store.balance_for_owner(2), 9_999.0);
        assert_eq!(store.balance_for_owner(3), 0.0);
    }

    #[test]
    fn test_list_ordering() {
        let store = TransactionStore::new();
        let old = store.create(
            1,
            CreateTransactionRequest {
                title: "old".to_string(),
                amount: 1.0,
                category: "Misc".to_string(),
                kind: TransactionKind::Expense,
                date: Some(100),
            },
        );
        let new = store.create(
            1,
            CreateTransactionRequest {
                title: "new".to_string(),
                amount: 1.0,
                category: "Misc".to_string(),
                kind: TransactionKind::Expense,
                date: Some(200),
            },
        );

        let listed = store.list_for_owner(1);
        assert_eq!(listed[0].id, new.id);
        assert_eq!(listed[1].id, old.id);
    }
}
