//! # PocketFlow Core
//!
//! Authentication, authorization and domain stores for the PocketFlow
//! personal finance tracker.
//!
//! This crate provides:
//! - **Password Hashing**: Argon2id with a fresh salt per hash
//! - **Session Tokens**: stateless, HMAC-SHA256-signed bearer tokens
//! - **User Accounts**: registration with atomic username uniqueness
//! - **Transactions**: income/expense records scoped to their owner on
//!   every read, update and delete
//!
//! ## Example
//!
//! ```rust
//! use pocketflow_core::{CoreStore, CreateTransactionRequest, TokenSigner, TransactionKind};
//!
//! let store = CoreStore::new();
//! let signer = TokenSigner::with_default_ttl("server-secret");
//!
//! // Register and log in
//! let alice = store.users.register("alice", "pw1").unwrap();
//! let user = store.users.authenticate("alice", "pw1").unwrap();
//! let token = signer.issue(&user.username).unwrap();
//!
//! // Later, on a protected request
//! let claims = signer.verify(&token).unwrap();
//! let caller = store.users.find_by_username(&claims.sub).unwrap();
//! assert_eq!(caller.id, alice.id);
//!
//! // Transactions are stamped with and filtered by the caller's id
//! store.transactions.create(caller.id, CreateTransactionRequest {
//!     title: "rent".into(),
//!     amount: 1000.0,
//!     category: "Housing".into(),
//!     kind: TransactionKind::Expense,
//!     date: None,
//! });
//! assert_eq!(store.transactions.list_for_owner(caller.id).len(), 1);
//! ```

mod error;
mod password;
mod store;
mod token;
mod transaction;
mod user;

pub use error::{CoreError, Result};
pub use password::{hash_password, verify_password};
pub use store::{CoreStore, TransactionStore, UserStore};
pub use token::{Claims, TokenFault, TokenSigner, DEFAULT_TOKEN_TTL_SECS};
pub use transaction::{
    CreateTransactionRequest, Transaction, TransactionId, TransactionKind,
    UpdateTransactionRequest,
};
pub use user::{LoginRequest, RegisterRequest, User, UserId, UserProfile};

/// Version of the core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
