//! Transaction types.

use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Unique identifier for a transaction.
pub type TransactionId = u64;

/// Whether a transaction adds to or subtracts from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

/// A single income or expense record, always bound to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: TransactionId,
    /// The user this transaction belongs to. Set by the server from the
    /// authenticated caller, never from the request body.
    pub owner_id: UserId,
    /// Short description.
    pub title: String,
    /// Amount in the account currency.
    pub amount: f64,
    /// Free-form category label.
    pub category: String,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Unix timestamp of the transaction.
    pub date: u64,
}

impl Transaction {
    /// Create a transaction owned by `owner_id` from a request.
    pub fn new(id: TransactionId, owner_id: UserId, req: CreateTransactionRequest) -> Self {
        Self {
            id,
            owner_id,
            title: req.title,
            amount: req.amount,
            category: req.category,
            kind: req.kind,
            date: req.date.unwrap_or_else(crate::token::unix_now),
        }
    }

    /// Apply the set fields of an update request.
    pub fn apply_update(&mut self, req: UpdateTransactionRequest) {
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(amount) = req.amount {
            self.amount = amount;
        }
        if let Some(category) = req.category {
            self.category = category;
        }
        if let Some(kind) = req.kind {
            self.kind = kind;
        }
        if let Some(date) = req.date {
            self.date = date;
        }
    }

    /// Signed contribution of this transaction to a balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Request to create a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Short description.
    pub title: String,
    /// Amount.
    pub amount: f64,
    /// Category label.
    pub category: String,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Unix timestamp; defaults to now.
    #[serde(default)]
    pub date: Option<u64>,
}

/// Request to update a transaction. Unset fields are left as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New amount.
    #[serde(default)]
    pub amount: Option<f64>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New kind.
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionKind>,
    /// New date.
    #[serde(default)]
    pub date: Option<u64>,
}
