//! Read-side filtering of the transaction list.

use crate::{
    Error,
    transaction::{PaymentMethod, Transaction, TransactionKind},
};

/// The type labels the transaction list can be filtered by.
///
/// Transfers are stored as expenses, so the Expense and Transfer labels are
/// defined disjointly: Expense matches expenses paid by cash or credit,
/// Transfer matches expenses with the transfer payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLabel {
    /// Matches every transaction; short-circuits the other labels.
    All,
    /// Matches income transactions.
    Income,
    /// Matches non-transfer expense transactions.
    Expense,
    /// Matches transfer transactions.
    Transfer,
}

impl TypeLabel {
    /// Parse a label as it appears in the filter bar, case-insensitively.
    ///
    /// # Errors
    /// Returns [Error::InvalidTypeLabel] for anything other than All,
    /// Income, Expense, or Transfer.
    pub fn parse(text: &str) -> Result<Self, Error> {
        match text.to_lowercase().as_str() {
            "all" => Ok(TypeLabel::All),
            "income" => Ok(TypeLabel::Income),
            "expense" => Ok(TypeLabel::Expense),
            "transfer" => Ok(TypeLabel::Transfer),
            _ => Err(Error::InvalidTypeLabel(text.to_owned())),
        }
    }

    fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            TypeLabel::All => true,
            TypeLabel::Income => transaction.kind == TransactionKind::Income,
            TypeLabel::Expense => {
                transaction.kind == TransactionKind::Expense
                    && transaction.payment_method != PaymentMethod::Transfer
            }
            TypeLabel::Transfer => {
                transaction.kind == TransactionKind::Expense
                    && transaction.payment_method == PaymentMethod::Transfer
            }
        }
    }
}

/// A filter over the transaction list.
///
/// Both dimensions are OR matches and an empty selection means "no filter".
/// Transactions without a category never match a category-name selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// The selected category names.
    pub categories: Vec<String>,
    /// The selected type labels.
    pub types: Vec<TypeLabel>,
}

impl TransactionFilter {
    /// Parse the comma-separated `categories` and `types` query parameters.
    ///
    /// # Errors
    /// Returns [Error::InvalidTypeLabel] if `types` contains an unknown
    /// label.
    pub fn parse(categories: Option<&str>, types: Option<&str>) -> Result<Self, Error> {
        let categories = categories
            .unwrap_or_default()
            .split(',')
            .filter(|name| !name.is_empty())
            .map(|name| name.to_owned())
            .collect();

        let types = types
            .unwrap_or_default()
            .split(',')
            .filter(|label| !label.is_empty())
            .map(TypeLabel::parse)
            .collect::<Result<_, _>>()?;

        Ok(Self { categories, types })
    }

    /// Whether `transaction` passes both filter dimensions.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matches_category(transaction) && self.matches_type(transaction)
    }

    /// Drop the transactions that do not pass the filter, preserving order.
    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions
            .into_iter()
            .filter(|transaction| self.matches(transaction))
            .collect()
    }

    fn matches_category(&self, transaction: &Transaction) -> bool {
        if self.categories.is_empty() {
            return true;
        }

        transaction
            .category_name
            .as_ref()
            .is_some_and(|name| self.categories.contains(name))
    }

    fn matches_type(&self, transaction: &Transaction) -> bool {
        if self.types.is_empty() || self.types.contains(&TypeLabel::All) {
            return true;
        }

        self.types.iter().any(|label| label.matches(transaction))
    }
}
