//! Grouped sums over a sequence of transactions.
//!
//! Callers filter transactions by date before aggregating; these functions
//! look at every transaction they are given.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    transaction::{Transaction, TransactionType},
};

/// The sum of transaction amounts for each transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: Decimal,
    /// The sum of all expense amounts.
    pub expense: Decimal,
}

/// The sum of transaction amounts in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category name, as stored on the transactions.
    pub category: String,
    /// The sum of amounts of the transactions in the category.
    pub total: Decimal,
}

/// Per-category totals, split by transaction type.
///
/// Within each list, categories appear in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Category totals for income transactions.
    pub income: Vec<CategoryTotal>,
    /// Category totals for expense transactions.
    pub expense: Vec<CategoryTotal>,
}

/// Sum transaction amounts by type.
///
/// A type with no transactions has a total of zero.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a total does not fit in a [Decimal].
pub fn totals(transactions: &[Transaction]) -> Result<Totals, Error> {
    transactions
        .iter()
        .try_fold(Totals::default(), |mut totals, transaction| {
            let total = match transaction.kind {
                TransactionType::Income => &mut totals.income,
                TransactionType::Expense => &mut totals.expense,
            };
            *total = checked_sum(*total, transaction.amount)?;

            Ok(totals)
        })
}

/// Sum transaction amounts by category, separately for income and expenses.
///
/// Categories are listed in the order they first appear in `transactions`
/// for that type, regardless of their totals.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a category total does not fit in a
/// [Decimal].
pub fn category_summary(transactions: &[Transaction]) -> Result<CategorySummary, Error> {
    let mut income = CategoryGroups::default();
    let mut expense = CategoryGroups::default();

    for transaction in transactions {
        let groups = match transaction.kind {
            TransactionType::Income => &mut income,
            TransactionType::Expense => &mut expense,
        };

        groups.add(&transaction.category, transaction.amount)?;
    }

    Ok(CategorySummary {
        income: income.totals,
        expense: expense.totals,
    })
}

fn checked_sum(total: Decimal, amount: Decimal) -> Result<Decimal, Error> {
    total.checked_add(amount).ok_or_else(|| {
        tracing::warn!("Summing {total} and {amount} overflowed");
        Error::AmountOverflow
    })
}

/// Insertion-ordered category totals.
#[derive(Default)]
struct CategoryGroups {
    totals: Vec<CategoryTotal>,
    index: HashMap<String, usize>,
}

impl CategoryGroups {
    fn add(&mut self, category: &str, amount: Decimal) -> Result<(), Error> {
        match self.index.get(category) {
            Some(&position) => {
                let entry = &mut self.totals[position];
                entry.total = checked_sum(entry.total, amount)?;
            }
            None => {
                self.index.insert(category.to_owned(), self.totals.len());
                self.totals.push(CategoryTotal {
                    category: category.to_owned(),
                    total: amount,
                });
            }
        }

        Ok(())
    }
}
