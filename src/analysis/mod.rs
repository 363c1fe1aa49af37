//! Classification of Python source into risk indicators, plus whole-file
//! statistics.

pub mod classifier;
pub mod patterns;
pub mod statistics;

pub use classifier::{BudgetExhausted, Classifier, FileScan};
