pub mod builder;
pub mod injection;
pub mod report;
pub mod truncation;

pub use builder::PromptBudgeter;
pub use report::{BudgetLevel, BudgetReport};
