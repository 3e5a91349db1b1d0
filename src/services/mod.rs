pub mod accounts;
pub mod tasks;

pub use accounts::{AccountError, AccountService, Promotion};
pub use tasks::TaskService;
