pub mod task;
pub mod user;

pub use task::{Task, TaskInput};
pub use user::{NewUser, Role, UnknownRole, User};
