#![forbid(unsafe_code)]

pub mod manager;
pub mod model;
pub mod parser;
pub mod storage;

pub use manager::TaskManager;
pub use model::{Action, Task};
pub use parser::parse;
pub use storage::Repository;
