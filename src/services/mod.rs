//! Injectable services shared by the demo screens

pub mod accounts;
pub mod operation_log;

pub use accounts::{Account, AccountDirectory};
pub use operation_log::{OperationEntry, OperationKind, OperationLog};
