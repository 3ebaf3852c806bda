pub mod tx_store;

pub use tx_store::{AssignmentStore, TransactionId, TxRecord};
