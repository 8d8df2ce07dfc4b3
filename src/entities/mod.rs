//! Entity module - Contains the SeaORM entity backing the ledger store.
//! The whole ledger lives in one key/value table; typed records are encoded
//! as JSON documents in its `value` column.

pub mod local_state;

pub use local_state::{Column as LocalStateColumn, Entity as LocalState, Model as LocalStateModel};
