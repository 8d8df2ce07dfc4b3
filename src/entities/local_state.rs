//! Local state entity - Stores the ledger as versioned key/value pairs.
//!
//! Each row holds one well-known key (`currentUser`, `transactions`, ...) with
//! its JSON-encoded value. `version` starts at 1 and increases on every write,
//! which lets writers detect concurrent modification.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key/value database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "local_state")]
pub struct Model {
    /// Storage key (e.g., `"currentUser"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// JSON-encoded value
    pub value: String,
    /// Monotonic write counter used for compare-and-swap
    pub version: i64,
    /// When this key was last written
    pub updated_at: DateTimeUtc,
}

/// `LocalState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
