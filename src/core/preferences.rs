//! Display preferences.

use crate::{
    core::storage::{self, keys},
    errors::Result,
    models::Theme,
};
use sea_orm::ConnectionTrait;

/// Stored theme, light when never set.
pub async fn get_theme<C>(db: &C) -> Result<Theme>
where
    C: ConnectionTrait,
{
    Ok(storage::get(db, keys::THEME).await?.unwrap_or_default())
}

/// Persists the theme choice.
pub async fn set_theme<C>(db: &C, theme: Theme) -> Result<()>
where
    C: ConnectionTrait,
{
    storage::put(db, keys::THEME, &theme).await?;
    Ok(())
}
