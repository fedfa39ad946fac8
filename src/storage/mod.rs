use async_trait::async_trait;
use crate::error::Result;
use crate::models::SeenSet;

mod json;
pub use json::JsonFileStore;

#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Identifiers from the last completed run; empty on first run.
    async fn load(&self) -> Result<SeenSet>;
    /// Replace the stored set with `ids`.
    async fn save(&self, ids: &SeenSet) -> Result<()>;
}
