pub mod digest;
pub mod email;

use async_trait::async_trait;

use crate::error::Result;

pub use digest::Digest;
pub use email::EmailNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, digest: &Digest) -> Result<()>;
}
