//! Values for `@populatedBy(callback:)` attributes, computed once per
//! mutation request.

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Callback: Send + Sync {
    async fn call(&self) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F> Callback for F
where
    F: Fn() -> Value + Send + Sync,
{
    async fn call(&self) -> anyhow::Result<Value> {
        Ok((self)())
    }
}
