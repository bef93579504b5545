use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn schema(&self) -> Value;

    /// Whether results may be reused for identical arguments.
    ///
    /// Tools that sample randomly must return false.
    fn cacheable(&self) -> bool {
        true
    }

    async fn execute(&self, arguments: Value) -> Result<Value>;
}
