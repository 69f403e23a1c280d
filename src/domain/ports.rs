use crate::domain::model::{ExtractedInput, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn records_path(&self) -> &str;
    fn references_path(&self) -> Option<&str>;
    fn catalog_path(&self) -> &str;
    fn territories_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn compress_output(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractedInput>;
    async fn transform(&self, input: ExtractedInput) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
