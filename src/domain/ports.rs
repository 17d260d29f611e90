use crate::domain::model::{Settings, Snapshot};
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn settings(&self) -> Settings;
    fn competitor_names(&self) -> &[String];
    fn output_path(&self) -> Option<&str>;
}

/// 接收快照的畫面元件
pub trait SnapshotListener {
    fn initialize(&mut self, snapshot: &Snapshot);
    fn changed(&mut self, snapshot: &Snapshot);
}
