use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::model::WidgetAsset;
use crate::domain::ports::AssetStore;
use crate::utils::error::Result;

/// 從本機檔案讀取 widget 建置產物
#[derive(Debug, Clone)]
pub struct LocalAssets {
    script_path: PathBuf,
    style_path: PathBuf,
}

impl LocalAssets {
    pub fn new(script_path: impl Into<PathBuf>, style_path: impl Into<PathBuf>) -> Self {
        Self {
            script_path: script_path.into(),
            style_path: style_path.into(),
        }
    }

    fn path_for(&self, asset: WidgetAsset) -> &PathBuf {
        match asset {
            WidgetAsset::Script => &self.script_path,
            WidgetAsset::Stylesheet => &self.style_path,
        }
    }
}

#[async_trait]
impl AssetStore for LocalAssets {
    async fn load(&self, asset: WidgetAsset) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(asset);
        match tokio::fs::read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("{} not found at {}", asset.name(), path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
