// ==========================================
// 技师排班系统 - JSON 文件文档存储
// ==========================================
// 写入方式: 写临时文件 -> sync_all 落盘 -> rename, 崩溃时旧文件保持完整
// ==========================================

use crate::repository::document::RosterState;
use crate::repository::error::RepositoryResult;
use crate::repository::state_store::StateStore;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonFileStateStore {
    fn load(&self) -> RepositoryResult<Option<RosterState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, state: &RosterState) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(state)?;
        let tmp = self.temp_path();
        let mut file = File::create(&tmp)?;
        file.write_all(raw.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json_file({})", self.path.display())
    }
}
