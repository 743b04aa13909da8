// ==========================================
// 技师排班系统 - 持久化协作者接口
// ==========================================
// 职责: 加载/保存单一全量文档, 屏蔽存储细节
// 实现者: SqliteStateStore / JsonFileStateStore / InMemoryStateStore
// ==========================================

use crate::repository::document::RosterState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ==========================================
// StateStore Trait
// ==========================================
pub trait StateStore: Send {
    /// 加载文档 (不存在返回 None)
    fn load(&self) -> RepositoryResult<Option<RosterState>>;

    /// 保存文档 (每次变更操作后调用)
    fn save(&self, state: &RosterState) -> RepositoryResult<()>;

    /// 存储描述 (用于日志)
    fn describe(&self) -> String;
}

// 共享存储 (宿主与测试同时持有同一存储)
impl<S: StateStore + Sync> StateStore for Arc<S> {
    fn load(&self) -> RepositoryResult<Option<RosterState>> {
        (**self).load()
    }

    fn save(&self, state: &RosterState) -> RepositoryResult<()> {
        (**self).save(state)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

// ==========================================
// InMemoryStateStore - 内存存储
// ==========================================
// 用途: 单元测试 / 不需要落盘的宿主
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    document: Mutex<Option<String>>,
    save_count: AtomicUsize,
    fail_on_save: AtomicBool,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有文档初始化
    pub fn with_state(state: &RosterState) -> RepositoryResult<Self> {
        let store = Self::new();
        store.save(state)?;
        store.save_count.store(0, Ordering::SeqCst);
        Ok(store)
    }

    /// 已保存次数
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// 模拟存储故障
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    /// 最近一次保存的原始 JSON
    pub fn raw_document(&self) -> Option<String> {
        self.document.lock().ok().and_then(|d| d.clone())
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> RepositoryResult<Option<RosterState>> {
        let guard = self
            .document
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        match guard.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &RosterState) -> RepositoryResult<()> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(RepositoryError::IoError("模拟存储故障".to_string()));
        }
        let raw = serde_json::to_string(state)?;
        let mut guard = self
            .document
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        *guard = Some(raw);
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
