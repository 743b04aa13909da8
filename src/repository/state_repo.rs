// ==========================================
// 技师排班系统 - 状态仓储
// ==========================================
// 职责: 持有当前文档 + 持久化协作者, 提供事务式变更
// 红线: 任何失败 (约束失败/保存失败) 均恢复变更前文档
// ==========================================

use crate::config::EngineConfig;
use crate::repository::document::RosterState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::state_store::StateStore;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// API 层共享的仓储句柄 (所有变更经同一把锁串行化)
pub type SharedStateRepository = Arc<Mutex<StateRepository>>;

/// 获取仓储锁
pub fn lock_repository(repo: &SharedStateRepository) -> RepositoryResult<MutexGuard<'_, StateRepository>> {
    repo.lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

pub struct StateRepository {
    state: RosterState,
    store: Box<dyn StateStore>,
    config: EngineConfig,
}

impl StateRepository {
    /// 打开仓储: 加载文档, 不存在时使用默认文档
    ///
    /// 文档损坏时回退默认文档并记录 warn (下一次保存会覆盖旧文档)
    pub fn open(store: Box<dyn StateStore>, config: EngineConfig) -> RepositoryResult<Self> {
        let state = match store.load() {
            Ok(Some(mut state)) => {
                state.normalize(&config);
                info!(
                    store = %store.describe(),
                    technicians = state.technicians.len(),
                    occurrences = state.occurrences.len(),
                    "已加载排班文档"
                );
                state
            }
            Ok(None) => {
                info!(store = %store.describe(), "未找到排班文档，使用默认文档");
                RosterState::from_config(&config)
            }
            Err(RepositoryError::SerializationError(msg)) => {
                warn!(store = %store.describe(), error = %msg, "排班文档格式错误，使用默认文档");
                RosterState::from_config(&config)
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            state,
            store,
            config,
        })
    }

    pub fn state(&self) -> &RosterState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 包装为共享句柄
    pub fn into_shared(self) -> SharedStateRepository {
        Arc::new(Mutex::new(self))
    }

    /// 事务式变更
    ///
    /// - op 返回 Err: 恢复变更前文档, 不保存
    /// - op 返回 Ok: 保存文档; 保存失败同样恢复并返回错误
    pub fn transact<T, E>(
        &mut self,
        op: impl FnOnce(&mut RosterState, &EngineConfig) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
    {
        let backup = self.state.clone();
        match op(&mut self.state, &self.config) {
            Ok(value) => match self.store.save(&self.state) {
                Ok(()) => {
                    debug!(store = %self.store.describe(), "排班文档已保存");
                    Ok(value)
                }
                Err(e) => {
                    error!(store = %self.store.describe(), error = %e, "排班文档保存失败，已回滚");
                    self.state = backup;
                    Err(E::from(e))
                }
            },
            Err(e) => {
                self.state = backup;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roster::Technician;
    use crate::domain::types::WorkloadClass;
    use crate::repository::state_store::InMemoryStateStore;

    fn open() -> (Arc<InMemoryStateStore>, StateRepository) {
        let store = Arc::new(InMemoryStateStore::new());
        let repo = StateRepository::open(Box::new(store.clone()), EngineConfig::default())
            .unwrap();
        (store, repo)
    }

    #[test]
    fn test_transact_saves_on_success() {
        let (store, mut repo) = open();
        repo.transact(|state, _| {
            state.technicians.push(Technician::new("Ana", WorkloadClass::H40));
            Ok::<_, RepositoryError>(())
        })
        .unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap().unwrap().technicians.len(), 1);
    }

    #[test]
    fn test_transact_rolls_back_on_error() {
        let (store, mut repo) = open();
        let result = repo.transact(|state, _| {
            state.technicians.push(Technician::new("Ana", WorkloadClass::H40));
            Err::<(), _>(RepositoryError::ValidationError("x".to_string()))
        });

        assert!(result.is_err());
        assert!(repo.state().technicians.is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_transact_rolls_back_on_save_failure() {
        let (store, mut repo) = open();
        store.set_fail_on_save(true);
        let result = repo.transact(|state, _| {
            state.technicians.push(Technician::new("Ana", WorkloadClass::H40));
            Ok::<_, RepositoryError>(())
        });

        assert!(matches!(result, Err(RepositoryError::IoError(_))));
        assert!(repo.state().technicians.is_empty());
    }

    #[test]
    fn test_open_with_corrupt_document_uses_default() {
        struct Corrupt;
        impl StateStore for Corrupt {
            fn load(&self) -> RepositoryResult<Option<RosterState>> {
                Err(RepositoryError::SerializationError("bad".to_string()))
            }
            fn save(&self, _: &RosterState) -> RepositoryResult<()> {
                Ok(())
            }
            fn describe(&self) -> String {
                "corrupt".to_string()
            }
        }

        let repo = StateRepository::open(Box::new(Corrupt), EngineConfig::default()).unwrap();
        assert_eq!(repo.state().templates.len(), 4);
    }
}
