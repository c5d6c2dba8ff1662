//! 用户注册表服务
//!
//! 进程内的用户存储加上单调递增的 ID 计数器。每个操作在同一把锁内完成
//! 存在性检查、邮箱唯一性检查和写入。

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{info, warn};

use super::model::{NewUser, User, UserPayload};
use crate::core::error::CoreError;

#[derive(Debug)]
struct RegistryState {
    /// ID 单调递增，BTreeMap 的遍历顺序即插入顺序
    users: BTreeMap<u64, User>,
    next_id: u64,
}

impl RegistryState {
    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        self.users
            .values()
            .any(|user| Some(user.id) != except && user.email == email)
    }
}

#[derive(Debug, Clone)]
pub struct UserRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRegistry {
    /// 空注册表，第一个 ID 为 1
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState {
                users: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// 预置 ID 1、2 两条示例记录，计数器从 3 开始
    pub fn with_fixtures() -> Self {
        let now = Utc::now();
        let fixtures = [
            NewUser {
                name: "John Doe".to_string(),
                email: "john@example.com".to_string(),
                age: Some(30),
                phone: Some("+1234567890".to_string()),
            },
            NewUser {
                name: "Jane Smith".to_string(),
                email: "jane@example.com".to_string(),
                age: Some(25),
                phone: Some("+1987654321".to_string()),
            },
        ];

        let users: BTreeMap<u64, User> = fixtures
            .into_iter()
            .zip(1u64..)
            .map(|(new_user, id)| (id, User::new(id, new_user, now)))
            .collect();

        info!("✅ 已初始化 {} 个示例用户", users.len());

        Self {
            state: Arc::new(Mutex::new(RegistryState {
                users,
                next_id: 3,
            })),
        }
    }

    pub fn list(&self) -> Vec<User> {
        self.state.lock().users.values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.state.lock().users.len()
    }

    pub fn get(&self, id: u64) -> Result<User, CoreError> {
        self.state
            .lock()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(CoreError::user_not_found)
    }

    pub fn create(&self, payload: Option<UserPayload>) -> Result<User, CoreError> {
        let payload = payload.ok_or_else(CoreError::no_data)?;
        let new_user = payload.into_new_user().inspect_err(|e| {
            warn!("创建用户校验失败: {:?}", e);
        })?;

        let mut state = self.state.lock();
        if state.email_taken(&new_user.email, None) {
            warn!("邮箱已存在: {}", new_user.email);
            return Err(CoreError::email_taken());
        }

        let id = state.next_id;
        state.next_id += 1;
        let user = User::new(id, new_user, Utc::now());
        state.users.insert(id, user.clone());

        info!("用户创建成功, ID: {}", id);
        Ok(user)
    }

    pub fn update(&self, id: u64, payload: Option<UserPayload>) -> Result<User, CoreError> {
        let mut state = self.state.lock();
        if !state.users.contains_key(&id) {
            return Err(CoreError::user_not_found());
        }

        let payload = payload.ok_or_else(CoreError::no_data)?;
        let changes = payload.into_changes().inspect_err(|e| {
            warn!("更新用户 {} 校验失败: {:?}", id, e);
        })?;

        if let Some(email) = &changes.email {
            if state.email_taken(email, Some(id)) {
                warn!("邮箱已被其他用户使用: {}", email);
                return Err(CoreError::email_taken());
            }
        }

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(CoreError::user_not_found)?;
        user.apply(changes, Utc::now());

        info!("用户更新成功, ID: {}", id);
        Ok(user.clone())
    }

    pub fn delete(&self, id: u64) -> Result<User, CoreError> {
        let removed = self
            .state
            .lock()
            .users
            .remove(&id)
            .ok_or_else(CoreError::user_not_found)?;

        info!("用户删除成功, ID: {}", id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Option<UserPayload> {
        Some(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn fixtures_are_seeded() {
        let registry = UserRegistry::with_fixtures();
        let users = registry.list();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[0].email, "john@example.com");
        assert_eq!(users[1].id, 2);
        assert_eq!(users[1].email, "jane@example.com");
    }

    #[test]
    fn create_assigns_fresh_ids() {
        let registry = UserRegistry::with_fixtures();
        let user = registry
            .create(payload(json!({ "name": "A", "email": "a@x.com" })))
            .unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(user.age, None);
        assert_eq!(user.phone, None);

        // 删除后 ID 不复用
        registry.delete(3).unwrap();
        let next = registry
            .create(payload(json!({ "name": "B", "email": "b@x.com" })))
            .unwrap();
        assert_eq!(next.id, 4);
    }

    #[test]
    fn create_without_body_is_bad_request() {
        let registry = UserRegistry::new();
        assert!(matches!(registry.create(None), Err(CoreError::BadRequest(_))));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn invalid_create_leaves_registry_unchanged() {
        let registry = UserRegistry::with_fixtures();
        let err = registry
            .create(payload(json!({ "name": "A", "email": "bad" })))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed(_)));
        assert_eq!(registry.count(), 2);

        // 失败的创建不消耗 ID
        let user = registry
            .create(payload(json!({ "name": "A", "email": "a@x.com" })))
            .unwrap();
        assert_eq!(user.id, 3);
    }

    #[test]
    fn duplicate_email_conflicts() {
        let registry = UserRegistry::new();
        registry
            .create(payload(json!({ "name": "A", "email": "a@x.com" })))
            .unwrap();
        let err = registry
            .create(payload(json!({ "name": "B", "email": "a@x.com" })))
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(registry.count(), 1);

        // 大小写不同视为不同邮箱
        registry
            .create(payload(json!({ "name": "C", "email": "A@x.com" })))
            .unwrap();
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let registry = UserRegistry::with_fixtures();
        let before = registry.list();
        let err = registry.update(99, None).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(registry.list(), before);
    }

    #[test]
    fn update_age_only_keeps_identity_fields() {
        let registry = UserRegistry::with_fixtures();
        let before = registry.get(1).unwrap();
        let after = registry.update(1, payload(json!({ "age": 31 }))).unwrap();
        assert_eq!(after.age, Some(31));
        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn update_email_checks_other_records_only() {
        let registry = UserRegistry::with_fixtures();
        registry
            .update(1, payload(json!({ "email": "john@example.com" })))
            .unwrap();
        let err = registry
            .update(1, payload(json!({ "email": "jane@example.com" })))
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(registry.get(1).unwrap().email, "john@example.com");
    }

    #[test]
    fn delete_twice() {
        let registry = UserRegistry::with_fixtures();
        let removed = registry.delete(2).unwrap();
        assert_eq!(removed.name, "Jane Smith");
        assert!(matches!(registry.delete(2), Err(CoreError::NotFound(_))));
        assert!(matches!(registry.get(2), Err(CoreError::NotFound(_))));
    }
}
