//! 用户数据模型

use axum::{extract::rejection::JsonRejection, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::error::{CoreError, FieldError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: u64, new_user: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new_user.name,
            email: new_user.email,
            age: new_user.age,
            phone: new_user.phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// 覆盖请求中出现的字段并刷新 `updated_at`，`id` 与 `created_at` 不变
    pub fn apply(&mut self, changes: UserChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(age) = changes.age {
            self.age = age;
        }
        if let Some(phone) = changes.phone {
            self.phone = phone;
        }
        self.updated_at = now;
    }
}

/// 创建/更新请求体
///
/// 每个字段有三种状态：缺省 (`None`)、显式 `null` (`Some(None)`)、有值 (`Some(Some(v))`)。
/// 校验和覆盖只看字段是否出现，而不是是否为 `null`。
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct UserPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// 通过校验的新用户数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
    pub phone: Option<String>,
}

/// 通过校验的部分更新，外层 `None` 表示不修改该字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<Option<i64>>,
    pub phone: Option<Option<String>>,
}

impl UserPayload {
    /// 解析 JSON 请求体
    ///
    /// 缺失的请求体、`null`、`{}` 和 `[]` 返回 `Ok(None)`，由调用方按 "No data provided" 处理。
    pub fn from_body(
        body: Result<Json<Value>, JsonRejection>,
    ) -> Result<Option<Self>, CoreError> {
        let value = match body {
            Ok(Json(value)) => value,
            Err(JsonRejection::MissingJsonContentType(_)) => return Ok(None),
            Err(rejection) => return Err(rejection.into()),
        };

        match value {
            Value::Null => Ok(None),
            Value::Object(ref map) if map.is_empty() => Ok(None),
            Value::Array(ref items) if items.is_empty() => Ok(None),
            Value::Object(_) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| CoreError::BadRequest(format!("Invalid JSON body: {e}"))),
            _ => Err(CoreError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }

    /// 创建校验：`name` 和 `email` 必填，`email` 必须包含 `@`
    pub fn into_new_user(self) -> Result<NewUser, CoreError> {
        let mut errors = Vec::new();
        let name = check_required("name", self.name, &mut errors);
        let email = check_email(self.email, &mut errors);

        match (name, email) {
            (Some(name), Some(email)) => Ok(NewUser {
                name,
                email,
                age: self.age.flatten(),
                phone: self.phone.flatten(),
            }),
            _ => Err(CoreError::ValidationFailed(errors)),
        }
    }

    /// 更新校验：只校验请求中出现的 `name`/`email`
    pub fn into_changes(self) -> Result<UserChanges, CoreError> {
        let mut errors = Vec::new();
        let name = self
            .name
            .map(|name| check_required("name", Some(name), &mut errors));
        let email = self.email.map(|email| check_email(Some(email), &mut errors));

        if !errors.is_empty() {
            return Err(CoreError::ValidationFailed(errors));
        }

        Ok(UserChanges {
            name: name.flatten(),
            email: email.flatten(),
            age: self.age,
            phone: self.phone,
        })
    }
}

fn check_required(
    field: &'static str,
    value: Option<Option<String>>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value.flatten() {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            errors.push(FieldError::required(field));
            None
        }
    }
}

fn check_email(value: Option<Option<String>>, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(email) = value.flatten() else {
        errors.push(FieldError::required("email"));
        return None;
    };

    let mut valid = true;
    if email.is_empty() {
        errors.push(FieldError::required("email"));
        valid = false;
    }
    if !email.contains('@') {
        errors.push(FieldError::new("email", "Invalid email format"));
        valid = false;
    }

    valid.then_some(email)
}
