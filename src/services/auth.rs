use crate::error::{ClientError, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";

/// 请求凭证来源
///
/// 每次发起请求时读取，由登录/登出流程负责写入。
pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String> {
        None
    }

    /// 保存刷新得到的访问令牌，`None` 表示丢弃当前令牌
    fn set_access_token(&self, _token: Option<&str>) {}

    /// 清除全部凭证
    fn clear(&self) {}

    fn has_credentials(&self) -> bool {
        self.access_token().is_some()
    }
}

/// 固定凭证，适用于测试和一次性脚本
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    access: Option<String>,
}

impl StaticCredentials {
    pub fn new(access: impl Into<String>) -> Self {
        Self {
            access: Some(access.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CredentialProvider for StaticCredentials {
    fn access_token(&self) -> Option<String> {
        self.access.clone()
    }
}

/// 持久化的令牌键值存储
///
/// 全进程共享一份，可选地写回 JSON 文件。
#[derive(Debug, Default)]
pub struct TokenStore {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<String, String>>,
}

impl TokenStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 从文件加载，文件不存在时视为空存储
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            HashMap::new()
        };

        debug!("Loaded {} token entries from {}", entries.len(), path.display());

        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        self.persist()
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        self.persist()
    }

    pub fn clear_all(&self) -> Result<()> {
        self.entries.write().clear();
        self.persist()
    }

    /// 登录成功后保存令牌对
    pub fn store_login(&self, access: &str, refresh: &str) -> Result<()> {
        {
            let mut entries = self.entries.write();
            entries.insert(ACCESS_TOKEN.to_string(), access.to_string());
            entries.insert(REFRESH_TOKEN.to_string(), refresh.to_string());
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot = serde_json::to_string_pretty(&*self.entries.read())?;
        std::fs::write(path, snapshot)?;
        Ok(())
    }
}

impl CredentialProvider for TokenStore {
    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN)
    }

    fn set_access_token(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => self.set(ACCESS_TOKEN, token),
            None => self.remove(ACCESS_TOKEN),
        };
        if let Err(e) = result {
            error!("Failed to persist access token: {}", e);
        }
    }

    fn clear(&self) {
        if let Err(e) = self.clear_all() {
            error!("Failed to clear token store: {}", e);
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// 从访问令牌中解析出的当前用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<i64>,
    pub username: String,
    pub role: String,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// 解码访问令牌中的用户信息
///
/// 只读取载荷用于展示，不校验签名和过期时间；鉴权由服务端负责。
pub fn decode_session(token: &str) -> Result<SessionUser> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    let claims = data.claims;

    let username = match (claims.username, claims.user_id) {
        (Some(name), _) => name,
        (None, Some(id)) => format!("user_{}", id),
        (None, None) => return Err(ClientError::unauthorized("Token carries no user identity")),
    };

    Ok(SessionUser {
        id: claims.user_id,
        username,
        role: claims.role.unwrap_or_else(|| "student".to_string()),
    })
}

/// 读取当前登录用户，令牌无效时将其丢弃
pub fn current_user(credentials: &dyn CredentialProvider) -> Option<SessionUser> {
    let token = credentials.access_token()?;

    match decode_session(&token) {
        Ok(user) => {
            info!("Session restored for {} ({})", user.username, user.role);
            Some(user)
        }
        Err(e) => {
            warn!("Discarding invalid access token: {}", e);
            credentials.set_access_token(None);
            None
        }
    }
}
