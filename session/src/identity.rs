use async_trait::async_trait;
use corelib::UserId;

/// Resolves the user whose reservations are being cached.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> anyhow::Result<UserId>;
}

/// Identity fixed at construction, e.g. the id used to log in.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user: UserId,
}

impl StaticIdentity {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self { user: user.into() }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> anyhow::Result<UserId> {
        if self.user.is_empty() {
            anyhow::bail!("no user configured");
        }
        Ok(self.user.clone())
    }
}
