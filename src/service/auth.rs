use super::firestore::Error;
use crate::{config::DatabaseSetting, util::init_once::InitOnce};
use gcp_auth::AuthenticationManager;
use tracing::debug;

pub(crate) enum Credentials {
    ApiKey(String),
    ApplicationDefault(InitOnce<AuthenticationManager>),
}

impl Credentials {
    pub(crate) fn from_setting(setting: &DatabaseSetting) -> Self {
        if setting.api_key().is_empty() {
            Credentials::ApplicationDefault(InitOnce::new())
        } else {
            Credentials::ApiKey(setting.api_key().to_string())
        }
    }

    /// The metadata entry that authenticates a request.
    pub(crate) async fn header(&self, scope: &str) -> Result<(&'static str, String), Error> {
        match self {
            Credentials::ApiKey(api_key) => Ok(("x-goog-api-key", api_key.clone())),
            Credentials::ApplicationDefault(manager) => {
                let manager = manager
                    .get_or_try_init(|| async {
                        debug!("initializing application default credentials");
                        gcp_auth::init().await
                    })
                    .await?;
                let token = manager.get_token(&[scope]).await?;
                Ok(("authorization", format!("Bearer {}", token.as_str())))
            }
        }
    }
}
