use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::fmt;

const CONFIG_FILE: &str = "firestore.toml";
const ENV_PREFIX: &str = "FIRESTORE_";

/// Credentials for a Firestore project.
///
/// An empty `api_key` falls back to Google application default credentials.
#[derive(Clone, Deserialize, PartialEq)]
pub struct DatabaseSetting {
    #[serde(default)]
    api_key: String,
    project_id: String,
}

impl DatabaseSetting {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        DatabaseSetting {
            api_key: api_key.into(),
            project_id: project_id.into(),
        }
    }

    /// Reads `./firestore.toml`, overridden by `FIRESTORE_API_KEY` and
    /// `FIRESTORE_PROJECT_ID`.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, figment::Error> {
        Figment::new().merge(Toml::string(content)).extract()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn auth_domain(&self) -> String {
        format!("{}.firebaseapp.com", self.project_id)
    }

    pub(crate) fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.project_id)
    }
}

impl fmt::Debug for DatabaseSetting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("DatabaseSetting")
            .field("api_key", &api_key)
            .field("project_id", &self.project_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::DatabaseSetting;

    #[test]
    fn test_derived_names() {
        let setting = DatabaseSetting::new("key", "malt03");
        assert_eq!("malt03.firebaseapp.com", setting.auth_domain());
        assert_eq!("projects/malt03/databases/(default)", setting.database_path());
    }

    #[test]
    fn test_from_toml_str() {
        let setting = DatabaseSetting::from_toml_str(
            r#"
            api_key = "AIza-test"
            project_id = "malt03"
            "#,
        )
        .unwrap();
        assert_eq!(DatabaseSetting::new("AIza-test", "malt03"), setting);

        let setting = DatabaseSetting::from_toml_str(r#"project_id = "malt03""#).unwrap();
        assert_eq!("", setting.api_key());

        assert!(DatabaseSetting::from_toml_str(r#"api_key = "AIza-test""#).is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let debug = format!("{:?}", DatabaseSetting::new("AIza-secret", "malt03"));
        assert!(!debug.contains("AIza-secret"));
        assert!(debug.contains("malt03"));
    }
}
