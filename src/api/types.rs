use serde::{Deserialize, Serialize};

/// Database connection settings saved on the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: String::new(),
        }
    }
}

/// Generic `{success, message?/error?}` reply used by the config endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthReply {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TablesReply {
    #[serde(default)]
    pub tables: Vec<String>,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadReply {
    pub filename: String,
    pub path: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.user, "root");
        assert!(config.database.is_empty());
    }

    #[test]
    fn test_status_reply_tolerates_missing_fields() {
        let reply: StatusReply = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(reply.success);
        assert!(reply.message.is_none());
        assert!(reply.error.is_none());
    }

    #[test]
    fn test_tables_reply_with_error() {
        let reply: TablesReply =
            serde_json::from_str(r#"{"tables":[],"success":false,"error":"no config"}"#).unwrap();
        assert!(!reply.success);
        assert!(reply.tables.is_empty());
        assert_eq!(reply.error.as_deref(), Some("no config"));
    }
}
