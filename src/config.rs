use serde::Deserialize;

/// an error used when deserializing a [`Config`] from environment variables
pub use envy::Error as EnvError;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE_NAME: &str = "vendor_backend";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
/// Argon2 iterations, same as the argon2 crate's own default.
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;
pub const DEFAULT_PROPERTY_CONFIG_PATH: &str = "config/tableData.yaml";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Service settings, one environment variable per field (`MONGODB_URI`,
/// `HASH_ITERATIONS`, ...). Every variable is optional.
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_database_name")]
    pub database_name: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    #[serde(default = "default_property_config_path")]
    pub property_config_path: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    /// Sender of support mails, e.g. `"Support" <support@example.com>`.
    pub support_from: Option<String>,
    /// The helpdesk address support mails are delivered to.
    pub support_to: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Config, EnvError> {
        envy::from_env()
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            mongodb_uri: default_mongodb_uri(),
            database_name: default_database_name(),
            bind_address: default_bind_address(),
            hash_iterations: default_hash_iterations(),
            property_config_path: default_property_config_path(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_pass: None,
            support_from: None,
            support_to: None,
        }
    }
}

// the uri may carry credentials
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_name", &self.database_name)
            .field("bind_address", &self.bind_address)
            .field("hash_iterations", &self.hash_iterations)
            .field("property_config_path", &self.property_config_path)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("support_from", &self.support_from)
            .field("support_to", &self.support_to)
            .finish_non_exhaustive()
    }
}

fn default_mongodb_uri() -> String {
    DEFAULT_MONGODB_URI.to_string()
}

fn default_database_name() -> String {
    DEFAULT_DATABASE_NAME.to_string()
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_hash_iterations() -> u32 {
    DEFAULT_HASH_ITERATIONS
}

fn default_property_config_path() -> String {
    DEFAULT_PROPERTY_CONFIG_PATH.to_string()
}

fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}
