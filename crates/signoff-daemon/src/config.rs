//! Configuration for the signoff daemon.

use approval_types::{Department, Role, User, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Workflow engine configuration
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Live stream configuration
    #[serde(default)]
    pub stream: StreamConfig,

    /// Notification fan-out configuration
    #[serde(default)]
    pub fanout: FanoutConfig,

    /// User directory seed
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
        }
    }
}

/// Workflow engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// How far ahead of the due date the warning sweep fires, in hours
    #[serde(default = "default_due_soon_window")]
    pub due_soon_window_hours: i64,

    /// Due-date sweep interval in seconds
    #[serde(default = "default_sweep_interval")]
    pub due_sweep_interval_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            due_soon_window_hours: default_due_soon_window(),
            due_sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Live stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Per-connection event queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Per-connection duplicate suppression window, 0 disables
    #[serde(default = "default_dedup_window")]
    pub dedup_window: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            dedup_window: default_dedup_window(),
        }
    }
}

/// Notification fan-out configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FanoutConfig {
    /// Extra users notified when a department's report completes
    #[serde(default)]
    pub stakeholders: HashMap<Department, Vec<UserId>>,

    /// Log out-of-band sends instead of delivering them
    #[serde(default = "default_true")]
    pub log_channel_sends: bool,
}

/// User directory seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Users loaded into the in-memory directory at startup
    #[serde(default = "default_seed_users")]
    pub seed_users: Vec<SeedUser>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            seed_users: default_seed_users(),
        }
    }
}

/// One seeded directory record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    pub department: Department,
}

impl SeedUser {
    pub fn into_user(self) -> User {
        User::new(self.id, self.display_name, self.role, self.department)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    ([127, 0, 0, 1], 8090).into()
}

fn default_due_soon_window() -> i64 {
    24
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_queue_capacity() -> usize {
    256
}

fn default_dedup_window() -> usize {
    128
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_seed_users() -> Vec<SeedUser> {
    [
        ("alice", "Alice Nguyen", Role::GeneralStaff, Department::Sales),
        ("bob", "Bob Park", Role::GeneralStaff, Department::Engineering),
        ("carol", "Carol Diaz", Role::LineManager, Department::Sales),
        ("dan", "Dan Kovacs", Role::LineManager, Department::Engineering),
        ("erin", "Erin Sato", Role::Gm, Department::Operations),
    ]
    .into_iter()
    .map(|(id, display_name, role, department)| SeedUser {
        id: id.to_string(),
        display_name: display_name.to_string(),
        role,
        department,
    })
    .collect()
}

impl DaemonConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with SIGNOFF_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("SIGNOFF")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
