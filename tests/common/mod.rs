//! Shared utilities for integration tests.

use std::path::PathBuf;

/// Provisioning file used by most tests.
pub const PROVISIONING: &str = r#"
[observability]
log_level = "debug"

[contracts]
policy = "warn"

[[contexts]]
service_type = "default"
log_tag = "DCT"
enabled = true

[[contexts]]
service_type = "mms"
log_tag = "DCT-MMS"

[[candidates]]
id = 1
carrier = "Example"
apn = "internet"
service_types = ["default", "supl"]

[[candidates]]
id = 2
carrier = "Example"
apn = "internet.backup"
service_types = ["default"]
protocol = "ipv4v6"

[[candidates]]
id = 3
carrier = "Example"
apn = "mms"
service_types = ["mms"]
mmsc = "http://mms.example.net"
proxy = "10.0.0.1"
port = 8080
"#;

/// Write `content` to a unique file under the temp dir.
pub fn write_temp_config(content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("ctxctl-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, content).unwrap();
    path
}
