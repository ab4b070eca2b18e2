use super::{LoggingConfig, StorageConfig, VehicleDefaults};

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: ".evtrack".to_string(),
            session_key: "ev_v2_session".to_string(),
            metadata_key: "ev_v2_meta".to_string(),
        }
    }
}

impl Default for VehicleDefaults {
    fn default() -> Self {
        Self {
            model: "Hyundai KONA EV".to_string(),
            reg: "191D37789".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/evtrack.log".to_string(),
            backup_count: 5,
            console_output: false,
            json_format: false,
        }
    }
}
