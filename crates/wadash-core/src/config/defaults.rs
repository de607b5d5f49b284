//! Default value functions used by serde for config deserialization.

pub fn default_data_dir() -> String {
    "~/.wadash".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_root_dir() -> String {
    ".".to_string()
}

pub fn default_cors_origin() -> String {
    "http://localhost:8080".to_string()
}

pub fn default_collection() -> String {
    "whatsappLogin".to_string()
}

pub fn default_service_account() -> String {
    "src/config/serviceAccount.json".to_string()
}

pub fn default_db_path() -> String {
    "~/.wadash/data/credentials.db".to_string()
}

pub fn default_device_name() -> String {
    "WADASH".to_string()
}
