pub fn default_api_url() -> String {
    "https://api.nickbell.dev".to_string()
}

pub fn default_site_url() -> String {
    "https://nickbell.dev".to_string()
}

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}
