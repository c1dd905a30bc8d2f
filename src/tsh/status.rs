//! Structured view of `tsh status --proxy=...`

use serde::Serialize;

/// Identity of the active session on a proxy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProxyStatus {
    pub logged_in_as: String,
    pub roles: Vec<String>,
    pub logins: Vec<String>,
}

impl ProxyStatus {
    /// Coarse `Key: value` scan; unknown keys are ignored
    pub fn parse(status: &str) -> Self {
        let mut res = ProxyStatus::default();

        for line in status.lines() {
            let line = line.trim_start().trim_start_matches('>');
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key.trim() {
                "Logged in as" => res.logged_in_as = value.trim().to_string(),
                "Roles" => res.roles = split_list(value),
                "Logins" => res.logins = split_list(value),
                _ => {}
            }
        }

        res
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
