//! Interactive proxy configuration (`tpot <env> -c`)

use std::io;
use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use url::Url;

use crate::config::ProxyConfig;
use crate::ui::into_io_error;

/// Collects the `[proxies.<env>]` section from the user
pub trait ConfigPrompt {
    /// `existing` values are offered as defaults
    fn proxy_config(&mut self, env: &str, existing: Option<&ProxyConfig>) -> io::Result<ProxyConfig>;
}

/// Terminal prompts
pub struct Prompter {
    theme: ColorfulTheme,
}

impl Prompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Free-text answer; empty input keeps `default`, or yields `None`
    fn optional(&self, prompt: &str, default: Option<&str>) -> io::Result<Option<String>> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(d) = default.filter(|d| !d.is_empty()) {
            input = input.default(d.to_string());
        }
        let answer = input.interact_text().map_err(into_io_error)?;
        Ok(non_blank(answer))
    }

    fn required(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .validate_with(|answer: &String| -> Result<(), String> {
                if answer.trim().is_empty() {
                    Err("A value is required".to_string())
                } else {
                    Ok(())
                }
            });
        if let Some(d) = default.filter(|d| !d.is_empty()) {
            input = input.default(d.to_string());
        }
        Ok(input.interact_text().map_err(into_io_error)?.trim().to_string())
    }

    fn address(&self, default: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt("Proxy address (e.g. https://teleport.example.com:3080)")
            .validate_with(|answer: &String| validate_address(answer.trim()));
        if let Some(d) = default.filter(|d| !d.is_empty()) {
            input = input.default(d.to_string());
        }
        Ok(input.interact_text().map_err(into_io_error)?.trim().to_string())
    }
}

impl Default for Prompter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPrompt for Prompter {
    fn proxy_config(&mut self, env: &str, existing: Option<&ProxyConfig>) -> io::Result<ProxyConfig> {
        eprintln!("Configure proxy for {env}");
        let current = existing.cloned().unwrap_or_default();

        let address = self.address(Some(current.address.as_str()))?;
        let auth_connector = self.optional(
            "Auth connector (empty for local user)",
            current.auth_connector.as_deref(),
        )?;
        let user_name = if auth_connector.is_some() {
            self.optional("User name (optional)", current.user_name.as_deref())?
        } else {
            Some(self.required("User name", current.user_name.as_deref())?)
        };
        let tsh_path = self
            .optional(
                "tsh path (empty to use tsh from PATH)",
                current.tsh_path.as_deref().and_then(|p| p.to_str()),
            )?
            .map(PathBuf::from);
        let login = self.optional(
            "Remote login (empty to use the user name)",
            current.login.as_deref(),
        )?;

        Ok(ProxyConfig {
            address,
            user_name,
            auth_connector,
            tsh_path,
            login,
        })
    }
}

fn non_blank(answer: String) -> Option<String> {
    let trimmed = answer.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Proxy addresses must be absolute URLs with a host
pub fn validate_address(address: &str) -> Result<(), String> {
    let url = Url::parse(address).map_err(|e| format!("Not a URL: {e}"))?;
    if url.host_str().is_none() {
        return Err("The address needs a host".to_string());
    }
    Ok(())
}
