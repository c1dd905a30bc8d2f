//! Host picker

use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::FuzzySelect;

use crate::tsh::HostDirectory;
use crate::ui::into_io_error;

/// Chooses the host to connect to
pub trait HostPicker {
    /// `None` when the user cancels
    fn pick(&mut self, hosts: &HostDirectory) -> io::Result<Option<String>>;
}

/// Fuzzy-searchable list on the terminal
///
/// Typing filters on hostname and address; Esc or `q` cancels.
pub struct FuzzyPicker {
    theme: ColorfulTheme,
}

impl FuzzyPicker {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for FuzzyPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPicker for FuzzyPicker {
    fn pick(&mut self, hosts: &HostDirectory) -> io::Result<Option<String>> {
        if hosts.is_empty() {
            eprintln!("No hosts to pick from");
            return Ok(None);
        }

        let items = host_items(hosts);
        let picked = FuzzySelect::with_theme(&self.theme)
            .with_prompt("Host")
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(into_io_error)?;

        Ok(picked
            .and_then(|idx| hosts.entries().get(idx))
            .map(|entry| entry.hostname.clone()))
    }
}

/// One aligned `hostname  address` row per entry, in directory order
pub fn host_items(hosts: &HostDirectory) -> Vec<String> {
    let width = hosts.iter().map(|e| e.hostname.len()).max().unwrap_or(0);
    hosts
        .iter()
        .map(|entry| format!("{:<width$}  {}", entry.hostname, entry.address))
        .collect()
}
