//! Stand-ins for the terminal picker and config prompts

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tpot::tsh::HostDirectory;
use tpot::ui::{ConfigPrompt, HostPicker};
use tpot::ProxyConfig;

/// Answers picks from a queue and remembers what it was offered
#[derive(Clone, Default)]
pub struct ScriptedPicker {
    answers: Arc<Mutex<VecDeque<Option<String>>>>,
    offered: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedPicker {
    pub fn answering<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<&'static str>>,
    {
        let picker = Self::default();
        picker
            .answers
            .lock()
            .extend(answers.into_iter().map(|a| a.map(String::from)));
        picker
    }

    /// Hostnames shown on each pick, in order
    pub fn offered(&self) -> Vec<Vec<String>> {
        self.offered.lock().clone()
    }
}

impl HostPicker for ScriptedPicker {
    fn pick(&mut self, hosts: &HostDirectory) -> io::Result<Option<String>> {
        self.offered
            .lock()
            .push(hosts.hostnames().into_iter().map(String::from).collect());
        Ok(self.answers.lock().pop_front().flatten())
    }
}

/// Returns a fixed proxy config and records the defaults it was given
#[derive(Clone)]
pub struct ScriptedPrompt {
    answer: ProxyConfig,
    existing: Arc<Mutex<Option<ProxyConfig>>>,
}

impl ScriptedPrompt {
    pub fn new(answer: ProxyConfig) -> Self {
        Self {
            answer,
            existing: Arc::new(Mutex::new(None)),
        }
    }

    pub fn offered_defaults(&self) -> Option<ProxyConfig> {
        self.existing.lock().clone()
    }
}

impl ConfigPrompt for ScriptedPrompt {
    fn proxy_config(&mut self, _env: &str, existing: Option<&ProxyConfig>) -> io::Result<ProxyConfig> {
        *self.existing.lock() = existing.cloned();
        Ok(self.answer.clone())
    }
}
