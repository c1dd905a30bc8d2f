//! Terminal interaction: host picking and configuration prompts

use std::io;

pub mod picker;
pub mod prompt;

pub use picker::{FuzzyPicker, HostPicker};
pub use prompt::{ConfigPrompt, Prompter};

fn into_io_error(e: dialoguer::Error) -> io::Error {
    match e {
        dialoguer::Error::IO(e) => e,
    }
}
