//! The user-facing side of a run.
//!
//! A front-end only has to show one message or one finished animation at a time; the pipeline
//! talks to it through `Notifier` and never prints on its own.

use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
}

pub trait Notifier {
    fn notify(&self, notice: Notice);

    fn show_animation(&self, path: &Path);
}

/// Terminal front-end: status on stdout, problems on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(msg) | Notice::Success(msg) => println!("{msg}"),
            Notice::Warning(msg) => eprintln!("warning: {msg}"),
            Notice::Error(msg) => eprintln!("error: {msg}"),
        }
    }

    fn show_animation(&self, path: &Path) {
        println!("{}", path.display());
    }
}
