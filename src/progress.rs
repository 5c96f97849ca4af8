/// Spinner shown on stderr while a fetch is in flight.
///
/// Only animates when stderr is a terminal; otherwise nothing is drawn and the
/// fetch is reported through logging alone.
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

pub struct FetchProgress {
    spinner: Option<ProgressBar>,
}

impl FetchProgress {
    pub fn start(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::debug!("{}", message);

        if !std::io::stderr().is_terminal() {
            return Self { spinner: None };
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self {
            spinner: Some(spinner),
        }
    }

    /// Clear the spinner line.
    pub fn finish(self) {
        if let Some(spinner) = self.spinner {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_only_on_terminal() {
        let progress = FetchProgress::start("Fetching");
        assert_eq!(progress.spinner.is_some(), std::io::stderr().is_terminal());
        progress.finish();
    }
}
