use std::sync::Arc;

use tracing::debug;

use crate::{
    api::SoftwareApi,
    help::{HelpRegistry, RepoCommand},
    output::OutputHandle,
    SpaceResult,
};

/// Asks the user a yes/no question; `Ok(true)` means go ahead.
pub type ConfirmCallback = Box<dyn Fn(&str) -> SpaceResult<bool> + Send + Sync>;

/// Everything a command handler needs: the remote service, the session key
/// to pass to it, where to print, and the help callbacks.
pub struct Shell {
    api: Arc<dyn SoftwareApi>,
    session: String,
    help: HelpRegistry,
    out: OutputHandle,
    confirm: Option<ConfirmCallback>,
}

impl Shell {
    pub fn new(
        api: Arc<dyn SoftwareApi>,
        session: impl Into<String>,
        help: HelpRegistry,
        out: OutputHandle,
    ) -> Self {
        Self {
            api,
            session: session.into(),
            help,
            out,
            confirm: None,
        }
    }

    /// Sets how destructive commands ask for confirmation. Without one, they
    /// are declined.
    pub fn with_confirm<F>(mut self, confirm: F) -> Self
    where
        F: Fn(&str) -> SpaceResult<bool> + Send + Sync + 'static,
    {
        self.confirm = Some(Box::new(confirm));
        self
    }

    pub fn api(&self) -> &dyn SoftwareApi {
        self.api.as_ref()
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn print(&self, line: &str) {
        self.out.print(line);
    }

    pub fn help(&self, cmd: RepoCommand) {
        self.help.invoke(cmd);
    }

    pub fn confirm(&self, message: &str) -> SpaceResult<bool> {
        match &self.confirm {
            Some(confirm) => confirm(message),
            None => {
                debug!(message, "no confirmation available, declining");
                Ok(false)
            }
        }
    }
}
