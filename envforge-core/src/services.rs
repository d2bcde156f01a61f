//! Bundle of the external collaborators a workflow needs.

use crate::api::ServiceClient;
use crate::process::ProcessRunner;
use crate::terminal::Terminal;
use std::sync::Arc;

/// Shared handles to the service client, the terminal, and the process
/// runner. Operations hold clones of this bundle so a compiled queue owns
/// everything it needs to run.
#[derive(Clone)]
pub struct Services {
    pub client: Arc<dyn ServiceClient>,
    pub terminal: Arc<dyn Terminal>,
    pub runner: Arc<dyn ProcessRunner>,
}

impl Services {
    pub fn new(
        client: Arc<dyn ServiceClient>,
        terminal: Arc<dyn Terminal>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            client,
            terminal,
            runner,
        }
    }
}
