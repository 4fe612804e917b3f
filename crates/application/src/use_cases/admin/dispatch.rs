use crate::ports::AdminTriggers;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Flush,
    DumpStats,
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminCommand::Flush => f.write_str("flush"),
            AdminCommand::DumpStats => f.write_str("dump_stats"),
        }
    }
}

pub struct AdminDispatcher {
    triggers: Arc<dyn AdminTriggers>,
}

impl AdminDispatcher {
    pub fn new(triggers: Arc<dyn AdminTriggers>) -> Self {
        Self { triggers }
    }

    pub fn execute(&self, command: AdminCommand) {
        debug!(command = %command, "Running admin command");
        match command {
            AdminCommand::Flush => self.triggers.flush(),
            AdminCommand::DumpStats => self.triggers.dump_stats(),
        }
    }

    /// Consumes commands until every sender is dropped. Each command runs in
    /// its own task so a slow one never holds back the next.
    pub fn start(self: Arc<Self>, mut commands: mpsc::Receiver<AdminCommand>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(command) = commands.recv().await {
                let dispatcher = Arc::clone(&self);
                tokio::spawn(async move {
                    dispatcher.execute(command);
                });
            }
            info!("Admin command channel closed");
        })
    }
}
