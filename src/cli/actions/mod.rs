pub mod server;

// The match over variants lives in its own module; this file only declares
// the enum.
mod run;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
}

impl Action {
    /// Run the selected action to completion.
    /// # Errors
    /// Propagates whatever the action itself fails with.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
