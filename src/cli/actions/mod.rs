pub mod digest;
pub mod fingerprint;
pub mod forget;
pub mod unlock;

// Internal "interpreter" for `Action`.
// The match lives in its own module so `mod.rs` stays small as actions are added.
mod run;

#[derive(Debug)]
pub enum Action {
    Unlock(unlock::Args),
    Digest(digest::Args),
    Forget(forget::Args),
    Fingerprint(fingerprint::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
