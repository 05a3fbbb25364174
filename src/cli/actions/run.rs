use super::{digest, fingerprint, forget, unlock, Action};
use anyhow::Result;

pub(super) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Unlock(args) => unlock::execute(args).await,
        Action::Digest(args) => digest::execute(args).await,
        Action::Forget(args) => forget::execute(args),
        Action::Fingerprint(args) => fingerprint::execute(args).await,
    }
}
