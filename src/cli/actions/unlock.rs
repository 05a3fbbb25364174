use crate::{
    cli::{
        commands::{gate, state},
        prompt::{self, TerminalForm},
    },
    fingerprint::{DeviceFingerprint, FingerprintProvider, StaticFingerprint},
    gate::{PasscodeGate, SilentOutcome},
    notify::TerminalNotifier,
    storage::Storage,
};
use anyhow::{anyhow, Context, Result};
use secrecy::ExposeSecret;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct Args {
    pub gate: gate::Options,
    pub state: state::Options,
    pub exec: Vec<String>,
}

/// Show the gate until it unlocks, then hand off to `exec` if one was given.
/// # Errors
/// Returns an error if the state directory, the terminal or the device
/// fingerprint is unavailable, or if the handed-off command fails.
pub async fn execute(args: Args) -> Result<()> {
    let storage: Arc<dyn Storage> = Arc::new(args.state.open_storage()?);

    match &args.state.fingerprint {
        Some(id) => {
            let provider = StaticFingerprint::new(id.expose_secret());
            run_gate(&args.gate, provider, storage).await?;
        }
        None => run_gate(&args.gate, DeviceFingerprint::default(), storage).await?,
    }

    hand_off(&args.exec).await
}

#[instrument(skip_all, fields(title = %options.title))]
async fn run_gate<P: FingerprintProvider>(
    options: &gate::Options,
    provider: P,
    storage: Arc<dyn Storage>,
) -> Result<()> {
    let unlocked = Arc::new(AtomicBool::new(false));
    let signal = Arc::clone(&unlocked);

    let gate = PasscodeGate::new(
        options.passcodes.clone(),
        provider,
        storage,
        Arc::new(TerminalNotifier),
        move || {
            signal.store(true, Ordering::SeqCst);
            info!("gate unlocked");
        },
    )
    .with_title(options.title.clone())
    .with_logo(options.logo.clone())
    .with_redirect_delay(options.redirect_delay);

    eprint!("{}", prompt::header(gate.logo(), gate.title()));

    if gate.silent_login().await == SilentOutcome::Restored {
        return Ok(());
    }

    let mut form = TerminalForm::default();
    while !unlocked.load(Ordering::SeqCst) {
        let state = form.read().await?;
        let outcome = gate.submit(&state).await?;
        debug!(?outcome, "passcode submitted");
    }

    Ok(())
}

async fn hand_off(exec: &[String]) -> Result<()> {
    let Some((program, rest)) = exec.split_first() else {
        return Ok(());
    };

    info!(program, "handing off");

    let status = tokio::process::Command::new(program)
        .args(rest)
        .status()
        .await
        .with_context(|| format!("failed to run {program}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("{program} exited with {status}"))
    }
}
