use anyhow::{anyhow, Result};
use passgate::{
    fingerprint::{Fingerprint, FingerprintAgent, FingerprintProvider, StaticFingerprint},
    gate::{clear_credential, Notice, STORAGE_KEY},
    notify::{MemoryNotifier, RecordedNotice},
    storage::{FileStorage, MemoryStorage, Storage},
    AllowList, FormState, PasscodeGate, SilentOutcome, SubmitOutcome,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

const PASSCODE: &str = "abc";
const PASSCODE_DIGEST: &str = "900150983cd24fb0d6963f7d28e17f72";
const OTHER_DIGEST: &str = "e80b5017098950fc58aad83c8c14978e";

struct Harness<S> {
    storage: Arc<S>,
    notifier: Arc<MemoryNotifier>,
    fired: Arc<AtomicUsize>,
}

impl<S: Storage + 'static> Harness<S> {
    fn with_storage(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
            notifier: Arc::new(MemoryNotifier::new()),
            fired: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn gate<P: FingerprintProvider>(&self, provider: P) -> PasscodeGate<P> {
        let fired = Arc::clone(&self.fired);
        PasscodeGate::new(
            AllowList::new([PASSCODE_DIGEST, OTHER_DIGEST]),
            provider,
            self.storage.clone(),
            self.notifier.clone(),
            move || {
                fired.fetch_add(1, Ordering::SeqCst);
            },
        )
        .with_title("Staff area")
        .with_redirect_delay(Duration::ZERO)
    }

    fn fired(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

fn memory() -> Harness<MemoryStorage> {
    Harness::with_storage(MemoryStorage::new())
}

fn device(id: &str) -> StaticFingerprint {
    StaticFingerprint::new(id)
}

struct BrokenFingerprint;

impl FingerprintAgent for BrokenFingerprint {
    async fn get(&self) -> Result<Fingerprint> {
        Err(anyhow!("fingerprint library unavailable"))
    }
}

impl FingerprintProvider for BrokenFingerprint {
    type Agent = Self;

    async fn load(&self) -> Result<Self::Agent> {
        Ok(Self)
    }
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn empty_passcode_is_rejected() {
    let harness = memory();
    let gate = harness.gate(device("visitor-1"));

    let outcome = gate.submit(&FormState::new("", true)).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Empty);
    assert_eq!(harness.fired(), 0);
    assert_eq!(
        harness.notifier.notices(),
        vec![RecordedNotice {
            message: Notice::PasscodeEmpty.to_string(),
            is_error: true,
        }]
    );
    assert_eq!(harness.storage.durable(STORAGE_KEY), None);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn wrong_passcode_is_rejected() {
    let harness = memory();
    let gate = harness.gate(device("visitor-1"));

    let outcome = gate.submit(&FormState::new("abd", true)).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Incorrect);
    assert!(!gate.is_unlocked());
    assert_eq!(harness.fired(), 0);
    assert_eq!(
        harness.notifier.errors(),
        vec![Notice::PasscodeIncorrect.to_string()]
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn correct_passcode_unlocks_without_remembering() {
    let harness = memory();
    let gate = harness.gate(device("visitor-1"));

    let outcome = gate.submit(&FormState::new(PASSCODE, false)).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Unlocked { remembered: false });
    assert_eq!(harness.fired(), 1);
    assert_eq!(harness.storage.get(STORAGE_KEY, "").unwrap(), "");
    assert!(harness.notifier.errors().is_empty());
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn unchecked_remember_leaves_existing_credential() {
    let harness = memory();
    harness
        .gate(device("visitor-1"))
        .submit(&FormState::new(PASSCODE, true))
        .await
        .unwrap();
    let remembered = harness.storage.durable(STORAGE_KEY).unwrap();

    harness
        .gate(device("visitor-1"))
        .submit(&FormState::new(PASSCODE, false))
        .await
        .unwrap();

    assert_eq!(harness.storage.durable(STORAGE_KEY), Some(remembered));
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn remembered_login_survives_restart() {
    let harness = memory();
    let outcome = harness
        .gate(device("visitor-1"))
        .submit(&FormState::new(PASSCODE, true))
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Unlocked { remembered: true });

    let stored = harness.storage.durable(STORAGE_KEY).unwrap();
    assert!(stored.starts_with("U2FsdGVkX1"));
    assert!(!stored.contains(PASSCODE_DIGEST));

    harness.storage.end_session();

    let gate = harness.gate(device("visitor-1"));
    assert_eq!(gate.silent_login().await, SilentOutcome::Restored);
    assert!(gate.is_unlocked());
    assert_eq!(harness.fired(), 2);
    assert!(harness
        .notifier
        .notices()
        .iter()
        .any(|notice| notice.message == Notice::AutoLoginSucceeded.message()));
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn silent_login_with_nothing_stored() {
    let harness = memory();
    let gate = harness.gate(device("visitor-1"));

    assert_eq!(gate.silent_login().await, SilentOutcome::Cleared);
    assert_eq!(harness.fired(), 0);
    assert!(harness.notifier.notices().is_empty());
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn credential_from_another_device_is_cleared() {
    let harness = memory();
    harness
        .gate(device("visitor-1"))
        .submit(&FormState::new(PASSCODE, true))
        .await
        .unwrap();

    let gate = harness.gate(device("visitor-2"));
    assert_eq!(gate.silent_login().await, SilentOutcome::Cleared);
    assert!(!gate.is_unlocked());
    assert_eq!(harness.fired(), 1);

    // cleared for real: neither tier holds the credential any more
    assert_eq!(harness.storage.durable(STORAGE_KEY), None);
    harness.storage.end_session();
    assert_eq!(
        harness.gate(device("visitor-1")).silent_login().await,
        SilentOutcome::Cleared
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn corrupt_credential_is_cleared() {
    let harness = memory();
    harness
        .storage
        .set(STORAGE_KEY, "not an encrypted credential", true)
        .unwrap();

    let gate = harness.gate(device("visitor-1"));
    assert_eq!(gate.silent_login().await, SilentOutcome::Cleared);
    assert_eq!(harness.fired(), 0);
    assert_eq!(harness.storage.get(STORAGE_KEY, "missing").unwrap(), "");
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn passcode_removed_from_allow_list_is_not_restored() {
    let harness = memory();
    harness
        .gate(device("visitor-1"))
        .submit(&FormState::new(PASSCODE, true))
        .await
        .unwrap();

    let gate = PasscodeGate::new(
        AllowList::new([OTHER_DIGEST]),
        device("visitor-1"),
        harness.storage.clone(),
        harness.notifier.clone(),
        || {},
    )
    .with_redirect_delay(Duration::ZERO);

    assert_eq!(gate.silent_login().await, SilentOutcome::Cleared);
    assert!(!gate.is_unlocked());
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn broken_fingerprint_fails_remembering_but_not_silent_login() {
    let harness = memory();
    let gate = harness.gate(BrokenFingerprint);

    assert!(gate.submit(&FormState::new(PASSCODE, true)).await.is_err());
    assert_eq!(harness.fired(), 0);

    // without remember the fingerprint is never needed
    let outcome = gate.submit(&FormState::new(PASSCODE, false)).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Unlocked { remembered: false });

    harness
        .storage
        .set(STORAGE_KEY, "U2FsdGVkX1+AAAAAAAAAAA==", true)
        .unwrap();
    let gate = harness.gate(BrokenFingerprint);
    assert_eq!(gate.silent_login().await, SilentOutcome::Cleared);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn clear_credential_forgets_remembered_login() {
    let harness = memory();
    harness
        .gate(device("visitor-1"))
        .submit(&FormState::new(PASSCODE, true))
        .await
        .unwrap();

    clear_credential(harness.storage.as_ref(), STORAGE_KEY).unwrap();
    harness.storage.end_session();

    assert_eq!(
        harness.gate(device("visitor-1")).silent_login().await,
        SilentOutcome::Cleared
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn file_storage_remembers_across_processes() {
    let dir = tempfile::tempdir().unwrap();

    let first = Harness::with_storage(FileStorage::open(dir.path()).unwrap());
    first
        .gate(device("visitor-1"))
        .submit(&FormState::new(PASSCODE, true))
        .await
        .unwrap();
    assert!(first.storage.path().exists());

    let second = Harness::with_storage(FileStorage::open(dir.path()).unwrap());
    let gate = second.gate(device("visitor-1"));
    assert_eq!(gate.silent_login().await, SilentOutcome::Restored);
    assert_eq!(second.fired(), 1);

    let third = Harness::with_storage(FileStorage::open(dir.path()).unwrap());
    assert_eq!(
        third.gate(device("visitor-2")).silent_login().await,
        SilentOutcome::Cleared
    );

    let fourth = Harness::with_storage(FileStorage::open(dir.path()).unwrap());
    assert_eq!(
        fourth.gate(device("visitor-1")).silent_login().await,
        SilentOutcome::Cleared
    );
}
