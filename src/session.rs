//! Session layer: the vault engine plus the idle auto-lock policy.
//!
//! The engine itself knows nothing about time.  `Session` wraps it,
//! checks for inactivity before every call (locking first if the idle
//! timeout has passed) and restarts the countdown after every
//! successful call.  An optional `IdleWatchdog` thread locks the engine
//! as soon as the countdown runs out, even while the caller is blocked
//! waiting for operator input.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::errors::Result;
use crate::vault::{Credential, VaultEngine, VaultFile, VaultState};

/// Default idle timeout before the vault locks itself.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

type SharedEngine = Arc<Mutex<VaultEngine>>;

fn lock_engine(engine: &SharedEngine) -> MutexGuard<'_, VaultEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An engine with an idle timer.
pub struct Session {
    engine: SharedEngine,
    path: PathBuf,
    idle_timeout: Duration,
    last_activity: Instant,
    watchdog: Option<IdleWatchdog>,
}

impl Session {
    pub fn new(engine: VaultEngine, idle_timeout: Duration) -> Self {
        let path = engine.path().to_path_buf();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            path,
            idle_timeout,
            last_activity: Instant::now(),
            watchdog: None,
        }
    }

    /// Start a background watchdog.  When the session has been idle for
    /// the timeout it locks the engine and then runs `on_expire`.  The
    /// next successful call (usually `unlock`) arms it again.
    /// Replaces any previous watchdog.
    pub fn start_watchdog<F>(&mut self, on_expire: F)
    where
        F: Fn() + Send + 'static,
    {
        self.stop_watchdog();
        let engine = Arc::clone(&self.engine);
        self.watchdog = Some(IdleWatchdog::spawn(self.idle_timeout, move || {
            lock_engine(&engine).lock();
            info!("idle watchdog locked the vault");
            on_expire();
        }));
    }

    /// Stop the background watchdog, if any.
    pub fn stop_watchdog(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.cancel();
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Time left before the idle lock, or `None` while locked.
    pub fn remaining(&self) -> Option<Duration> {
        if lock_engine(&self.engine).is_locked() {
            return None;
        }
        Some(self.idle_timeout.saturating_sub(self.last_activity.elapsed()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ------------------------------------------------------------------
    // Engine operations, each behind the idle check
    // ------------------------------------------------------------------

    pub fn vault_exists(&mut self) -> bool {
        let mut engine = lock_engine(&self.engine);
        enforce_idle(&mut engine, self.last_activity, self.idle_timeout);
        engine.vault_exists()
    }

    pub fn state(&mut self) -> VaultState {
        let mut engine = lock_engine(&self.engine);
        enforce_idle(&mut engine, self.last_activity, self.idle_timeout);
        engine.state()
    }

    pub fn is_locked(&mut self) -> bool {
        self.state() == VaultState::Locked
    }

    pub fn create(&mut self, master_password: &str) -> Result<()> {
        self.run(|engine| engine.create(master_password))
    }

    pub fn unlock(&mut self, master_password: &str) -> Result<()> {
        self.run(|engine| engine.unlock(master_password))
    }

    pub fn lock(&mut self) {
        lock_engine(&self.engine).lock();
    }

    pub fn list_credentials(&mut self) -> Result<Vec<Credential>> {
        self.run(|engine| engine.list_credentials())
    }

    pub fn credential_count(&mut self) -> Result<usize> {
        self.run(|engine| engine.credential_count())
    }

    pub fn find_credential(&mut self, identifier: &str) -> Result<Credential> {
        self.run(|engine| engine.find_credential(identifier))
    }

    pub fn add_credential(&mut self, credential: Credential) -> Result<()> {
        self.run(|engine| engine.add_credential(credential))
    }

    pub fn remove_credential(&mut self, identifier: &str) -> Result<()> {
        self.run(|engine| engine.remove_credential(identifier))
    }

    pub fn check_current_password(&mut self, candidate: &str) -> Result<bool> {
        self.run(|engine| engine.check_current_password(candidate))
    }

    pub fn change_master_password(&mut self, new_password: &str) -> Result<()> {
        self.run(|engine| engine.change_master_password(new_password))
    }

    /// Copy the encrypted vault file into `dest_dir`.
    pub fn backup(&mut self, dest_dir: &Path) -> Result<PathBuf> {
        let file = VaultFile::new(self.path.clone());
        self.run(|_| file.backup(dest_dir))
    }

    // ------------------------------------------------------------------
    // Idle policy
    // ------------------------------------------------------------------

    fn run<T>(&mut self, op: impl FnOnce(&mut VaultEngine) -> Result<T>) -> Result<T> {
        let out = {
            let mut engine = lock_engine(&self.engine);
            enforce_idle(&mut engine, self.last_activity, self.idle_timeout);
            op(&mut engine)
        };
        if out.is_ok() {
            self.last_activity = Instant::now();
            if let Some(watchdog) = &self.watchdog {
                watchdog.reset();
            }
        }
        out
    }
}

/// Lock first if the session has been idle too long.
fn enforce_idle(engine: &mut VaultEngine, last_activity: Instant, idle_timeout: Duration) {
    if !engine.is_locked() && last_activity.elapsed() >= idle_timeout {
        info!(
            idle_secs = idle_timeout.as_secs(),
            "idle timeout reached, locking vault"
        );
        engine.lock();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_watchdog();
        self.lock();
    }
}

// ---------------------------------------------------------------------------
// Watchdog thread
// ---------------------------------------------------------------------------

enum Signal {
    Reset,
    Stop,
}

/// A cancellable countdown on its own thread.
///
/// Every `reset` restarts the countdown.  When it runs out `on_expire`
/// runs and the watchdog sleeps until the next `reset` arms it again.
pub struct IdleWatchdog {
    tx: Sender<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl IdleWatchdog {
    pub fn spawn<F>(timeout: Duration, on_expire: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || loop {
            match rx.recv_timeout(timeout) {
                Ok(Signal::Reset) => continue,
                Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => return,
                Err(RecvTimeoutError::Timeout) => {
                    debug!("idle watchdog fired");
                    on_expire();
                    // Disarmed until the next reset.
                    match rx.recv() {
                        Ok(Signal::Reset) => debug!("idle watchdog re-armed"),
                        Ok(Signal::Stop) | Err(_) => return,
                    }
                }
            }
        });

        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Restart the countdown.
    pub fn reset(&self) {
        let _ = self.tx.send(Signal::Reset);
    }

    /// Stop the countdown without firing.
    pub fn cancel(self) {}
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        let _ = self.tx.send(Signal::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Argon2Params;
    use crate::errors::PassVaultError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    const PASSWORD: &str = "Str0ng!Pass123";

    fn unlocked_session(timeout: Duration) -> (TempDir, Session) {
        let dir = TempDir::new().unwrap();
        let engine =
            VaultEngine::new(&dir.path().join("vault.json"), Argon2Params::minimum()).unwrap();
        let mut session = Session::new(engine, timeout);
        session.create(PASSWORD).unwrap();
        session.unlock(PASSWORD).unwrap();
        (dir, session)
    }

    #[test]
    fn idle_timeout_locks_before_next_call() {
        let (_dir, mut session) = unlocked_session(Duration::from_millis(50));
        assert!(session.list_credentials().is_ok());

        thread::sleep(Duration::from_millis(120));
        assert!(matches!(
            session.list_credentials(),
            Err(PassVaultError::VaultLocked)
        ));
        assert!(session.is_locked());
        assert_eq!(session.remaining(), None);

        session.unlock(PASSWORD).unwrap();
        assert!(session.list_credentials().is_ok());
    }

    #[test]
    fn activity_resets_the_timer() {
        let (_dir, mut session) = unlocked_session(Duration::from_millis(300));
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(100));
            assert!(session.credential_count().is_ok());
        }
        assert!(!session.is_locked());
    }

    #[test]
    fn watchdog_locks_engine_then_runs_callback() {
        let (_dir, mut session) = unlocked_session(Duration::from_millis(50));
        let engine = Arc::clone(&session.engine);
        let (tx, rx) = mpsc::channel();
        session.start_watchdog(move || {
            let _ = tx.send(());
        });

        rx.recv_timeout(Duration::from_secs(5))
            .expect("watchdog should fire");
        assert!(lock_engine(&engine).is_locked());
    }

    #[test]
    fn watchdog_rearms_after_unlock() {
        let (_dir, mut session) = unlocked_session(Duration::from_millis(50));
        let (tx, rx) = mpsc::channel();
        session.start_watchdog(move || {
            let _ = tx.send(());
        });

        rx.recv_timeout(Duration::from_secs(5))
            .expect("watchdog should fire");
        assert!(session.is_locked());

        session.unlock(PASSWORD).unwrap();
        rx.recv_timeout(Duration::from_secs(5))
            .expect("watchdog should fire again after unlock");
        assert!(session.is_locked());
    }

    #[test]
    fn watchdog_reset_postpones_expiry() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let watchdog = IdleWatchdog::spawn(Duration::from_millis(200), move || {
            flag.store(true, Ordering::SeqCst);
        });
        for _ in 0..6 {
            thread::sleep(Duration::from_millis(50));
            watchdog.reset();
        }
        assert!(!fired.load(Ordering::SeqCst));
        watchdog.cancel();
    }

    #[test]
    fn cancelled_watchdog_never_fires() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let watchdog = IdleWatchdog::spawn(Duration::from_millis(50), move || {
            flag.store(true, Ordering::SeqCst);
        });
        watchdog.cancel();
        thread::sleep(Duration::from_millis(120));
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn backup_goes_through_session() {
        let (dir, mut session) = unlocked_session(DEFAULT_IDLE_TIMEOUT);
        let dest = session.backup(&dir.path().join("backups")).unwrap();
        assert!(dest.exists());
    }
}
