use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serializes tests that mutate process-wide environment variables.
pub fn env_lock() -> MutexGuard<'static, ()> {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sets an env var for the lifetime of the guard.
pub struct EnvVarGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvVarGuard {
    pub fn set(key: &'static str, value: impl AsRef<Path>) -> Self {
        let original = env::var(key).ok();
        env::set_var(key, value.as_ref());
        Self { key, original }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(value) => env::set_var(self.key, value),
            None => env::remove_var(self.key),
        }
    }
}

/// Write an executable shell script standing in for the editor binary.
#[cfg(unix)]
pub fn fake_editor(dir: &Path, body: &str) -> PathBuf {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-nvim");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake editor");
    let mut perms = fs::metadata(&path).expect("stat fake editor").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod fake editor");
    path
}
