//! SSH host key persistence.
//!
//! The server identifies itself with one Ed25519 key for its whole lifetime.
//! The key is generated on first start and stored in OpenSSH format so that
//! returning clients keep seeing the same fingerprint across restarts.

use std::{
    fs::{DirBuilder, OpenOptions},
    io::Write,
    path::Path,
};

use rand_core::OsRng;
use russh::keys::{
    PrivateKey, load_secret_key,
    ssh_key::{Algorithm, LineEnding},
};

use crate::ServerError;

/// Load the host key at `path`, generating and saving one if it is missing.
///
/// A new key's parent directory is created owner-only (0700) and the key file
/// is written owner-read/write (0600).
///
/// # Errors
///
/// Returns [`ServerError::HostKey`] if an existing file is not a valid
/// unencrypted OpenSSH private key, or the new key cannot be written.
pub fn load_or_generate(path: &Path) -> Result<PrivateKey, ServerError> {
    if path.exists() {
        let key = load_secret_key(path, None).map_err(|e| {
            ServerError::HostKey(format!("failed to load {}: {e}", path.display()))
        })?;
        tracing::info!("Loaded host key from {}", path.display());
        return Ok(key);
    }

    let key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519)
        .map_err(|e| ServerError::HostKey(format!("failed to generate key: {e}")))?;
    let encoded = key
        .to_openssh(LineEnding::LF)
        .map_err(|e| ServerError::HostKey(format!("failed to encode key: {e}")))?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        create_private_dir(dir)?;
    }
    write_private_file(path, encoded.as_bytes())?;

    tracing::info!("Generated new host key at {}", path.display());
    Ok(key)
}

fn create_private_dir(dir: &Path) -> Result<(), ServerError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder
        .create(dir)
        .map_err(|e| ServerError::HostKey(format!("failed to create {}: {e}", dir.display())))
}

fn write_private_file(path: &Path, contents: &[u8]) -> Result<(), ServerError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
        .open(path)
        .and_then(|mut file| file.write_all(contents))
        .map_err(|e| ServerError::HostKey(format!("failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_then_reloads_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("host_ed25519");

        let generated = load_or_generate(&path).unwrap();
        assert_eq!(generated.algorithm(), Algorithm::Ed25519);
        assert!(path.exists());

        let loaded = load_or_generate(&path).unwrap();
        assert_eq!(loaded.public_key(), generated.public_key());
    }

    #[cfg(unix)]
    #[test]
    fn new_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let key_dir = dir.path().join(".ssh");
        let path = key_dir.join("host_ed25519");
        load_or_generate(&path).unwrap();

        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = std::fs::metadata(&key_dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        assert_eq!(dir_mode & 0o077, 0);
    }

    #[test]
    fn corrupt_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host_ed25519");
        std::fs::write(&path, "not a key").unwrap();

        assert!(matches!(load_or_generate(&path), Err(ServerError::HostKey(_))));
    }
}
