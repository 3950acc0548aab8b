use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::crypto;
use crate::models::AppData;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
}

const DATA_FILE: &str = "data.lunara";

/// Path of the encrypted data file inside the platform data dir.
fn data_file_path() -> Result<PathBuf, StorageError> {
    let dir = dirs::data_local_dir()
        .ok_or(StorageError::NoDataDir)?
        .join("lunara");
    fs::create_dir_all(&dir)?;
    Ok(dir.join(DATA_FILE))
}

/// Check if a data file exists (i.e., the app has been set up before).
pub fn data_exists() -> Result<bool, StorageError> {
    Ok(data_file_path()?.exists())
}

/// Save the snapshot encrypted with the given passphrase.
pub fn save(passphrase: &str, data: &AppData) -> Result<(), StorageError> {
    save_to(&data_file_path()?, passphrase, data)
}

pub fn save_to(path: &Path, passphrase: &str, data: &AppData) -> Result<(), StorageError> {
    let json = serde_json::to_vec(data)?;
    let encrypted = crypto::encrypt(passphrase, &json)?;
    fs::write(path, &encrypted)?;
    debug!("saved {} encrypted bytes to {}", encrypted.len(), path.display());
    Ok(())
}

/// Load and decrypt the snapshot with the given passphrase.
pub fn load(passphrase: &str) -> Result<AppData, StorageError> {
    load_from(&data_file_path()?, passphrase)
}

pub fn load_from(path: &Path, passphrase: &str) -> Result<AppData, StorageError> {
    let encrypted = fs::read(path)?;
    let decrypted = crypto::decrypt(passphrase, &encrypted)?;
    let data: AppData = serde_json::from_slice(&decrypted)?;
    debug!("loaded snapshot from {}", path.display());
    Ok(data)
}

/// Delete the data file permanently.
pub fn wipe() -> Result<(), StorageError> {
    let path = data_file_path()?;
    if path.exists() {
        fs::remove_file(&path)?;
        info!("wiped data file {}", path.display());
    }
    Ok(())
}
