use crate::error::Result;
use crate::utils::{deserialize, serialize};
use crate::wallet::Wallet;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const WALLET_FILE: &str = "wallet.dat";

/// Address -> keypair map backed by a single file.
///
/// The file is read once in [`Wallets::load`] and rewritten in full after
/// every new wallet.
pub struct Wallets {
    wallets: HashMap<String, Wallet>,
    path: PathBuf,
}

impl Wallets {
    /// Load the wallet file at `path`. A missing file is an empty wallet set;
    /// a file that does not decode is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Wallets> {
        let path = path.as_ref().to_path_buf();
        let wallets = match fs::read(&path) {
            Ok(bytes) => deserialize::<HashMap<String, Wallet>>(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No wallet file at {}, starting empty", path.display());
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Wallets { wallets, path })
    }

    pub fn create_wallet(&mut self) -> Result<String> {
        let wallet = Wallet::new()?;
        let address = wallet.get_address();
        self.wallets.insert(address.clone(), wallet);
        self.save_to_file()?;
        info!("Created wallet {address}");
        Ok(address)
    }

    /// Addresses in lexical order
    pub fn get_addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.wallets.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    pub fn get_wallet(&self, address: &str) -> Option<&Wallet> {
        self.wallets.get(address)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    fn save_to_file(&self) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        let wallets_bytes = serialize(&self.wallets)?;
        writer.write_all(wallets_bytes.as_slice())?;
        writer.flush()?;
        Ok(())
    }
}
