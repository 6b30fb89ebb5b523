//! Directory gate: one file per entry
//!
//! Every gate is bound to a directory and a cache name. Files are named by
//! [`format::cache_filename`] and only files matching this gate's extension,
//! name hash and format version are ever read, listed or removed, so several
//! caches can share one directory.

use std::env;
use std::fs::{self, File, ReadDir};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::{self, FORMAT_VERSION};
use crate::gate::{Bundle, GateBundle, StorageGate};
use crate::lexical::Lexical;
use crate::log::{Logger, TracingLogger};

/// Log category used by every directory gate
pub const LOG_CATEGORY: &str = "gatestore::directory";

/// Default file extension
pub const DEFAULT_EXTENSION: &str = ".cache";

/// Length of generated temporary directory names
const TEMP_DIR_NAME_LEN: usize = 32;

/// Attempts before giving up on finding a free temporary directory name
const TEMP_DIR_ATTEMPTS: usize = 16;

/// Directory gate settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateOptions {
    /// Extension appended to every file name, including the dot
    pub extension: String,
    /// Base64-encode the options segment
    pub encode_options: bool,
    /// Use a hash of the serialized key as the file name
    pub hash_keys: bool,
    /// Accepted but not implemented; values are stored as plain text
    pub encrypt_values: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            encode_options: true,
            hash_keys: true,
            encrypt_values: false,
        }
    }
}

impl GateOptions {
    /// Set the file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Enable or disable base64 for the options segment
    pub fn with_encode_options(mut self, encode: bool) -> Self {
        self.encode_options = encode;
        self
    }

    /// Enable or disable key hashing for file names
    pub fn with_hash_keys(mut self, hash: bool) -> Self {
        self.hash_keys = hash;
        self
    }

    /// Set the (currently ignored) encryption flag
    pub fn with_encrypt_values(mut self, encrypt: bool) -> Self {
        self.encrypt_values = encrypt;
        self
    }
}

/// Everything needed to open a [`DirectoryGate`]
#[derive(Clone)]
pub struct DirectoryGateConfig {
    /// Target directory; a fresh temporary directory when `None`
    pub directory: Option<PathBuf>,
    /// Logical cache name, hashed into every file name
    pub name: String,
    /// File layout settings
    pub options: GateOptions,
    /// Log sink; [`TracingLogger`] when `None`
    pub logger: Option<Arc<dyn Logger>>,
}

impl DirectoryGateConfig {
    /// Config for cache `name` in a temporary directory
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            directory: None,
            name: name.into(),
            options: GateOptions::default(),
            logger: None,
        }
    }

    /// Store entries in `directory`, creating it if needed
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Replace the file layout settings
    pub fn with_options(mut self, options: GateOptions) -> Self {
        self.options = options;
        self
    }

    /// Report failures to `logger`
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

/// Storage gate keeping each bundle in its own file
pub struct DirectoryGate<K, V, O = u64> {
    dir: PathBuf,
    name: String,
    namespace: String,
    options: GateOptions,
    logger: Arc<dyn Logger>,
    ephemeral: bool,
    _marker: PhantomData<fn() -> (K, V, O)>,
}

impl<K, V, O> DirectoryGate<K, V, O> {
    /// Open a gate described by `config`
    ///
    /// # Returns
    /// * `Result<DirectoryGate>` - fails only if the directory cannot be created
    pub fn open(config: DirectoryGateConfig) -> Result<Self> {
        let logger = config
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger) as Arc<dyn Logger>);

        let (dir, ephemeral) = match config.directory {
            Some(dir) => {
                fs::create_dir_all(&dir)?;
                (dir, false)
            }
            None => (create_temp_dir(&env::temp_dir())?, true),
        };

        logger.info(
            LOG_CATEGORY,
            &format!("cache {:?} stored in {}", config.name, dir.display()),
        );

        Ok(Self {
            namespace: format::hash_text(&config.name),
            dir,
            name: config.name,
            options: config.options,
            logger,
            ephemeral,
            _marker: PhantomData,
        })
    }

    /// Open cache `name` in a new temporary directory, removed on drop
    pub fn temporary(name: impl Into<String>) -> Result<Self> {
        Self::open(DirectoryGateConfig::new(name))
    }

    /// Directory holding the entries
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Logical cache name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File layout settings
    pub fn options(&self) -> &GateOptions {
        &self.options
    }

    /// True when the directory was created by this gate and dies with it
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    fn is_ours(&self, file_name: &str) -> bool {
        format::is_cache_filename(
            file_name,
            &self.namespace,
            FORMAT_VERSION,
            &self.options.extension,
        )
    }

    fn file_part(&self, serialized_key: &str) -> Result<String> {
        if serialized_key.contains('\n') {
            return Err(Error::InvalidKey(format!(
                "{:?} contains a newline",
                serialized_key
            )));
        }
        if self.options.hash_keys {
            return Ok(format::hash_text(serialized_key));
        }
        if serialized_key.is_empty() || serialized_key.contains(&['/', '\\', '\0'][..]) {
            return Err(Error::InvalidKey(format!(
                "{:?} cannot be used as a file name",
                serialized_key
            )));
        }
        Ok(serialized_key.to_string())
    }

    /// Files in the directory that belong to this gate
    fn owned_files(&self) -> Vec<PathBuf> {
        let Some(entries) = self.read_dir() else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| self.owned_path(entry))
            .collect()
    }

    fn read_dir(&self) -> Option<ReadDir> {
        match fs::read_dir(&self.dir) {
            Ok(entries) => Some(entries),
            Err(e) => {
                self.logger.error(
                    LOG_CATEGORY,
                    &format!("cannot list {}", self.dir.display()),
                    Some(&e),
                );
                None
            }
        }
    }

    fn owned_path(&self, entry: io::Result<fs::DirEntry>) -> Option<PathBuf> {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                self.logger.error(
                    LOG_CATEGORY,
                    &format!("cannot read an entry of {}", self.dir.display()),
                    Some(&e),
                );
                return None;
            }
        };
        let name = entry.file_name();
        let path = entry.path();
        let owned = name.to_str().is_some_and(|n| self.is_ours(n)) && is_entry_file(&path);
        owned.then_some(path)
    }

    fn remove_file(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                self.logger.error(
                    LOG_CATEGORY,
                    &format!("cannot remove {}", path.display()),
                    Some(&e),
                );
                false
            }
        }
    }

    fn write_file(&self, path: &Path, body: &str) {
        let mut file = match File::create(path) {
            Ok(file) => file,
            Err(e) => {
                self.logger.error(
                    LOG_CATEGORY,
                    &format!("cannot open {} for writing", path.display()),
                    Some(&e),
                );
                return;
            }
        };
        if let Err(e) = file.write_all(body.as_bytes()) {
            self.logger.error(
                LOG_CATEGORY,
                &format!("write to {} failed, entry may be truncated", path.display()),
                Some(&e),
            );
        }
    }

    // Encryption is not implemented; both directions pass text through.
    fn seal_value(&self, text: String) -> String {
        text
    }

    fn unseal_value<'a>(&self, text: &'a str) -> &'a str {
        text
    }
}

impl<K, V, O> DirectoryGate<K, V, O>
where
    K: Lexical,
    V: Lexical,
    O: Lexical,
{
    /// Path and serialized key for `key`, or `None` (logged) if unstorable
    fn locate(&self, key: &K) -> Option<(PathBuf, String)> {
        let serialized = key.to_lexical();
        match self.file_part(&serialized) {
            Ok(part) => {
                let file_name = format::cache_filename(
                    &self.namespace,
                    &part,
                    FORMAT_VERSION,
                    &self.options.extension,
                );
                Some((self.dir.join(file_name), serialized))
            }
            Err(e) => {
                self.logger.error(LOG_CATEGORY, &e.to_string(), None);
                None
            }
        }
    }

    fn decode(&self, body: &str) -> Result<(String, Bundle<K, V, O>)> {
        let raw = format::parse_entry(body)?;
        let options = format::decode_options(raw.options, self.options.encode_options)?;
        let bundle = Bundle::new(
            K::from_lexical(raw.key)?,
            V::from_lexical(self.unseal_value(raw.value))?,
            O::from_lexical(&options)?,
        );
        Ok((raw.key.to_string(), bundle))
    }

    /// Read and decode one file; `expected_key` guards against hash collisions
    fn read_entry(&self, path: &Path, expected_key: Option<&str>) -> Option<Bundle<K, V, O>> {
        let body = match fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                self.logger.error(
                    LOG_CATEGORY,
                    &format!("cannot read {}", path.display()),
                    Some(&e),
                );
                return None;
            }
        };

        match self.decode(&body) {
            Ok((stored_key, bundle)) => match expected_key {
                Some(expected) if expected != stored_key => {
                    self.logger.warning(
                        LOG_CATEGORY,
                        &format!("{} holds a different key", path.display()),
                        None,
                    );
                    None
                }
                _ => Some(bundle),
            },
            Err(e) => {
                self.logger.error(
                    LOG_CATEGORY,
                    &format!("corrupt entry {}: {}", path.display(), e),
                    None,
                );
                None
            }
        }
    }
}

impl<K, V, O> StorageGate for DirectoryGate<K, V, O>
where
    K: Lexical + Clone,
    V: Lexical + Default,
    O: Lexical + Clone,
{
    type Key = K;
    type Value = V;
    type Options = O;
    type Iter<'a>
        = DirectoryIter<'a, K, V, O>
    where
        Self: 'a;

    fn has_or_get(&mut self, key: &K) -> Option<GateBundle<Self>> {
        let (path, serialized) = self.locate(key)?;
        if !is_entry_file(&path) {
            return None;
        }
        self.read_entry(&path, Some(&serialized))
    }

    fn set(&mut self, key: K, value: V, options: O) {
        let Some((path, serialized)) = self.locate(&key) else {
            return;
        };

        let options = options.to_lexical();
        if !self.options.encode_options && options.contains('\n') {
            self.logger.error(
                LOG_CATEGORY,
                &format!(
                    "options for {:?} contain a newline and encoding is off",
                    serialized
                ),
                None,
            );
            return;
        }

        let body = format::encode_entry(
            &serialized,
            &format::encode_options(&options, self.options.encode_options),
            &self.seal_value(value.to_lexical()),
        );
        self.write_file(&path, &body);
    }

    fn set_options(&mut self, key: &K, options: O) {
        let encrypt = std::mem::replace(&mut self.options.encrypt_values, false);
        let value = self
            .has_or_get(key)
            .map(|bundle| bundle.value)
            .unwrap_or_default();
        self.set(key.clone(), value, options);
        self.options.encrypt_values = encrypt;
    }

    fn erase(&mut self, key: &K) -> bool {
        match self.locate(key) {
            Some((path, _)) => self.remove_file(&path),
            None => false,
        }
    }

    fn erase_if<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&GateBundle<Self>) -> bool,
    {
        let mut removed = 0;
        for path in self.owned_files() {
            let Some(bundle) = self.read_entry(&path, None) else {
                continue;
            };
            if predicate(&bundle) && self.remove_file(&path) {
                removed += 1;
            }
        }
        removed
    }

    fn clear(&mut self) {
        for path in self.owned_files() {
            self.remove_file(&path);
        }
    }

    fn iter(&self) -> Self::Iter<'_> {
        DirectoryIter {
            gate: self,
            entries: self.read_dir(),
        }
    }
}

impl<K, V, O> Drop for DirectoryGate<K, V, O> {
    fn drop(&mut self) {
        if !self.ephemeral {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            self.logger.warning(
                LOG_CATEGORY,
                &format!("cannot remove temporary directory {}", self.dir.display()),
                Some(&e),
            );
        }
    }
}

/// Lazy scan over the files of a [`DirectoryGate`]
///
/// Foreign and corrupt files are skipped.
pub struct DirectoryIter<'a, K, V, O> {
    gate: &'a DirectoryGate<K, V, O>,
    entries: Option<ReadDir>,
}

impl<K, V, O> Iterator for DirectoryIter<'_, K, V, O>
where
    K: Lexical,
    V: Lexical,
    O: Lexical,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries.as_mut()?;
        for entry in entries {
            let Some(path) = self.gate.owned_path(entry) else {
                continue;
            };
            if let Some(bundle) = self.gate.read_entry(&path, None) {
                return Some((bundle.key, bundle.value));
            }
        }
        None
    }
}

/// Regular file, or a symlink to one; lookups and scans share this rule
fn is_entry_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

/// Create a new uniquely named directory under `base`
fn create_temp_dir(base: &Path) -> Result<PathBuf> {
    let mut rng = rand::rng();
    for _ in 0..TEMP_DIR_ATTEMPTS {
        let name: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(TEMP_DIR_NAME_LEN)
            .map(char::from)
            .collect();
        let path = base.join(name);
        match fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(Error::TempDir(base.to_path_buf()))
}
