//! Subcommands of gatectl

use std::io::{self, Write};

use clap::Subcommand;
use gatecache::{CacheStrategy, DirectoryCache};
use tracing::info;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the value stored under a key
    Get { key: String },
    /// Store a value under a key
    Set { key: String, value: String },
    /// Remove a key
    Del { key: String },
    /// Print every key and value
    List,
    /// Remove every entry of this cache
    Clear,
    /// Print entry count and location
    Stats,
}

/// Run `command` against `cache`, writing results to `out`
///
/// # Returns
/// * `io::Result<bool>` - `false` when a `get` or `del` found no entry
pub fn run(
    command: &Command,
    cache: &mut DirectoryCache<String, String>,
    out: &mut impl Write,
) -> io::Result<bool> {
    match command {
        Command::Get { key } => match cache.get(key) {
            Some(value) => {
                writeln!(out, "{}", value)?;
                Ok(true)
            }
            None => Ok(false),
        },
        Command::Set { key, value } => {
            cache.set(key.clone(), value.clone());
            info!("Stored {:?}", key);
            Ok(true)
        }
        Command::Del { key } => Ok(cache.erase(key)),
        Command::List => {
            let mut entries: Vec<_> = cache.iter().collect();
            entries.sort();
            for (key, value) in entries {
                writeln!(out, "{}\t{}", key, value.escape_default())?;
            }
            Ok(true)
        }
        Command::Clear => {
            cache.clear();
            info!("Cleared cache");
            Ok(true)
        }
        Command::Stats => {
            let gate = cache.strategy().gate();
            writeln!(out, "name:      {}", gate.name())?;
            writeln!(out, "directory: {}", gate.path().display())?;
            writeln!(out, "entries:   {}", cache.len())?;
            writeln!(out, "capacity:  {}", cache.strategy().max_size())?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatecache::Cache;
    use gatestore::DirectoryGateConfig;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> DirectoryCache<String, String> {
        Cache::open_directory(DirectoryGateConfig::new("cli").with_directory(dir.path()), 8)
            .unwrap()
    }

    fn run_to_string(
        command: Command,
        cache: &mut DirectoryCache<String, String>,
    ) -> (bool, String) {
        let mut out = Vec::new();
        let found = run(&command, cache, &mut out).unwrap();
        (found, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_set_get_del() {
        let dir = TempDir::new().unwrap();
        let mut cache = open(&dir);

        let set = Command::Set {
            key: "greeting".to_string(),
            value: "hello".to_string(),
        };
        assert!(run_to_string(set, &mut cache).0);

        let get = Command::Get {
            key: "greeting".to_string(),
        };
        assert_eq!(run_to_string(get.clone(), &mut cache), (true, "hello\n".to_string()));

        let del = Command::Del {
            key: "greeting".to_string(),
        };
        assert!(run_to_string(del.clone(), &mut cache).0);
        assert!(!run_to_string(del, &mut cache).0);
        assert_eq!(run_to_string(get, &mut cache), (false, String::new()));
    }

    #[test]
    fn test_list_escapes_newlines() {
        let dir = TempDir::new().unwrap();
        let mut cache = open(&dir);
        cache.set("b".to_string(), "2".to_string());
        cache.set("a".to_string(), "line\nbreak".to_string());

        let (_, listing) = run_to_string(Command::List, &mut cache);

        assert_eq!(listing, "a\tline\\nbreak\nb\t2\n");
    }

    #[test]
    fn test_clear_and_stats() {
        let dir = TempDir::new().unwrap();
        let mut cache = open(&dir);
        cache.set("a".to_string(), "1".to_string());

        run_to_string(Command::Clear, &mut cache);
        let (_, stats) = run_to_string(Command::Stats, &mut cache);

        assert!(stats.contains("name:      cli"));
        assert!(stats.contains("entries:   0"));
        assert!(stats.contains("capacity:  8"));
    }
}
