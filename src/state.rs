use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value persistence for the CLI: generated keys, the RPC URL and the
/// addresses of deployed contracts, stored as `KEY=VALUE` lines.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load a single value by key from the state file.
    pub fn load_value(&self, key: &str) -> Option<String> {
        if !self.path.exists() {
            return None;
        }
        if let Ok(contents) = fs::read_to_string(&self.path) {
            for line in contents.lines() {
                if let Some(val) = line.strip_prefix(&format!("{}=", key)) {
                    return Some(val.trim().to_string());
                }
            }
        }
        None
    }

    /// Save a single key-value pair, preserving other values.
    pub fn save_value(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.load_all();
        state.insert(key.to_string(), value.to_string());
        self.save_all(&state)
    }

    /// Load all key-value pairs from the state file.
    pub fn load_all(&self) -> HashMap<String, String> {
        let mut state = HashMap::new();
        if self.path.exists() {
            if let Ok(contents) = fs::read_to_string(&self.path) {
                for line in contents.lines() {
                    if let Some((k, v)) = line.split_once('=') {
                        state.insert(k.to_string(), v.trim().to_string());
                    }
                }
            }
        }
        state
    }

    /// Save all key-value pairs (sorted by key for stable diffs).
    pub fn save_all(&self, state: &HashMap<String, String>) -> Result<()> {
        let mut keys: Vec<_> = state.keys().collect();
        keys.sort();
        let mut content = String::new();
        for k in keys {
            content.push_str(&format!("{}={}\n", k, state[k]));
        }
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Delete the state file.
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_save_and_load_value() {
        let temp_file = "test_creatorpay_state_1.env";
        let state = StateFile::new(temp_file);

        state.save_value("RPC_URL", "http://localhost:8545").unwrap();
        assert_eq!(
            state.load_value("RPC_URL"),
            Some("http://localhost:8545".to_string())
        );

        fs::remove_file(temp_file).unwrap();
    }

    #[test]
    fn test_load_value_nonexistent() {
        let state = StateFile::new("nonexistent_creatorpay.env");
        assert_eq!(state.load_value("RPC_URL"), None);
    }

    #[test]
    fn test_save_preserves_other_values() {
        let temp_file = "test_creatorpay_state_2.env";
        let state = StateFile::new(temp_file);

        state.save_value("PRIVATE_KEY", "0xabc").unwrap();
        state
            .save_value("CREATOR_ROUTER_ADDRESS", "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0")
            .unwrap();

        assert_eq!(state.load_value("PRIVATE_KEY"), Some("0xabc".to_string()));
        assert_eq!(
            state.load_value("CREATOR_ROUTER_ADDRESS"),
            Some("0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0".to_string())
        );

        fs::remove_file(temp_file).unwrap();
    }

    #[test]
    fn test_load_all() {
        let temp_file = "test_creatorpay_state_3.env";
        let state = StateFile::new(temp_file);

        state.save_value("KEY1", "value1").unwrap();
        state.save_value("KEY2", "value2").unwrap();

        let all = state.load_all();
        assert_eq!(all.get("KEY1"), Some(&"value1".to_string()));
        assert_eq!(all.get("KEY2"), Some(&"value2".to_string()));

        fs::remove_file(temp_file).unwrap();
    }

    #[test]
    fn test_delete() {
        let temp_file = "test_creatorpay_state_4.env";
        let state = StateFile::new(temp_file);

        state.save_value("KEY1", "value1").unwrap();
        assert!(state.exists());

        state.delete().unwrap();
        assert!(!state.exists());
    }
}
