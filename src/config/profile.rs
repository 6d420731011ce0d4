//! Profile store: saves and restores the form's option state as JSON
//!
//! Every key is optional on load so profiles written by older versions keep
//! working; unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::ProfileError;
use crate::options::{available_cores, OptionState};

/// On-disk shape of a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    script_path: String,
    #[serde(default)]
    output_dir: String,
    #[serde(default)]
    icon_path: String,
    #[serde(default)]
    one_file: bool,
    #[serde(default)]
    no_console: bool,
    #[serde(default)]
    shutdown: bool,

    /// Core count as a string; older files may hold a bare number
    #[serde(default = "default_cores", deserialize_with = "deserialize_cores")]
    cores: String,

    #[serde(default)]
    product_name: String,
    #[serde(default)]
    product_version: String,
    #[serde(default)]
    file_version: String,
    #[serde(default)]
    file_description: String,
    #[serde(default)]
    copyright: String,

    #[serde(default)]
    included_files: Vec<String>,
    #[serde(default)]
    included_folders: Vec<String>,
    #[serde(default)]
    included_modules: Vec<String>,
}

fn default_cores() -> String {
    available_cores().to_string()
}

/// Accepts both `"4"` and `4`
fn deserialize_cores<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(u64),
    }

    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => Ok(s),
        StringOrInt::Int(n) => Ok(n.to_string()),
    }
}

impl From<&OptionState> for ProfileFile {
    fn from(state: &OptionState) -> Self {
        Self {
            script_path: state.script_path.clone(),
            output_dir: state.output_dir.clone(),
            icon_path: state.icon_path.clone(),
            one_file: state.one_file,
            no_console: state.no_console,
            shutdown: state.shutdown_on_success,
            cores: state.core_count.to_string(),
            product_name: state.product_name.clone(),
            product_version: state.product_version.clone(),
            file_version: state.file_version.clone(),
            file_description: state.file_description.clone(),
            copyright: state.copyright.clone(),
            included_files: state.included_files.clone(),
            included_folders: state.included_folders.clone(),
            included_modules: state.included_modules.clone(),
        }
    }
}

impl From<ProfileFile> for OptionState {
    fn from(file: ProfileFile) -> Self {
        let core_count = file.cores.trim().parse::<usize>().unwrap_or_else(|_| {
            warn!(cores = %file.cores, "Invalid core count in profile, using all cores");
            available_cores()
        });

        let mut state = Self {
            script_path: file.script_path,
            output_dir: file.output_dir,
            icon_path: file.icon_path,
            one_file: file.one_file,
            no_console: file.no_console,
            shutdown_on_success: file.shutdown,
            core_count,
            product_name: file.product_name,
            product_version: file.product_version,
            file_version: file.file_version,
            file_description: file.file_description,
            copyright: file.copyright,
            included_files: file.included_files,
            included_folders: file.included_folders,
            included_modules: file.included_modules,
        };
        state.clamp_core_count();
        state
    }
}

/// Write `state` to `path` as indented JSON
pub fn save(state: &OptionState, path: &Path) -> Result<(), ProfileError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    ProfileFile::from(state).serialize(&mut serializer)?;

    fs::write(path, buf).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Saved profile");
    Ok(())
}

/// Read a profile, substituting defaults for any missing key
pub fn load(path: &Path) -> Result<OptionState, ProfileError> {
    let contents = fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file: ProfileFile = serde_json::from_str(&contents).map_err(|source| ProfileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Loaded profile");
    Ok(file.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> OptionState {
        OptionState {
            script_path: "/proj/app.py".to_string(),
            output_dir: "/proj/out".to_string(),
            icon_path: "/proj/app.ico".to_string(),
            one_file: true,
            no_console: true,
            shutdown_on_success: true,
            core_count: 1,
            product_name: "App".to_string(),
            product_version: "1.2.3".to_string(),
            file_version: "1.2.3.4".to_string(),
            file_description: "An \"app\" with ünïcode".to_string(),
            copyright: "(c) 2026".to_string(),
            included_files: vec!["/a/b.txt".to_string(), "/a/b.txt".to_string()],
            included_folders: vec!["/x/y".to_string()],
            included_modules: vec!["PySide6.QtXml".to_string(), "json".to_string()],
        }
    }

    #[test]
    fn test_save_then_load_reproduces_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.mpb");

        let state = sample_state();
        save(&state, &path).unwrap();
        assert_eq!(load(&path).unwrap(), state);
    }

    #[test]
    fn test_saved_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.mpb");
        save(&sample_state(), &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\n    \"script_path\": \"/proj/app.py\""));

        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["cores"], serde_json::json!("1"));
        assert_eq!(value["shutdown"], serde_json::json!(true));
        assert_eq!(value["included_folders"], serde_json::json!(["/x/y"]));
        assert_eq!(value.as_object().unwrap().len(), 15);
    }

    #[test]
    fn test_missing_keys_get_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.mpb");
        fs::write(&path, r#"{"script_path": "/proj/app.py", "one_file": true}"#).unwrap();

        let state = load(&path).unwrap();
        assert_eq!(state.script_path, "/proj/app.py");
        assert!(state.one_file);
        assert!(!state.no_console);
        assert!(state.output_dir.is_empty());
        assert_eq!(state.core_count, available_cores());
        assert!(state.included_files.is_empty());
        assert!(state.included_modules.is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.mpb");
        fs::write(&path, r#"{"script_path": "a.py", "upx": true, "extra": [1, 2]}"#).unwrap();

        assert_eq!(load(&path).unwrap().script_path, "a.py");
    }

    #[test]
    fn test_numeric_and_invalid_cores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cores.mpb");

        fs::write(&path, r#"{"cores": 1}"#).unwrap();
        assert_eq!(load(&path).unwrap().core_count, 1);

        fs::write(&path, r#"{"cores": "many"}"#).unwrap();
        assert_eq!(load(&path).unwrap().core_count, available_cores());

        fs::write(&path, r#"{"cores": "0"}"#).unwrap();
        assert_eq!(load(&path).unwrap().core_count, 1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.mpb")).unwrap_err();
        assert!(matches!(err, ProfileError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mpb");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path).unwrap_err(), ProfileError::Parse { .. }));
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/profile.mpb");
        assert!(matches!(save(&sample_state(), &path).unwrap_err(), ProfileError::Io { .. }));
    }
}
