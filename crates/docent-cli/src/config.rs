//! Configuration vault – reads/writes `~/.docent/config.toml`.

use docent_runtime::{ScriptEntry, TourScript};
use docent_types::{NarrationMessage, RobotIdentity};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Speech-service settings. Narration is off unless explicitly enabled;
/// whether a robot can narrate is a deployment fact, not something inferred
/// from which port the action service happens to listen on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the speech service (a different server from the action
    /// engine in general).
    #[serde(default = "default_narration_url")]
    pub base_url: String,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_narration_url(),
        }
    }
}

/// One scripted stop as written in the config file. The shared `scene` from
/// [`Config`] is folded in when the [`TourScript`] is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopEntry {
    pub poi_id: String,
    pub intention: String,
    pub content: String,
}

/// Persisted operator configuration stored in `~/.docent/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Robot name the authorization header is derived from. No spaces.
    #[serde(default = "default_robot_name")]
    pub robot_name: String,

    /// Host of the robot's action service.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the robot's action service.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub narration: NarrationSettings,

    /// Sleep between action status polls, milliseconds.
    #[serde(default = "default_action_poll_ms")]
    pub action_poll_ms: u64,

    /// Sleep between narration handshake polls, milliseconds.
    #[serde(default = "default_speech_poll_ms")]
    pub speech_poll_ms: u64,

    /// Optional cap on any single blocking wait, seconds. Unset means every
    /// wait is unbounded, which is the classic operator-supervised mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_secs: Option<u64>,

    /// Scene name shared by every narration in the tour.
    #[serde(default = "default_scene")]
    pub scene: String,

    /// The tour script: narration per POI id.
    #[serde(default)]
    pub stops: Vec<StopEntry>,
}

fn default_robot_name() -> String {
    "docent-01".to_string()
}
fn default_host() -> String {
    "192.168.11.1".to_string()
}
fn default_port() -> u16 {
    1448
}
fn default_narration_url() -> String {
    "http://8.130.69.6:39099".to_string()
}
fn default_action_poll_ms() -> u64 {
    100
}
fn default_speech_poll_ms() -> u64 {
    500
}
fn default_scene() -> String {
    "mainProcess".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            robot_name: default_robot_name(),
            host: default_host(),
            port: default_port(),
            narration: NarrationSettings::default(),
            action_poll_ms: default_action_poll_ms(),
            speech_poll_ms: default_speech_poll_ms(),
            max_wait_secs: None,
            scene: default_scene(),
            stops: Vec::new(),
        }
    }
}

impl Config {
    /// The robot identity this configuration binds a session to.
    pub fn identity(&self) -> RobotIdentity {
        RobotIdentity::new(&self.robot_name, &self.host, self.port)
    }

    /// Build the tour script, folding the shared scene into every stop.
    pub fn script(&self) -> TourScript {
        TourScript::new(
            self.stops
                .iter()
                .map(|stop| ScriptEntry {
                    poi_id: stop.poi_id.clone(),
                    message: NarrationMessage::new(&self.scene, &stop.intention, &stop.content),
                })
                .collect(),
        )
    }
}

/// Return the path to `~/.docent/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".docent").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `DOCENT_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `DOCENT_ROBOT_NAME` | `robot_name` |
/// | `DOCENT_HOST` | `host` |
/// | `DOCENT_PORT` | `port` |
/// | `DOCENT_NARRATION_URL` | `narration.base_url` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("DOCENT_ROBOT_NAME") {
        cfg.robot_name = v;
    }
    if let Ok(v) = std::env::var("DOCENT_HOST") {
        cfg.host = v;
    }
    if let Ok(v) = std::env::var("DOCENT_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.port = port;
    }
    if let Ok(v) = std::env::var("DOCENT_NARRATION_URL") {
        cfg.narration.base_url = v;
    }
}

/// Save the config to disk, creating `~/.docent/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Restrict the config directory to the owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Write the file with owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.robot_name, "docent-01");
        assert_eq!(loaded.host, "192.168.11.1");
        assert_eq!(loaded.port, 1448);
        assert_eq!(loaded.action_poll_ms, 100);
        assert_eq!(loaded.speech_poll_ms, 500);
        assert_eq!(loaded.max_wait_secs, None);
        assert!(!loaded.narration.enabled);
    }

    #[test]
    fn config_path_points_to_docent_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".docent"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let file_meta = std::fs::metadata(&path).expect("file metadata");
        let file_mode = file_meta.permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        let dir_mode = dir_meta.permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700, "config directory must have 0o700 permissions");
    }

    #[test]
    fn stops_parse_from_toml() {
        let raw = r#"
            robot_name = "avatar123"
            host = "192.168.11.1"
            scene = "museum"

            [narration]
            enabled = true
            base_url = "http://192.168.11.5:39099"

            [[stops]]
            poi_id = "p1"
            intention = "Pos1"
            content = "greet|welcome"

            [[stops]]
            poi_id = "p2"
            intention = "Pos2"
            content = "bronze|hall"
        "#;
        let cfg: Config = toml::from_str(raw).expect("parse");
        assert_eq!(cfg.robot_name, "avatar123");
        assert!(cfg.narration.enabled);
        assert_eq!(cfg.stops.len(), 2);
        assert_eq!(cfg.stops[1].intention, "Pos2");
        // Unset fields keep their defaults.
        assert_eq!(cfg.port, 1448);
    }

    #[test]
    fn script_folds_the_shared_scene_into_every_stop() {
        let mut cfg = Config::default();
        cfg.scene = "museum".to_string();
        cfg.stops = vec![
            StopEntry {
                poi_id: "p1".to_string(),
                intention: "Pos1".to_string(),
                content: "greet".to_string(),
            },
            StopEntry {
                poi_id: "p2".to_string(),
                intention: "Pos2".to_string(),
                content: "hall".to_string(),
            },
        ];
        let script = cfg.script();
        assert_eq!(script.len(), 2);
        let msg = script.narration_for("p2").expect("scripted");
        assert_eq!(msg.scene, "museum");
        assert_eq!(msg.intention, "Pos2");
    }

    #[test]
    fn identity_binds_name_host_and_port() {
        let cfg = Config::default();
        let identity = cfg.identity();
        assert_eq!(identity.authorization(), "Robot docent-01");
        assert_eq!(identity.base_url(), "http://192.168.11.1:1448");
    }

    #[test]
    fn apply_env_overrides_changes_host() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("DOCENT_HOST", "10.0.0.9") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.host, "10.0.0.9");
        unsafe { std::env::remove_var("DOCENT_HOST") };
    }

    #[test]
    fn apply_env_overrides_changes_port() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("DOCENT_PORT", "39092") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.port, 39092);
        unsafe { std::env::remove_var("DOCENT_PORT") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_port() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("DOCENT_PORT", "not-a-port") };
        let mut cfg = Config::default();
        let original_port = cfg.port;
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.port, original_port);
        unsafe { std::env::remove_var("DOCENT_PORT") };
    }

    #[test]
    fn apply_env_overrides_changes_narration_url() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("DOCENT_NARRATION_URL", "http://10.0.0.9:39099") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.narration.base_url, "http://10.0.0.9:39099");
        unsafe { std::env::remove_var("DOCENT_NARRATION_URL") };
    }
}
