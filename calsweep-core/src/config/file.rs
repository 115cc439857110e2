//! Loading a [`SweepConfig`] from disk and the environment.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, Map};

use super::SweepConfig;
use crate::error::{SweepError, SweepResult};

const ENV_PREFIX: &str = "CALSWEEP";

/// Keys whose environment values are split on commas.
const LIST_KEYS: [&str; 4] = [
    "filters.exclude_keywords",
    "filters.only_keywords",
    "calendars.include",
    "calendars.exclude",
];

impl SweepConfig {
    /// Default config location: ~/.config/calsweep/config.toml
    pub fn config_path() -> SweepResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SweepError::Config("Could not determine config directory".into()))?
            .join("calsweep");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from `path` (optional file), overlaid with
    /// `CALSWEEP__SECTION__FIELD` environment variables. List fields take
    /// comma-separated values.
    pub fn load(path: &Path) -> SweepResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`SweepConfig::load`], reading variables from `env` instead of
    /// the process environment when given.
    fn load_with_env(path: &Path, env: Option<Map<String, String>>) -> SweepResult<Self> {
        let environment = LIST_KEYS.iter().fold(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .try_parsing(true)
                .source(env),
            |environment, key| environment.with_list_parse_key(key),
        );

        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| SweepError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SweepError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SweepResult<()> {
        let contents = "\
# calsweep configuration

# Where your calendars live (one directory per calendar, one .ics per event):
# calendar_dir = \"~/calendar\"

# \"simulate\" only reports what would be deleted, \"live\" deletes.
# mode = \"simulate\"

[window]
# Keep events newer than this. Set exactly one; days wins over months over years.
days_to_keep = 365
# months_to_keep = 12
# years_to_keep = 1

[limits]
# max_deletes_per_run = 50
# pause_between_deletes = \"1s\"
# sample_events = 5
# backup_rows = 1000

[filters]
# delete_recurring = false
# skip_all_day = false
# skip_with_attendees = false
# exclude_keywords = [\"birthday\", \"anniversary\"]
# only_keywords = []
# min_title_length = 0

[calendars]
# include = [\"work\"]
# exclude = [\"holidays\"]

[report]
# build_report = true
# email_report = false
# email_recipient = \"me@example.com\"

[backup]
# before_delete = false
# dir = \"~/.local/share/calsweep/backups\"

# [smtp]
# host = \"smtp.example.com\"
# port = 587
# username = \"me@example.com\"
# password = \"app-password\"
# from = \"calsweep <me@example.com>\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SweepError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SweepError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::RunMode;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SweepConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.mode, RunMode::Simulate);
        assert!(!config.window.is_set());
        assert_eq!(config.limits.max_deletes_per_run, 50);
        assert!(config.report.build_report);
    }

    #[test]
    fn test_load_reads_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
mode = "live"

[window]
months_to_keep = 6

[limits]
max_deletes_per_run = 10
pause_between_deletes = "250ms"

[filters]
exclude_keywords = ["Birthday"]
skip_all_day = true

[calendars]
exclude = ["holidays"]
"#,
        )
        .unwrap();

        let config = SweepConfig::load(&path).unwrap();

        assert_eq!(config.mode, RunMode::Live);
        assert_eq!(config.window.months_to_keep, Some(6));
        assert_eq!(config.limits.max_deletes_per_run, 10);
        assert_eq!(config.limits.pause_between_deletes, Duration::from_millis(250));
        assert_eq!(config.limits.sample_events, 5);
        assert_eq!(config.filters.exclude_keywords, vec!["Birthday".to_string()]);
        assert!(config.filters.skip_all_day);
        assert_eq!(config.calendars.exclude, vec!["holidays".to_string()]);
    }

    #[test]
    fn test_default_config_file_loads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        SweepConfig::create_default_config(&path).unwrap();
        let config = SweepConfig::load(&path).unwrap();

        assert_eq!(config.window.days_to_keep, Some(365));
        assert!(config.validate().is_ok());
    }

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_environment_sets_scalar_and_list_fields() {
        let dir = tempfile::tempdir().unwrap();
        let vars = env(&[
            ("CALSWEEP__WINDOW__DAYS_TO_KEEP", "30"),
            ("CALSWEEP__FILTERS__EXCLUDE_KEYWORDS", "birthday,anniversary"),
            ("CALSWEEP__FILTERS__ONLY_KEYWORDS", "standup"),
            ("CALSWEEP__CALENDARS__INCLUDE", "work,home"),
            ("CALSWEEP__CALENDARS__EXCLUDE", "holidays"),
        ]);

        let config = SweepConfig::load_with_env(&dir.path().join("absent.toml"), vars).unwrap();

        assert_eq!(config.window.days_to_keep, Some(30));
        assert_eq!(config.filters.exclude_keywords, vec!["birthday", "anniversary"]);
        assert_eq!(config.filters.only_keywords, vec!["standup"]);
        assert_eq!(config.calendars.include, vec!["work", "home"]);
        assert_eq!(config.calendars.exclude, vec!["holidays"]);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "mode = \"live\"\n[window]\ndays_to_keep = 365\n[filters]\nexclude_keywords = [\"lunch\"]\n",
        )
        .unwrap();
        let vars = env(&[
            ("CALSWEEP__MODE", "simulate"),
            ("CALSWEEP__FILTERS__EXCLUDE_KEYWORDS", "birthday"),
        ]);

        let config = SweepConfig::load_with_env(&path, vars).unwrap();

        assert_eq!(config.mode, RunMode::Simulate);
        assert_eq!(config.window.days_to_keep, Some(365));
        assert_eq!(config.filters.exclude_keywords, vec!["birthday"]);
    }
}
