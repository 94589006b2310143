//! Run configuration.

use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::day::DayOffset;
use crate::error::RollError;
use crate::tier::Tier;

/// Configuration for one retention run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(private, name = "build_unchecked"))]
pub struct RollConfig {
    /// Directory holding freshly produced backups.
    pub workspace_dir: PathBuf,

    /// Daily store directory (default: `<workspace>/daily`).
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub daily_dir: Option<PathBuf>,

    /// Weekly store directory (default: `<workspace>/weekly`).
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub weekly_dir: Option<PathBuf>,

    /// Monthly store directory (default: `<workspace>/monthly`).
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub monthly_dir: Option<PathBuf>,

    /// Days daily backups are kept.
    #[builder(default = "30")]
    #[serde(default = "default_daily_retention")]
    pub daily_retention: u32,

    /// Weeks weekly backups are kept.
    #[builder(default = "12")]
    #[serde(default = "default_weekly_retention")]
    pub weekly_retention: u32,

    /// Months monthly backups are kept.
    #[builder(default = "12")]
    #[serde(default = "default_monthly_retention")]
    pub monthly_retention: u32,

    /// Weekdays collected into the weekly tier, 0 = Monday .. 6 = Sunday.
    /// Empty disables the weekly tier.
    #[builder(default = "vec![6]")]
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<u32>,

    /// Days of month collected into the monthly tier. Negative values count
    /// from the end of the month. Empty disables the monthly tier.
    #[builder(default = "vec![1]")]
    #[serde(default = "default_monthdays")]
    pub monthdays: Vec<i32>,

    /// Hours added to modification times before deriving the day.
    #[builder(default = "6")]
    #[serde(default = "default_offset_hours")]
    pub offset_hours: i32,

    /// Never delete old backups from the tier directories.
    #[builder(default)]
    #[serde(default)]
    pub keep_old_backups: bool,

    /// Never delete files from the workspace.
    #[builder(default)]
    #[serde(default)]
    pub keep_workspace: bool,

    /// Report actions without copying or deleting anything.
    #[builder(default)]
    #[serde(default)]
    pub dry_run: bool,

    /// Date windows are computed from (default: today, local time).
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

fn default_daily_retention() -> u32 {
    30
}

fn default_weekly_retention() -> u32 {
    12
}

fn default_monthly_retention() -> u32 {
    12
}

fn default_weekdays() -> Vec<u32> {
    vec![6]
}

fn default_monthdays() -> Vec<i32> {
    vec![1]
}

fn default_offset_hours() -> i32 {
    6
}

impl RollConfigBuilder {
    /// Build and validate the configuration.
    pub fn build(&self) -> Result<RollConfig, RollError> {
        let config = self
            .build_unchecked()
            .map_err(|e| RollError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl RollConfig {
    /// Create a new config builder.
    pub fn builder() -> RollConfigBuilder {
        RollConfigBuilder::default()
    }

    /// Create a config with default settings for a workspace.
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            daily_dir: None,
            weekly_dir: None,
            monthly_dir: None,
            daily_retention: default_daily_retention(),
            weekly_retention: default_weekly_retention(),
            monthly_retention: default_monthly_retention(),
            weekdays: default_weekdays(),
            monthdays: default_monthdays(),
            offset_hours: default_offset_hours(),
            keep_old_backups: false,
            keep_workspace: false,
            dry_run: false,
            reference_date: None,
        }
    }

    /// Store directory of a tier, falling back to `<workspace>/<tier>`.
    pub fn tier_dir(&self, tier: Tier) -> PathBuf {
        let configured = match tier {
            Tier::Daily => self.daily_dir.as_ref(),
            Tier::Weekly => self.weekly_dir.as_ref(),
            Tier::Monthly => self.monthly_dir.as_ref(),
        };
        configured
            .cloned()
            .unwrap_or_else(|| tier.default_dir(&self.workspace_dir))
    }

    /// Tiers enabled by this configuration, in processing order.
    pub fn enabled_tiers(&self) -> Vec<Tier> {
        let mut tiers = Vec::with_capacity(3);
        if !self.monthdays.is_empty() {
            tiers.push(Tier::Monthly);
        }
        if !self.weekdays.is_empty() {
            tiers.push(Tier::Weekly);
        }
        tiers.push(Tier::Daily);
        tiers
    }

    /// Day offset applied to every directory.
    pub fn offset(&self) -> DayOffset {
        DayOffset::hours(self.offset_hours)
    }

    /// Check settings that cannot be expressed by field types alone.
    pub fn validate(&self) -> Result<(), RollError> {
        if self.workspace_dir.as_os_str().is_empty() {
            return Err(RollError::config("workspace directory cannot be empty"));
        }
        if let Some(day) = self.weekdays.iter().find(|d| **d > 6) {
            return Err(RollError::config(format!(
                "weekday {day} is out of range 0..=6"
            )));
        }
        if let Some(day) = self
            .monthdays
            .iter()
            .find(|d| **d == 0 || !(-31..=31).contains(*d))
        {
            return Err(RollError::config(format!(
                "month day {day} must be within 1..=31 or -31..=-1"
            )));
        }

        let tiers = self.enabled_tiers();
        for (i, tier) in tiers.iter().enumerate() {
            let dir = self.tier_dir(*tier);
            if same_path(&dir, &self.workspace_dir) {
                return Err(RollError::config(format!(
                    "{tier} directory {} is the workspace directory",
                    dir.display()
                )));
            }
            for other in &tiers[i + 1..] {
                if same_path(&dir, &self.tier_dir(*other)) {
                    return Err(RollError::config(format!(
                        "{tier} and {other} tiers share directory {}",
                        dir.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Convert a signed retention count from the command line.
pub fn retention_count(name: &str, value: i64) -> Result<u32, RollError> {
    u32::try_from(value).map_err(|_| {
        RollError::config(format!(
            "{name} must be a non-negative number, got {value}"
        ))
    })
}

fn same_path(a: &Path, b: &Path) -> bool {
    resolve(a) == resolve(b)
}

/// Absolute, lexically normalized form of `path`. Relative paths are taken
/// from the current directory; symbolic links are not followed.
fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    resolved.push(component);
                }
            }
            other => resolved.push(other),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RollConfig::builder()
            .workspace_dir("/srv/backups")
            .daily_retention(7u32)
            .weekdays(vec![5u32, 6])
            .daily_dir("/mnt/daily")
            .build()
            .unwrap();

        assert_eq!(config.workspace_dir, PathBuf::from("/srv/backups"));
        assert_eq!(config.daily_retention, 7);
        assert_eq!(config.weekly_retention, 12);
        assert_eq!(config.monthdays, vec![1]);
        assert_eq!(config.offset_hours, 6);
        assert_eq!(config.tier_dir(Tier::Daily), PathBuf::from("/mnt/daily"));
        assert_eq!(
            config.tier_dir(Tier::Monthly),
            PathBuf::from("/srv/backups/monthly")
        );
    }

    #[test]
    fn test_builder_requires_workspace() {
        let err = RollConfig::builder().build().unwrap_err();
        assert!(matches!(err, RollError::Configuration { .. }));
    }

    #[test]
    fn test_enabled_tiers() {
        let mut config = RollConfig::new("/srv/backups");
        assert_eq!(
            config.enabled_tiers(),
            vec![Tier::Monthly, Tier::Weekly, Tier::Daily]
        );

        config.weekdays.clear();
        config.monthdays.clear();
        assert_eq!(config.enabled_tiers(), vec![Tier::Daily]);
    }

    #[test]
    fn test_rejects_out_of_range_selectors() {
        let err = RollConfig::builder()
            .workspace_dir("/srv/backups")
            .weekdays(vec![7u32])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("weekday 7"));

        for bad in [0i32, 32, -32] {
            let result = RollConfig::builder()
                .workspace_dir("/srv/backups")
                .monthdays(vec![bad])
                .build();
            assert!(result.is_err(), "month day {bad} should be rejected");
        }
    }

    #[test]
    fn test_rejects_shared_directories() {
        let result = RollConfig::builder()
            .workspace_dir("/srv/backups")
            .daily_dir("/srv/backups")
            .build();
        assert!(result.is_err());

        let result = RollConfig::builder()
            .workspace_dir("/srv/backups")
            .daily_dir("/mnt/keep")
            .weekly_dir("/mnt/keep/")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_relative_alias_of_workspace() {
        let cwd = std::env::current_dir().unwrap();
        let name = cwd.file_name().unwrap().to_os_string();

        let result = RollConfig::builder()
            .workspace_dir(cwd.clone())
            .daily_dir(Path::new("..").join(&name))
            .build();
        assert!(result.is_err());

        let result = RollConfig::builder()
            .workspace_dir(".")
            .weekly_dir(cwd.join("./weekly/.."))
            .build();
        assert!(result.is_err());

        assert!(same_path(Path::new("/srv/b/daily/.."), Path::new("/srv/b")));
        assert!(!same_path(Path::new("/srv/b/daily"), Path::new("/srv/b")));
    }

    #[test]
    fn test_disabled_tier_may_share_directory() {
        let result = RollConfig::builder()
            .workspace_dir("/srv/backups")
            .daily_dir("/mnt/keep")
            .weekly_dir("/mnt/keep")
            .weekdays(Vec::<u32>::new())
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_retention_count() {
        assert_eq!(retention_count("daily retention", 30).unwrap(), 30);
        let err = retention_count("daily retention", -1).unwrap_err();
        assert!(err.to_string().contains("daily retention"));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: RollConfig =
            serde_json::from_str(r#"{"workspace_dir": "/srv/backups"}"#).unwrap();
        assert_eq!(config.daily_retention, 30);
        assert_eq!(config.weekdays, vec![6]);
        assert!(!config.dry_run);
    }
}
