use std::path::PathBuf;

use indexmap::IndexSet;
use serde::Deserialize;

use crate::fmt::ChangelogFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct RawCfg {
    pub gitdch: RawGitDchCfg,
    #[serde(default)]
    pub team: IndexSet<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawGitDchCfg {
    pub package: Option<String>,
    pub version: Option<String>,
    pub distribution: Option<String>,
    pub changelog: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub from_latest_tag: bool,
    pub skip_bugs: bool,
    pub infile: Option<String>,
    pub outfile: Option<String>,
    pub git_dir: Option<PathBuf>,
    pub git_work_tree: Option<PathBuf>,
    pub output_format: ChangelogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config() {
        let cfg = r#"
            team = ["Jane Doe", "John Roe"]

            [gitdch]
            package = "cloud-utils"
            version = "0.31-1ubuntu1"
            distribution = "jammy"
            changelog = "debian/changelog"
            from-latest-tag = true
            skip-bugs = true
            output-format = "stanza"
        "#;
        let res = toml::from_str(cfg);
        assert!(res.is_ok(), "{res:?}");
        let cfg: RawCfg = res.unwrap();

        assert_eq!(cfg.gitdch.package, Some("cloud-utils".into()));
        assert_eq!(cfg.gitdch.version, Some("0.31-1ubuntu1".into()));
        assert_eq!(cfg.gitdch.distribution, Some("jammy".into()));
        assert_eq!(cfg.gitdch.changelog, Some("debian/changelog".into()));
        assert!(cfg.gitdch.from_latest_tag);
        assert!(cfg.gitdch.skip_bugs);
        assert_eq!(cfg.gitdch.output_format, ChangelogFormat::Stanza);
        assert!(cfg.team.contains("Jane Doe"));
        assert!(cfg.team.contains("John Roe"));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = "[gitdch]\n";
        let res = toml::from_str(cfg);
        assert!(res.is_ok(), "{res:?}");
        let cfg: RawCfg = res.unwrap();

        assert!(!cfg.gitdch.from_latest_tag);
        assert!(!cfg.gitdch.skip_bugs);
        assert_eq!(cfg.gitdch.output_format, ChangelogFormat::Entries);
        assert!(cfg.team.is_empty());
    }

    #[test]
    fn dogfood_config() {
        let cfg = include_str!("../.gitdch.toml");
        let res = toml::from_str(cfg);
        assert!(res.is_ok(), "{res:?}");
        let cfg: RawCfg = res.unwrap();

        assert_eq!(cfg.gitdch.package, Some("gitdch".into()));
        assert_eq!(cfg.gitdch.to, Some("HEAD".into()));
        assert!(!cfg.team.is_empty());
    }
}
