//! CLI subcommand implementations.

pub mod check;
pub mod crawl;

use std::path::Path;

use anyhow::{Context, Result};
use votecrawler_lib::{parse_url_list, PartyCatalog, UrlEntry};

/// Environment variable naming a party catalog YAML file.
pub const PARTIES_ENV: &str = "VOTECRAWLER_PARTIES";

/// Reads and validates the URL list before any request goes out.
pub fn read_url_file(path: &Path) -> Result<Vec<UrlEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read URL file {}", path.display()))?;
    let entries = parse_url_list(&content)?;
    Ok(entries)
}

/// Loads the catalog from `--parties`, then `VOTECRAWLER_PARTIES`, then the
/// built-in default.
pub fn load_catalog(path: Option<&Path>) -> Result<PartyCatalog> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(PARTIES_ENV).map(Into::into));
    match path {
        Some(path) => {
            let yaml = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read party catalog {}", path.display()))?;
            PartyCatalog::from_yaml(&yaml)
                .with_context(|| format!("invalid party catalog {}", path.display()))
        }
        None => Ok(PartyCatalog::builtin()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use votecrawler_lib::VoteCrawlerError;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("votecrawler-cmd-{}-{}", std::process::id(), name))
    }

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = temp_path(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_url_file_is_fatal() {
        let path = temp_path("does-not-exist.txt");
        let err = read_url_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read URL file"));
    }

    #[test]
    fn test_malformed_url_reports_line() {
        let path = write_temp(
            "urls.txt",
            "http://x.example/a?detailonr=1\n\nhttp://x.example/b?wahl=2\n",
        );
        let err = read_url_file(&path).unwrap_err();
        match err.downcast_ref::<VoteCrawlerError>() {
            Some(VoteCrawlerError::MalformedUrl { line, url, .. }) => {
                assert_eq!(*line, 3);
                assert_eq!(url, "http://x.example/b?wahl=2");
            }
            other => panic!("expected MalformedUrl, got {:?}", other),
        }
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_url_file_entries_in_order() {
        let path = write_temp(
            "good-urls.txt",
            "http://x.example/a?detailonr=1\nhttp://y.other/b?detailonr=2&z=0\n",
        );
        let entries = read_url_file(&path).unwrap();
        let keys: Vec<String> = entries.iter().map(UrlEntry::key).collect();
        assert_eq!(keys, vec!["example-1", "other-2"]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_invalid_catalog_file_is_fatal() {
        let path = write_temp("bad-parties.yml", "parties: []\n");
        let err = load_catalog(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid party catalog"));
        fs::remove_file(&path).unwrap();
    }

    // Only test touching VOTECRAWLER_PARTIES, so the env steps cannot race.
    #[test]
    fn test_catalog_precedence() {
        let flag = write_temp("flag-parties.yml", "parties:\n  - id: \"KPÖ\"\n");
        let env = write_temp("env-parties.yml", "parties:\n  - id: \"BIER\"\n");

        std::env::remove_var(PARTIES_ENV);
        assert_eq!(load_catalog(None).unwrap(), PartyCatalog::builtin().unwrap());

        std::env::set_var(PARTIES_ENV, &env);
        let from_env = load_catalog(None).unwrap();
        assert_eq!(from_env.ids().collect::<Vec<_>>(), vec!["BIER"]);

        let from_flag = load_catalog(Some(&flag)).unwrap();
        assert_eq!(from_flag.ids().collect::<Vec<_>>(), vec!["KPÖ"]);

        std::env::remove_var(PARTIES_ENV);
        fs::remove_file(&flag).unwrap();
        fs::remove_file(&env).unwrap();
    }
}
