//! Script registry
//!
//! Owns the scanner, the click store and the most recent view. A refresh is
//! the only place where file system state and usage state meet:
//!
//! root -> scan -> load clicks -> classify -> view
//!
//! Launching goes the other way: the click is recorded and persisted, then
//! the path is handed to a `ScriptRunner`. The view is not reclassified until
//! the next refresh.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::clicks::{ClickDatabase, ClickStore};
use crate::config::Config;
use crate::error::{AsgardError, Result};
use crate::host::{ScriptRunner, Settings};
use crate::logging;
use crate::scripts::{
    apply_filter, classify, favorite_threshold, FileScanner, FileSystem, Percentile,
    RegistryView, ScriptFile, StdFileSystem,
};

/// Result of a successful launch
#[derive(Debug)]
pub struct LaunchOutcome {
    /// New click count, `None` if tracking failed
    pub clicks: Option<u64>,
    /// First tracking failure of the session, for the caller to show the user.
    /// Later failures are only logged.
    pub tracking_error: Option<AsgardError>,
}

pub struct ScriptRegistry {
    scanner: FileScanner,
    clicks: ClickStore,
    view: RegistryView,
    tracking_error_reported: bool,
}

impl ScriptRegistry {
    pub fn new(scanner: FileScanner, clicks: ClickStore) -> Self {
        ScriptRegistry {
            scanner,
            clicks,
            view: RegistryView::default(),
            tracking_error_reported: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FileScanner::from_config(config),
            ClickStore::with_path(config.clicks_path()),
        )
    }

    /// Most recent successfully computed view
    pub fn view(&self) -> &RegistryView {
        &self.view
    }

    pub fn clicks(&self) -> &ClickDatabase {
        self.clicks.database()
    }

    /// Rescan `root`, reload clicks and reclassify.
    ///
    /// On failure the previous view is kept.
    pub fn refresh(&mut self, root: &Path, percentile: Percentile) -> Result<&RegistryView> {
        self.refresh_with(&StdFileSystem, root, percentile)
    }

    #[instrument(name = "registry_refresh", skip_all, fields(root = %root.display()))]
    pub fn refresh_with(
        &mut self,
        fs: &dyn FileSystem,
        root: &Path,
        percentile: Percentile,
    ) -> Result<&RegistryView> {
        self.clicks.load().map_err(|e| {
            warn!(error = %e, "Loading clicks failed, keeping previous view");
            e
        })?;
        let files = self.scanner.scan_with(fs, root).map_err(|e| {
            warn!(error = %e, "Scan failed, keeping previous view");
            e
        })?;

        self.view = classify(&files, self.clicks.database(), percentile);
        info!(
            favorites = self.view.favorites.len(),
            standard = self.view.standard.len(),
            "Registry refreshed"
        );
        Ok(&self.view)
    }

    /// Refresh from the configured root; no root means an empty view.
    pub fn refresh_from_settings(
        &mut self,
        settings: &Settings,
        percentile: Percentile,
    ) -> Result<&RegistryView> {
        match &settings.root_directory {
            Some(root) => self.refresh(root, percentile),
            None => {
                info!("No root directory configured, nothing to scan");
                self.view = RegistryView::default();
                Ok(&self.view)
            }
        }
    }

    /// Reload click counts without rescanning
    pub fn load_clicks(&mut self) -> Result<&ClickDatabase> {
        self.clicks.load()
    }

    /// Current view narrowed to names containing `query`
    pub fn apply_filter(&self, query: Option<&str>) -> RegistryView {
        apply_filter(&self.view, query)
    }

    /// First script called `name`, favorites before standard
    pub fn find(&self, name: &str) -> Option<Arc<ScriptFile>> {
        self.view.iter().find(|s| s.name == name).cloned()
    }

    /// Count one invocation of `name` and persist it.
    ///
    /// Works before any refresh; existing counts on disk are kept.
    pub fn record_invocation(&mut self, name: &str) -> Result<u64> {
        self.clicks.increment(name)
    }

    /// Record the click, then run the script.
    ///
    /// Tracking is best-effort: a failed save never stops the script from
    /// running. A runner failure is returned as the error.
    #[instrument(name = "registry_launch", skip(self, runner), fields(name = %script.name))]
    pub fn launch(
        &mut self,
        script: &ScriptFile,
        runner: &mut dyn ScriptRunner,
    ) -> Result<LaunchOutcome> {
        let tracked = self.record_invocation(&script.name);

        if let Err(e) = runner.run_script(&script.path) {
            logging::log_script_event(&script.name, "launch", false);
            if let Err(tracking) = &tracked {
                warn!(error = %tracking, "Click was not recorded");
            }
            return Err(e);
        }
        logging::log_script_event(&script.name, "launch", true);

        let (clicks, tracking_error) = match tracked {
            Ok(count) => (Some(count), None),
            Err(e) if !self.tracking_error_reported => {
                self.tracking_error_reported = true;
                warn!(error = %e, "Click tracking failed");
                (None, Some(e))
            }
            Err(e) => {
                warn!(error = %e, "Click tracking failed again");
                (None, None)
            }
        };

        Ok(LaunchOutcome {
            clicks,
            tracking_error,
        })
    }

    /// Threshold the current clicks would produce
    pub fn threshold(&self, percentile: Percentile) -> Option<u64> {
        favorite_threshold(self.clicks.database(), percentile)
    }

    pub fn reset_clicks(&mut self) -> Result<()> {
        self.clicks.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    struct RecordingRunner {
        ran: Vec<PathBuf>,
        fail: bool,
    }

    impl RecordingRunner {
        fn new() -> Self {
            RecordingRunner {
                ran: Vec::new(),
                fail: false,
            }
        }
    }

    impl ScriptRunner for RecordingRunner {
        fn run_script(&mut self, path: &Path) -> Result<()> {
            self.ran.push(path.to_path_buf());
            if self.fail {
                Err(AsgardError::Launch {
                    path: path.to_path_buf(),
                    message: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        _temp: tempfile::TempDir,
        root: PathBuf,
        clicks_path: PathBuf,
    }

    fn fixture(names: &[&str]) -> Fixture {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("scripts");
        fs::create_dir_all(root.join("nested")).unwrap();
        for (i, name) in names.iter().enumerate() {
            let dir = if i % 2 == 0 { root.clone() } else { root.join("nested") };
            fs::write(dir.join(format!("{}.jsx", name)), "").unwrap();
        }
        fs::create_dir_all(temp.path().join("data")).unwrap();
        let clicks_path = temp.path().join("data/clicks.json");
        Fixture {
            _temp: temp,
            root,
            clicks_path,
        }
    }

    fn registry(f: &Fixture) -> ScriptRegistry {
        ScriptRegistry::new(FileScanner::new(".jsx", true), ClickStore::with_path(&f.clicks_path))
    }

    fn names(list: &[Arc<ScriptFile>]) -> Vec<&str> {
        list.iter().map(|s| s.name.as_str()).collect()
    }

    fn pct(p: f64) -> Percentile {
        Percentile::new(p).unwrap()
    }

    #[test]
    fn test_refresh_without_clicks_is_all_standard() {
        let f = fixture(&["B", "A", "C"]);
        let mut reg = registry(&f);

        let view = reg.refresh(&f.root, pct(0.25)).unwrap();

        assert!(view.favorites.is_empty());
        assert_eq!(names(&view.standard), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_refresh_applies_click_counts() {
        let f = fixture(&["A", "B", "C"]);
        fs::write(&f.clicks_path, r#"{"A": 10, "B": 2, "C": 1}"#).unwrap();
        let mut reg = registry(&f);

        let view = reg.refresh(&f.root, pct(0.34)).unwrap();

        assert_eq!(names(&view.favorites), vec!["A", "B"]);
        assert_eq!(names(&view.standard), vec!["C"]);
    }

    #[test]
    fn test_refresh_failure_keeps_previous_view() {
        let f = fixture(&["A", "B"]);
        let mut reg = registry(&f);
        reg.refresh(&f.root, pct(0.25)).unwrap();
        let before = reg.view().clone();

        let err = reg.refresh(&f.root.join("missing"), pct(0.25)).unwrap_err();
        assert!(matches!(err, AsgardError::NotFound { .. }));
        assert_eq!(reg.view(), &before);

        fs::write(&f.clicks_path, "garbage").unwrap();
        let err = reg.refresh(&f.root, pct(0.25)).unwrap_err();
        assert!(matches!(err, AsgardError::CorruptData { .. }));
        assert_eq!(reg.view(), &before);
    }

    #[test]
    fn test_refresh_from_settings_without_root_is_empty() {
        let f = fixture(&["A"]);
        let mut reg = registry(&f);
        reg.refresh(&f.root, pct(0.25)).unwrap();

        let view = reg.refresh_from_settings(&Settings::default(), pct(0.25)).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_record_invocation_does_not_reclassify() {
        let f = fixture(&["A", "B"]);
        let mut reg = registry(&f);
        reg.refresh(&f.root, pct(0.25)).unwrap();

        assert_eq!(reg.record_invocation("A").unwrap(), 1);
        assert!(reg.view().favorites.is_empty());

        let view = reg.refresh(&f.root, pct(0.25)).unwrap();
        assert_eq!(names(&view.favorites), vec!["A"]);
    }

    #[test]
    fn test_three_invocations_persist_across_sessions() {
        let f = fixture(&["A", "B", "C"]);
        {
            let mut reg = registry(&f);
            reg.refresh(&f.root, pct(0.25)).unwrap();
            for _ in 0..3 {
                reg.record_invocation("C").unwrap();
            }
        }

        let mut reg = registry(&f);
        reg.refresh(&f.root, pct(0.25)).unwrap();
        assert_eq!(reg.clicks().count("C"), 3);
        assert_eq!(names(&reg.view().favorites), vec!["C"]);
    }

    #[test]
    fn test_find_prefers_favorites() {
        let f = fixture(&["Export", "Other"]);
        fs::write(f.root.join("nested/Export.jsx"), "").unwrap();
        let mut reg = registry(&f);
        reg.refresh(&f.root, pct(0.25)).unwrap();

        let found = reg.find("Export").unwrap();
        assert_eq!(found.name, "Export");
        assert!(reg.find("Nope").is_none());
    }

    #[test]
    fn test_apply_filter_narrows_both_groups() {
        let f = fixture(&["Render Mov", "Render Png", "Align"]);
        fs::write(&f.clicks_path, r#"{"Render Mov": 5}"#).unwrap();
        let mut reg = registry(&f);
        reg.refresh(&f.root, pct(0.25)).unwrap();

        let filtered = reg.apply_filter(Some("render"));

        assert_eq!(names(&filtered.favorites), vec!["Render Mov"]);
        assert_eq!(names(&filtered.standard), vec!["Render Png"]);
        assert_eq!(reg.apply_filter(None), *reg.view());
    }

    #[test]
    fn test_launch_records_then_runs() {
        let f = fixture(&["A"]);
        let mut reg = registry(&f);
        reg.refresh(&f.root, pct(0.25)).unwrap();
        let script = reg.find("A").unwrap();
        let mut runner = RecordingRunner::new();

        let outcome = reg.launch(&script, &mut runner).unwrap();

        assert_eq!(outcome.clicks, Some(1));
        assert!(outcome.tracking_error.is_none());
        assert_eq!(runner.ran, vec![script.path.clone()]);
    }

    #[test]
    fn test_launch_runs_even_when_tracking_fails() {
        let f = fixture(&["A"]);
        // clicks path is a directory, so every save fails
        fs::create_dir_all(&f.clicks_path).unwrap();
        let mut reg = registry(&f);
        let script = ScriptFile::new("A", f.root.join("A.jsx"));
        let mut runner = RecordingRunner::new();

        let first = reg.launch(&script, &mut runner).unwrap();
        assert!(first.tracking_error.is_some());
        assert_eq!(first.clicks, None);

        let second = reg.launch(&script, &mut runner).unwrap();
        assert!(second.tracking_error.is_none());

        assert_eq!(runner.ran.len(), 2);
    }

    #[test]
    fn test_launch_runner_failure_is_error() {
        let f = fixture(&["A"]);
        let mut reg = registry(&f);
        let script = ScriptFile::new("A", f.root.join("A.jsx"));
        let mut runner = RecordingRunner::new();
        runner.fail = true;

        assert!(reg.launch(&script, &mut runner).is_err());
        // the attempt still counts
        assert_eq!(reg.clicks().count("A"), 1);
    }

    #[test]
    fn test_load_clicks_without_refresh() {
        let f = fixture(&["A"]);
        fs::write(&f.clicks_path, r#"{"A": 4}"#).unwrap();
        let mut reg = registry(&f);

        assert_eq!(reg.load_clicks().unwrap().count("A"), 4);
        assert!(reg.view().is_empty());
    }

    #[test]
    fn test_record_without_refresh_keeps_history() {
        let f = fixture(&["A"]);
        fs::write(&f.clicks_path, r#"{"Old": 40, "Other": 7}"#).unwrap();
        let mut reg = registry(&f);

        assert_eq!(reg.record_invocation("New").unwrap(), 1);

        let mut store = ClickStore::with_path(&f.clicks_path);
        let clicks = store.load().unwrap();
        assert_eq!(clicks.count("Old"), 40);
        assert_eq!(clicks.count("Other"), 7);
        assert_eq!(clicks.count("New"), 1);
    }

    #[test]
    fn test_record_after_failed_scan_keeps_history() {
        let f = fixture(&["A"]);
        fs::write(&f.clicks_path, r#"{"Old": 40}"#).unwrap();
        let mut reg = registry(&f);

        assert!(reg.refresh(&f.root.join("missing"), pct(0.25)).is_err());
        reg.record_invocation("New").unwrap();

        let mut store = ClickStore::with_path(&f.clicks_path);
        let clicks = store.load().unwrap();
        assert_eq!(clicks.count("Old"), 40);
        assert_eq!(clicks.count("New"), 1);
    }

    #[test]
    fn test_launch_without_refresh_keeps_history() {
        let f = fixture(&["A"]);
        fs::write(&f.clicks_path, r#"{"A": 2, "B": 9}"#).unwrap();
        let mut reg = registry(&f);
        let script = ScriptFile::new("A", f.root.join("A.jsx"));
        let mut runner = RecordingRunner::new();

        let outcome = reg.launch(&script, &mut runner).unwrap();

        assert_eq!(outcome.clicks, Some(3));
        assert_eq!(reg.clicks().count("B"), 9);
    }

    #[test]
    fn test_record_on_corrupt_clicks_is_tracking_error() {
        let f = fixture(&["A"]);
        fs::write(&f.clicks_path, "{broken").unwrap();
        let mut reg = registry(&f);
        let script = ScriptFile::new("A", f.root.join("A.jsx"));
        let mut runner = RecordingRunner::new();

        let outcome = reg.launch(&script, &mut runner).unwrap();

        assert!(matches!(outcome.tracking_error, Some(AsgardError::CorruptData { .. })));
        assert_eq!(runner.ran.len(), 1);
        assert_eq!(fs::read_to_string(&f.clicks_path).unwrap(), "{broken");
    }

    #[test]
    fn test_refresh_from_settings_scans_configured_root() {
        let f = fixture(&["B", "A"]);
        fs::write(&f.clicks_path, r#"{"B": 3}"#).unwrap();
        let mut reg = registry(&f);
        let settings = Settings {
            root_directory: Some(f.root.clone()),
            ..Settings::default()
        };

        let view = reg.refresh_from_settings(&settings, pct(0.25)).unwrap();

        assert_eq!(names(&view.favorites), vec!["B"]);
        assert_eq!(names(&view.standard), vec!["A"]);
    }

    #[test]
    fn test_reset_clicks_empties_favorites() {
        let f = fixture(&["A", "B"]);
        let mut reg = registry(&f);
        reg.record_invocation("A").unwrap();
        reg.refresh(&f.root, pct(0.25)).unwrap();
        assert_eq!(reg.threshold(pct(0.25)), Some(1));

        reg.reset_clicks().unwrap();
        let view = reg.refresh(&f.root, pct(0.25)).unwrap();

        assert!(view.favorites.is_empty());
        assert_eq!(reg.threshold(pct(0.25)), None);
    }
}
