//! Favorites classification
//!
//! Splits scanned scripts into FAVORITES and STANDARD groups using a
//! threshold taken from the observed click distribution rather than a fixed
//! count, so the favorites set follows how usage shifts over time.
//!
//! Threshold: sort every recorded count descending and take the value at
//! index `floor(len * percentile)`. A script is a favorite when its own count
//! (0 if unrecorded) is at least that value. With no recorded counts there is
//! no threshold and every script is standard.

use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::clicks::ClickDatabase;
use crate::config::DEFAULT_FAVORITE_PERCENTILE;
use crate::error::{AsgardError, Result};

use super::types::{RegistryView, ScriptFile};

/// Fraction of tracked scripts, strictly between 0 and 1
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentile(f64);

impl Percentile {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 && value < 1.0 {
            Ok(Percentile(value))
        } else {
            Err(AsgardError::InvalidPercentile(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Percentile {
    fn default() -> Self {
        Percentile(DEFAULT_FAVORITE_PERCENTILE)
    }
}

impl TryFrom<f64> for Percentile {
    type Error = AsgardError;

    fn try_from(value: f64) -> Result<Self> {
        Percentile::new(value)
    }
}

/// Click count a script needs to be a favorite, or `None` when no clicks
/// have been recorded at all.
pub fn favorite_threshold(clicks: &ClickDatabase, percentile: Percentile) -> Option<u64> {
    let mut pool: Vec<u64> = clicks.counts().collect();
    if pool.is_empty() {
        return None;
    }
    pool.sort_unstable_by(|a, b| b.cmp(a));

    // percentile < 1 keeps the index in bounds; min() guards float rounding
    let index = ((pool.len() as f64) * percentile.value()).floor() as usize;
    let index = index.min(pool.len() - 1);
    Some(pool[index])
}

/// Partition `files` into favorites and standard, each sorted by name.
///
/// Names compare by byte order; equal names fall back to path order.
#[instrument(level = "debug", skip_all, fields(file_count = files.len(), percentile = percentile.value()))]
pub fn classify(files: &[ScriptFile], clicks: &ClickDatabase, percentile: Percentile) -> RegistryView {
    let threshold = favorite_threshold(clicks, percentile);

    let mut favorites: Vec<Arc<ScriptFile>> = Vec::new();
    let mut standard: Vec<Arc<ScriptFile>> = Vec::new();

    for file in files {
        let is_favorite = match threshold {
            Some(t) => clicks.count(&file.name) >= t,
            None => false,
        };
        if is_favorite {
            favorites.push(Arc::new(file.clone()));
        } else {
            standard.push(Arc::new(file.clone()));
        }
    }

    favorites.sort_by(|a, b| by_name(a, b));
    standard.sort_by(|a, b| by_name(a, b));

    debug!(
        threshold = ?threshold,
        favorites_count = favorites.len(),
        standard_count = standard.len(),
        "Classified scripts"
    );

    RegistryView {
        favorites,
        standard,
    }
}

fn by_name(a: &ScriptFile, b: &ScriptFile) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn script(name: &str) -> ScriptFile {
        ScriptFile::new(name, format!("/scripts/{}.jsx", name))
    }

    fn db(pairs: &[(&str, u64)]) -> ClickDatabase {
        pairs.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    }

    fn names(list: &[Arc<ScriptFile>]) -> Vec<&str> {
        list.iter().map(|s| s.name.as_str()).collect()
    }

    fn pct(p: f64) -> Percentile {
        Percentile::new(p).unwrap()
    }

    #[test]
    fn test_percentile_rejects_out_of_range() {
        assert!(Percentile::new(0.0).is_err());
        assert!(Percentile::new(1.0).is_err());
        assert!(Percentile::new(-0.2).is_err());
        assert!(Percentile::new(f64::NAN).is_err());
        assert!(Percentile::try_from(0.5).is_ok());
    }

    #[test]
    fn test_threshold_worked_example() {
        let clicks = db(&[("A", 10), ("B", 2), ("C", 1)]);
        // sorted [10, 2, 1], floor(3 * 0.34) = 1
        assert_eq!(favorite_threshold(&clicks, pct(0.34)), Some(2));
    }

    #[test]
    fn test_threshold_empty_pool_is_none() {
        assert_eq!(favorite_threshold(&ClickDatabase::new(), pct(0.25)), None);
    }

    #[test]
    fn test_threshold_small_pool_takes_top_value() {
        let clicks = db(&[("A", 5), ("B", 3)]);
        // floor(2 * 0.25) = 0
        assert_eq!(favorite_threshold(&clicks, pct(0.25)), Some(5));
    }

    #[test]
    fn test_threshold_high_percentile_stays_in_bounds() {
        let clicks = db(&[("A", 5), ("B", 3), ("C", 1)]);
        assert_eq!(favorite_threshold(&clicks, pct(0.999_999)), Some(1));
    }

    #[test]
    fn test_classify_worked_example() {
        let files = vec![script("C"), script("A"), script("B")];
        let clicks = db(&[("A", 10), ("B", 2), ("C", 1)]);

        let view = classify(&files, &clicks, pct(0.34));

        assert_eq!(names(&view.favorites), vec!["A", "B"]);
        assert_eq!(names(&view.standard), vec!["C"]);
    }

    #[test]
    fn test_classify_empty_pool_all_standard() {
        let files = vec![script("b"), script("a")];

        let view = classify(&files, &ClickDatabase::new(), pct(0.25));

        assert!(view.favorites.is_empty());
        assert_eq!(names(&view.standard), vec!["a", "b"]);
    }

    #[test]
    fn test_classify_unrecorded_scripts_are_standard() {
        let files = vec![script("Tracked"), script("Fresh")];
        let clicks = db(&[("Tracked", 1)]);

        let view = classify(&files, &clicks, pct(0.25));

        assert_eq!(names(&view.favorites), vec!["Tracked"]);
        assert_eq!(names(&view.standard), vec!["Fresh"]);
    }

    #[test]
    fn test_classify_clicks_for_deleted_scripts_still_shape_threshold() {
        // "Gone" is no longer on disk but its count stays in the pool
        let files = vec![script("Kept")];
        let clicks = db(&[("Gone", 50), ("Kept", 3), ("Other", 1)]);

        let view = classify(&files, &clicks, pct(0.25));

        assert!(view.favorites.is_empty());
        assert_eq!(names(&view.standard), vec!["Kept"]);
    }

    #[test]
    fn test_classify_sort_is_ordinal() {
        let files = vec![script("beta"), script("Alpha"), script("alpha"), script("Beta")];

        let view = classify(&files, &ClickDatabase::new(), pct(0.5));

        // uppercase sorts before lowercase by byte value
        assert_eq!(names(&view.standard), vec!["Alpha", "Beta", "alpha", "beta"]);
    }

    #[test]
    fn test_classify_duplicate_names_share_count() {
        let files = vec![
            ScriptFile::new("Export", "/b/Export.jsx"),
            ScriptFile::new("Export", "/a/Export.jsx"),
            script("Misc"),
        ];
        let clicks = db(&[("Export", 4), ("Misc", 1)]);

        let view = classify(&files, &clicks, pct(0.25));

        let paths: Vec<_> = view.favorites.iter().map(|s| s.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/a/Export.jsx"), PathBuf::from("/b/Export.jsx")]
        );
    }

    #[test]
    fn test_classify_groups_are_disjoint_and_complete() {
        let files: Vec<_> = (0..20).map(|i| script(&format!("s{:02}", i))).collect();
        let clicks: ClickDatabase = (0..20)
            .filter(|i| i % 3 != 0)
            .map(|i| (format!("s{:02}", i), (i * 7 % 11) as u64))
            .collect();
        let percentile = pct(0.3);
        let threshold = favorite_threshold(&clicks, percentile).unwrap();

        let view = classify(&files, &clicks, percentile);

        let fav: HashSet<_> = view.favorites.iter().map(|s| s.path.clone()).collect();
        let standard: HashSet<_> = view.standard.iter().map(|s| s.path.clone()).collect();
        let all: HashSet<_> = files.iter().map(|s| s.path.clone()).collect();
        assert!(fav.is_disjoint(&standard));
        assert_eq!(fav.union(&standard).cloned().collect::<HashSet<_>>(), all);

        for s in &view.favorites {
            assert!(clicks.count(&s.name) >= threshold);
        }
        for s in &view.standard {
            assert!(clicks.count(&s.name) < threshold);
        }
    }
}
