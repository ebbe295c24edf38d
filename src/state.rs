use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::data::loader::load_database;
use crate::data::NeoDatabase;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// A loaded dataset plus what is needed to rebuild it.
pub struct Session {
    /// NEO metadata file.
    pub neo_path: PathBuf,

    /// Close-approach file.
    pub cad_path: PathBuf,

    /// The dataset built from the files at their last successful load.
    pub database: NeoDatabase,

    /// Modification times of both files when `database` was built.
    loaded_mtimes: [Option<SystemTime>; 2],

    /// Successful reloads since the first load.
    generation: u64,
}

impl Session {
    /// Read both files and build the first dataset.
    pub fn load(neo_path: impl Into<PathBuf>, cad_path: impl Into<PathBuf>) -> Result<Self> {
        let neo_path = neo_path.into();
        let cad_path = cad_path.into();
        let loaded_mtimes = [modified(&neo_path), modified(&cad_path)];
        let database = load_database(&neo_path, &cad_path)?;
        Ok(Self {
            neo_path,
            cad_path,
            database,
            loaded_mtimes,
            generation: 0,
        })
    }

    /// Build a fresh dataset from the files. On failure the current one is kept.
    pub fn reload(&mut self) -> Result<()> {
        let mtimes = [modified(&self.neo_path), modified(&self.cad_path)];
        let database = load_database(&self.neo_path, &self.cad_path)
            .context("reloading data files; keeping the previous dataset")?;
        self.generation += 1;
        log::info!(
            "Reloaded {} NEOs and {} close approaches (generation {})",
            database.len_neos(),
            database.len_approaches(),
            self.generation
        );
        self.database = database;
        self.loaded_mtimes = mtimes;
        Ok(())
    }

    /// How many times the dataset has been rebuilt since [`Session::load`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether either file changed on disk since the dataset was built.
    pub fn is_stale(&self) -> bool {
        let now = [modified(&self.neo_path), modified(&self.cad_path)];
        now.iter()
            .zip(&self.loaded_mtimes)
            .any(|(current, loaded)| match (current, loaded) {
                (Some(c), Some(l)) => c > l,
                (c, l) => c.is_some() != l.is_some(),
            })
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;
    use std::time::Duration;

    use super::*;

    const NEOS: &str = "pdes,name,pha,diameter\n433,Eros,N,16.84\n";
    const CAD: &str = r#"{"fields": ["des", "cd", "dist", "v_rel"],
        "data": [["433", "2012-Jan-31 11:01", "0.178", "5.95"]]}"#;

    pub(crate) fn write_files(dir: &Path) -> (PathBuf, PathBuf) {
        let neo = dir.join("neos.csv");
        let cad = dir.join("cad.json");
        fs::write(&neo, NEOS).unwrap();
        fs::write(&cad, CAD).unwrap();
        (neo, cad)
    }

    pub(crate) fn touch_later(path: &Path) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60)).unwrap();
    }

    #[test]
    fn load_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let (neo, cad) = write_files(dir.path());

        let mut session = Session::load(&neo, &cad).unwrap();
        assert_eq!(session.database.len_approaches(), 1);
        assert!(!session.is_stale());

        fs::write(
            &cad,
            r#"{"fields": ["des", "cd", "dist", "v_rel"],
                "data": [["433", "2012-Jan-31 11:01", "0.178", "5.95"],
                         ["433", "2056-Jan-24 10:00", "0.15", "6.1"]]}"#,
        )
        .unwrap();
        touch_later(&cad);
        assert!(session.is_stale());

        session.reload().unwrap();
        assert_eq!(session.database.len_approaches(), 2);
        assert!(!session.is_stale());
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn failed_reload_keeps_previous_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let (neo, cad) = write_files(dir.path());
        let mut session = Session::load(&neo, &cad).unwrap();

        fs::write(&cad, "{ not json").unwrap();
        assert!(session.reload().is_err());
        assert_eq!(session.generation(), 0);
        assert_eq!(session.database.len_approaches(), 1);
        assert!(session.database.get_neo_by_name("eros").is_some());
    }
}
