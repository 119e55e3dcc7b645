//! Filesystem router: one directory per relationship.

use docflow::{FlowRecord, Relationship, ResultRouter};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Writes every routed record under `<root>/<relationship>/`, alongside a
/// `<name>.attributes.json` file holding its attributes.
pub struct DirectoryRouter {
    root: PathBuf,
    written: HashMap<(Relationship, String), PathBuf>,
}

impl DirectoryRouter {
    pub fn new(root: impl Into<PathBuf>) -> docflow::Result<Self> {
        let root = root.into();
        for relationship in Relationship::ALL {
            fs::create_dir_all(root.join(relationship.as_str()))?;
        }
        Ok(Self {
            root,
            written: HashMap::new(),
        })
    }

    /// Where `record` was written for `relationship`, if it was.
    pub fn path_of(&self, relationship: Relationship, record: &FlowRecord) -> Option<&Path> {
        self.written
            .get(&(relationship, record.id().to_string()))
            .map(PathBuf::as_path)
    }

    fn target_path(&self, relationship: Relationship, record: &FlowRecord) -> PathBuf {
        let dir = self.root.join(relationship.as_str());
        let name = record
            .filename()
            .and_then(|name| Path::new(name).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| record.id().to_string());

        let candidate = dir.join(&name);
        if candidate.exists() {
            dir.join(format!("{}-{}", record.id(), name))
        } else {
            candidate
        }
    }
}

impl ResultRouter for DirectoryRouter {
    fn transfer(&mut self, relationship: Relationship, record: FlowRecord) -> docflow::Result<()> {
        let path = self.target_path(relationship, &record);
        let mut reader = record.open()?;
        io::copy(&mut reader, &mut File::create(&path)?)?;

        let mut sidecar = path.clone().into_os_string();
        sidecar.push(".attributes.json");
        fs::write(&sidecar, serde_json::to_vec_pretty(record.attributes())?)?;

        tracing::debug!(relationship = %relationship, path = %path.display(), "Wrote record");
        self.written.insert((relationship, record.id().to_string()), path);
        Ok(())
    }
}
