use std::path::{Path, PathBuf};

/// Where the viewer keeps its own files. Everything lives in one directory
/// per [`DataPathType`] under a single base, `<data_local_dir>/animthumb` unless
/// `--datapath` says otherwise.
#[derive(Debug, Clone)]
pub struct DataPath {
    base: PathBuf,
}

/// The kinds of files animthumb writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPathType {
    /// daily rolling log files
    Log,
    /// settings.json
    Setting,
}

impl DataPathType {
    fn dir_name(self) -> &'static str {
        match self {
            DataPathType::Log => "logs",
            DataPathType::Setting => "settings",
        }
    }
}

impl DataPath {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    /// The per-user base, if the platform has a local data directory
    pub fn default_base() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("animthumb"))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn path(&self, typ: DataPathType) -> PathBuf {
        self.base.join(typ.dir_name())
    }
}

impl Default for DataPath {
    /// Falls back to the working directory when there is no data directory
    fn default() -> Self {
        Self::new(Self::default_base().unwrap_or_else(|| PathBuf::from(".")))
    }
}
