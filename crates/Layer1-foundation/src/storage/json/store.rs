//! 범위별 JSON 설정 저장소
//!
//! 글로벌 범위는 `<config_dir>/remark/`, 프로젝트 범위는 작업 디렉토리의
//! `.remark/` 아래에 파일을 둡니다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 글로벌 설정 디렉토리 이름 (<config_dir>/remark)
const GLOBAL_DIR: &str = "remark";

/// 프로젝트 설정 디렉토리 이름 (./.remark)
const PROJECT_DIR: &str = ".remark";

/// Where a settings file lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsScope {
    /// Per-user, shared by every project
    Global,
    /// Current working directory only
    Project,
}

impl SettingsScope {
    /// Directory holding this scope's files
    pub fn dir(&self) -> Result<PathBuf> {
        match self {
            Self::Global => dirs::config_dir()
                .map(|dir| dir.join(GLOBAL_DIR))
                .ok_or_else(|| Error::Config("Cannot find config directory".to_string())),
            Self::Project => Ok(std::env::current_dir()?.join(PROJECT_DIR)),
        }
    }
}

impl std::fmt::Display for SettingsScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Project => f.write_str("project"),
        }
    }
}

/// JSON files under one directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Store for a settings scope
    pub fn for_scope(scope: SettingsScope) -> Result<Self> {
        Ok(Self::new(scope.dir()?))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    /// Read and parse a file. A missing file is `Ok(None)`.
    pub fn read<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Malformed JSON file");
            Error::Json(e)
        })
    }

    /// Write pretty JSON, replacing the file in one rename.
    ///
    /// Returns the written path.
    pub fn write<T: Serialize>(&self, filename: &str, data: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.base_dir)?;

        let path = self.file_path(filename);
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, serde_json::to_string_pretty(data)?)?;
        std::fs::rename(&staging, &path)?;

        debug!(path = %path.display(), "Wrote JSON file");
        Ok(path)
    }
}
