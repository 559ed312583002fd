//! Contracts for the external collaborators the core depends on.
//!
//! The core performs no I/O of its own: loaders, version-control backends,
//! and the persistence layer implement these traits on the host side and
//! exchange already-materialized [`LineSequence`]s and [`PaneSnapshot`]s with
//! the document. Collaborator failures pass through to the caller unchanged;
//! core state is never touched by them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pane::{ContentStamp, LineSequence};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionId(pub String);

/// One entry of a version-control backend's history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub label: String,
}

/// What the persistence collaborator consumes: content plus the dirty flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneSnapshot {
    pub pane: usize,
    pub label: String,
    pub lines: Vec<String>,
    pub dirty: bool,
    pub stamp: ContentStamp,
}

/// Supplies initial pane content.
pub trait Loader {
    fn load(&mut self, source: &str) -> Result<LineSequence, LoadError>;
}

/// Retrieves revision content from a version-control backend.
pub trait VersionControl {
    fn list_revisions(&mut self, path: &str) -> Result<Vec<Revision>, FetchError>;
    fn fetch(&mut self, path: &str, revision: &RevisionId) -> Result<LineSequence, FetchError>;
}

/// Writes pane content back to its source.
pub trait Persistence {
    fn save(&mut self, snapshot: &PaneSnapshot) -> Result<(), SaveError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    NotFound { source: String },

    Unreadable { source: String, detail: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound { source } => {
                write!(f, "[TXM_IO_001] source '{source}' not found")
            }
            LoadError::Unreadable { source, detail } => {
                write!(f, "[TXM_IO_002] source '{source}' could not be read: {detail}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl LoadError {
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::NotFound { .. } => "TXM_IO_001",
            LoadError::Unreadable { .. } => "TXM_IO_002",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("[TXM_IO_003] revision '{revision}' is unknown to the backend")]
    UnknownRevision { revision: String },

    #[error("[TXM_IO_004] version-control backend failed: {detail}")]
    Backend { detail: String },
}

impl FetchError {
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::UnknownRevision { .. } => "TXM_IO_003",
            FetchError::Backend { .. } => "TXM_IO_004",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SaveError {
    Rejected { detail: String },

    ExternallyModified { source: String },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Rejected { detail } => {
                write!(f, "[TXM_IO_005] destination rejected the save: {detail}")
            }
            SaveError::ExternallyModified { source } => write!(
                f,
                "[TXM_IO_006] '{source}' changed externally since load; refusing to overwrite"
            ),
        }
    }
}

impl std::error::Error for SaveError {}

impl SaveError {
    pub fn code(&self) -> &'static str {
        match self {
            SaveError::Rejected { .. } => "TXM_IO_005",
            SaveError::ExternallyModified { .. } => "TXM_IO_006",
        }
    }
}
