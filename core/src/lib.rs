//! Text Merge: a multi-way line alignment, diff, and merge engine.
//!
//! This crate is the engine core of a side-by-side comparison/merge tool:
//! - Aligning an arbitrary number of text buffers onto one common grid
//! - Classifying grid rows into navigable difference blocks
//! - Merge commands across panes (copy, union merge, ordered bulk merge)
//! - User-forced realignment (pins, isolation) and an undoable history
//!
//! It renders nothing and performs no I/O; loaders, version-control backends,
//! and the persistence layer plug in through the contracts in [`collab`].
//!
//! # Quick Start
//!
//! ```
//! use text_merge::{AlignConfig, Command, Document, EqualityPolicy, LineSequence};
//!
//! let left = LineSequence::from_text("left.txt", "a\nb\nc");
//! let right = LineSequence::from_text("right.txt", "a\nx\nc");
//! let mut doc = Document::new(
//!     vec![left, right],
//!     EqualityPolicy::default(),
//!     AlignConfig::default(),
//! )?;
//!
//! assert_eq!(doc.differences().blocks().len(), 1);
//! doc.apply(Command::CopyBlock { block: 0, src: 0, dst: 1 })?;
//! assert!(doc.differences().is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod alignment;
pub mod collab;
mod config;
mod difference;
mod document;
mod hashing;
pub(crate) mod line_view;
mod merge;
mod pane;
mod pool;
mod table;
mod undo;
pub mod view;

pub use alignment::align;
pub use config::{
    AlignConfig, AlignConfigBuilder, ConfigError, EqualityPolicy, LimitBehavior,
};
pub use difference::{DifferenceBlock, DifferenceIndex, Direction, NavResult, RowKind};
pub use document::{
    AlignmentTicket, Command, CommandError, Document, EditState, ViewUpdate,
};
pub use merge::{LineEdit, RangeError};
pub use pane::{ContentStamp, Line, LineSequence, Pane};
pub use pool::{LineId, LinePool};
pub use table::{AlignmentError, AlignmentRow, AlignmentTable, Isolation, Pin};
pub use undo::UndoStack;
