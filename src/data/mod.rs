//! Data processing for status snapshots.
//!
//! This module turns raw status snapshots into display-ready data.
//!
//! ## Submodules
//!
//! - [`projection`]: The Loading / Empty / Populated decision and the
//!   flattening of connections and sink stats into table rows
//! - [`history`]: Per-source message count history for rates and sparklines
//!
//! ## Data Flow
//!
//! ```text
//! StatusState (status + error slots)
//!        │
//!        ▼
//! projection::project()
//!        │
//!        ├──▶ Projection::{Loading, Empty, Populated}
//!        │
//!        └──▶ History::record() (for rates and sparklines)
//! ```

pub mod history;
pub mod projection;

pub use history::History;
pub use projection::{
    project, BlankState, Header, Indicator, ItemTable, Link, Projection, StatusTables,
};
