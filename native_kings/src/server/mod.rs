pub mod run;
pub mod state;
pub mod token;
pub mod ws;

pub use run::{build_router, run_server};
pub use state::{Grant, IssueError, RelayState};
