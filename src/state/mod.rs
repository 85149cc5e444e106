//! State module for tracking crawl task progress
//!
//! # Components
//!
//! - `TaskState`: lifecycle of one website's crawl task (init, running, and
//!   the terminal outcomes)

mod task_state;

pub use task_state::TaskState;
