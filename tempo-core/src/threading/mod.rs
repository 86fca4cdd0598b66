//! Threading primitives for launching actions
//!
//! Every launched action runs on its own native OS thread (std::thread), so a
//! slow or faulting action never holds up the dispatching thread.

pub mod wait_group;

pub use wait_group::WaitGroup;
