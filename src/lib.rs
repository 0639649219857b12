//! bprov: bulk board provisioning
//!
//! Invites people by email (or picks existing accounts) and adds every one of
//! them to a set of boards, reporting who was added, invited or failed.

pub mod cli;
pub mod core;
