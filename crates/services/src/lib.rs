//! Engagement and moderation logic for Agora.
//!
//! Four cooperating policies composed around the store ports: the ban gate,
//! ownership/capability resolution, the response sequencer, thread ranking,
//! and the reaction toggle. [`forum::ForumService`] wires them into the
//! operations the request layer invokes.

pub mod access;
pub mod ban;
pub mod forum;
mod locks;
pub mod ranking;
pub mod reactions;
pub mod sequencer;

pub use forum::{ForumService, SectionListing, MAX_MESSAGE_CHARS, MAX_NAME_CHARS, MAX_TITLE_CHARS};
pub use ranking::{RankedThread, ThreadPage, PAGE_SIZE};
pub use reactions::VoteOutcome;
