//! Client-side state: identity, token persistence and resource hooks.
//!
//! DESIGN
//! ======
//! State is split by domain. `session` owns identity; the hook modules
//! (`jobs`, `job`, `applications`) each own one piece of fetched data and
//! share the sequencing rules in `resource`. Hooks never read the session.

pub mod applications;
pub mod job;
pub mod jobs;
pub mod outcome;
pub mod resource;
pub mod session;
pub mod token;
