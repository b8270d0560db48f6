//! Read-only graph analyses run after post-processing.

mod cohesion;
mod dependency_profile;

pub use cohesion::find_cohesion;
pub use dependency_profile::{find_dependency_profiles, DependencyProfiles};
