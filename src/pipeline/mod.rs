//! The job: one image and one audio clip in, one video out.

pub mod job;
pub mod workdir;

pub use job::{AnimationJob, JobOutput, JobRequest, PreparedJob};
pub use workdir::WorkDir;
