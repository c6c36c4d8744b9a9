//! Video assembly: frame sinks, the ffmpeg encoder, audio muxing and probing.

pub mod assemble;
pub mod ffmpeg;
pub mod mux;
pub mod probe;
pub mod sink;

pub use assemble::{AssembleOptions, AssembleOutcome, assemble};
pub use ffmpeg::{EncodeConfig, FfmpegSink};
pub use mux::{MuxOptions, MuxOutcome};
pub use probe::{FfprobeOptions, MediaInfo, probe, probe_duration};
pub use sink::{FrameSink, InMemorySink};
