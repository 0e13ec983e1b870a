// Covergen - Library Entry Point
//
// Smart cover generation for video uploads: probe, plan sampling points,
// extract candidate frames, score them, encode the best one.

pub mod constants;
pub mod error;
pub mod tools;
pub mod config;
pub mod exec;
pub mod probe;
pub mod sampling;
pub mod extract;
pub mod analysis;
pub mod selector;
pub mod encoder;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use analysis::FrameAnalysis;
pub use config::{CoverConfig, CoverFormat, CoverOptions, FormatSpec, SamplingStrategy};
pub use error::{CoverError, Result};
pub use pipeline::generate_cover_for_video;
pub use selector::BestFrame;
