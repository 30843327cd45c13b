//! Blackboard - Narrated Animation Pipeline
//!
//! Turns an authored narration script and a manim scene into a narrated
//! video: every sentence is spoken with Coqui TTS, timed with ffprobe, and
//! the measured durations are written into the scene's `#DURATION_<i>#`
//! placeholders before manim renders it.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod narration;
pub mod animation;
pub mod response;
pub mod library;
pub mod media;
pub mod error;
pub mod quality;
pub mod setup;
