//! Subburn - automated subtitle translation for online videos
//!
//! Downloads a video with yt-dlp, picks the best subtitle track by language
//! priority, translates it entry by entry, sorts the artifacts into folders and
//! burns the translated subtitles into the video with ffmpeg.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod language;
pub mod media;
pub mod organizer;
pub mod selector;
pub mod subtitle;
pub mod translate;
pub mod workflow;
