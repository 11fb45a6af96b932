use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Result, SubburnError};

/// A single timed subtitle entry; times are in milliseconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub index: usize,
    pub start: u64,
    pub end: u64,
    pub text: String,
}

/// Ordered subtitle entries as read from an SRT file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleDocument {
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleDocument {
    /// Read an SRT file (UTF-8)
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading subtitles: {}", path.display());

        let bytes = fs::read(path).await?;
        let content = String::from_utf8(bytes)
            .map_err(|e| SubburnError::Subtitle(format!("{} is not valid UTF-8: {}", path.display(), e)))?;

        let document = Self::parse(&content)?;
        info!("Loaded {} subtitle entries", document.entries.len());
        Ok(document)
    }

    /// Write the document as SRT (UTF-8), numbering entries from 1
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_srt()).await?;
        info!("Saved {} subtitle entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut entries = Vec::new();
        let mut lines = content.lines().enumerate().peekable();

        loop {
            // Skip blank lines between blocks
            while lines.peek().is_some_and(|(_, line)| line.trim().is_empty()) {
                lines.next();
            }
            let Some((line_no, index_line)) = lines.next() else {
                break;
            };

            let index = index_line.trim().parse::<usize>().map_err(|_| {
                SubburnError::Subtitle(format!(
                    "line {}: expected entry number, found {:?}",
                    line_no + 1,
                    index_line
                ))
            })?;

            let (timing_no, timing_line) = lines.next().ok_or_else(|| {
                SubburnError::Subtitle(format!("entry {}: missing timing line", index))
            })?;
            let (start, end) = parse_timing_line(timing_line).ok_or_else(|| {
                SubburnError::Subtitle(format!(
                    "line {}: malformed timing {:?}",
                    timing_no + 1,
                    timing_line
                ))
            })?;

            let mut text_lines = Vec::new();
            while let Some((_, line)) = lines.peek() {
                if line.trim().is_empty() {
                    break;
                }
                text_lines.push(*line);
                lines.next();
            }

            if end < start {
                warn!("Entry {} ends before it starts", index);
            }

            entries.push(SubtitleEntry {
                index,
                start,
                end,
                text: text_lines.join("\n"),
            });
        }

        debug!("Parsed {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn to_srt(&self) -> String {
        let mut srt_content = String::new();

        for (position, entry) in self.entries.iter().enumerate() {
            srt_content.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                position + 1,
                format_srt_time(entry.start),
                format_srt_time(entry.end),
                entry.text
            ));
        }

        srt_content
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
    let (start, rest) = line.split_once("-->")?;
    // Position cues may follow the end time (`00:00:01,000 --> 00:00:02,000 X1:...`)
    let end = rest.split_whitespace().next()?;
    Some((parse_srt_time(start.trim())?, parse_srt_time(end)?))
}

/// Parse `HH:MM:SS,mmm` (a `.` separator is tolerated) into milliseconds
fn parse_srt_time(value: &str) -> Option<u64> {
    let (clock, millis) = value.split_once([',', '.'])?;
    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.trim().parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    let millis: u64 = millis.trim().parse().ok()?;
    if millis >= 1000 {
        return None;
    }
    hours
        .checked_mul(3_600_000)?
        .checked_add((minutes * 60 + seconds) * 1000 + millis)
}

/// Format milliseconds as SRT time (HH:MM:SS,mmm)
fn format_srt_time(total_milliseconds: u64) -> String {
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
