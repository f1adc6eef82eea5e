use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

use crate::{session::FrameSnapshot, ClockError, Result};

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_path: PathBuf,
    pub fps: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::new(),
            fps: 60,
        }
    }
}

impl RecordingSettings {
    /// Fixed frame step in seconds.
    pub fn frame_interval(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }
}

/// Collects frame snapshots and writes them out as a JSON array.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
    frames: Vec<FrameSnapshot>,
    is_recording: bool,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            frames: Vec::new(),
            is_recording: false,
        }
    }

    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    pub fn start(&mut self) -> Result<()> {
        if self.settings.output_path.as_os_str().is_empty() {
            return Err(ClockError::msg("recording requires an output path"));
        }
        self.frames.clear();
        self.is_recording = true;
        tracing::debug!(path = ?self.settings.output_path, "recording started");
        Ok(())
    }

    /// Stores the frame if recording is active.
    pub fn capture(&mut self, frame: &FrameSnapshot) {
        if self.is_recording {
            self.frames.push(frame.clone());
        }
    }

    /// Writes everything captured so far and returns the frame count.
    pub fn stop(&mut self) -> Result<usize> {
        if !self.is_recording {
            return Ok(0);
        }
        self.is_recording = false;

        let file = File::create(&self.settings.output_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.frames)?;
        writer.flush()?;
        let count = self.frames.len();
        tracing::info!(frames = count, path = ?self.settings.output_path, "recording written");
        self.frames.clear();
        Ok(count)
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn captured(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ClockSession;

    #[test]
    fn start_requires_output_path() {
        let mut recorder = Recorder::new(RecordingSettings::default());
        assert!(recorder.start().is_err());
        assert!(!recorder.is_recording());
    }

    #[test]
    fn ignores_frames_when_idle() {
        let mut session = ClockSession::with_defaults().unwrap();
        let mut recorder = Recorder::new(RecordingSettings::default());
        recorder.capture(&session.tick(0.016));
        assert_eq!(recorder.captured(), 0);
        assert_eq!(recorder.stop().unwrap(), 0);
    }

    #[test]
    fn writes_captured_frames() {
        let path = std::env::temp_dir().join(format!("clockwork-record-{}.json", std::process::id()));
        let mut recorder = Recorder::new(RecordingSettings {
            output_path: path.clone(),
            fps: 30,
        });
        let mut session = ClockSession::with_defaults().unwrap();
        session.play();

        recorder.start().unwrap();
        for _ in 0..3 {
            recorder.capture(&session.tick(recorder.settings().frame_interval()));
        }
        assert_eq!(recorder.stop().unwrap(), 3);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 3);
        assert_eq!(written[2]["segment_id"], "intro");
        std::fs::remove_file(path).ok();
    }
}
