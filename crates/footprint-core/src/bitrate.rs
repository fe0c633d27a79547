//! Bitrate-based bandwidth estimates for local video files.
//!
//! The media prober is an external command treated as a black box that
//! prints one integer (bits per second) for a file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{CoreError, CoreResult};

const SECONDS_PER_HOUR: f64 = 3600.0;
const BITS_PER_GIB: f64 = 8.0 * 1024.0 * 1024.0 * 1024.0;

/// Data transferred in one hour of playback, in GiB.
pub fn hourly_data_gb(bitrate_bps: f64) -> f64 {
    bitrate_bps * SECONDS_PER_HOUR / BITS_PER_GIB
}

#[async_trait]
pub trait BitrateProbe: Send + Sync {
    /// Video stream bitrate of `path`, or `None` when it cannot be read.
    async fn bitrate(&self, path: &Path) -> Option<u64>;
}

/// Runs `ffprobe` on the first video stream.
#[derive(Debug, Clone)]
pub struct FfprobeBitrate {
    program: PathBuf,
}

impl Default for FfprobeBitrate {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffprobe"),
        }
    }
}

impl FfprobeBitrate {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl BitrateProbe for FfprobeBitrate {
    async fn bitrate(&self, path: &Path) -> Option<u64> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=bit_rate",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let parsed = stdout.trim().parse().ok();
                if parsed.is_none() {
                    warn!(file = %path.display(), output = %stdout.trim(), "unparseable bitrate");
                }
                parsed
            }
            Ok(out) => {
                warn!(
                    file = %path.display(),
                    status = %out.status,
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "bitrate probe failed"
                );
                None
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not run bitrate probe");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileBitrate {
    pub name: String,
    pub bitrate_bps: u64,
}

impl FileBitrate {
    pub fn hourly_data_gb(&self) -> f64 {
        hourly_data_gb(self.bitrate_bps as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BitrateReport {
    pub files: Vec<FileBitrate>,
}

impl BitrateReport {
    pub fn average_bitrate(&self) -> Option<f64> {
        if self.files.is_empty() {
            return None;
        }
        let total: u64 = self.files.iter().map(|f| f.bitrate_bps).sum();
        Some(total as f64 / self.files.len() as f64)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("--- Individual File Analysis ---\n");
        for file in &self.files {
            let _ = writeln!(
                out,
                "{}: Bitrate: {} bps, Hourly data: {:.2} GB",
                file.name,
                file.bitrate_bps,
                file.hourly_data_gb()
            );
        }

        out.push_str("\n--- Summary ---\n");
        match self.average_bitrate() {
            Some(avg) => {
                let _ = writeln!(out, "Total files processed: {}", self.files.len());
                let _ = writeln!(out, "Average bitrate: {} bps", avg as u64);
                let _ = writeln!(
                    out,
                    "Average hourly data per file: {:.2} GB",
                    hourly_data_gb(avg)
                );
            }
            None => out.push_str("No video files found or processed.\n"),
        }
        out
    }
}

/// Probe every regular file directly inside `folder`, in name order.
/// Files whose bitrate cannot be read are skipped.
pub async fn analyze_folder(probe: &dyn BitrateProbe, folder: &Path) -> CoreResult<BitrateReport> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .map_err(|e| CoreError::io(folder, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CoreError::io(folder, e))?
    {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut report = BitrateReport::default();
    for path in files {
        match probe.bitrate(&path).await {
            Some(bitrate_bps) => report.files.push(FileBitrate {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                bitrate_bps,
            }),
            None => debug!(file = %path.display(), "no bitrate"),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TableProbe(HashMap<String, u64>);

    #[async_trait]
    impl BitrateProbe for TableProbe {
        async fn bitrate(&self, path: &Path) -> Option<u64> {
            let name = path.file_name()?.to_string_lossy().into_owned();
            self.0.get(&name).copied()
        }
    }

    #[test]
    fn test_hourly_data_gb() {
        let bps = BITS_PER_GIB / SECONDS_PER_HOUR;
        assert!((hourly_data_gb(bps) - 1.0).abs() < 1e-9);
        assert!((hourly_data_gb(20_000_000.0) - 8.381903171539307).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_analyze_folder_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mov", "a.mov", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let probe = TableProbe(HashMap::from([
            ("a.mov".to_string(), 10_000_000),
            ("b.mov".to_string(), 30_000_000),
        ]));
        let report = analyze_folder(&probe, dir.path()).await.unwrap();

        let names: Vec<_> = report.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.mov", "b.mov"]);
        assert_eq!(report.average_bitrate(), Some(20_000_000.0));

        let text = report.render();
        assert!(text.contains("a.mov: Bitrate: 10000000 bps, Hourly data: 4.19 GB"));
        assert!(text.contains("Average bitrate: 20000000 bps"));
        assert!(text.contains("Average hourly data per file: 8.38 GB"));
    }

    #[tokio::test]
    async fn test_analyze_missing_folder_is_error() {
        let probe = TableProbe(HashMap::new());
        let err = analyze_folder(&probe, Path::new("/definitely/not/here"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[test]
    fn test_empty_report() {
        let text = BitrateReport::default().render();
        assert!(text.contains("No video files found or processed."));
    }

    #[tokio::test]
    async fn test_missing_ffprobe_yields_none() {
        let probe = FfprobeBitrate::with_program("/nonexistent/ffprobe-binary");
        assert_eq!(probe.bitrate(Path::new("video.mov")).await, None);
    }
}
