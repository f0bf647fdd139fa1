use crate::domain::narration::NarrationReport;
use crate::error::AppResult;
use std::path::{Path, PathBuf};

/// Write the assembled audio as `<output_dir>/<stem>.mp3`.
///
/// When segments are missing a `<stem>.report.json` listing them is written
/// next to it. Returns the audio path.
pub async fn write_narration(
    output_dir: &Path,
    stem: &str,
    report: &NarrationReport,
) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;

    let audio_path = output_dir.join(format!("{}.mp3", stem));
    tokio::fs::write(&audio_path, &report.audio).await?;
    tracing::info!(
        path = %audio_path.display(),
        audio_size_bytes = report.audio.len(),
        "Combined speech saved"
    );

    if !report.failed.is_empty() {
        let report_path = output_dir.join(format!("{}.report.json", stem));
        let json = serde_json::to_vec_pretty(report)?;
        tokio::fs::write(&report_path, json).await?;
        tracing::warn!(
            path = %report_path.display(),
            failed = report.failed.len(),
            "Failed segments report saved"
        );
    }

    Ok(audio_path)
}
