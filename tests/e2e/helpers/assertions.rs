use longread_tts::domain::narration::{NarrationReport, Segment};

/// The audio a fully successful run must produce for these segments
pub fn expected_audio(segments: &[Segment]) -> Vec<u8> {
    segments
        .iter()
        .flat_map(|segment| format!("[{}]", segment.text).into_bytes())
        .collect()
}

pub fn assert_complete_in_order(report: &NarrationReport, segments: &[Segment]) {
    assert!(report.failed.is_empty(), "Unexpected failures: {:?}", report.failed);
    assert_eq!(report.segment_count, segments.len());
    assert_eq!(
        report.succeeded,
        (0..segments.len()).collect::<Vec<_>>(),
        "Succeeded indices should be contiguous"
    );
    assert_eq!(
        String::from_utf8_lossy(&report.audio),
        String::from_utf8_lossy(&expected_audio(segments))
    );
}
