//! Component tests for the enhancement stage, segment encoder and concatenator

mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{run_context, test_settings, Behavior, ScriptedExecutor};
use stillcast::domain::model::{
    AudioChoice, EncodeAttempt, EncodeProfile, EncodingJob, EncodingStrategy, ProbedDuration,
    ScaleMode, Segment,
};
use stillcast::engine::{
    AudioEnhancer, ChunkedEncoder, Concatenator, EnhancementLevel, SegmentEncoder, SegmentRequest,
};
use stillcast::error::FailureKind;

fn write_audio(dir: &std::path::Path) -> PathBuf {
    let audio = dir.join("audio_source.wav");
    std::fs::write(&audio, vec![7u8; 4096]).unwrap();
    audio
}

#[tokio::test]
async fn test_enhancement_advanced_succeeds_first() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let audio = write_audio(workspace.path());
    let executor = Arc::new(ScriptedExecutor::succeeding());

    let enhanced = AudioEnhancer::new(executor.clone()).enhance(&ctx, &audio).await;

    assert_eq!(enhanced.level, EnhancementLevel::Advanced);
    assert!(enhanced.degradations.is_empty());
    assert_eq!(executor.labels(), vec!["enhance-advanced"]);

    let invocation = executor.find("enhance-advanced").unwrap();
    assert_eq!(
        invocation.value_of("-af").as_deref(),
        Some("volume=2dB,highpass=f=80,loudnorm=I=-16:TP=-1.5:LRA=11")
    );
    assert_eq!(invocation.value_of("-ar").as_deref(), Some("44100"));
    assert_eq!(invocation.value_of("-ac").as_deref(), Some("1"));
    assert_ne!(enhanced.path, audio);
    workspace.cleanup();
}

#[tokio::test]
async fn test_enhancement_falls_through_to_pass_through() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let audio = write_audio(workspace.path());
    let executor = Arc::new(ScriptedExecutor::new(|i| {
        if i.label == "enhance-advanced" {
            Behavior::Timeout
        } else {
            Behavior::Fail(1)
        }
    }));

    let enhanced = AudioEnhancer::new(executor.clone()).enhance(&ctx, &audio).await;

    assert_eq!(enhanced.level, EnhancementLevel::PassThrough);
    assert_eq!(executor.labels(), vec!["enhance-advanced", "enhance-basic"]);
    assert_eq!(enhanced.degradations.len(), 2);
    assert!(enhanced
        .degradations
        .iter()
        .all(|d| d.kind == FailureKind::EnhancementDegraded));

    // a copy, with the input left alone
    assert_ne!(enhanced.path, audio);
    assert_eq!(std::fs::read(&enhanced.path).unwrap(), vec![7u8; 4096]);
    assert_eq!(std::fs::read(&audio).unwrap(), vec![7u8; 4096]);
    workspace.cleanup();
}

#[tokio::test]
async fn test_enhancement_undersized_output_is_degraded() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let audio = write_audio(workspace.path());
    let executor = Arc::new(ScriptedExecutor::new(|i| {
        if i.label == "enhance-advanced" {
            Behavior::Produce(10)
        } else {
            Behavior::Produce(4096)
        }
    }));

    let enhanced = AudioEnhancer::new(executor).enhance(&ctx, &audio).await;
    assert_eq!(enhanced.level, EnhancementLevel::Basic);
    assert!(!ctx.path("enhanced_advanced.wav").exists());
    workspace.cleanup();
}

fn segment_request(ctx_dir: &std::path::Path, image: PathBuf, audio: PathBuf) -> SegmentRequest {
    SegmentRequest {
        label: "segment-0000".to_string(),
        image,
        audio,
        start_offset: Some(0.0),
        length: Some(600.0),
        output: ctx_dir.join("segment_0000.mp4"),
        timeout: Duration::from_secs(1800),
        scale: ScaleMode::EvenSource,
        profile: EncodeProfile::Full,
    }
}

#[tokio::test]
async fn test_segment_zero_exit_with_empty_file_fails_and_is_removed() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let audio = write_audio(workspace.path());
    let image = workspace.file("image_source.png");
    std::fs::write(&image, b"png").unwrap();
    let executor = Arc::new(ScriptedExecutor::new(|_| Behavior::ProduceEmpty));

    let request = segment_request(workspace.path(), image, audio);
    let failure = SegmentEncoder::new(executor)
        .encode_segment(&ctx, &request)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::SegmentEncodeFailed);
    assert!(failure.diagnostic.starts_with("segment-0000"));
    assert!(!request.output.exists());
    workspace.cleanup();
}

#[tokio::test]
async fn test_segment_timeout_kind() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let audio = write_audio(workspace.path());
    let image = workspace.file("image_source.png");
    std::fs::write(&image, b"png").unwrap();
    let executor = Arc::new(ScriptedExecutor::new(|_| Behavior::Timeout));

    let request = segment_request(workspace.path(), image, audio);
    let failure = SegmentEncoder::new(executor.clone())
        .encode_segment(&ctx, &request)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(executor.timeout_of("segment-0000"), Some(Duration::from_secs(1800)));
    workspace.cleanup();
}

fn segments_at(dir: &std::path::Path, indices: &[usize]) -> Vec<Segment> {
    indices
        .iter()
        .map(|&index| {
            let output_path = dir.join(format!("segment_{:04}.mp4", index));
            std::fs::write(&output_path, vec![1u8; 2048]).unwrap();
            Segment {
                index,
                start_offset: index as f64 * 600.0,
                length: 600.0,
                output_path,
            }
        })
        .collect()
}

#[tokio::test]
async fn test_concat_joins_in_index_order_regardless_of_input_order() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let dir = ctx.segments_dir("primary").await.unwrap();
    let segments = segments_at(&dir, &[2, 0, 1]);
    let executor = Arc::new(ScriptedExecutor::succeeding());
    let output = ctx.path("joined.mp4");

    let bytes = Concatenator::new(executor.clone())
        .concatenate(&ctx, &segments, &output)
        .await
        .unwrap();

    assert_eq!(bytes, 4096);
    assert_eq!(
        executor.concat_lists(),
        vec!["file 'segment_0000.mp4'\nfile 'segment_0001.mp4'\nfile 'segment_0002.mp4'\n".to_string()]
    );
    let invocation = executor.find("concat").unwrap();
    assert_eq!(invocation.value_of("-c").as_deref(), Some("copy"));
    assert_eq!(executor.timeout_of("concat"), Some(Duration::from_secs(300)));
    workspace.cleanup();
}

#[tokio::test]
async fn test_concat_single_segment_is_a_rename() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let dir = ctx.segments_dir("primary").await.unwrap();
    let segments = segments_at(&dir, &[0]);
    let executor = Arc::new(ScriptedExecutor::succeeding());
    let output = ctx.path("joined.mp4");

    let bytes = Concatenator::new(executor.clone())
        .concatenate(&ctx, &segments, &output)
        .await
        .unwrap();

    assert_eq!(bytes, 2048);
    assert!(output.exists());
    assert!(executor.labels().is_empty());
    workspace.cleanup();
}

#[tokio::test]
async fn test_concat_failure_leaves_no_output() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let dir = ctx.segments_dir("primary").await.unwrap();
    let segments = segments_at(&dir, &[0, 1]);
    let executor = Arc::new(ScriptedExecutor::new(|_| Behavior::ProduceEmpty));
    let output = ctx.path("joined.mp4");

    let failure = Concatenator::new(executor)
        .concatenate(&ctx, &segments, &output)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::ConcatenationFailed);
    assert!(!output.exists());

    let empty = Concatenator::new(Arc::new(ScriptedExecutor::succeeding()))
        .concatenate(&ctx, &[], &output)
        .await
        .unwrap_err();
    assert_eq!(empty.kind, FailureKind::ConcatenationFailed);
    workspace.cleanup();
}

#[tokio::test]
async fn test_chunked_job_encodes_then_joins() {
    let root = tempfile::tempdir().unwrap();
    let (workspace, ctx) = run_context(root.path(), test_settings(root.path()));
    let audio = write_audio(workspace.path());
    let image = workspace.file("image_source.png");
    std::fs::write(&image, b"png").unwrap();
    let executor = Arc::new(ScriptedExecutor::succeeding());

    let attempt = EncodeAttempt {
        name: "primary".to_string(),
        audio: AudioChoice::Enhanced,
        scale: ScaleMode::EvenSource,
        profile: EncodeProfile::Full,
    };
    let job = EncodingJob::new(
        image,
        audio,
        ctx.path("output_primary.mp4"),
        Duration::from_secs(1800),
        EncodingStrategy::Chunked,
        ProbedDuration::Known(1500.0),
        attempt,
    )
    .unwrap();

    let output = ChunkedEncoder::new(executor.clone())
        .encode_job(&ctx, &job)
        .await
        .unwrap();

    assert_eq!(output.segment_count, 3);
    assert_eq!(executor.count(|l| l.starts_with("primary-segment-")), 3);
    assert_eq!(
        executor
            .find("primary-segment-0002")
            .and_then(|i| i.value_of("-t"))
            .as_deref(),
        Some("300.000000")
    );
    assert_eq!(executor.labels().last().map(String::as_str), Some("concat"));
    assert!(ctx.path("output_primary.mp4").exists());
    workspace.cleanup();
}
