//! Batch lifecycle integration tests.
//!
//! These tests run the real filesystem replacer with mock probe and encode
//! collaborators:
//! - Skipping files already within bounds
//! - In-place replacement without leftover temp files
//! - Per-file failure isolation
//! - Sequential and concurrent runs agreeing on the result

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use walkdir::WalkDir;

use vidnorm_core::{
    batch::{BatchConfig, BatchRunner, FilePipeline, FileStage, RunMode},
    policy::PolicyEngine,
    replacer::{is_work_file, FsReplacer},
    testing::{fixtures, MockEncoder, MockProber},
};

/// Test helper wiring a runner to shared mocks and a scratch directory.
struct TestHarness {
    runner: BatchRunner<MockProber, MockEncoder, FsReplacer>,
    prober: MockProber,
    encoder: MockEncoder,
    dir: TempDir,
}

impl TestHarness {
    fn new(prober: MockProber) -> Self {
        Self::with_encoder(prober, MockEncoder::new())
    }

    fn with_encoder(prober: MockProber, encoder: MockEncoder) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let pipeline = FilePipeline::new(
            prober.clone(),
            PolicyEngine::default(),
            encoder.clone(),
            FsReplacer::with_defaults(),
        );
        let runner = BatchRunner::new(pipeline, BatchConfig::default());

        Self {
            runner,
            prober,
            encoder,
            dir,
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn add_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    fn work_files(&self) -> Vec<PathBuf> {
        WalkDir::new(self.root())
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| is_work_file(p))
            .collect()
    }
}

fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap()
}

#[tokio::test]
async fn test_compliant_files_untouched() {
    let harness = TestHarness::new(MockProber::compliant());
    let a = harness.add_file("a.mp4", b"small video a");
    let b = harness.add_file("nested/b.mp4", b"small video b");

    let report = harness
        .runner
        .run_all(harness.root(), RunMode::Concurrent { workers: 2 })
        .await
        .unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.skipped(), 2);
    assert_eq!(report.reencoded(), 0);
    assert_eq!(read(&a), b"small video a");
    assert_eq!(read(&b), b"small video b");
    assert_eq!(harness.encoder.call_count().await, 0);
    assert!(harness.work_files().is_empty());
}

#[tokio::test]
async fn test_in_place_replacement() {
    let harness = TestHarness::new(MockProber::oversized());
    let clip = harness.add_file("clip.mp4", b"a large original video");

    let report = harness
        .runner
        .run_all(harness.root(), RunMode::Sequential)
        .await
        .unwrap();

    assert_eq!(report.reencoded(), 1);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        read(&clip),
        MockEncoder::encoded_payload(b"a large original video")
    );
    assert!(harness.work_files().is_empty());

    let requests = harness.encoder.recorded_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].plan.new_height, Some(720));
    assert_eq!(requests[0].plan.new_frame_rate, Some(24.0));
    assert!(is_work_file(&requests[0].output_path));
}

#[tokio::test]
async fn test_probe_failure_isolated() {
    let harness = TestHarness::new(MockProber::oversized());
    for i in 1..=5 {
        harness.add_file(&format!("f{i}.mp4"), format!("video {i}").as_bytes());
    }
    harness.prober.fail_on("f3.mp4").await;

    let report = harness
        .runner
        .run_all(harness.root(), RunMode::Concurrent { workers: 2 })
        .await
        .unwrap();

    assert_eq!(report.total(), 5);
    assert_eq!(report.reencoded(), 4);
    assert_eq!(report.failed(), 1);

    let failure = report.failures().next().unwrap();
    assert!(failure.path.ends_with("f3.mp4"));
    assert_eq!(failure.stage, FileStage::Probe);
    assert_eq!(read(&harness.root().join("f3.mp4")), b"video 3");
    assert_eq!(harness.encoder.call_count().await, 4);
}

#[tokio::test]
async fn test_encode_failure_keeps_original_and_cleans_temp() {
    let harness = TestHarness::new(MockProber::oversized());
    harness.add_file("a.mp4", b"video a");
    let b = harness.add_file("b.mp4", b"video b");
    harness.encoder.fail_on("b.mp4").await;

    let report = harness
        .runner
        .run_all(harness.root(), RunMode::Sequential)
        .await
        .unwrap();

    assert_eq!(report.reencoded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures().next().unwrap().stage, FileStage::Encode);
    assert_eq!(read(&b), b"video b");
    assert!(harness.work_files().is_empty());
}

#[tokio::test]
async fn test_mixed_profiles() {
    let harness = TestHarness::new(MockProber::oversized());
    harness.add_file("big.mp4", b"big");
    let small = harness.add_file("small.mp4", b"small");
    harness.add_file("silent.mp4", b"silent");
    harness
        .prober
        .set_profile("small.mp4", fixtures::compliant_profile(""))
        .await;
    harness
        .prober
        .set_profile("silent.mp4", fixtures::silent_profile(""))
        .await;

    let report = harness
        .runner
        .run_all(harness.root(), RunMode::Concurrent { workers: 3 })
        .await
        .unwrap();

    assert_eq!(report.reencoded(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(read(&small), b"small");

    let silent = harness
        .encoder
        .recorded_requests()
        .await
        .into_iter()
        .find(|r| r.input_path.ends_with("silent.mp4"))
        .unwrap();
    assert_eq!(silent.plan.new_audio_sample_rate_hz, None);
    assert_eq!(silent.plan.new_audio_bitrate_kbps, None);
}

#[tokio::test]
async fn test_all_failed_exit_code() {
    let harness = TestHarness::new(MockProber::oversized());
    harness.add_file("a.mp4", b"a");
    harness.prober.fail_on("a.mp4").await;

    let report = harness
        .runner
        .run_all(harness.root(), RunMode::Sequential)
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_worker_limit() {
    let encoder = MockEncoder::new().with_delay(Duration::from_millis(30));
    let harness = TestHarness::with_encoder(MockProber::oversized(), encoder);
    for i in 0..8 {
        harness.add_file(&format!("{i}.mp4"), b"data");
    }

    let report = harness
        .runner
        .run_all(harness.root(), RunMode::Concurrent { workers: 3 })
        .await
        .unwrap();

    assert_eq!(report.reencoded(), 8);
    assert!(harness.encoder.max_concurrency().await <= 3);
}

#[tokio::test]
async fn test_sequential_and_concurrent_agree() {
    let sequential = TestHarness::new(MockProber::oversized());
    let concurrent = TestHarness::new(MockProber::oversized());

    for i in 0..10 {
        let name = format!("dir{}/clip{i}.mp4", i % 3);
        let content = format!("original content {i}");
        sequential.add_file(&name, content.as_bytes());
        concurrent.add_file(&name, content.as_bytes());
    }
    for harness in [&sequential, &concurrent] {
        harness
            .prober
            .set_profile("clip4.mp4", fixtures::compliant_profile(""))
            .await;
    }

    let seq_report = sequential
        .runner
        .run_all(sequential.root(), RunMode::Sequential)
        .await
        .unwrap();
    let con_report = concurrent
        .runner
        .run_all(concurrent.root(), RunMode::Concurrent { workers: 4 })
        .await
        .unwrap();

    assert_eq!(seq_report.reencoded(), con_report.reencoded());
    assert_eq!(seq_report.skipped(), con_report.skipped());

    for i in 0..10 {
        let name = format!("dir{}/clip{i}.mp4", i % 3);
        assert_eq!(
            read(&sequential.root().join(&name)),
            read(&concurrent.root().join(&name)),
            "{name} differs"
        );
    }
}
