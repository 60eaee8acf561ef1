use super::*;
use crate::progress::StageStatus::{self, Completed as Done, InProgress as Active, Pending as Idle};
use shared::{domain::AnalysisId, error::ErrorCode};

struct Recorder {
    started: Instant,
    frames: Vec<(Duration, Vec<StageStatus>)>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            frames: Vec::new(),
        }
    }

    fn statuses(&self) -> Vec<Vec<StageStatus>> {
        self.frames.iter().map(|(_, s)| s.clone()).collect()
    }

    fn assert_frame(&self, index: usize, at_ms: u64, expected: &[StageStatus]) {
        let (elapsed, statuses) = &self.frames[index];
        assert_near(*elapsed, at_ms);
        assert_eq!(statuses, expected, "frame {index} at {elapsed:?}");
    }
}

impl ProgressListener for Recorder {
    fn on_stages(&mut self, stages: &[Stage]) {
        self.frames.push((
            self.started.elapsed(),
            stages.iter().map(|stage| stage.status).collect(),
        ));
    }
}

fn assert_near(actual: Duration, expected_ms: u64) {
    let actual_ms = actual.as_millis() as i128;
    assert!(
        (actual_ms - expected_ms as i128).abs() <= 5,
        "expected ~{expected_ms}ms, got {actual_ms}ms"
    );
}

fn abcd() -> ProgressSimulator {
    let plan = StagePlan::new([("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")]).expect("plan");
    ProgressSimulator::new(plan, SimulatorConfig::default())
}

fn service_failure() -> ClientError {
    ClientError::Service {
        status: 500,
        code: ErrorCode::Internal,
        message: "pipeline crashed".into(),
    }
}

async fn resolves_after(ms: u64) -> Result<AnalysisId, ClientError> {
    sleep(Duration::from_millis(ms)).await;
    Ok(AnalysisId::new("an-7"))
}

async fn fails_after(ms: u64) -> Result<AnalysisId, ClientError> {
    sleep(Duration::from_millis(ms)).await;
    Err(service_failure())
}

#[tokio::test(start_paused = true)]
async fn reference_run_advances_every_interval_then_settles() {
    let simulator = abcd();
    let mut recorder = Recorder::new();

    let id = simulator
        .run(resolves_after(12_000), &mut recorder)
        .await
        .expect("run");

    assert_eq!(id, AnalysisId::new("an-7"));
    assert_eq!(recorder.frames.len(), 5);
    recorder.assert_frame(0, 0, &[Active, Idle, Idle, Idle]);
    recorder.assert_frame(1, 3_500, &[Done, Active, Idle, Idle]);
    recorder.assert_frame(2, 7_000, &[Done, Done, Active, Idle]);
    recorder.assert_frame(3, 10_500, &[Done, Done, Done, Active]);
    recorder.assert_frame(4, 12_000, &[Done, Done, Done, Done]);
    // hand-off only after the settle delay
    assert_near(recorder.started.elapsed(), 13_000);
}

#[tokio::test(start_paused = true)]
async fn early_success_completes_remaining_stages_at_once() {
    let simulator = abcd();
    let mut recorder = Recorder::new();

    simulator
        .run(resolves_after(8_000), &mut recorder)
        .await
        .expect("run");

    assert_eq!(
        recorder.statuses(),
        vec![
            vec![Active, Idle, Idle, Idle],
            vec![Done, Active, Idle, Idle],
            vec![Done, Done, Active, Idle],
            vec![Done, Done, Done, Done],
        ]
    );
    recorder.assert_frame(3, 8_000, &[Done, Done, Done, Done]);
    assert_near(recorder.started.elapsed(), 9_000);
}

#[tokio::test(start_paused = true)]
async fn success_before_first_tick() {
    let simulator = abcd();
    let mut recorder = Recorder::new();

    simulator
        .run(resolves_after(1_000), &mut recorder)
        .await
        .expect("run");

    assert_eq!(
        recorder.statuses(),
        vec![vec![Active, Idle, Idle, Idle], vec![Done, Done, Done, Done]]
    );
    assert_near(recorder.started.elapsed(), 2_000);
}

#[tokio::test(start_paused = true)]
async fn slow_success_holds_last_stage_without_extra_frames() {
    let simulator = abcd();
    let mut recorder = Recorder::new();

    simulator
        .run(resolves_after(20_000), &mut recorder)
        .await
        .expect("run");

    assert_eq!(recorder.frames.len(), 5);
    recorder.assert_frame(3, 10_500, &[Done, Done, Done, Active]);
    recorder.assert_frame(4, 20_000, &[Done, Done, Done, Done]);
}

#[tokio::test(start_paused = true)]
async fn failure_mid_run_resets_every_stage() {
    let simulator = abcd();
    let mut recorder = Recorder::new();

    let err = simulator
        .run(fails_after(5_000), &mut recorder)
        .await
        .expect_err("must fail");

    assert!(matches!(err, RunError::Remote(ClientError::Service { status: 500, .. })));
    assert_eq!(recorder.frames.len(), 3);
    recorder.assert_frame(1, 3_500, &[Done, Active, Idle, Idle]);
    recorder.assert_frame(2, 5_000, &[Idle, Idle, Idle, Idle]);
    // no settle delay on failure
    assert_near(recorder.started.elapsed(), 5_000);
}

#[tokio::test(start_paused = true)]
async fn optional_timeout_fails_like_a_remote_error() {
    let plan = StagePlan::analysis();
    let simulator = ProgressSimulator::new(
        plan,
        SimulatorConfig {
            timeout: Some(Duration::from_secs(60)),
            ..SimulatorConfig::default()
        },
    );
    let mut recorder = Recorder::new();

    let err = simulator
        .run(
            std::future::pending::<Result<AnalysisId, ClientError>>(),
            &mut recorder,
        )
        .await
        .expect_err("timeout");

    assert!(matches!(err, RunError::TimedOut(limit) if limit == Duration::from_secs(60)));
    let (at, last) = recorder.frames.last().expect("frames");
    assert_near(*at, 60_000);
    assert_eq!(last, &vec![Idle, Idle, Idle, Idle]);
}

#[tokio::test(start_paused = true)]
async fn default_config_waits_indefinitely() {
    let simulator = abcd();
    let mut recorder = Recorder::new();

    let outcome = tokio::time::timeout(
        Duration::from_secs(600),
        simulator.run(resolves_after(300_000), &mut recorder),
    )
    .await;

    assert!(outcome.is_ok(), "a slow call must not be cut short");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_run_stops_the_timer() {
    let simulator = abcd();
    let mut recorder = Recorder::new();

    let cancelled = tokio::time::timeout(
        Duration::from_millis(4_000),
        simulator.run(
            std::future::pending::<Result<AnalysisId, ClientError>>(),
            &mut recorder,
        ),
    )
    .await;
    assert!(cancelled.is_err());
    let frames_at_cancel = recorder.frames.len();
    assert_eq!(frames_at_cancel, 2);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(recorder.frames.len(), frames_at_cancel);
}

#[tokio::test(start_paused = true)]
async fn rerun_after_failure_starts_from_the_same_state() {
    let simulator = abcd();

    let mut first = Recorder::new();
    simulator
        .run(fails_after(4_000), &mut first)
        .await
        .expect_err("first run fails");

    let mut second = Recorder::new();
    simulator
        .run(resolves_after(4_000), &mut second)
        .await
        .expect("second run");

    assert_eq!(first.statuses()[..2], second.statuses()[..2]);
    second.assert_frame(0, 0, &[Active, Idle, Idle, Idle]);
}

#[tokio::test(start_paused = true)]
async fn closures_work_as_listeners() {
    let simulator = abcd();
    let mut labels = Vec::new();
    let mut listener = |stages: &[Stage]| {
        if let Some(index) = current_index(stages) {
            labels.push(stages[index].label.clone());
        }
    };

    simulator
        .run(resolves_after(11_000), &mut listener)
        .await
        .expect("run");

    assert_eq!(labels, vec!["A", "B", "C", "D"]);
}
