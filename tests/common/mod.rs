//! Scripted stand-ins for ffmpeg and ffprobe

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stillcast::domain::model::{PipelineSettings, ProbedDuration};
use stillcast::ports::{ExecutePort, Invocation, ProbePort, ProcessOutcome};
use stillcast::workspace::{RunContext, Workspace};

/// What the fake transcoder does for one invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    /// Exit 0 after writing this many bytes to the output path
    Produce(usize),
    /// Exit 0 after writing an empty output file
    ProduceEmpty,
    /// Exit with this code, writing nothing
    Fail(i32),
    /// Report a timeout
    Timeout,
}

type Script = Box<dyn Fn(&Invocation) -> Behavior + Send + Sync>;

/// Executor that simulates ffmpeg by writing each invocation's output file
pub struct ScriptedExecutor {
    script: Script,
    delay: Duration,
    calls: Mutex<Vec<(Invocation, Duration)>>,
    concat_lists: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(script: impl Fn(&Invocation) -> Behavior + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            concat_lists: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Every invocation succeeds with a plausible output
    pub fn succeeding() -> Self {
        Self::new(|_| Behavior::Produce(4096))
    }

    /// Every invocation exits non-zero
    pub fn failing() -> Self {
        Self::new(|_| Behavior::Fail(1))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(invocation, _)| invocation.clone())
            .collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.label).collect()
    }

    /// Number of invocations whose label satisfies `pred`
    pub fn count(&self, pred: impl Fn(&str) -> bool) -> usize {
        self.labels().iter().filter(|label| pred(label)).count()
    }

    /// Invocation with exactly this label, if any
    pub fn find(&self, label: &str) -> Option<Invocation> {
        self.invocations().into_iter().find(|i| i.label == label)
    }

    /// Timeout passed along with the invocation labelled `label`
    pub fn timeout_of(&self, label: &str) -> Option<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(invocation, _)| invocation.label == label)
            .map(|(_, timeout)| *timeout)
    }

    /// Bodies of every concat list seen, in call order
    pub fn concat_lists(&self) -> Vec<String> {
        self.concat_lists.lock().unwrap().clone()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutePort for ScriptedExecutor {
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> ProcessOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((invocation.clone(), timeout));

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if invocation.value_of("-f").as_deref() == Some("concat") {
            if let Some(list) = invocation.value_of("-i") {
                if let Ok(body) = std::fs::read_to_string(&list) {
                    self.concat_lists.lock().unwrap().push(body);
                }
            }
        }

        let outcome = match (self.script)(invocation) {
            Behavior::Produce(bytes) => {
                if let Some(output) = invocation.output_path() {
                    std::fs::write(output, vec![0u8; bytes]).unwrap();
                }
                ProcessOutcome::Success {
                    stdout: String::new(),
                    stderr: String::new(),
                }
            }
            Behavior::ProduceEmpty => {
                if let Some(output) = invocation.output_path() {
                    std::fs::write(output, b"").unwrap();
                }
                ProcessOutcome::Success {
                    stdout: String::new(),
                    stderr: String::new(),
                }
            }
            Behavior::Fail(code) => ProcessOutcome::Failed {
                code: Some(code),
                stderr: "simulated encoder failure\n".to_string(),
            },
            Behavior::Timeout => ProcessOutcome::TimedOut { after: timeout },
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Probe returning one fixed duration for every file
pub struct FakeProbe {
    duration: ProbedDuration,
    probed: Mutex<Vec<PathBuf>>,
}

impl FakeProbe {
    pub fn new(duration: ProbedDuration) -> Self {
        Self {
            duration,
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn known(seconds: f64) -> Self {
        Self::new(ProbedDuration::Known(seconds))
    }

    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProbePort for FakeProbe {
    async fn probe_duration(&self, path: &Path) -> ProbedDuration {
        self.probed.lock().unwrap().push(path.to_path_buf());
        self.duration
    }
}

/// Settings for tests: workspaces under `root/work`, two workers
pub fn test_settings(root: &Path) -> PipelineSettings {
    PipelineSettings {
        workspace_root: Some(root.join("work")),
        workers: 2,
        ..PipelineSettings::default()
    }
}

/// Write a fake image and audio file under `root`
pub fn write_inputs(root: &Path) -> (PathBuf, PathBuf) {
    let image = root.join("cover.png");
    let audio = root.join("episode.mp3");
    std::fs::write(&image, vec![0x89u8; 512]).unwrap();
    std::fs::write(&audio, vec![0xffu8; 8192]).unwrap();
    (image, audio)
}

/// Entries left under the workspace root
pub fn workspace_leftovers(root: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(root.join("work")) {
        Ok(entries) => entries.map(|entry| entry.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// Fresh workspace and run context for component-level tests
pub fn run_context(root: &Path, settings: PipelineSettings) -> (Workspace, RunContext) {
    let workspace = Workspace::create(Some(&root.join("work"))).unwrap();
    let ctx = RunContext::new(&workspace, Arc::new(settings));
    (workspace, ctx)
}
