//! Fake collaborators: a scripted process list and recording notifiers

use anyhow::Result;
use playwatch::events::Notifier;
use playwatch::source::SnapshotSource;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// One scripted answer from [`ScriptedSource`]
pub enum Step {
    Running(HashSet<String>),
    Fail(&'static str),
    Panic(&'static str),
}

/// Process list that replays a script, then repeats `fallback` forever
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    fallback: HashSet<String>,
    pub calls: Arc<Mutex<usize>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            fallback: HashSet::new(),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn then_forever(mut self, fallback: HashSet<String>) -> Self {
        self.fallback = fallback;
        self
    }
}

impl SnapshotSource for ScriptedSource {
    fn list_process_names(&mut self) -> Result<HashSet<String>> {
        *self.calls.lock().unwrap() += 1;
        match self.steps.pop_front() {
            Some(Step::Running(names)) => Ok(names),
            Some(Step::Fail(msg)) => Err(anyhow::anyhow!(msg)),
            Some(Step::Panic(msg)) => panic!("{}", msg),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Notifier that records every message it is asked to send
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Notifier whose deliveries always fail, counting attempts
#[derive(Clone, Default)]
pub struct FailingNotifier {
    pub attempts: Arc<Mutex<usize>>,
}

impl Notifier for FailingNotifier {
    async fn send(&self, _text: &str) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        anyhow::bail!("network unreachable")
    }
}
