//! Per-client single-flight guard for long-running jobs.
//!
//! Each client key is a two-state machine: `Idle → Running → Idle`.
//! `try_begin` performs the first transition and hands out a guard;
//! dropping the guard performs the second, on every exit path. A
//! `try_begin` while the same client is `Running` is rejected, never
//! queued. Other clients are unaffected.

use std::collections::HashSet;

use parking_lot::Mutex;

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
}

/// Returned when the client already has a job running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateBusy;

#[derive(Debug, Default)]
pub struct JobGate {
    running: Mutex<HashSet<String>>,
}

/// Holds the client's gate in `Running` until dropped.
#[must_use = "the gate returns to Idle as soon as the guard is dropped"]
#[derive(Debug)]
pub struct JobGuard<'a> {
    gate: &'a JobGate,
    key: String,
}

impl JobGate {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self, key: &str) -> JobState {
        if self.running.lock().contains(key) {
            JobState::Running
        } else {
            JobState::Idle
        }
    }

    pub fn try_begin(&self, key: &str) -> Result<JobGuard<'_>, GateBusy> {
        if !self.running.lock().insert(key.to_string()) {
            return Err(GateBusy);
        }
        Ok(JobGuard {
            gate: self,
            key: key.to_string(),
        })
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.gate.running.lock().remove(&self.key);
    }
}
