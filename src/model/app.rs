use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::sys::process::pid_t;

/// An OS process as reported by the host. The termination flag is set by the
/// notification source, possibly before the launch event has been handled.
#[derive(Debug)]
pub struct Process {
    pub pid: pid_t,
    pub name: String,
    terminated: AtomicBool,
}

impl Process {
    pub fn new(pid: pid_t, name: impl Into<String>) -> Arc<Process> {
        Arc::new(Process {
            pid,
            name: name.into(),
            terminated: AtomicBool::new(false),
        })
    }

    pub fn is_terminated(&self) -> bool { self.terminated.load(Ordering::Acquire) }

    pub fn mark_terminated(&self) { self.terminated.store(true, Ordering::Release); }
}

#[derive(Debug, Clone)]
pub struct Application {
    pub pid: pid_t,
    pub name: String,
    pub is_hidden: bool,
    process: Weak<Process>,
}

impl Application {
    pub fn new(process: &Arc<Process>) -> Application {
        Application {
            pid: process.pid,
            name: process.name.clone(),
            is_hidden: false,
            process: Arc::downgrade(process),
        }
    }

    pub fn process(&self) -> Option<Arc<Process>> { self.process.upgrade() }
}
