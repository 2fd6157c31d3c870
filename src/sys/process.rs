use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

#[allow(non_camel_case_types)]
pub type pid_t = i32;

/// Probes a pid with the null signal. `EPERM` still means the process exists.
pub fn pid_is_alive(pid: pid_t) -> bool {
    if pid <= 0 {
        return false;
    }
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_pid_is_alive() { assert!(pid_is_alive(std::process::id() as pid_t)); }

    #[test]
    fn non_positive_pids_are_never_alive() {
        assert!(!pid_is_alive(0));
        assert!(!pid_is_alive(-1));
    }
}
