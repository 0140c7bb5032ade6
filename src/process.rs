use std::fs;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

/// The processes around the window manager: parent links, used to decide
/// which terminal launched a window, and the commands it starts.
pub trait Processes {
    fn parent(&self, pid: u32) -> Option<u32>;

    fn spawn(&self, argv: &[String]) -> io::Result<()> {
        spawn(argv)
    }

    /// Whether `pid` is `ancestor` or one of its descendants.
    fn is_descendant(&self, ancestor: u32, mut pid: u32) -> bool {
        while pid != ancestor && pid != 0 {
            match self.parent(pid) {
                Some(parent) if parent != pid => pid = parent,
                _ => return false,
            }
        }
        pid != 0
    }
}

/// Reads parent pids from `/proc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcFs;

impl Processes for ProcFs {
    fn parent(&self, pid: u32) -> Option<u32> {
        let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
        parse_parent(&stat)
    }
}

/// The ppid field of a `/proc/<pid>/stat` line. The command name may
/// contain spaces and parentheses, so parsing starts after the last `)`.
fn parse_parent(stat: &str) -> Option<u32> {
    let rest = &stat[stat.rfind(')')? + 1..];
    rest.split_whitespace().nth(1)?.parse().ok()
}

/// Starts `argv` detached in its own session.
pub fn spawn(argv: &[String]) -> io::Result<()> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());
    // SAFETY: setsid is async-signal-safe and touches no parent state.
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
    command.spawn()?;
    Ok(())
}

/// Collects every exited child without blocking.
pub fn reap_children() {
    loop {
        // SAFETY: waitpid with WNOHANG and a null status pointer is always valid.
        let pid = unsafe { libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG) };
        if pid <= 0 {
            break;
        }
    }
}

/// Runs `command` through the shell and returns its standard output.
pub fn read_command(command: &str) -> io::Result<String> {
    let output = Command::new("sh").arg("-c").arg(command).output()?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Tree(HashMap<u32, u32>);

    impl Processes for Tree {
        fn parent(&self, pid: u32) -> Option<u32> {
            self.0.get(&pid).copied()
        }
    }

    #[test]
    fn test_parse_parent_with_spaces_in_name() {
        let stat = "4242 (my (odd) prog) S 17 4242 4242 0 -1";
        assert_eq!(parse_parent(stat), Some(17));
        assert_eq!(parse_parent("garbage"), None);
    }

    #[test]
    fn test_descendant_walks_to_init() {
        let tree = Tree(HashMap::from([(30, 20), (20, 10), (10, 1), (1, 0)]));
        assert!(tree.is_descendant(10, 30));
        assert!(tree.is_descendant(30, 30));
        assert!(!tree.is_descendant(20, 10));
        assert!(!tree.is_descendant(99, 30));
    }

    #[test]
    fn test_descendant_stops_on_unknown_pid() {
        let tree = Tree(HashMap::new());
        assert!(!tree.is_descendant(10, 30));
    }

    #[test]
    fn test_current_process_descends_from_parent() {
        let pid = std::process::id();
        let parent = ProcFs.parent(pid);
        if let Some(parent) = parent {
            assert!(ProcFs.is_descendant(parent, pid));
        }
    }
}
