use std::io;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicI32, Ordering};

/// Process signals the window manager reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// A child exited and needs reaping.
    Child,
    /// Restart in place.
    Hangup,
    /// Quit.
    Terminate,
}

impl SignalKind {
    fn from_raw(signal: u8) -> Option<Self> {
        match i32::from(signal) {
            libc::SIGCHLD => Some(SignalKind::Child),
            libc::SIGHUP => Some(SignalKind::Hangup),
            libc::SIGTERM => Some(SignalKind::Terminate),
            _ => None,
        }
    }
}

static WRITE_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn forward(signal: libc::c_int) {
    let fd = WRITE_FD.load(Ordering::Relaxed);
    if fd >= 0 {
        let byte = signal as u8;
        // SAFETY: write(2) is async-signal-safe and the buffer outlives the call.
        unsafe {
            libc::write(fd, (&byte as *const u8).cast(), 1);
        }
    }
}

/// Self-pipe carrying signal numbers from the handlers to the event loop.
pub struct SignalPipe {
    read_fd: RawFd,
    write_fd: RawFd,
}

impl SignalPipe {
    pub fn install() -> io::Result<Self> {
        let mut fds = [0 as RawFd; 2];
        // SAFETY: fds has room for the two descriptors pipe2 writes.
        if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_NONBLOCK | libc::O_CLOEXEC) } == -1 {
            return Err(io::Error::last_os_error());
        }
        let (read_fd, write_fd) = (fds[0], fds[1]);
        WRITE_FD.store(write_fd, Ordering::Relaxed);

        for signal in [libc::SIGCHLD, libc::SIGHUP, libc::SIGTERM] {
            // SAFETY: the sigaction struct is fully initialised before use and
            // the handler only performs async-signal-safe work.
            unsafe {
                let mut action: libc::sigaction = std::mem::zeroed();
                action.sa_sigaction = forward as extern "C" fn(libc::c_int) as libc::sighandler_t;
                action.sa_flags = libc::SA_RESTART | libc::SA_NOCLDSTOP;
                libc::sigemptyset(&mut action.sa_mask);
                if libc::sigaction(signal, &action, std::ptr::null_mut()) == -1 {
                    return Err(io::Error::last_os_error());
                }
            }
        }

        Ok(Self { read_fd, write_fd })
    }

    pub fn fd(&self) -> RawFd {
        self.read_fd
    }

    /// Signals received since the last call, oldest first.
    pub fn drain(&self) -> Vec<SignalKind> {
        let mut buffer = [0u8; 64];
        let mut signals = Vec::new();
        loop {
            // SAFETY: the buffer is valid for its full length.
            let read = unsafe {
                libc::read(self.read_fd, buffer.as_mut_ptr().cast(), buffer.len())
            };
            if read <= 0 {
                break;
            }
            signals.extend(
                buffer[..read as usize]
                    .iter()
                    .filter_map(|&signal| SignalKind::from_raw(signal)),
            );
        }
        signals
    }
}

impl Drop for SignalPipe {
    fn drop(&mut self) {
        WRITE_FD.store(-1, Ordering::Relaxed);
        // SAFETY: both descriptors were opened by install and are closed once.
        unsafe {
            libc::close(self.read_fd);
            libc::close(self.write_fd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_signal_mapping() {
        assert_eq!(
            SignalKind::from_raw(libc::SIGCHLD as u8),
            Some(SignalKind::Child)
        );
        assert_eq!(
            SignalKind::from_raw(libc::SIGTERM as u8),
            Some(SignalKind::Terminate)
        );
        assert_eq!(SignalKind::from_raw(libc::SIGUSR1 as u8), None);
    }
}
