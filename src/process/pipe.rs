use std::os::fd::{FromRawFd, OwnedFd, RawFd};

/// The two ends of an anonymous OS pipe.
#[derive(Debug)]
pub struct Pipe {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl Pipe {
    /// Creates a pipe whose ends are close-on-exec, so the only children that
    /// ever hold them are the ones they are explicitly handed to.
    pub fn new() -> nix::Result<Self> {
        let (read, write) = cloexec_pipe()?;

        // SAFETY: both descriptors were just returned by pipe(2) and are owned
        // by nothing else
        let (read, write) = unsafe { (OwnedFd::from_raw_fd(read), OwnedFd::from_raw_fd(write)) };

        Ok(Self { read, write })
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn cloexec_pipe() -> nix::Result<(RawFd, RawFd)> {
    nix::unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC)
}

// no pipe2 here, the flag is set right after creation instead
#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn cloexec_pipe() -> nix::Result<(RawFd, RawFd)> {
    use nix::{
        fcntl::{fcntl, FcntlArg, FdFlag},
        unistd::{close, pipe},
    };

    let (read, write) = pipe()?;

    for fd in [read, write] {
        if let Err(err) = fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)) {
            let _ = close(read);
            let _ = close(write);
            return Err(err);
        }
    }

    Ok((read, write))
}
