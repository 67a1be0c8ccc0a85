//! Worker process creation.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Starts one worker process per call.
pub trait Launcher {
    fn launch(&mut self) -> io::Result<Child>;
}

impl<F> Launcher for F
where
    F: FnMut() -> io::Result<Child>,
{
    fn launch(&mut self) -> io::Result<Child> {
        self()
    }
}

/// Launches a fixed command line.
///
/// Children inherit stdout/stderr so worker logs interleave with the
/// supervisor's; stdin is closed.
#[derive(Debug, Clone)]
pub struct ExecLauncher {
    program: PathBuf,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl ExecLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Re-execute the running binary.
    pub fn current_exe() -> io::Result<Self> {
        std::env::current_exe().map(Self::new)
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_owned(), value.as_ref().to_owned()));
        self
    }
}

impl Launcher for ExecLauncher {
    fn launch(&mut self) -> io::Result<Child> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null());
        #[cfg(any(target_os = "linux", target_os = "android"))]
        tie_to_parent(&mut command);
        command.spawn()
    }
}

/// Have the kernel send SIGTERM to the child once its parent is gone.
///
/// The parent is the launching *thread*: workers must be launched from the
/// thread that outlives them (the supervisor loop).
#[cfg(any(target_os = "linux", target_os = "android"))]
fn tie_to_parent(command: &mut Command) {
    use nix::errno::Errno;
    use nix::sys::prctl;
    use nix::sys::signal::Signal;
    use nix::unistd::{getpid, getppid};
    use std::os::unix::process::CommandExt;

    let parent = getpid();
    // SAFETY: the hook only issues async-signal-safe syscalls and does not
    // allocate.
    unsafe {
        command.pre_exec(move || {
            prctl::set_pdeathsig(Signal::SIGTERM)?;
            // The parent died before the signal was armed
            if getppid() != parent {
                return Err(Errno::ESRCH.into());
            }
            Ok(())
        });
    }
}
