//! Kernel load average via `getloadavg`

use super::LoadSource;
use crate::error::{CheckError, Result};
use crate::models::LoadSample;
use async_trait::async_trait;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Fills up to three averages and returns how many it wrote, or -1 on failure
pub type LoadAvgReader = fn(&mut [f64; 3]) -> i32;

/// Whether this platform has a `getloadavg` to call
pub const HAS_GETLOADAVG: bool = cfg!(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
));

#[cfg(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
fn getloadavg(averages: &mut [f64; 3]) -> i32 {
    // SAFETY: the buffer holds exactly the three elements requested
    unsafe { libc::getloadavg(averages.as_mut_ptr(), 3) }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
)))]
fn getloadavg(_averages: &mut [f64; 3]) -> i32 {
    -1
}

/// Load source backed by the platform's `getloadavg`
#[derive(Debug, Clone, Copy)]
pub struct SyscallLoadSource {
    reader: LoadAvgReader,
}

impl SyscallLoadSource {
    pub fn new() -> Self {
        Self {
            reader: getloadavg,
        }
    }

    /// Create a source with a custom reader (for testing)
    pub fn with_reader(reader: LoadAvgReader) -> Self {
        Self { reader }
    }
}

impl Default for SyscallLoadSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoadSource for SyscallLoadSource {
    async fn load(&self) -> Result<LoadSample> {
        let mut averages = [0.0f64; 3];
        let count = (self.reader)(&mut averages);
        if count != 3 {
            return Err(CheckError::load(format!(
                "Error in getloadavg(): got {} of 3 values",
                count
            )));
        }
        Ok(LoadSample(averages))
    }

    fn name(&self) -> &str {
        "getloadavg"
    }
}

/// Number of online logical CPUs, `None` when it cannot be determined
pub fn online_cpu_count() -> Option<usize> {
    let sys = System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    let count = sys.cpus().len();
    (count > 0).then_some(count)
}
