//! Virtual router execution context.
//!
//! EXOS runs every command inside a virtual router (VR) namespace. Rather
//! than switching the namespace of the whole process, helpers carry the
//! desired VR in an [`ExecContext`] that executors apply per command.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

/// Kernel-exposed file holding the namespace id of the current process.
pub const NS_ID_PATH: &str = "/proc/self/ns_id";

/// Virtual router a command executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualRouter {
    /// VR-Mgmt (namespace 0).
    Mgmt,
    /// VR-Default (namespace 2).
    Default,
    /// User-created VR with its namespace number.
    User(u32),
}

impl VirtualRouter {
    /// Returns the namespace id written to the kernel.
    pub const fn id(&self) -> u32 {
        match self {
            VirtualRouter::Mgmt => 0,
            VirtualRouter::Default => 2,
            VirtualRouter::User(id) => *id,
        }
    }
}

impl fmt::Display for VirtualRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualRouter::Mgmt => write!(f, "VR-Mgmt"),
            VirtualRouter::Default => write!(f, "VR-Default"),
            VirtualRouter::User(id) => write!(f, "VR-{}", id),
        }
    }
}

impl FromStr for VirtualRouter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mgmt" | "vr-mgmt" => Ok(VirtualRouter::Mgmt),
            "default" | "vr-default" => Ok(VirtualRouter::Default),
            other => match other.parse::<u32>() {
                Ok(0) => Ok(VirtualRouter::Mgmt),
                Ok(2) => Ok(VirtualRouter::Default),
                Ok(id) => Ok(VirtualRouter::User(id)),
                Err(_) => Err(format!("invalid virtual router '{}'", s)),
            },
        }
    }
}

/// Execution context attached to every CLI request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecContext {
    /// VR to run in; `None` keeps whatever namespace the executor is in.
    pub vr: Option<VirtualRouter>,
}

impl ExecContext {
    /// Creates a context pinned to a virtual router.
    pub fn in_vr(vr: VirtualRouter) -> Self {
        Self { vr: Some(vr) }
    }
}

/// Moves the current process into `vr` by writing [`NS_ID_PATH`].
///
/// Every command the process runs afterwards executes in that namespace
/// until changed back. Returns `false` if the write fails.
pub fn enter_namespace(vr: VirtualRouter) -> bool {
    enter_namespace_at(Path::new(NS_ID_PATH), vr)
}

/// Writes the namespace id of `vr` to `path`. Returns `false` on any IO error.
pub fn enter_namespace_at(path: &Path, vr: VirtualRouter) -> bool {
    let result = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .and_then(|mut f| f.write_all(format!("{}\n", vr.id()).as_bytes()));

    match result {
        Ok(()) => {
            debug!(vr = %vr, path = %path.display(), "Switched namespace");
            true
        }
        Err(e) => {
            warn!(vr = %vr, path = %path.display(), error = %e, "Namespace switch failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_vr_ids() {
        assert_eq!(VirtualRouter::Mgmt.id(), 0);
        assert_eq!(VirtualRouter::Default.id(), 2);
        assert_eq!(VirtualRouter::User(5).id(), 5);
    }

    #[test]
    fn test_vr_from_str() {
        assert_eq!("VR-Mgmt".parse::<VirtualRouter>().unwrap(), VirtualRouter::Mgmt);
        assert_eq!("default".parse::<VirtualRouter>().unwrap(), VirtualRouter::Default);
        assert_eq!("2".parse::<VirtualRouter>().unwrap(), VirtualRouter::Default);
        assert_eq!("0".parse::<VirtualRouter>().unwrap(), VirtualRouter::Mgmt);
        assert_eq!("7".parse::<VirtualRouter>().unwrap(), VirtualRouter::User(7));
        assert!("vr-blue".parse::<VirtualRouter>().is_err());
    }

    #[test]
    fn test_vr_display() {
        assert_eq!(VirtualRouter::Mgmt.to_string(), "VR-Mgmt");
        assert_eq!(VirtualRouter::User(9).to_string(), "VR-9");
    }

    #[test]
    fn test_exec_context_default_has_no_vr() {
        assert_eq!(ExecContext::default().vr, None);
        assert_eq!(
            ExecContext::in_vr(VirtualRouter::Default).vr,
            Some(VirtualRouter::Default)
        );
    }

    #[test]
    fn test_enter_namespace_writes_id() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "0\n").unwrap();

        assert!(enter_namespace_at(file.path(), VirtualRouter::Default));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "2\n");
    }

    #[test]
    fn test_enter_namespace_failure_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("ns_id");
        assert!(!enter_namespace_at(&missing, VirtualRouter::Mgmt));
    }
}
