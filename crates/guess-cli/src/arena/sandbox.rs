//! Optional per-contestant confinement.
//!
//! The contestant leaves its user, mount, UTS and IPC namespaces, maps
//! itself to `nobody`, pivots into its own root directory and drops to
//! uid/gid 65534 before exec. Everything that allocates or touches the
//! filesystem layout happens in [`Sandbox::prepare`] in the arena;
//! [`Sandbox::enter`] runs in the forked child and only issues syscalls.
//!
//! The executable path given to the arena is resolved inside the new root.

use anyhow::{bail, Context};
use nix::fcntl::{open, OFlag};
use nix::mount::{mount, umount2, MntFlags, MsFlags};
use nix::sched::{unshare, CloneFlags};
use nix::sys::stat::Mode;
use nix::unistd::{chdir, close, getegid, geteuid, pivot_root, setgid, setgroups, setuid, write};
use nix::unistd::{Gid, Uid};
use std::fs;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// uid and gid of `nobody`, inside the sandbox and, for a root arena,
/// outside it too.
pub const NOBODY: u32 = 65534;

const OLD_ROOT: &str = ".old_root";
const OLD_ROOT_AFTER_PIVOT: &str = "/.old_root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    rootfs: PathBuf,
    proc_dir: PathBuf,
    old_root: PathBuf,
    /// A root arena first becomes `nobody` in its own namespace, so the
    /// contestant never maps onto host root.
    drop_first: bool,
    uid_map: String,
    gid_map: String,
}

impl Sandbox {
    /// Resolves `rootfs` and creates the `proc` and pivot directories in it.
    pub fn prepare(rootfs: &Path) -> anyhow::Result<Self> {
        let rootfs = fs::canonicalize(rootfs)
            .with_context(|| format!("rootfs {} not found", rootfs.display()))?;
        if !rootfs.is_dir() {
            bail!("rootfs {} is not a directory", rootfs.display());
        }
        if rootfs == Path::new("/") {
            bail!("rootfs must not be the host root");
        }

        let proc_dir = rootfs.join("proc");
        let old_root = rootfs.join(OLD_ROOT);
        for dir in [&proc_dir, &old_root] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let drop_first = geteuid().is_root();
        let (outer_uid, outer_gid) = if drop_first {
            (NOBODY, NOBODY)
        } else {
            (geteuid().as_raw(), getegid().as_raw())
        };

        Ok(Self {
            rootfs,
            proc_dir,
            old_root,
            drop_first,
            uid_map: id_map(outer_uid),
            gid_map: id_map(outer_gid),
        })
    }

    pub fn rootfs(&self) -> &Path {
        &self.rootfs
    }

    /// Arranges for the child of `cmd` to enter the sandbox before exec.
    #[allow(unsafe_code)]
    pub fn apply(&self, cmd: &mut Command) {
        let sandbox = self.clone();
        // SAFETY: pre_exec runs after fork, before exec in the child.
        // Sandbox::enter only issues syscalls on buffers prepared in the
        // parent; paths are short enough for nix's stack conversion, so no
        // allocation happens in the child.
        unsafe {
            cmd.pre_exec(move || sandbox.enter());
        }
    }

    fn enter(&self) -> io::Result<()> {
        let nobody_uid = Uid::from_raw(NOBODY);
        let nobody_gid = Gid::from_raw(NOBODY);

        if self.drop_first {
            setgroups(&[])?;
            setgid(nobody_gid)?;
            setuid(nobody_uid)?;
        }

        unshare(
            CloneFlags::CLONE_NEWUSER
                | CloneFlags::CLONE_NEWNS
                | CloneFlags::CLONE_NEWUTS
                | CloneFlags::CLONE_NEWIPC,
        )?;
        write_proc_file("/proc/self/setgroups", b"deny")?;
        write_proc_file("/proc/self/uid_map", self.uid_map.as_bytes())?;
        write_proc_file("/proc/self/gid_map", self.gid_map.as_bytes())?;

        mount(
            None::<&str>,
            "/",
            None::<&str>,
            MsFlags::MS_PRIVATE | MsFlags::MS_REC,
            None::<&str>,
        )?;
        mount(
            Some(&self.rootfs),
            &self.rootfs,
            None::<&str>,
            MsFlags::MS_BIND | MsFlags::MS_REC,
            None::<&str>,
        )?;
        // Hosts that lock /proc leave the contestant without it.
        let _ = mount(
            Some("/proc"),
            &self.proc_dir,
            None::<&str>,
            MsFlags::MS_BIND | MsFlags::MS_REC,
            None::<&str>,
        );

        pivot_root(&self.rootfs, &self.old_root)?;
        chdir("/")?;
        umount2(OLD_ROOT_AFTER_PIVOT, MntFlags::MNT_DETACH)?;

        setgid(nobody_gid)?;
        setuid(nobody_uid)?;
        Ok(())
    }
}

/// Single-line id map placing `outer` at `nobody` inside the namespace.
fn id_map(outer: u32) -> String {
    format!("{NOBODY} {outer} 1\n")
}

fn write_proc_file(path: &str, data: &[u8]) -> nix::Result<()> {
    let fd = open(path, OFlag::O_WRONLY | OFlag::O_CLOEXEC, Mode::empty())?;
    let written = write(fd, data);
    let _ = close(fd);
    written.map(|_| ())
}
