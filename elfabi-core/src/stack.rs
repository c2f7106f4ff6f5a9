use anyhow::{Context, Result};
use goblin::elf::Elf;
use goblin::elf32::program_header::{PF_R, PF_W, PF_X, PT_GNU_STACK};
use std::fmt;
use std::path::Path;

/// Permission bits of a `PT_GNU_STACK` program header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackPerms {
    pub read: bool,
    pub write: bool,
    pub exec: bool,
}

impl StackPerms {
    fn from_flags(p_flags: u32) -> Self {
        StackPerms {
            read: p_flags & PF_R != 0,
            write: p_flags & PF_W != 0,
            exec: p_flags & PF_X != 0,
        }
    }

    /// The set permission letters, unset ones omitted.
    pub fn letters(&self) -> String {
        let mut s = String::new();
        if self.read {
            s.push('R');
        }
        if self.write {
            s.push('W');
        }
        if self.exec {
            s.push('X');
        }
        s
    }
}

impl fmt::Display for StackPerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.letters())
    }
}

/// Reports the `GNU_STACK` permissions of the object at `path`, or
/// `None` when the object carries no such program header.
pub fn gnu_stack<P: AsRef<Path>>(path: P) -> Result<Option<StackPerms>> {
    let path = path.as_ref();
    let buf = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    gnu_stack_from_bytes(&buf).with_context(|| format!("failed to parse {}", path.display()))
}

fn gnu_stack_from_bytes(buf: &[u8]) -> Result<Option<StackPerms>> {
    let elf = Elf::parse(buf)?;
    for ph in &elf.program_headers {
        if ph.p_type == PT_GNU_STACK {
            return Ok(Some(StackPerms::from_flags(ph.p_flags)));
        }
    }
    log::warn!("no GNU_STACK program header");
    Ok(None)
}
