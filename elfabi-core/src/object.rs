use crate::abi::{multilib_abi, MultilibAbi};
use crate::identity::ElfIdentity;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;

/// An ELF object on disk, reduced to the header fields classification
/// needs. The file handle is released before `open` returns, on every
/// exit path.
#[derive(Debug)]
pub struct ElfObject {
    pub path: String,
    pub identity: ElfIdentity,
}

impl ElfObject {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)
            .with_context(|| format!("{} does not exist", path.display()))?;
        if !meta.is_file() {
            bail!("{} is not a regular file", path.display());
        }

        let mut file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let identity = ElfIdentity::from_reader(&mut file)
            .with_context(|| format!("failed to classify {}", path.display()))?;
        log::info!(
            "{}: machine {:#x}, {}-bit, {}-endian, flags {:#010x}",
            path.display(),
            identity.machine,
            identity.word_width.bits(),
            identity.byte_order.as_str(),
            identity.flags
        );

        Ok(Self {
            path: path.display().to_string(),
            identity,
        })
    }

    pub fn abi(&self) -> MultilibAbi {
        multilib_abi(&self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_reported_by_name() {
        let err = ElfObject::open("/no/such/object").unwrap_err();
        assert!(err.to_string().contains("/no/such/object"));
    }

    #[test]
    fn directories_are_rejected() {
        let err = ElfObject::open(std::env::temp_dir()).unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }
}
