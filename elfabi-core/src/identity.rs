use byteorder::{ReadBytesExt, BE, LE};
use std::error::Error;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// Magic bytes at the start of every ELF object: `0x7F 'E' 'L' 'F'`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const ELFDATA2MSB: u8 = 2;

/// File offset of `e_machine`: the 16-byte identification area plus the
/// 2-byte `e_type`. Identical for 32- and 64-bit objects.
pub const E_MACHINE_OFFSET: u64 = 18;
/// File offset of `e_flags` in an `Elf32_Ehdr`.
pub const E_FLAGS_OFFSET_32: u64 = 36;
/// File offset of `e_flags` in an `Elf64_Ehdr`. Larger than the 32-bit
/// offset only because `e_entry`/`e_phoff`/`e_shoff` grow to 8 bytes;
/// everything before `e_machine` is fixed-size.
pub const E_FLAGS_OFFSET_64: u64 = 48;

/// Word width declared by `e_ident[EI_CLASS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordWidth {
    W32,
    W64,
}

impl WordWidth {
    pub fn bits(self) -> u32 {
        match self {
            WordWidth::W32 => 32,
            WordWidth::W64 => 64,
        }
    }
}

/// Byte order declared by `e_ident[EI_DATA]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            ByteOrder::Little => "little",
            ByteOrder::Big => "big",
        }
    }
}

/// The handful of ELF header fields the ABI classifier needs, extracted
/// in one pass over the identification area and the two fixed-offset
/// fields behind it.
///
/// Multi-byte fields are accumulated in the order the file declares, so
/// the values are the same no matter what the host's native byte order
/// is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfIdentity {
    pub word_width: WordWidth,
    pub byte_order: ByteOrder,
    /// `e_machine`, the target instruction set.
    pub machine: u16,
    /// `e_flags`, architecture-specific flag bits.
    pub flags: u32,
}

impl ElfIdentity {
    /// Reads the identity fields from a source positioned at the start
    /// of an ELF file.
    pub fn from_reader<R: Read + Seek>(r: &mut R) -> Result<Self, IdentityError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)
            .map_err(|e| IdentityError::truncated("magic", e))?;
        if magic != ELF_MAGIC {
            return Err(IdentityError::NotAnElfFile);
        }

        let ei_class = r
            .read_u8()
            .map_err(|e| IdentityError::truncated("ei_class", e))?;
        let word_width = match ei_class {
            ELFCLASS32 => WordWidth::W32,
            ELFCLASS64 => WordWidth::W64,
            other => return Err(IdentityError::UnsupportedWordWidth(other)),
        };

        let ei_data = r
            .read_u8()
            .map_err(|e| IdentityError::truncated("ei_data", e))?;
        let byte_order = match ei_data {
            ELFDATA2LSB => ByteOrder::Little,
            ELFDATA2MSB => ByteOrder::Big,
            other => return Err(IdentityError::UnsupportedByteOrder(other)),
        };

        r.seek(SeekFrom::Start(E_MACHINE_OFFSET))
            .map_err(|e| IdentityError::truncated("e_machine", e))?;
        let machine =
            read_u16(r, byte_order).map_err(|e| IdentityError::truncated("e_machine", e))?;

        r.seek(SeekFrom::Start(flags_offset(word_width)))
            .map_err(|e| IdentityError::truncated("e_flags", e))?;
        let flags = read_u32(r, byte_order).map_err(|e| IdentityError::truncated("e_flags", e))?;

        Ok(ElfIdentity {
            word_width,
            byte_order,
            machine,
            flags,
        })
    }
}

/// Where `e_flags` lives for the given word width. The only
/// width-dependent offset in the header prefix we read.
pub fn flags_offset(width: WordWidth) -> u64 {
    match width {
        WordWidth::W32 => E_FLAGS_OFFSET_32,
        WordWidth::W64 => E_FLAGS_OFFSET_64,
    }
}

fn read_u16<R: Read>(r: &mut R, order: ByteOrder) -> io::Result<u16> {
    match order {
        ByteOrder::Little => r.read_u16::<LE>(),
        ByteOrder::Big => r.read_u16::<BE>(),
    }
}

fn read_u32<R: Read>(r: &mut R, order: ByteOrder) -> io::Result<u32> {
    match order {
        ByteOrder::Little => r.read_u32::<LE>(),
        ByteOrder::Big => r.read_u32::<BE>(),
    }
}

/// Failure to extract an [`ElfIdentity`].
///
/// A malformed identification area is fatal; an unrecognized machine
/// code is not an error at all and classifies as `unknown` downstream.
#[derive(Debug)]
pub enum IdentityError {
    /// The first four bytes are not the ELF magic.
    NotAnElfFile,
    /// `e_ident[EI_CLASS]` is neither ELFCLASS32 nor ELFCLASS64.
    UnsupportedWordWidth(u8),
    /// `e_ident[EI_DATA]` is neither ELFDATA2LSB nor ELFDATA2MSB.
    UnsupportedByteOrder(u8),
    /// A read or seek failed before the field was fully consumed.
    Truncated {
        step: &'static str,
        source: io::Error,
    },
}

impl IdentityError {
    fn truncated(step: &'static str, source: io::Error) -> Self {
        IdentityError::Truncated { step, source }
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::NotAnElfFile => write!(f, "not an ELF object"),
            IdentityError::UnsupportedWordWidth(b) => {
                write!(f, "unsupported EI_CLASS byte {b:#04x}")
            }
            IdentityError::UnsupportedByteOrder(b) => {
                write!(f, "unsupported EI_DATA byte {b:#04x}")
            }
            IdentityError::Truncated { step, source } => {
                write!(f, "truncated file while reading {step}: {source}")
            }
        }
    }
}

impl Error for IdentityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IdentityError::Truncated { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Lay out a minimal header: magic, class, data, machine at 18 and
    /// flags at 36/48, with multi-byte fields in the declared order.
    fn header(class: u8, data: u8, machine: u16, flags: u32) -> Vec<u8> {
        let mut buf = vec![0u8; 64];
        buf[..4].copy_from_slice(&ELF_MAGIC);
        buf[4] = class;
        buf[5] = data;
        let m = match data {
            ELFDATA2MSB => machine.to_be_bytes(),
            _ => machine.to_le_bytes(),
        };
        buf[18..20].copy_from_slice(&m);
        let off = match class {
            ELFCLASS32 => 36,
            _ => 48,
        };
        let fl = match data {
            ELFDATA2MSB => flags.to_be_bytes(),
            _ => flags.to_le_bytes(),
        };
        buf[off..off + 4].copy_from_slice(&fl);
        buf
    }

    fn extract(bytes: &[u8]) -> Result<ElfIdentity, IdentityError> {
        ElfIdentity::from_reader(&mut Cursor::new(bytes))
    }

    #[test]
    fn parses_x86_64_little_endian() {
        let ident = extract(&header(ELFCLASS64, ELFDATA2LSB, 62, 0)).unwrap();
        assert_eq!(ident.word_width, WordWidth::W64);
        assert_eq!(ident.byte_order, ByteOrder::Little);
        assert_eq!(ident.machine, 62);
        assert_eq!(ident.flags, 0);
    }

    #[test]
    fn parses_big_endian_fields() {
        let ident = extract(&header(ELFCLASS32, ELFDATA2MSB, 8, 0x2000_0020)).unwrap();
        assert_eq!(ident.word_width, WordWidth::W32);
        assert_eq!(ident.byte_order, ByteOrder::Big);
        assert_eq!(ident.machine, 8);
        assert_eq!(ident.flags, 0x2000_0020);
    }

    #[test]
    fn endianness_of_encoding_never_changes_the_values() {
        let le = extract(&header(ELFCLASS64, ELFDATA2LSB, 21, 0x8000_0001)).unwrap();
        let be = extract(&header(ELFCLASS64, ELFDATA2MSB, 21, 0x8000_0001)).unwrap();
        assert_eq!(le.machine, be.machine);
        assert_eq!(le.flags, be.flags);
    }

    #[test]
    fn word_width_is_always_32_or_64() {
        for class in [ELFCLASS32, ELFCLASS64] {
            let ident = extract(&header(class, ELFDATA2LSB, 3, 0)).unwrap();
            assert!(matches!(ident.word_width.bits(), 32 | 64));
        }
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = header(ELFCLASS64, ELFDATA2LSB, 62, 0);
        buf[0] = 0x7e;
        assert!(matches!(
            extract(&buf).unwrap_err(),
            IdentityError::NotAnElfFile
        ));
    }

    #[test]
    fn rejects_unknown_class_byte() {
        let buf = header(3, ELFDATA2LSB, 62, 0);
        assert!(matches!(
            extract(&buf).unwrap_err(),
            IdentityError::UnsupportedWordWidth(3)
        ));
    }

    #[test]
    fn rejects_unknown_data_byte() {
        let buf = header(ELFCLASS64, 0, 62, 0);
        assert!(matches!(
            extract(&buf).unwrap_err(),
            IdentityError::UnsupportedByteOrder(0)
        ));
    }

    #[test]
    fn every_truncated_prefix_fails_cleanly() {
        let full = header(ELFCLASS64, ELFDATA2LSB, 62, 0);
        // Everything short of the end of e_flags at offset 52 is a
        // short read somewhere.
        for len in 0..52 {
            match extract(&full[..len]) {
                Err(IdentityError::Truncated { .. }) => {}
                other => panic!("prefix of {len} bytes: expected truncation, got {other:?}"),
            }
        }
    }

    #[test]
    fn same_bytes_same_identity() {
        let buf = header(ELFCLASS32, ELFDATA2MSB, 40, 0x0500_0000);
        assert_eq!(extract(&buf).unwrap(), extract(&buf).unwrap());
    }

    #[test]
    fn flags_offset_depends_only_on_width() {
        assert_eq!(flags_offset(WordWidth::W32), E_FLAGS_OFFSET_32);
        assert_eq!(flags_offset(WordWidth::W64), E_FLAGS_OFFSET_64);
    }
}
