use core::fmt;

/// A fatal defect in the module's word stream.
///
/// Any of these aborts the whole parse; there is no partial recovery at this
/// layer because every later instruction boundary depends on the declared
/// length of the instructions before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// The buffer is too short to contain the fixed-size module header.
    TooShort {
        /// Number of words actually present.
        words: usize,
    },
    /// The first header word is not the SPIR-V magic number.
    BadMagic {
        /// The word found where the magic number was expected.
        found: u32,
    },
    /// An instruction declared a word length of zero, which can never be valid
    /// and would stall the walk.
    ZeroLengthInstruction {
        /// Word offset of the offending instruction.
        at: usize,
    },
    /// An instruction's declared length is too short to hold the type/result
    /// id words its opcode requires.
    ShortInstruction {
        /// Word offset of the offending instruction.
        at: usize,
        /// The raw opcode of the offending instruction.
        opcode: u16,
        /// Words the instruction claims to occupy.
        declared_words: usize,
        /// Minimum words the opcode's fixed layout needs.
        required_words: usize,
    },
    /// An instruction's declared length runs past the end of the buffer, so
    /// the final position cannot land on the declared end of the module.
    TruncatedInstruction {
        /// Word offset of the offending instruction.
        at: usize,
        /// The raw opcode of the offending instruction.
        opcode: u16,
        /// Words the instruction claims to occupy.
        declared_words: usize,
        /// Words actually remaining in the buffer.
        remaining_words: usize,
    },
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::TooShort { words } => {
                write!(f, "module has {words} words, smaller than the 5-word header")
            }
            ModuleError::BadMagic { found } => {
                write!(f, "bad magic word {found:#010x}, expected {:#010x}", crate::MAGIC)
            }
            ModuleError::ZeroLengthInstruction { at } => {
                write!(f, "instruction at word {at} declares a length of 0")
            }
            ModuleError::ShortInstruction {
                at,
                opcode,
                declared_words,
                required_words,
            } => write!(
                f,
                "instruction at word {at} (opcode {opcode}) declares {declared_words} words but its opcode needs at least {required_words}"
            ),
            ModuleError::TruncatedInstruction {
                at,
                opcode,
                declared_words,
                remaining_words,
            } => write!(
                f,
                "instruction at word {at} (opcode {opcode}) declares {declared_words} words but only {remaining_words} remain"
            ),
        }
    }
}

impl std::error::Error for ModuleError {}
