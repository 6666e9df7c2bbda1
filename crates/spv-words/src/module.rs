use crate::error::ModuleError;
use crate::instruction::Instruction;

/// The SPIR-V magic number, first word of every module.
pub const MAGIC: u32 = 0x0723_0203;

/// Number of words in the fixed module header
/// (magic, version, generator, id bound, schema).
pub const HEADER_WORDS: usize = 5;

/// A validated handle to a module's word stream.
///
/// Construction checks only the fixed header; instruction boundaries are
/// validated lazily while iterating, and the iterator fails fast (and fuses)
/// on the first malformed instruction.
#[derive(Debug, Clone, Copy)]
pub struct RawModule<'a> {
    words: &'a [u32],
}

impl<'a> RawModule<'a> {
    /// Wraps `words`, validating the 5-word header and magic number.
    pub fn new(words: &'a [u32]) -> Result<RawModule<'a>, ModuleError> {
        if words.len() < HEADER_WORDS {
            return Err(ModuleError::TooShort { words: words.len() });
        }
        if words[0] != MAGIC {
            return Err(ModuleError::BadMagic { found: words[0] });
        }
        Ok(RawModule { words })
    }

    /// The module's declared id bound (all result ids are below this).
    pub fn id_bound(&self) -> u32 {
        self.words[3]
    }

    /// The full word buffer, header included.
    pub fn words(&self) -> &'a [u32] {
        self.words
    }

    /// Iterates over instructions, starting after the module header.
    ///
    /// Yields `Err` for the first instruction whose declared length is zero or
    /// overruns the buffer, then stops. A walk that consumes every item
    /// without an error is guaranteed to have landed exactly on the declared
    /// end of the module.
    pub fn instructions(&self) -> Instructions<'a> {
        Instructions {
            words: self.words,
            pos: HEADER_WORDS,
            failed: false,
        }
    }
}

/// Iterator over a module's instructions. See [`RawModule::instructions`].
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    words: &'a [u32],
    pos: usize,
    failed: bool,
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ModuleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.words.len() {
            return None;
        }
        match Instruction::decode(self.words, self.pos) {
            Ok(insn) => {
                self.pos += insn.word_len();
                Some(Ok(insn))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
