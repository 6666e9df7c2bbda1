use crate::error::ModuleError;
use crate::spv::op;

/// A zero-copy view of one instruction in a module's word stream.
///
/// The view holds exactly the instruction's own words, so every accessor is
/// bounds-checked against the declared instruction length at construction
/// time. Instructions are referenced by their stream position (see
/// [`Instruction::at`]) and are cheap to copy; they never outlive the word
/// buffer they were decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    words: &'a [u32],
    at: usize,
    // Zero means "absent"; a present id always sits at word 1 or 2.
    result_index: usize,
    type_index: usize,
    operand_start: usize,
}

impl<'a> Instruction<'a> {
    /// Decodes the instruction starting at word offset `at` of `module_words`.
    ///
    /// Fails if the declared length is zero or runs past the end of the
    /// buffer. Both are fatal for the whole parse: every later instruction
    /// boundary depends on this one.
    pub fn decode(module_words: &'a [u32], at: usize) -> Result<Instruction<'a>, ModuleError> {
        let header = *module_words.get(at).ok_or(ModuleError::TruncatedInstruction {
            at,
            opcode: 0,
            declared_words: 1,
            remaining_words: 0,
        })?;
        let len = (header >> 16) as usize;
        let opcode = (header & 0xffff) as u16;

        if len == 0 {
            return Err(ModuleError::ZeroLengthInstruction { at });
        }
        let end = at.checked_add(len).ok_or(ModuleError::TruncatedInstruction {
            at,
            opcode,
            declared_words: len,
            remaining_words: module_words.len() - at,
        })?;
        let words = module_words
            .get(at..end)
            .ok_or(ModuleError::TruncatedInstruction {
                at,
                opcode,
                declared_words: len,
                remaining_words: module_words.len() - at,
            })?;

        let (has_result, has_type) = op::has_result_and_type(opcode);
        let mut result_index = 0;
        let mut type_index = 0;
        let mut operand_start = 1;
        if has_type {
            type_index = 1;
            operand_start += 1;
            if has_result {
                result_index = 2;
                operand_start += 1;
            }
        } else if has_result {
            result_index = 1;
            operand_start += 1;
        }

        // The declared length must cover the header plus any type/result id
        // words, or the id accessors would read out of bounds.
        if len < operand_start {
            return Err(ModuleError::ShortInstruction {
                at,
                opcode,
                declared_words: len,
                required_words: operand_start,
            });
        }

        Ok(Instruction {
            words,
            at,
            result_index,
            type_index,
            operand_start,
        })
    }

    /// Word offset of this instruction within the module's word stream.
    pub fn at(&self) -> usize {
        self.at
    }

    /// The instruction's opcode.
    pub fn opcode(&self) -> u16 {
        (self.words[0] & 0xffff) as u16
    }

    /// Length of the instruction in words (always at least 1).
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    /// Returns word `index` of the instruction, counting the header word as 0.
    pub fn word(&self, index: usize) -> Option<u32> {
        self.words.get(index).copied()
    }

    /// Returns operand `index`, skipping past any type/result id words.
    ///
    /// Returns `None` when the instruction is shorter than the requested
    /// operand; malformed instructions can legitimately be missing operands
    /// their opcode implies, and callers treat that as an unresolvable step
    /// rather than a fatal parse error.
    pub fn operand(&self, index: usize) -> Option<u32> {
        self.words.get(self.operand_start + index).copied()
    }

    /// Number of words following any type/result id words.
    pub fn num_operands(&self) -> usize {
        self.words.len() - self.operand_start
    }

    /// The operand words, after any type/result id words.
    pub fn operands(&self) -> &'a [u32] {
        &self.words[self.operand_start..]
    }

    /// The instruction's result id, or 0 if the opcode produces none.
    ///
    /// Id 0 is reserved by the encoding and never names a real result.
    pub fn result_id(&self) -> u32 {
        if self.result_index == 0 {
            0
        } else {
            self.words[self.result_index]
        }
    }

    /// The instruction's type id, or 0 if the opcode carries none.
    pub fn type_id(&self) -> u32 {
        if self.type_index == 0 {
            0
        } else {
            self.words[self.type_index]
        }
    }
}

/// Decodes a nul-terminated literal string from operand words.
///
/// Literal strings pack UTF-8 bytes little-endian, four per word, padded with
/// nuls. Invalid UTF-8 is replaced rather than rejected; names are purely
/// diagnostic.
pub fn literal_string(words: &[u32]) -> String {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    'outer: for word in words {
        for byte in word.to_le_bytes() {
            if byte == 0 {
                break 'outer;
            }
            bytes.push(byte);
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
