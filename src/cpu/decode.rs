//! Instruction decoder.
//!
//! Every instruction is a 16-bit big-endian word described by its four
//! nibbles. [`Opcode`] splits a word into its positional fields;
//! [`Instruction`] is the structured form produced by the dispatcher.

use serde::{Deserialize, Serialize};

/// Positional fields of a raw instruction word.
///
/// ```text
/// | top | x | y | n |
///         |  nn   |
///     |    nnn    |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    /// The full word.
    pub value: u16,
    /// Bits 12-15.
    pub top: u8,
    /// Bits 8-11, usually a register.
    pub x: u8,
    /// Bits 4-7, usually a register.
    pub y: u8,
    /// Bits 0-3.
    pub n: u8,
    /// Bits 0-7.
    pub nn: u8,
    /// Bits 0-11, usually an address.
    pub nnn: u16,
}

/// Split a raw word into its fields.
pub fn decode(value: u16) -> Opcode {
    Opcode {
        value,
        top: (value >> 12) as u8,
        x: ((value >> 8) & 0xF) as u8,
        y: ((value >> 4) & 0xF) as u8,
        n: (value & 0xF) as u8,
        nn: (value & 0xFF) as u8,
        nnn: value & 0x0FFF,
    }
}

/// A dispatched instruction.
///
/// `x` and `y` name registers, `nn` is an immediate byte, `nnn` an
/// address and `n` a sprite height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    // ==================== Flow ====================
    /// 00E0: clear the display
    Clear,
    /// 00EE: return from subroutine
    Return,
    /// 1NNN: PC := NNN
    Jump { nnn: u16 },
    /// 2NNN: push PC, PC := NNN
    Call { nnn: u16 },
    /// 3XNN: skip if VX == NN
    SkipIfEqual { x: u8, nn: u8 },
    /// 4XNN: skip if VX != NN
    SkipIfNotEqual { x: u8, nn: u8 },
    /// 5XY_: skip if VX == VY
    SkipIfRegistersEqual { x: u8, y: u8 },
    /// 9XY_: skip if VX != VY
    SkipIfRegistersNotEqual { x: u8, y: u8 },
    /// BNNN: PC := V0 + NNN
    JumpPlusBase { nnn: u16 },

    // ==================== Registers ====================
    /// 6XNN: VX := NN
    SetImmediate { x: u8, nn: u8 },
    /// 7XNN: VX += NN, VF untouched
    AddImmediate { x: u8, nn: u8 },
    /// 8XY0: VX := VY
    SetFromRegister { x: u8, y: u8 },
    /// 8XY1: VX |= VY
    Or { x: u8, y: u8 },
    /// 8XY2: VX &= VY
    And { x: u8, y: u8 },
    /// 8XY3: VX ^= VY
    Xor { x: u8, y: u8 },
    /// 8XY4: VX += VY, VF := carry
    AddRegisters { x: u8, y: u8 },
    /// 8XY5: VX -= VY, VF := borrow
    SubRegisters { x: u8, y: u8 },
    /// 8XY6: VX >>= 1, VF := shifted-out bit
    ShiftRight { x: u8, y: u8 },
    /// 8XY7: VX := VY - VX, VF := borrow
    ReverseSub { x: u8, y: u8 },
    /// 8XYE: VX <<= 1, VF := shifted-out bit
    ShiftLeft { x: u8, y: u8 },
    /// CXNN: VX := random & NN
    RandomMasked { x: u8, nn: u8 },

    // ==================== Index & memory ====================
    /// ANNN: I := NNN
    SetIndex { nnn: u16 },
    /// FX1E: I += VX
    AddToIndex { x: u8 },
    /// FX29: I := glyph address of VX
    SetIndexToGlyph { x: u8 },
    /// FX33: decimal digits of VX at I..I+2
    StoreDecimalDigits { x: u8 },
    /// FX55: store V0..=VX at I
    DumpRegisters { x: u8 },
    /// FX65: load V0..=VX from I
    LoadRegisters { x: u8 },

    // ==================== Display ====================
    /// DXYN: XOR an N-row sprite from I at (VX, VY)
    Draw { x: u8, y: u8, n: u8 },

    // ==================== Timers & keys ====================
    /// EX9E: skip if key VX is held
    SkipIfKeyPressed { x: u8 },
    /// EXA1: skip if key VX is not held
    SkipIfKeyNotPressed { x: u8 },
    /// FX07: VX := delay timer
    ReadDelayTimer { x: u8 },
    /// FX0A: wait for a key, VX := key
    WaitForKey { x: u8 },
    /// FX15: delay timer := VX
    SetDelayTimer { x: u8 },
    /// FX18: sound timer := VX
    SetSoundTimer { x: u8 },
}

#[inline]
fn xy(top: u16, x: u8, y: u8, n: u16) -> u16 {
    top << 12 | (x as u16 & 0xF) << 8 | (y as u16 & 0xF) << 4 | n
}

#[inline]
fn xnn(top: u16, x: u8, nn: u8) -> u16 {
    top << 12 | (x as u16 & 0xF) << 8 | nn as u16
}

/// Encode an instruction back to its raw word.
pub fn encode(instr: &Instruction) -> u16 {
    use Instruction::*;

    match *instr {
        Clear => 0x00E0,
        Return => 0x00EE,
        Jump { nnn } => 0x1000 | (nnn & 0x0FFF),
        Call { nnn } => 0x2000 | (nnn & 0x0FFF),
        SkipIfEqual { x, nn } => xnn(0x3, x, nn),
        SkipIfNotEqual { x, nn } => xnn(0x4, x, nn),
        SkipIfRegistersEqual { x, y } => xy(0x5, x, y, 0x0),
        SetImmediate { x, nn } => xnn(0x6, x, nn),
        AddImmediate { x, nn } => xnn(0x7, x, nn),
        SetFromRegister { x, y } => xy(0x8, x, y, 0x0),
        Or { x, y } => xy(0x8, x, y, 0x1),
        And { x, y } => xy(0x8, x, y, 0x2),
        Xor { x, y } => xy(0x8, x, y, 0x3),
        AddRegisters { x, y } => xy(0x8, x, y, 0x4),
        SubRegisters { x, y } => xy(0x8, x, y, 0x5),
        ShiftRight { x, y } => xy(0x8, x, y, 0x6),
        ReverseSub { x, y } => xy(0x8, x, y, 0x7),
        ShiftLeft { x, y } => xy(0x8, x, y, 0xE),
        SkipIfRegistersNotEqual { x, y } => xy(0x9, x, y, 0x0),
        SetIndex { nnn } => 0xA000 | (nnn & 0x0FFF),
        JumpPlusBase { nnn } => 0xB000 | (nnn & 0x0FFF),
        RandomMasked { x, nn } => xnn(0xC, x, nn),
        Draw { x, y, n } => xy(0xD, x, y, n as u16 & 0xF),
        SkipIfKeyPressed { x } => xnn(0xE, x, 0x9E),
        SkipIfKeyNotPressed { x } => xnn(0xE, x, 0xA1),
        ReadDelayTimer { x } => xnn(0xF, x, 0x07),
        WaitForKey { x } => xnn(0xF, x, 0x0A),
        SetDelayTimer { x } => xnn(0xF, x, 0x15),
        SetSoundTimer { x } => xnn(0xF, x, 0x18),
        AddToIndex { x } => xnn(0xF, x, 0x1E),
        SetIndexToGlyph { x } => xnn(0xF, x, 0x29),
        StoreDecimalDigits { x } => xnn(0xF, x, 0x33),
        DumpRegisters { x } => xnn(0xF, x, 0x55),
        LoadRegisters { x } => xnn(0xF, x, 0x65),
    }
}

/// Encode a sequence of instructions as a big-endian program image.
pub fn assemble_words(instructions: &[Instruction]) -> Vec<u8> {
    instructions
        .iter()
        .flat_map(|i| encode(i).to_be_bytes())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        let op = decode(0xABCD);
        assert_eq!(op.value, 0xABCD);
        assert_eq!(op.top, 0xA);
        assert_eq!(op.x, 0xB);
        assert_eq!(op.y, 0xC);
        assert_eq!(op.n, 0xD);
        assert_eq!(op.nn, 0xCD);
        assert_eq!(op.nnn, 0xBCD);
    }

    #[test]
    fn test_encode_known_words() {
        assert_eq!(encode(&Instruction::SetImmediate { x: 0xA, nn: 0x11 }), 0x6A11);
        assert_eq!(encode(&Instruction::StoreDecimalDigits { x: 2 }), 0xF233);
        assert_eq!(encode(&Instruction::DumpRegisters { x: 5 }), 0xF555);
        assert_eq!(encode(&Instruction::ShiftLeft { x: 1, y: 2 }), 0x812E);
        assert_eq!(encode(&Instruction::Draw { x: 0, y: 1, n: 5 }), 0xD015);
    }

    #[test]
    fn test_assemble_words_is_big_endian() {
        let image = assemble_words(&[
            Instruction::SetImmediate { x: 0xA, nn: 0x11 },
            Instruction::Clear,
        ]);
        assert_eq!(image, vec![0x6A, 0x11, 0x00, 0xE0]);
    }
}
