//! Opcode dispatch.
//!
//! Several bit patterns are supersets of others (`00E0` and `00EE` both
//! sit inside the `0NNN` space, the `8`, `E` and `F` families share a top
//! nibble), so matching is a first-hit scan over an ordered table of
//! `(mask, pattern)` rules. Exact words come first, then whole-family
//! top-nibble rules, then the sub-tables keyed on the low nibble or low
//! byte.

use crate::cpu::decode::{Instruction, Opcode};

/// Builds the structured instruction from the decoded fields.
type Build = fn(&Opcode) -> Instruction;

/// One dispatch rule: matches when `value & mask == pattern`.
struct Rule {
    mask: u16,
    pattern: u16,
    build: Build,
}

const fn rule(mask: u16, pattern: u16, build: Build) -> Rule {
    Rule { mask, pattern, build }
}

const EXACT: u16 = 0xFFFF;
const TOP: u16 = 0xF000;
const LOW_NIBBLE: u16 = 0xF00F;
const LOW_BYTE: u16 = 0xF0FF;

/// Dispatch rules in priority order.
static RULES: &[Rule] = &[
    // Exact words
    rule(EXACT, 0x00E0, |_| Instruction::Clear),
    rule(EXACT, 0x00EE, |_| Instruction::Return),
    // Top-nibble families
    rule(TOP, 0x1000, |o| Instruction::Jump { nnn: o.nnn }),
    rule(TOP, 0x2000, |o| Instruction::Call { nnn: o.nnn }),
    rule(TOP, 0x3000, |o| Instruction::SkipIfEqual { x: o.x, nn: o.nn }),
    rule(TOP, 0x4000, |o| Instruction::SkipIfNotEqual { x: o.x, nn: o.nn }),
    rule(TOP, 0x5000, |o| Instruction::SkipIfRegistersEqual { x: o.x, y: o.y }),
    rule(TOP, 0x6000, |o| Instruction::SetImmediate { x: o.x, nn: o.nn }),
    rule(TOP, 0x7000, |o| Instruction::AddImmediate { x: o.x, nn: o.nn }),
    rule(TOP, 0x9000, |o| Instruction::SkipIfRegistersNotEqual { x: o.x, y: o.y }),
    rule(TOP, 0xA000, |o| Instruction::SetIndex { nnn: o.nnn }),
    rule(TOP, 0xB000, |o| Instruction::JumpPlusBase { nnn: o.nnn }),
    rule(TOP, 0xC000, |o| Instruction::RandomMasked { x: o.x, nn: o.nn }),
    rule(TOP, 0xD000, |o| Instruction::Draw { x: o.x, y: o.y, n: o.n }),
    // 8XY_ arithmetic
    rule(LOW_NIBBLE, 0x8000, |o| Instruction::SetFromRegister { x: o.x, y: o.y }),
    rule(LOW_NIBBLE, 0x8001, |o| Instruction::Or { x: o.x, y: o.y }),
    rule(LOW_NIBBLE, 0x8002, |o| Instruction::And { x: o.x, y: o.y }),
    rule(LOW_NIBBLE, 0x8003, |o| Instruction::Xor { x: o.x, y: o.y }),
    rule(LOW_NIBBLE, 0x8004, |o| Instruction::AddRegisters { x: o.x, y: o.y }),
    rule(LOW_NIBBLE, 0x8005, |o| Instruction::SubRegisters { x: o.x, y: o.y }),
    rule(LOW_NIBBLE, 0x8006, |o| Instruction::ShiftRight { x: o.x, y: o.y }),
    rule(LOW_NIBBLE, 0x8007, |o| Instruction::ReverseSub { x: o.x, y: o.y }),
    rule(LOW_NIBBLE, 0x800E, |o| Instruction::ShiftLeft { x: o.x, y: o.y }),
    // EX__ keys
    rule(LOW_BYTE, 0xE09E, |o| Instruction::SkipIfKeyPressed { x: o.x }),
    rule(LOW_BYTE, 0xE0A1, |o| Instruction::SkipIfKeyNotPressed { x: o.x }),
    // FX__ timers, index and memory
    rule(LOW_BYTE, 0xF007, |o| Instruction::ReadDelayTimer { x: o.x }),
    rule(LOW_BYTE, 0xF00A, |o| Instruction::WaitForKey { x: o.x }),
    rule(LOW_BYTE, 0xF015, |o| Instruction::SetDelayTimer { x: o.x }),
    rule(LOW_BYTE, 0xF018, |o| Instruction::SetSoundTimer { x: o.x }),
    rule(LOW_BYTE, 0xF01E, |o| Instruction::AddToIndex { x: o.x }),
    rule(LOW_BYTE, 0xF029, |o| Instruction::SetIndexToGlyph { x: o.x }),
    rule(LOW_BYTE, 0xF033, |o| Instruction::StoreDecimalDigits { x: o.x }),
    rule(LOW_BYTE, 0xF055, |o| Instruction::DumpRegisters { x: o.x }),
    rule(LOW_BYTE, 0xF065, |o| Instruction::LoadRegisters { x: o.x }),
];

/// Select the instruction for a decoded opcode.
///
/// Returns `None` when no rule matches; the caller treats that as fatal.
pub fn dispatch(op: &Opcode) -> Option<Instruction> {
    RULES
        .iter()
        .find(|r| op.value & r.mask == r.pattern)
        .map(|r| (r.build)(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::{decode, encode};

    fn lookup(value: u16) -> Option<Instruction> {
        dispatch(&decode(value))
    }

    #[test]
    fn test_exact_words_win_over_family() {
        assert_eq!(lookup(0x00E0), Some(Instruction::Clear));
        assert_eq!(lookup(0x00EE), Some(Instruction::Return));
        assert_eq!(lookup(0x00E1), None);
        assert_eq!(lookup(0x0123), None);
    }

    #[test]
    fn test_top_nibble_families() {
        assert_eq!(lookup(0x1E04), Some(Instruction::Jump { nnn: 0xE04 }));
        assert_eq!(lookup(0x2028), Some(Instruction::Call { nnn: 0x028 }));
        assert_eq!(lookup(0x5AB3), Some(Instruction::SkipIfRegistersEqual { x: 0xA, y: 0xB }));
        assert_eq!(lookup(0xD125), Some(Instruction::Draw { x: 1, y: 2, n: 5 }));
    }

    #[test]
    fn test_eight_family_by_low_nibble() {
        assert_eq!(lookup(0x8124), Some(Instruction::AddRegisters { x: 1, y: 2 }));
        assert_eq!(lookup(0x812E), Some(Instruction::ShiftLeft { x: 1, y: 2 }));
        for low in [0x8, 0x9, 0xA, 0xB, 0xC, 0xD, 0xF] {
            assert_eq!(lookup(0x8120 | low), None, "8XY{:X} should not match", low);
        }
    }

    #[test]
    fn test_e_and_f_families_by_low_byte() {
        assert_eq!(lookup(0xE39E), Some(Instruction::SkipIfKeyPressed { x: 3 }));
        assert_eq!(lookup(0xE3A1), Some(Instruction::SkipIfKeyNotPressed { x: 3 }));
        assert_eq!(lookup(0xE39F), None);
        assert_eq!(lookup(0xF233), Some(Instruction::StoreDecimalDigits { x: 2 }));
        assert_eq!(lookup(0xF00B), None);
        assert_eq!(lookup(0xFF75), None);
    }

    #[test]
    fn test_every_encoded_instruction_dispatches_back() {
        let samples = [
            Instruction::Clear,
            Instruction::Return,
            Instruction::Jump { nnn: 0x345 },
            Instruction::Call { nnn: 0x678 },
            Instruction::SkipIfEqual { x: 1, nn: 0x22 },
            Instruction::SkipIfNotEqual { x: 2, nn: 0x33 },
            Instruction::SkipIfRegistersEqual { x: 3, y: 4 },
            Instruction::SkipIfRegistersNotEqual { x: 5, y: 6 },
            Instruction::JumpPlusBase { nnn: 0x100 },
            Instruction::SetImmediate { x: 7, nn: 0x44 },
            Instruction::AddImmediate { x: 8, nn: 0x55 },
            Instruction::SetFromRegister { x: 9, y: 0xA },
            Instruction::Or { x: 1, y: 2 },
            Instruction::And { x: 1, y: 2 },
            Instruction::Xor { x: 1, y: 2 },
            Instruction::AddRegisters { x: 1, y: 2 },
            Instruction::SubRegisters { x: 1, y: 2 },
            Instruction::ShiftRight { x: 1, y: 2 },
            Instruction::ReverseSub { x: 1, y: 2 },
            Instruction::ShiftLeft { x: 1, y: 2 },
            Instruction::RandomMasked { x: 0xB, nn: 0x0F },
            Instruction::SetIndex { nnn: 0x2F0 },
            Instruction::AddToIndex { x: 3 },
            Instruction::SetIndexToGlyph { x: 4 },
            Instruction::StoreDecimalDigits { x: 5 },
            Instruction::DumpRegisters { x: 6 },
            Instruction::LoadRegisters { x: 7 },
            Instruction::Draw { x: 0, y: 1, n: 0xF },
            Instruction::SkipIfKeyPressed { x: 8 },
            Instruction::SkipIfKeyNotPressed { x: 9 },
            Instruction::ReadDelayTimer { x: 0xA },
            Instruction::WaitForKey { x: 0xB },
            Instruction::SetDelayTimer { x: 0xC },
            Instruction::SetSoundTimer { x: 0xD },
        ];

        for instr in samples {
            assert_eq!(lookup(encode(&instr)), Some(instr));
        }
    }
}
