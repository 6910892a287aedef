//! Disassembler for CHIP-8 programs.
//!
//! Converts raw instruction words back to readable assembly using the
//! conventional mnemonics (`LD`, `SE`, `DRW`, ...).

use crate::cpu::decode::{decode, Instruction};
use crate::cpu::dispatch::dispatch;

/// Disassemble a single instruction word to text.
pub fn disassemble_instruction(word: u16) -> String {
    match dispatch(&decode(word)) {
        Some(instr) => format_instruction(&instr),
        None => format!("??? ; {:04X}", word),
    }
}

/// Disassemble a program image loaded at `base`.
///
/// A trailing odd byte is listed as data.
pub fn disassemble(image: &[u8], base: u16) -> String {
    let mut output = String::new();
    output.push_str("; CHIP-8 Disassembly\n");
    output.push_str("; ------------------\n\n");

    for (index, chunk) in image.chunks(2).enumerate() {
        let addr = base as usize + index * 2;
        match *chunk {
            [hi, lo] => {
                let word = u16::from_be_bytes([hi, lo]);
                let line = disassemble_instruction(word);
                output.push_str(&format!("{:03X}: {:04X}  {}\n", addr, word, line));
            }
            [byte] => output.push_str(&format!("{:03X}: {:02X}    DB {:#04X}\n", addr, byte, byte)),
            _ => unreachable!("chunks(2) yields one or two bytes"),
        }
    }

    output
}

/// Format a dispatched instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    match *instr {
        // Flow
        Instruction::Clear => "CLS".to_string(),
        Instruction::Return => "RET".to_string(),
        Instruction::Jump { nnn } => format!("JP {:#05X}", nnn),
        Instruction::Call { nnn } => format!("CALL {:#05X}", nnn),
        Instruction::SkipIfEqual { x, nn } => format!("SE V{:X}, {:#04X}", x, nn),
        Instruction::SkipIfNotEqual { x, nn } => format!("SNE V{:X}, {:#04X}", x, nn),
        Instruction::SkipIfRegistersEqual { x, y } => format!("SE V{:X}, V{:X}", x, y),
        Instruction::SkipIfRegistersNotEqual { x, y } => format!("SNE V{:X}, V{:X}", x, y),
        Instruction::JumpPlusBase { nnn } => format!("JP V0, {:#05X}", nnn),

        // Registers
        Instruction::SetImmediate { x, nn } => format!("LD V{:X}, {:#04X}", x, nn),
        Instruction::AddImmediate { x, nn } => format!("ADD V{:X}, {:#04X}", x, nn),
        Instruction::SetFromRegister { x, y } => format!("LD V{:X}, V{:X}", x, y),
        Instruction::Or { x, y } => format!("OR V{:X}, V{:X}", x, y),
        Instruction::And { x, y } => format!("AND V{:X}, V{:X}", x, y),
        Instruction::Xor { x, y } => format!("XOR V{:X}, V{:X}", x, y),
        Instruction::AddRegisters { x, y } => format!("ADD V{:X}, V{:X}", x, y),
        Instruction::SubRegisters { x, y } => format!("SUB V{:X}, V{:X}", x, y),
        Instruction::ShiftRight { x, .. } => format!("SHR V{:X}", x),
        Instruction::ReverseSub { x, y } => format!("SUBN V{:X}, V{:X}", x, y),
        Instruction::ShiftLeft { x, .. } => format!("SHL V{:X}", x),
        Instruction::RandomMasked { x, nn } => format!("RND V{:X}, {:#04X}", x, nn),

        // Index & memory
        Instruction::SetIndex { nnn } => format!("LD I, {:#05X}", nnn),
        Instruction::AddToIndex { x } => format!("ADD I, V{:X}", x),
        Instruction::SetIndexToGlyph { x } => format!("LD F, V{:X}", x),
        Instruction::StoreDecimalDigits { x } => format!("LD B, V{:X}", x),
        Instruction::DumpRegisters { x } => format!("LD [I], V{:X}", x),
        Instruction::LoadRegisters { x } => format!("LD V{:X}, [I]", x),

        // Display
        Instruction::Draw { x, y, n } => format!("DRW V{:X}, V{:X}, {}", x, y, n),

        // Timers & keys
        Instruction::SkipIfKeyPressed { x } => format!("SKP V{:X}", x),
        Instruction::SkipIfKeyNotPressed { x } => format!("SKNP V{:X}", x),
        Instruction::ReadDelayTimer { x } => format!("LD V{:X}, DT", x),
        Instruction::WaitForKey { x } => format!("LD V{:X}, K", x),
        Instruction::SetDelayTimer { x } => format!("LD DT, V{:X}", x),
        Instruction::SetSoundTimer { x } => format!("LD ST, V{:X}", x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_simple() {
        assert_eq!(disassemble_instruction(0x00E0), "CLS");
        assert_eq!(disassemble_instruction(0x6A11), "LD VA, 0x11");
        assert_eq!(disassemble_instruction(0x1E04), "JP 0xE04");
        assert_eq!(disassemble_instruction(0xD015), "DRW V0, V1, 5");
        assert_eq!(disassemble_instruction(0xF565), "LD V5, [I]");
    }

    #[test]
    fn test_disassemble_unknown() {
        assert_eq!(disassemble_instruction(0x0123), "??? ; 0123");
    }

    #[test]
    fn test_disassemble_listing() {
        let listing = disassemble(&[0x6A, 0x11, 0x00, 0xE0, 0x42], 0x200);
        assert!(listing.contains("200: 6A11  LD VA, 0x11"));
        assert!(listing.contains("202: 00E0  CLS"));
        assert!(listing.contains("204: 42    DB 0x42"));
    }
}
