//! Property tests for arithmetic flags, sprite drawing and the call stack.

use plan8::cpu::{encode, PROGRAM_START};
use plan8::{Cpu, Instruction, Step};
use proptest::prelude::*;

/// Write `instr` at PC and execute it.
fn exec(cpu: &mut Cpu, instr: Instruction) -> Step {
    let pc = cpu.regs.pc as usize;
    cpu.mem.write_slice(pc, &encode(&instr).to_be_bytes()).unwrap();
    cpu.step().unwrap()
}

proptest! {
    #[test]
    fn add_registers_carry(a in any::<u8>(), b in any::<u8>()) {
        let mut cpu = Cpu::new();
        cpu.regs.v[0] = a;
        cpu.regs.v[1] = b;
        exec(&mut cpu, Instruction::AddRegisters { x: 0, y: 1 });

        let sum = a as u16 + b as u16;
        prop_assert_eq!(cpu.regs.v[0], (sum % 256) as u8);
        prop_assert_eq!(cpu.regs.v[0xF], (sum > 255) as u8);
        prop_assert_eq!(cpu.regs.pc, PROGRAM_START + 2);
    }

    #[test]
    fn sub_registers_borrow(a in any::<u8>(), b in any::<u8>()) {
        let mut cpu = Cpu::new();
        cpu.regs.v[3] = a;
        cpu.regs.v[4] = b;
        exec(&mut cpu, Instruction::SubRegisters { x: 3, y: 4 });

        prop_assert_eq!(cpu.regs.v[3], a.wrapping_sub(b));
        prop_assert_eq!(cpu.regs.v[0xF], (a < b) as u8);
    }

    #[test]
    fn shift_right_flag(a in any::<u8>(), y in 0u8..16) {
        let mut cpu = Cpu::new();
        cpu.regs.v[2] = a;
        exec(&mut cpu, Instruction::ShiftRight { x: 2, y });

        prop_assert_eq!(cpu.regs.v[2], a >> 1);
        prop_assert_eq!(cpu.regs.v[0xF], a & 1);
    }

    #[test]
    fn draw_twice_restores_framebuffer(
        background in proptest::collection::vec(any::<u8>(), 256),
        sprite in proptest::collection::vec(any::<u8>(), 1..=15),
        vx in any::<u8>(),
        vy in 0u8..32,
    ) {
        let mut cpu = Cpu::new();
        for (idx, byte) in background.iter().enumerate() {
            cpu.display.set_byte(idx / 8, (idx % 8) * 8, *byte);
        }
        let before = cpu.framebuffer().clone();

        cpu.mem.write_slice(0x300, &sprite).unwrap();
        cpu.regs.i = 0x300;
        cpu.regs.v[0] = vx;
        cpu.regs.v[1] = vy;
        let draw = Instruction::Draw { x: 0, y: 1, n: sprite.len() as u8 };

        exec(&mut cpu, draw);
        cpu.regs.pc = PROGRAM_START;
        exec(&mut cpu, draw);

        let visible = sprite.len().min(32 - vy as usize);
        let any_bits = sprite[..visible].iter().any(|b| *b != 0);
        prop_assert_eq!(cpu.framebuffer(), &before);
        prop_assert_eq!(cpu.regs.v[0xF], any_bits as u8);
    }

    #[test]
    fn call_then_return_is_noop(target in 0x101u16..0x7FF, depth in 0usize..16) {
        let target = target * 2;
        let mut cpu = Cpu::new();
        for frame in 0..depth {
            cpu.regs.stack.push(0x400 + frame as u16 * 2).unwrap();
        }
        cpu.mem.write_slice(target as usize, &encode(&Instruction::Return).to_be_bytes()).unwrap();

        exec(&mut cpu, Instruction::Call { nnn: target });
        prop_assert_eq!(cpu.regs.pc, target);
        cpu.step().unwrap();

        prop_assert_eq!(cpu.regs.pc, PROGRAM_START);
        prop_assert_eq!(cpu.regs.stack.pointer() as usize, depth);
    }

    #[test]
    fn sprite_wraps_at_right_edge(sprite in any::<u8>(), row in 0u8..32) {
        let mut cpu = Cpu::new();
        cpu.mem.write(0x300, sprite).unwrap();
        cpu.regs.i = 0x300;
        cpu.regs.v[0] = 60;
        cpu.regs.v[1] = row;
        exec(&mut cpu, Instruction::Draw { x: 0, y: 1, n: 1 });

        let columns = [60, 61, 62, 63, 0, 1, 2, 3];
        for (bit, col) in columns.iter().enumerate() {
            let expected = sprite & (0x80 >> bit) != 0;
            prop_assert_eq!(cpu.framebuffer().get(row as usize, *col), expected);
        }
        let lit = (0..64).filter(|c| cpu.framebuffer().get(row as usize, *c)).count();
        prop_assert_eq!(lit, sprite.count_ones() as usize);
    }
}
