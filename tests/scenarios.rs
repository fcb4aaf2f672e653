use chip8::{Chip8Error, Config, Fault, Result, VirtualMachine};
use proptest::prelude::*;
use std::time::Duration;

fn run_steps(vm: &mut VirtualMachine, n: usize) -> Result<()> {
    for _ in 0..n {
        vm.step()?;
    }
    Ok(())
}

#[test]
fn test_add_registers() -> Result<()> {
    // LD V1,5; LD V0,7; ADD V0,V1
    let mut vm = VirtualMachine::new(&[0x61, 0x05, 0x60, 0x07, 0x80, 0x14])?;
    run_steps(&mut vm, 3)?;
    assert_eq!(vm.register(0), 12);
    assert_eq!(vm.register(0xf), 0);
    Ok(())
}

#[test]
fn test_clear_then_draw_reports_change_once() -> Result<()> {
    // CLS; LD I,0x206; DRW V0,V0,1; 0x206: sprite byte 0xF0
    let mut vm = VirtualMachine::new(&[0x00, 0xe0, 0xa2, 0x06, 0xd0, 0x01, 0xf0, 0x00])?;
    run_steps(&mut vm, 3)?;
    assert!(vm.display_changed());
    assert!(!vm.display_changed());

    let view = vm.framebuffer_view();
    assert_eq!(&view.as_bytes()[..5], &[1, 1, 1, 1, 0]);
    assert_eq!(view.pixel(0, 1), Some(0));
    Ok(())
}

#[test]
fn test_delay_timer_counts_down_to_zero() -> Result<()> {
    // LD V0,3; LD DT,V0
    let mut vm = VirtualMachine::new(&[0x60, 0x03, 0xf0, 0x15])?;
    run_steps(&mut vm, 2)?;
    assert_eq!(vm.delay_timer_value(), 3);
    for _ in 0..3 {
        vm.advance_timers();
    }
    assert_eq!(vm.delay_timer_value(), 0);
    vm.advance_timers();
    assert_eq!(vm.delay_timer_value(), 0);
    Ok(())
}

#[test]
fn test_timers_ignore_instruction_rate() -> Result<()> {
    // LD V0,10; LD ST,V0; JP 0x204
    let config = Config::default().with_instructions_per_second(4096.0)?;
    let mut vm = VirtualMachine::with_config(&[0x60, 0x0a, 0xf0, 0x18, 0x12, 0x04], config)?;
    vm.run(Duration::from_secs(2))?;
    assert_eq!(vm.sound_timer_value(), 10);
    vm.advance_timers();
    assert_eq!(vm.sound_timer_value(), 9);
    Ok(())
}

#[test]
fn test_jump_then_fetch_target() -> Result<()> {
    // JP 0x204; LD V0,1; LD V0,2
    let mut vm = VirtualMachine::new(&[0x12, 0x04, 0x60, 0x01, 0x60, 0x02])?;
    vm.step()?;
    assert_eq!(vm.program_counter(), 0x204);
    vm.step()?;
    assert_eq!(vm.register(0), 2);
    Ok(())
}

#[test]
fn test_call_returns_after_call_site() -> Result<()> {
    // 0x200: CALL 0x208; 0x202: LD V0,1; ...; 0x208: LD V1,9; RET
    let mut vm = VirtualMachine::new(&[
        0x22, 0x08, 0x60, 0x01, 0x00, 0x00, 0x00, 0x00, 0x61, 0x09, 0x00, 0xee,
    ])?;
    run_steps(&mut vm, 3)?;
    assert_eq!(vm.program_counter(), 0x202);
    assert_eq!(vm.register(1), 9);
    vm.step()?;
    assert_eq!(vm.register(0), 1);
    Ok(())
}

#[test]
fn test_draw_wraps_at_bottom_right() -> Result<()> {
    // LD V0,63; LD V1,31; LD I,0x20a; DRW V0,V1,2; 0x20a: 0xC0 0xC0
    let mut vm = VirtualMachine::new(&[
        0x60, 0x3f, 0x61, 0x1f, 0xa2, 0x0a, 0xd0, 0x12, 0x00, 0x00, 0xc0, 0xc0,
    ])?;
    run_steps(&mut vm, 4)?;
    let view = vm.framebuffer_view();
    for (x, y) in [(63, 31), (0, 31), (63, 0), (0, 0)] {
        assert_eq!(view.pixel(x, y), Some(1), "({}, {})", x, y);
    }
    assert_eq!(vm.register(0xf), 0);
    Ok(())
}

#[test]
fn test_bcd_of_font_digit_draws() -> Result<()> {
    // LD V0,137; LD I,0x300; LD B,V0; LD V2,[I]; LD F,V1
    let mut vm = VirtualMachine::new(&[
        0x60, 0x89, 0xa3, 0x00, 0xf0, 0x33, 0xf2, 0x65, 0xf1, 0x29,
    ])?;
    run_steps(&mut vm, 5)?;
    assert_eq!((vm.register(0), vm.register(1), vm.register(2)), (1, 3, 7));
    assert_eq!(vm.index_register(), 0x050 + 3 * 5);
    Ok(())
}

#[test]
fn test_unknown_opcode_stops_run() -> Result<()> {
    let mut vm = VirtualMachine::new(&[0x60, 0x01, 0x01, 0x23])?;
    let err = vm.run(Duration::from_secs(1)).unwrap_err();
    assert_eq!(err, Chip8Error::Fault(Fault::Decode { pc: 0x202, opcode: 0x0123 }));
    assert_eq!(vm.register(0), 1);
    Ok(())
}

proptest! {
    #[test]
    fn test_store_then_load_restores_registers(
        values in proptest::array::uniform16(any::<u8>()),
        x in 0u8..16,
        addr in 0x300u16..0xff0,
    ) {
        // LD Vn,value for all 16 registers; LD I,addr; LD [I],Vx;
        // clobber V0-Vx with LD Vn,0; LD Vx,[I]
        let mut rom = Vec::new();
        for (n, v) in values.iter().enumerate() {
            rom.extend_from_slice(&[0x60 | n as u8, *v]);
        }
        rom.extend_from_slice(&[0xa0 | (addr >> 8) as u8, addr as u8]);
        rom.extend_from_slice(&[0xf0 | x, 0x55]);
        for n in 0..=x {
            rom.extend_from_slice(&[0x60 | n, 0x00]);
        }
        rom.extend_from_slice(&[0xf0 | x, 0x65]);

        let mut vm = VirtualMachine::new(&rom).unwrap();
        run_steps(&mut vm, 16 + 2 + x as usize + 1 + 1).unwrap();
        for n in 0..16u8 {
            prop_assert_eq!(vm.register(n), values[n as usize]);
        }
    }

    #[test]
    fn test_timer_ticks_clamp(v in any::<u8>(), n in 0usize..300) {
        let mut vm = VirtualMachine::new(&[0x60, v, 0xf0, 0x15]).unwrap();
        run_steps(&mut vm, 2).unwrap();
        for _ in 0..n {
            vm.advance_timers();
        }
        prop_assert_eq!(vm.delay_timer_value() as usize, (v as usize).saturating_sub(n));
    }
}
