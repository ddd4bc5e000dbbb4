//! Whole-console tests against in-memory NROM images.

use nescore::{
    Cartridge, CartridgeError, Console,
    bus::Bus,
    controller::{BUTTON_A, BUTTON_START},
};

const PRG_LEN: usize = 0x4000;
const CHR_LEN: usize = 0x2000;
const NMI_HANDLER: u16 = 0x8100;

/// One 16 KiB PRG bank with `program` at $8000, NMI → $8100 and reset → $8000.
fn rom(program: &[u8]) -> Vec<u8> {
    let mut image = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let mut prg = vec![0xEA; PRG_LEN];
    prg[..program.len()].copy_from_slice(program);
    prg[0x0100] = 0x40; // RTI
    prg[0x3FFA..0x3FFC].copy_from_slice(&NMI_HANDLER.to_le_bytes());
    prg[0x3FFC..0x3FFE].copy_from_slice(&0x8000u16.to_le_bytes());
    prg[0x3FFE..0x4000].copy_from_slice(&0x8000u16.to_le_bytes());
    image.extend_from_slice(&prg);
    image.extend(std::iter::repeat_n(0, CHR_LEN));
    image
}

fn console(program: &[u8]) -> Console {
    Console::new(Cartridge::from_bytes(&rom(program)).unwrap())
}

/// JMP $8000
const SPIN: [u8; 3] = [0x4C, 0x00, 0x80];

#[test]
fn power_on_runs_reset_first() {
    let mut nes = console(&SPIN);
    assert_eq!(nes.step_processor(), 7);
    assert_eq!(nes.cpu.pc, 0x8000);
    assert_eq!(nes.cpu.sp, 0xFD);
    assert_ne!(nes.cpu.status & 0x04, 0);
    assert_eq!(nes.step_processor(), 3);
    assert_eq!(nes.cpu.pc, 0x8000);
}

#[test]
fn request_reset_reloads_vector() {
    let mut nes = console(&[0xA9, 0x01, 0xEA, 0xEA]);
    nes.step_processor();
    nes.step_processor();
    nes.step_processor();
    assert_eq!(nes.cpu.pc, 0x8003);
    nes.request_reset();
    assert_eq!(nes.step_processor(), 7);
    assert_eq!(nes.cpu.pc, 0x8000);
    assert_eq!(nes.cpu.sp, 0xFA);
    // Registers other than SP/P survive reset
    assert_eq!(nes.cpu.a, 0x01);
}

#[test]
fn sixteen_k_prg_is_mirrored() {
    let mut nes = console(&[0x12, 0x34, 0x56]);
    for offset in 0..3 {
        assert_eq!(nes.cpu.bus.read(0x8000 + offset), nes.cpu.bus.read(0xC000 + offset));
    }
    assert_eq!(nes.cpu.bus.read(0xFFFC), 0x00);
    assert_eq!(nes.cpu.bus.read(0xFFFD), 0x80);
}

#[test]
fn status_read_resets_write_toggle() {
    let mut nes = console(&SPIN);
    nes.cpu.bus.write(0x2006, 0x21);
    assert!(nes.cpu.bus.ppu.write_toggle);
    nes.cpu.bus.read(0x2002);
    assert!(!nes.cpu.bus.ppu.write_toggle);
    // Mirrored register at $3FFA still hits PPUSTATUS
    nes.cpu.bus.write(0x2005, 0x00);
    nes.cpu.bus.read(0x3FFA);
    assert!(!nes.cpu.bus.ppu.write_toggle);
}

#[test]
fn palette_backdrop_mirrors_through_ppudata() {
    let mut nes = console(&SPIN);
    nes.cpu.bus.write(0x2006, 0x3F);
    nes.cpu.bus.write(0x2006, 0x10);
    nes.cpu.bus.write(0x2007, 0x2A);
    nes.cpu.bus.write(0x2006, 0x3F);
    nes.cpu.bus.write(0x2006, 0x00);
    // Palette reads are not delayed by the read buffer
    assert_eq!(nes.cpu.bus.read(0x2007), 0x2A);
}

#[test]
fn one_frame_of_dots_has_one_vblank() {
    let mut nes = console(&SPIN);
    let mut frame = Console::new_frame();
    let mut vblanks = Vec::new();
    for dot in 0..89_342u32 {
        if nes.step_dots(1, &mut frame) {
            vblanks.push(dot);
            assert_ne!(nes.cpu.bus.ppu.status & 0x80, 0);
        }
        if dot == 89_002 {
            assert_eq!(nes.cpu.bus.ppu.status & 0x80, 0);
        }
    }
    assert_eq!(vblanks, vec![82_182]);
    assert_eq!(nes.cpu.bus.ppu.cycle, 0);
    // NMI disabled in PPUCTRL
    assert!(!nes.nmi_pending);
}

#[test]
fn zero_cycle_step_is_a_no_op() {
    let mut nes = console(&SPIN);
    let mut frame = Console::new_frame();
    nes.step_dots(1000, &mut frame);
    let before = nes.cpu.bus.ppu.cycle;
    assert!(!nes.step_picture(0, &mut frame));
    assert!(!nes.step_picture(0, &mut frame));
    assert_eq!(nes.cpu.bus.ppu.cycle, before);
}

#[test]
fn step_picture_runs_three_dots_per_cycle() {
    let mut nes = console(&SPIN);
    let mut frame = Console::new_frame();
    nes.step_picture(7, &mut frame);
    assert_eq!(nes.cpu.bus.ppu.cycle, 21);
}

#[test]
fn nmi_is_serviced_on_next_processor_step() {
    // LDA #$80; STA $2000; JMP $8005
    let mut nes = console(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
    let mut frame = Console::new_frame();
    nes.run_frame(&mut frame);
    assert!(nes.nmi_pending);

    let sp = nes.cpu.sp;
    assert_eq!(nes.step_processor(), 7);
    assert_eq!(nes.cpu.pc, NMI_HANDLER);
    assert_eq!(nes.cpu.sp, sp.wrapping_sub(3));
    assert!(!nes.nmi_pending);

    // RTI returns to the spin loop
    assert_eq!(nes.step_processor(), 6);
    assert_eq!(nes.cpu.pc, 0x8005);
}

#[test]
fn enabling_nmi_during_vblank_fires_immediately() {
    // LDA #$80; STA $2000; JMP $8005
    let mut nes = console(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
    let mut frame = Console::new_frame();
    nes.step_processor(); // reset
    nes.step_dots(82_183, &mut frame);
    assert_ne!(nes.cpu.bus.ppu.status & 0x80, 0);
    assert!(!nes.nmi_pending);

    nes.step_processor(); // LDA
    nes.step_processor(); // STA $2000
    assert!(nes.nmi_pending);
    nes.step_processor();
    assert_eq!(nes.cpu.pc, NMI_HANDLER);
}

#[test]
fn oam_dma_stalls_the_writing_instruction() {
    // LDA #$02; STA $4014
    let mut nes = console(&[0xA9, 0x02, 0x8D, 0x14, 0x40]);
    for i in 0..256 {
        nes.cpu.bus.ram[0x200 + i] = i as u8;
    }
    nes.step_processor(); // reset: 7 cycles
    nes.step_processor(); // LDA: 9 cycles
    // 9 + 4 is odd, so the stall takes the extra alignment cycle
    assert_eq!(nes.step_processor(), 4 + 513 + 1);
    assert_eq!(nes.cpu.bus.ppu.oam[0x00], 0x00);
    assert_eq!(nes.cpu.bus.ppu.oam[0x7F], 0x7F);
    assert_eq!(nes.cpu.bus.ppu.oam[0xFF], 0xFF);
    assert_eq!(nes.step_processor(), 2);
}

#[test]
fn controller_input_shifts_out_after_strobe() {
    let mut nes = console(&SPIN);
    nes.set_input(0, BUTTON_A | BUTTON_START);
    nes.cpu.bus.write(0x4016, 1);
    nes.cpu.bus.write(0x4016, 0);
    let bits: Vec<u8> = (0..10).map(|_| nes.cpu.bus.read(0x4016) & 1).collect();
    assert_eq!(bits, vec![1, 0, 0, 1, 0, 0, 0, 0, 1, 1]);
    // Port 2 latched nothing
    assert_eq!(nes.cpu.bus.read(0x4017) & 1, 0);
    // Out-of-range ports are ignored
    nes.set_input(2, 0xFF);
}

#[test]
fn run_frame_stops_at_vblank() {
    let mut nes = console(&SPIN);
    let mut frame = Console::new_frame();
    let first = nes.run_frame(&mut frame);
    // Vblank starts at dot 82,182: at least 27,395 CPU cycles, overshooting by less than one JMP
    assert!((27_395..27_398).contains(&first), "first frame took {first} cycles");
    assert_eq!(nes.cpu.bus.ppu.scanline(), 241);

    let second = nes.run_frame(&mut frame);
    assert!((29_778..29_784).contains(&second), "second frame took {second} cycles");
}

#[test]
fn loads_from_file_and_rejects_other_mappers() {
    let path = std::env::temp_dir().join(format!("nescore-{}.nes", std::process::id()));
    std::fs::write(&path, rom(&SPIN)).unwrap();
    let cart = Cartridge::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(cart.prg_read(0x8000), 0x4C);

    let mut image = rom(&SPIN);
    image[6] |= 0x10;
    assert!(matches!(
        Cartridge::from_bytes(&image),
        Err(CartridgeError::UnsupportedMapper(1))
    ));
    assert!(matches!(
        Cartridge::from_file("/nonexistent/rom.nes"),
        Err(CartridgeError::Io(_))
    ));
}
