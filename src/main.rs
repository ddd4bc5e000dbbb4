//! NES emulator entry point.
//!
//! Loads an NROM cartridge and runs the console in a window, or headless for `--frames N`.
//! Usage: nescore [--scale 2] [--trace] [--frames N] path/to/game.nes

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use nescore::{
    Cartridge, Console, HEIGHT, WIDTH,
    controller::{
        BUTTON_A, BUTTON_B, BUTTON_DOWN, BUTTON_LEFT, BUTTON_RIGHT, BUTTON_SELECT, BUTTON_START,
        BUTTON_UP,
    },
    palette,
};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// NES runs at ~60.0988 Hz (NTSC). Target one frame per 16.67 ms for ~60 fps.
const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

const KEYMAP: [(Key, u8); 8] = [
    (Key::Z, BUTTON_A),
    (Key::X, BUTTON_B),
    (Key::RightShift, BUTTON_SELECT),
    (Key::Enter, BUTTON_START),
    (Key::Up, BUTTON_UP),
    (Key::Down, BUTTON_DOWN),
    (Key::Left, BUTTON_LEFT),
    (Key::Right, BUTTON_RIGHT),
];

#[derive(Parser, Debug)]
#[command(name = "nescore", about = "NES emulator (NROM cartridges)")]
struct Args {
    /// Path to an iNES ROM file
    rom: PathBuf,

    /// Window scale factor (1, 2, 4 or 8)
    #[arg(short, long, default_value = "2")]
    scale: u8,

    /// Log every executed instruction
    #[arg(short, long)]
    trace: bool,

    /// Run this many frames without a window, then print CPU state
    #[arg(short, long)]
    frames: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.trace { Level::TRACE } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let cart = Cartridge::from_file(&args.rom)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;
    let mut console = Console::new(cart);

    match args.frames {
        Some(frames) => run_headless(&mut console, frames),
        None => run_window(&mut console, args.scale),
    }
}

fn run_headless(console: &mut Console, frames: u64) -> Result<()> {
    let mut frame = Console::new_frame();
    let mut cycles = 0u64;
    for _ in 0..frames {
        cycles += console.run_frame(&mut frame);
    }
    let cpu = &console.cpu;
    info!("ran {} frames, {} CPU cycles", frames, cycles);
    println!(
        "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        cpu.pc, cpu.a, cpu.x, cpu.y, cpu.status, cpu.sp, cpu.cycles
    );
    Ok(())
}

fn run_window(console: &mut Console, scale: u8) -> Result<()> {
    let scale = match scale {
        1 => Scale::X1,
        2 => Scale::X2,
        4 => Scale::X4,
        8 => Scale::X8,
        other => bail!("unsupported scale {other} (expected 1, 2, 4 or 8)"),
    };

    let mut window = Window::new(
        "nescore",
        WIDTH,
        HEIGHT,
        WindowOptions {
            scale,
            ..WindowOptions::default()
        },
    )
    .context("failed to create window")?;
    window.set_target_fps(60);

    let mut frame = Console::new_frame();
    let mut pixels = vec![0u32; WIDTH * HEIGHT];

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame_start = Instant::now();

        if window.is_key_pressed(Key::F5, KeyRepeat::No) {
            info!("reset requested");
            console.request_reset();
        }
        let buttons = KEYMAP
            .iter()
            .filter(|(key, _)| window.is_key_down(*key))
            .fold(0u8, |acc, (_, bit)| acc | bit);
        console.set_input(0, buttons);

        console.run_frame(&mut frame);
        palette::to_rgb(&frame, &mut pixels);
        window
            .update_with_buffer(&pixels, WIDTH, HEIGHT)
            .context("failed to update window")?;

        // Pace to ~60 fps so we don't burn CPU
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }
    Ok(())
}
