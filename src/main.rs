use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chip8::config::DEFAULT_INSTRUCTIONS_PER_SECOND;
use chip8::input::{Input, KeyEvent, Keymap, TermInput};
use chip8::screen::{MonoTermScreen, Screen};
use chip8::sound::{Mute, SimpleBeep, Sound};
use chip8::{Chip8Error, Config, JumpQuirk, LoadStoreQuirk, Quirks, ShiftQuirk, VirtualMachine};
use clap::{Parser, ValueEnum};
use log::info;

/// timers and screen both run at 60Hz
const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);

#[derive(Parser, Debug)]
#[command(name = "chip8", about = "Run a CHIP-8 program in the terminal")]
struct Args {
    /// program image, loaded at 0x200
    rom: PathBuf,

    /// instructions executed per second of wall time
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    ips: f64,

    /// operand of 8XY6/8XYE
    #[arg(long, value_enum, default_value_t = ShiftArg::InPlace)]
    shift_quirk: ShiftArg,

    /// register BNNN adds to its target
    #[arg(long, value_enum, default_value_t = JumpArg::V0)]
    jump_quirk: JumpArg,

    /// what FX55/FX65 do to I
    #[arg(long, value_enum, default_value_t = LoadStoreArg::Unchanged)]
    load_store_quirk: LoadStoreArg,

    /// seed for CXNN, for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// beep on the PC speaker while the sound timer runs
    #[arg(long)]
    sound: bool,

    #[arg(long, value_enum, default_value_t = KeymapArg::Conventional)]
    keymap: KeymapArg,

    /// write logs here (filtered by RUST_LOG, default warn); the terminal
    /// belongs to the screen
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShiftArg {
    InPlace,
    CopyVy,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum JumpArg {
    V0,
    Vx,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LoadStoreArg {
    Unchanged,
    Increment,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KeymapArg {
    Conventional,
    Literal,
}

impl Args {
    fn config(&self) -> Result<Config, Chip8Error> {
        let quirks = Quirks {
            shift: match self.shift_quirk {
                ShiftArg::InPlace => ShiftQuirk::InPlace,
                ShiftArg::CopyVy => ShiftQuirk::CopyVy,
            },
            jump: match self.jump_quirk {
                JumpArg::V0 => JumpQuirk::V0,
                JumpArg::Vx => JumpQuirk::Vx,
            },
            load_store: match self.load_store_quirk {
                LoadStoreArg::Unchanged => LoadStoreQuirk::Unchanged,
                LoadStoreArg::Increment => LoadStoreQuirk::Increment,
            },
        };
        let mut config = Config::default()
            .with_instructions_per_second(self.ips)?
            .with_quirks(quirks);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }

    fn keymap(&self) -> Keymap {
        match self.keymap {
            KeymapArg::Conventional => Keymap::Conventional,
            KeymapArg::Literal => Keymap::Literal,
        }
    }
}

fn init_logging(path: &Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    if let Some(path) = path {
        let file = File::create(path)?;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
    Ok(())
}

/// drive the machine until the user quits or the program faults; the
/// terminal is restored when the screen and input drop
fn main_loop(
    vm: &mut VirtualMachine,
    screen: &mut dyn Screen,
    input: &mut dyn Input,
    sound: &mut dyn Sound,
) -> Result<Option<Chip8Error>, Box<dyn Error>> {
    let mut last = Instant::now();
    let mut next_frame = last + FRAME;
    let mut timer_debt = Duration::ZERO;

    loop {
        let now = Instant::now();
        for event in input.poll_events(now)? {
            match event {
                KeyEvent::Down(key) => vm.press_key(key)?,
                KeyEvent::Up(key) => vm.release_key(key)?,
                KeyEvent::Quit => return Ok(None),
            }
        }

        let elapsed = now - last;
        last = now;
        if let Err(e) = vm.run(elapsed) {
            sound.stop()?;
            return Ok(Some(e));
        }

        timer_debt += elapsed;
        while timer_debt >= FRAME {
            vm.advance_timers();
            timer_debt -= FRAME;
        }
        sound.follow_timer(vm.sound_timer_value())?;

        if vm.display_changed() {
            screen.draw(vm.framebuffer_view())?;
        }

        spin_sleep::sleep(next_frame.saturating_duration_since(Instant::now()));
        next_frame += FRAME;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    // load a program
    let rom = std::fs::read(&args.rom)?;
    let mut vm = VirtualMachine::with_config(&rom, args.config()?)?;
    info!("running {}", args.rom.display());

    let outcome = {
        let mut screen = MonoTermScreen::new()?;
        let mut input = TermInput::new(args.keymap())?;
        let mut sound: Box<dyn Sound> = if args.sound {
            Box::new(SimpleBeep::new())
        } else {
            Box::new(Mute::new())
        };
        let outcome = main_loop(&mut vm, &mut screen, &mut input, sound.as_mut());
        sound.stop()?;
        outcome?
    };

    match outcome {
        Some(e) => {
            eprintln!("{}: {}", args.rom.display(), e);
            eprintln!("stopped at pc {:#05x}", vm.program_counter());
            std::process::exit(1)
        }
        None => Ok(()),
    }
}
