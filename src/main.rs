use std::env;
use std::error::Error;
use std::fs;
use std::process;
use std::time::{Duration, Instant};

use chip8vm::display::{Display, MonoTermDisplay};
use chip8vm::input::{Control, CrosstermInput, Input};
use chip8vm::sound::{Mute, SimpleBeep, Sound, DEFAULT_PITCH};
use chip8vm::{boot, QuirkMode, RunState, DEFAULT_IPS};

/// one 60 Hz tick
const FRAME: Duration = Duration::from_micros(16_667);

const USAGE: &str = "usage: chip8vm <rom> [--legacy|--modern|--extended] [--ips N] [--mute]";

struct Config {
    rom: String,
    quirks: QuirkMode,
    ips: u32,
    mute: bool,
}

impl Config {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Config, String> {
        let mut rom = None;
        let mut quirks = QuirkMode::Legacy;
        let mut ips = DEFAULT_IPS;
        let mut mute = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--legacy" => quirks = QuirkMode::Legacy,
                "--modern" => quirks = QuirkMode::Modern,
                "--extended" => quirks = QuirkMode::Extended,
                "--mute" => mute = true,
                "--ips" => {
                    let value = args.next().ok_or("--ips needs a value")?;
                    ips = value
                        .parse()
                        .map_err(|_| format!("--ips: not a number: {}", value))?;
                }
                _ if arg.starts_with("--") => return Err(format!("unknown option: {}", arg)),
                _ if rom.is_none() => rom = Some(arg),
                _ => return Err(format!("unexpected argument: {}", arg)),
            }
        }
        Ok(Config {
            rom: rom.ok_or("no rom given")?,
            quirks,
            ips,
            mute,
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = match Config::from_args(env::args().skip(1)) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            process::exit(2);
        }
    };

    // load fails here, before any terminal state is touched
    let image = fs::read(&config.rom)?;
    let mut machine = boot(&image, config.quirks, config.ips)?;

    let mut input = CrosstermInput::new()?;
    let mut display = MonoTermDisplay::new()?;
    let mut sound: Box<dyn Sound> = if config.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new(DEFAULT_PITCH))
    };

    loop {
        let frame_start = Instant::now();

        match input.poll()? {
            Some(Control::Quit) => break,
            Some(Control::TogglePause) => machine.toggle_pause(),
            Some(Control::Reset) => machine.reset(),
            None => {}
        }
        machine.set_keypad(input.keypad());

        let tone = machine.tick();
        sound.set_enabled(tone)?;

        if let Some(cells) = machine.take_frame() {
            display.draw(cells)?;
        }

        if machine.state() == RunState::Halted {
            break;
        }

        spin_sleep::sleep(FRAME.saturating_sub(frame_start.elapsed()));
    }

    sound.set_enabled(false)?;
    drop(input); // leaves raw mode before we print

    if let Some(fault) = machine.fault() {
        eprintln!("program halted: {}", fault);
    }
    let ignored = machine.interpreter().unknown_opcodes();
    if ignored > 0 {
        eprintln!(
            "ignored {} unknown opcode(s), last was {:#06x}",
            ignored,
            machine.interpreter().last_unknown().unwrap_or(0)
        );
    }

    // shove some newlines at stdout so the shell prompt lands below the frame
    for _ in 0..2 {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, String> {
        Config::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let c = parse(&["game.ch8"]).unwrap();
        assert_eq!(c.rom, "game.ch8");
        assert_eq!(c.quirks, QuirkMode::Legacy);
        assert_eq!(c.ips, DEFAULT_IPS);
        assert!(!c.mute);
    }

    #[test]
    fn test_flags() {
        let c = parse(&["--modern", "--ips", "1200", "--mute", "game.ch8"]).unwrap();
        assert_eq!(c.quirks, QuirkMode::Modern);
        assert_eq!(c.ips, 1200);
        assert!(c.mute);
    }

    #[test]
    fn test_bad_args_rejected() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--ips"]).is_err());
        assert!(parse(&["--ips", "lots", "game.ch8"]).is_err());
        assert!(parse(&["--turbo", "game.ch8"]).is_err());
        assert!(parse(&["a.ch8", "b.ch8"]).is_err());
    }
}
