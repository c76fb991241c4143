//! CLI entry point for the emu65 runner binary.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use emu65_core::{RunState, System, SystemConfig};
#[cfg(test)]
use tempfile as _;

const HELP_TEXT: &str = "\
Usage: emu65 <image> [options]

Runs a raw W65C02S object image loaded at ROM offset 0.

Options:
  --instructions <N>   Instruction budget (default 1000000)
  --trace <FILE>       Log every bus access to FILE
  --mhz <F>            Nominal clock rate for pacing (default 1, 0 disables)
  --ram <LO:HI>        RAM window (default 0x0000:0x3FFF, -1:-1 disables)
  --registers <LO:HI>  Register window (default 0x6000:0x7FFF)
  --rom <LO:HI>        ROM window (default 0x8000:0xFFFF)
  --help               Show this text";

#[derive(Debug, PartialEq)]
struct CliArgs {
    image: PathBuf,
    instructions: u64,
    trace: Option<PathBuf>,
    config: SystemConfig,
}

#[derive(Debug)]
enum ParseResult {
    Args(Box<CliArgs>),
    Help,
}

fn parse_bound(text: &str) -> Result<i64, String> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|_| format!("invalid address bound: {text}"))
}

fn parse_window(text: &str) -> Result<(i64, i64), String> {
    let (lo, hi) = text
        .split_once(':')
        .ok_or_else(|| format!("expected LO:HI, got: {text}"))?;
    Ok((parse_bound(lo)?, parse_bound(hi)?))
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut image: Option<PathBuf> = None;
    let mut instructions: u64 = 1_000_000;
    let mut trace: Option<PathBuf> = None;
    let mut config = SystemConfig::default();

    let next_value = |args: &mut dyn Iterator<Item = OsString>, flag: &str| {
        args.next()
            .ok_or_else(|| format!("missing value for {flag}"))
    };

    while let Some(arg) = args.next() {
        if arg == "--help" {
            return Ok(ParseResult::Help);
        }

        if arg == "--instructions" {
            let value = next_value(&mut args, "--instructions")?;
            instructions = value
                .to_string_lossy()
                .parse()
                .map_err(|_| format!("invalid instruction count: {}", value.to_string_lossy()))?;
            continue;
        }

        if arg == "--trace" {
            trace = Some(PathBuf::from(next_value(&mut args, "--trace")?));
            continue;
        }

        if arg == "--mhz" {
            let value = next_value(&mut args, "--mhz")?;
            config.mhz = value
                .to_string_lossy()
                .parse()
                .map_err(|_| format!("invalid clock rate: {}", value.to_string_lossy()))?;
            continue;
        }

        if arg == "--ram" {
            let value = next_value(&mut args, "--ram")?;
            (config.ram_start, config.ram_end) = parse_window(&value.to_string_lossy())?;
            continue;
        }

        if arg == "--registers" {
            let value = next_value(&mut args, "--registers")?;
            (config.registers_start, config.registers_end) =
                parse_window(&value.to_string_lossy())?;
            continue;
        }

        if arg == "--rom" {
            let value = next_value(&mut args, "--rom")?;
            (config.rom_start, config.rom_end) = parse_window(&value.to_string_lossy())?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if image.is_some() {
            return Err(String::from("multiple image paths provided"));
        }
        image = Some(PathBuf::from(arg));
    }

    let image = image.ok_or_else(|| String::from("missing image path"))?;
    Ok(ParseResult::Args(Box::new(CliArgs {
        image,
        instructions,
        trace,
        config,
    })))
}

fn run(args: &CliArgs) -> Result<(), String> {
    let mut system = System::new(&args.config).map_err(|error| error.to_string())?;
    let logging = args.trace.is_some();
    let out_file = args
        .trace
        .clone()
        .unwrap_or_else(|| PathBuf::from("emu65-trace.txt"));

    let outcome = system
        .execute_program(&args.image, args.instructions, logging, &out_file)
        .map_err(|error| error.to_string())?;

    let regs = system.cpu().regs();
    println!(
        "retired {} instructions in {} cycles",
        outcome.retired, outcome.cycles
    );
    println!(
        "A={:02X} X={:02X} Y={:02X} SP={:02X} PC={:04X} PS={:02X}",
        regs.a,
        regs.x,
        regs.y,
        regs.sp,
        regs.pc,
        regs.ps.bits()
    );
    match outcome.state {
        RunState::Running => println!("stopped at instruction budget"),
        RunState::Halted => println!("halted"),
        RunState::Faulted(fault) => println!("faulted: {fault}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{HELP_TEXT}");
            ExitCode::SUCCESS
        }
        Ok(ParseResult::Args(args)) => match run(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error}");
                ExitCode::FAILURE
            }
        },
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::{parse_args, parse_bound, parse_window, ParseResult};

    fn args<'a>(list: &'a [&'a str]) -> impl Iterator<Item = OsString> + 'a {
        list.iter().map(OsString::from)
    }

    #[test]
    fn bounds_accept_hex_decimal_and_sentinel() {
        assert_eq!(parse_bound("0x8000"), Ok(0x8000));
        assert_eq!(parse_bound("16383"), Ok(16383));
        assert_eq!(parse_bound("-1"), Ok(-1));
        assert!(parse_bound("wat").is_err());
    }

    #[test]
    fn windows_split_on_the_colon() {
        assert_eq!(parse_window("0x0000:0x3FFF"), Ok((0x0000, 0x3FFF)));
        assert_eq!(parse_window("-1:-1"), Ok((-1, -1)));
        assert!(parse_window("0x8000").is_err());
    }

    #[test]
    fn minimal_invocation_uses_the_reference_layout() {
        let parsed = parse_args(args(&["program.out"])).expect("valid args");
        let ParseResult::Args(cli) = parsed else {
            panic!("expected parsed args");
        };
        assert_eq!(cli.image.to_string_lossy(), "program.out");
        assert_eq!(cli.instructions, 1_000_000);
        assert!(cli.trace.is_none());
        assert_eq!(cli.config.rom_start, 0x8000);
        assert_eq!(cli.config.rom_end, 0xFFFF);
    }

    #[test]
    fn full_invocation_overrides_every_knob() {
        let parsed = parse_args(args(&[
            "program.out",
            "--instructions",
            "155",
            "--trace",
            "out.txt",
            "--mhz",
            "0",
            "--ram",
            "0x0000:0xFFFF",
            "--registers",
            "-1:-1",
            "--rom",
            "-1:-1",
        ]))
        .expect("valid args");
        let ParseResult::Args(cli) = parsed else {
            panic!("expected parsed args");
        };
        assert_eq!(cli.instructions, 155);
        assert_eq!(cli.trace.as_ref().map(|p| p.to_string_lossy().into_owned()), Some(String::from("out.txt")));
        assert_eq!(cli.config.mhz, 0.0);
        assert_eq!((cli.config.ram_start, cli.config.ram_end), (0, 0xFFFF));
        assert_eq!(cli.config.registers_start, -1);
        assert_eq!(cli.config.rom_start, -1);
    }

    #[test]
    fn missing_image_and_unknown_flags_are_rejected() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["program.out", "--what"])).is_err());
        assert!(parse_args(args(&["a.out", "b.out"])).is_err());
        assert!(parse_args(args(&["a.out", "--instructions"])).is_err());
    }

    #[test]
    fn help_flag_wins() {
        assert!(matches!(
            parse_args(args(&["--help"])),
            Ok(ParseResult::Help)
        ));
        assert!(matches!(
            parse_args(args(&["program.out", "--help"])),
            Ok(ParseResult::Help)
        ));
    }
}
