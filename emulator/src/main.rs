mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use phase_core::config::LineFrequency;
use session::Session;

fn main() -> io::Result<()> {
    let (line, channels) = parse_args().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: phase-emulator [--mains <50|60>] [--channels <1-3>]");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(line, channels);
    let mut input = String::new();

    writeln!(
        writer,
        "Phase controller emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        input.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut input)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed) {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_args() -> Result<(LineFrequency, usize), String> {
    let mut line = LineFrequency::Hz60;
    let mut channels = 3;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mains" => {
                let value = args.next().ok_or("--mains requires a value")?;
                line = match value.as_str() {
                    "50" => LineFrequency::Hz50,
                    "60" => LineFrequency::Hz60,
                    other => return Err(format!("unsupported mains frequency `{other}`")),
                };
            }
            "--channels" => {
                let value = args.next().ok_or("--channels requires a value")?;
                channels = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid channel count `{value}`"))?;
                if !(1..=3).contains(&channels) {
                    return Err(format!("channel count {channels} outside 1..=3"));
                }
            }
            other => return Err(format!("unknown argument `{other}`")),
        }
    }

    Ok((line, channels))
}
