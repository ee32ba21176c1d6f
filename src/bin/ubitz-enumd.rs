//! Demo entry point: runs one enumeration pass against a simulated
//! backplane, then drops into the operator console on stdin/stdout.
//!
//! A real deployment wires [`ubitz_enum::orchestrator::run_enumeration`]
//! against I2C/GPIO/UART backends instead of [`ubitz_enum::sim`]; the
//! pipeline and console code are identical either way.

use std::io::{self, Write};

use ubitz_enum::console;
use ubitz_enum::orchestrator;
use ubitz_enum::sim::SimBackplane;
use ubitz_enum::snapshot::SnapshotStore;
use ubitz_enum::transport::ConsoleIo;

#[derive(Default)]
struct StdConsole;

impl ConsoleIo for StdConsole {
    fn read_line(&mut self) -> Option<String> {
        let mut buf = String::new();
        match io::stdin().read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(buf.trim_end_matches(['\n', '\r']).to_string()),
            Err(_) => None,
        }
    }

    fn write_line(&mut self, line: &str) {
        println!("{line}");
        let _ = io::stdout().flush();
    }
}

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        eprintln!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

fn main() {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(log::LevelFilter::Debug))
        .expect("logger installs exactly once");

    let mut sim = SimBackplane::happy_path();
    let snapshot = SnapshotStore::new();

    let reason = orchestrator::run_enumeration(&mut sim.bus, &mut sim.cpld, &mut sim.reset, &snapshot);
    println!("enumeration finished: {reason}");
    println!("commands: lstiles, showhost, showbank, showerrors, reset");

    let mut io = StdConsole;
    console::run(&mut io, &snapshot, || {
        let reason =
            orchestrator::run_enumeration(&mut sim.bus, &mut sim.cpld, &mut sim.reset, &snapshot);
        println!("enumeration finished: {reason}");
    });
}
