#[macro_use]
extern crate clap;

use clap::Arg;
use cpu::constants::DEFAULT_MAX_CYCLES;
use cpu::{Core, StdoutSink};
use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;

#[derive(Debug)]
enum Error {
    Io(std::io::Error, PathBuf),
    Object(objfmt::Error),
    Runtime(cpu::RuntimeError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => write!(f, "reading \"{}\" failed: {}", path.display(), err),
            Error::Object(err) => write!(f, "{}", err),
            Error::Runtime(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("FILES")
                .help("Sets the object file(s) to load")
                .required(true)
                .multiple(true),
        )
        .arg(
            Arg::with_name("trace")
                .short("t")
                .long("trace")
                .help("Writes a per-instruction trace to stderr"),
        )
        .arg(
            Arg::with_name("max-cycles")
                .long("max-cycles")
                .takes_value(true)
                .value_name("N")
                .help("Sets the cycle cap before simulation aborts as runaway"),
        )
        .get_matches();

    let files: Vec<&str> = matches.values_of("FILES").unwrap().collect();
    let trace = matches.is_present("trace");
    let max_cycles = if matches.is_present("max-cycles") {
        value_t_or_exit!(matches.value_of("max-cycles"), u64)
    } else {
        DEFAULT_MAX_CYCLES
    };

    if let Err(err) = run(&files, trace, max_cycles) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(files: &[&str], trace: bool, max_cycles: u64) -> Result<(), Error> {
    let mut loaded_files = Vec::with_capacity(files.len());
    for name in files {
        let path = PathBuf::from(name);
        let bytes = fs::read(&path).map_err(|err| Error::Io(err, path.clone()))?;
        loaded_files.push((name.to_string(), bytes, None));
    }

    let (image, loaded_set, _provenance) =
        objfmt::load_files(&loaded_files).map_err(Error::Object)?;

    let mut core = Core::new();
    for (&address, &byte) in image.iter() {
        core.memory_mut().load_byte(address, byte);
    }
    for address in loaded_set.addresses() {
        core.memory_mut().mark_loaded(address);
    }

    let mut sink = StdoutSink;
    let stderr = std::io::stderr();
    let mut trace_writer = BufWriter::new(stderr.lock());

    let result = if trace {
        core.run(&mut sink, Some(&mut trace_writer), max_cycles)
    } else {
        core.run(&mut sink, None, max_cycles)
    };

    result.map_err(Error::Runtime)
}
