#[macro_use]
extern crate clap;

use clap::Arg;
use objfmt::Format;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Debug)]
enum IOErrorContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Asm(asm::Error),
    Io(std::io::Error, IOErrorContext, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadInput => "Reading input",
                    IOErrorContext::WriteOutput => "Writing output",
                },
                path.display(),
                err
            ),
            Error::Asm(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the assembly source file to assemble")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .takes_value(true)
                .value_name("FORMAT")
                .possible_values(&["bin", "hex", "srec"])
                .default_value("bin")
                .help("Sets the output object format"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Sets the output file to write to"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let format = match matches.value_of("format").unwrap() {
        "hex" => Format::Hex,
        "srec" => Format::SRec,
        _ => Format::Bin,
    };
    let output = matches.value_of("output");

    if let Err(err) = run(input, format, output) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(input: &str, format: Format, output: Option<&str>) -> Result<(), Error> {
    let input_path = Path::new(input);

    let mut source = String::new();
    File::open(input_path)
        .and_then(|mut f| f.read_to_string(&mut source))
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;

    let (image, listing) = asm::assemble(&source).map_err(Error::Asm)?;

    let output_path: PathBuf = output.map(PathBuf::from).unwrap_or_else(|| {
        input_path.with_extension(match format {
            Format::Bin => "bin",
            Format::Hex => "hex",
            Format::SRec => "srec",
        })
    });

    let bytes = match format {
        Format::Bin => objfmt::bin::write_bin(&image),
        Format::Hex => objfmt::hex::write_hex(&image).into_bytes(),
        Format::SRec => {
            let name = input_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("EDU-CPU");
            objfmt::srec::write_srec(&image, name).into_bytes()
        }
    };
    write_file(&output_path, &bytes)?;

    let listing_path = input_path.with_extension("lst");
    write_file(&listing_path, listing.to_string().as_bytes())?;

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    File::create(path)
        .and_then(|mut f| f.write_all(bytes))
        .map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, path.to_owned()))
}
