//! PPM rotation tool over swappable array layouts.
//!
//! # Usage
//!
//! ```bash
//! rotate_ppm -rotate 90 -row-major photo.ppm > rotated.ppm
//! rotate_ppm -rotate 180 -block-major < photo.ppm > rotated.ppm
//! rotate_ppm -rotate 90 -time timings.log photo.ppm > rotated.ppm
//! ```
//!
//! The traversal flags select both the backing layout and the traversal
//! order: `-row-major` and `-col-major` use the flat layout, `-block-major`
//! the blocked layout. With no flag the flat layout's default (row-major)
//! is used. The choice affects speed only; the output image is identical.
//!
//! Exit status is 0 on success. Bad arguments, an unreadable input file, a
//! malformed image, or an unsupported traversal all print a diagnostic to
//! stderr and exit 1 without producing output.

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use rusty_grids::{Layout, OpRotate, Ppm, Rotation, Traversal, append_timing_summary};

#[derive(Debug)]
struct Options {
    rotation: Rotation,
    layout: Layout,
    order: Traversal,
    time_file: Option<PathBuf>,
    input: Option<PathBuf>,
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {program} [-rotate <0|90|180|270>] [-{{row,col,block}}-major] \
         [-time <file>] [filename]"
    );
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut rotation = Rotation::Deg0;
    let mut layout = Layout::Plain;
    let mut order = layout.default_order();
    let mut time_file = None;
    let mut input: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-row-major" => {
                layout = Layout::Plain;
                order = Traversal::RowMajor;
            }
            "-col-major" => {
                layout = Layout::Plain;
                order = Traversal::ColMajor;
            }
            "-block-major" => {
                layout = Layout::Blocked;
                order = Traversal::BlockMajor;
            }
            "-rotate" => {
                i += 1;
                let value = args.get(i).ok_or("-rotate requires an angle")?;
                let degrees = value
                    .parse::<u32>()
                    .map_err(|_| format!("rotation must be a number, got {value:?}"))?;
                rotation = Rotation::from_degrees(degrees)
                    .ok_or("rotation must be 0, 90, 180 or 270")?;
            }
            "-time" => {
                i += 1;
                let value = args.get(i).ok_or("-time requires a file name")?;
                time_file = Some(PathBuf::from(value));
            }
            "-transpose" | "-flip" => {
                return Err(format!("{} functionality not implemented", &args[i][1..]));
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option {flag:?}"));
            }
            name => {
                if input.is_some() {
                    return Err("too many arguments".to_string());
                }
                input = Some(PathBuf::from(name));
            }
        }
        i += 1;
    }

    Ok(Options {
        rotation,
        layout,
        order,
        time_file,
        input,
    })
}

/// Rejects a traversal the chosen layout leaves unset.
///
/// The flags couple layout and order, so this cannot trip from flag parsing
/// alone; it is the guard that turns a configuration mismatch into a clean
/// exit instead of a panic deep inside the pipeline.
fn check_traversal(layout: Layout, order: Traversal) -> Result<(), String> {
    if layout.supports(order) {
        Ok(())
    } else {
        Err(format!(
            "{:?} layout does not support {} traversal",
            layout,
            order.label()
        ))
    }
}

fn read_input(input: Option<&Path>, layout: Layout) -> Result<Ppm, String> {
    match input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| format!("could not open {} for reading: {err}", path.display()))?;
            Ppm::read(BufReader::new(file), layout).map_err(|err| err.to_string())
        }
        None => Ppm::read(io::stdin().lock(), layout).map_err(|err| err.to_string()),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("rotate_ppm");

    let opts = match parse_args(&args[1..]) {
        Ok(opts) => opts,
        Err(message) => {
            eprintln!("{program}: {message}");
            print_usage(program);
            process::exit(1);
        }
    };

    // Configuration errors surface before any input is read.
    if let Err(message) = check_traversal(opts.layout, opts.order) {
        eprintln!("{program}: {message}");
        process::exit(1);
    }

    let src = match read_input(opts.input.as_deref(), opts.layout) {
        Ok(ppm) => ppm,
        Err(message) => {
            eprintln!("{program}: {message}");
            process::exit(1);
        }
    };

    let op = OpRotate::new(opts.rotation);
    let (rotated, elapsed) = op.apply_timed(src, opts.order);
    let pixel_count = rotated.width() * rotated.height();

    let mut out = BufWriter::new(io::stdout().lock());
    if let Err(err) = rotated.write(&mut out) {
        eprintln!("{program}: failed to write image: {err}");
        process::exit(1);
    }

    if let Some(path) = &opts.time_file {
        if let Err(err) =
            append_timing_summary(path, elapsed, pixel_count, opts.order, opts.rotation)
        {
            eprintln!(
                "{program}: failed to write timing log {}: {err}",
                path.display()
            );
            process::exit(1);
        }
    }
}
