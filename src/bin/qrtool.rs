//! Thin CLI shell over the qrgrid core: file I/O and argument handling
//! live here, never in the library.

use std::process::ExitCode;

use qrgrid::{DiagEvent, DiagnosticSink, ECLevel, Mode};

fn usage() -> ExitCode {
    eprintln!(
        "usage:\n  \
         qrtool encode <text> [--mode numeric|alnum|byte] [--ec L|M|Q|H]\n          \
         [--version N] [--scale N] [--quiet N] [--out PATH]\n  \
         qrtool decode <image> [--region x0,x1,y0,y1] [--max-version N] [--verbose]"
    );
    ExitCode::from(2)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("encode") => run_encode(&args[1..]),
        Some("decode") => run_decode(&args[1..]),
        _ => return usage(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("qrtool: {message}");
            ExitCode::FAILURE
        }
    }
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn run_encode(args: &[String]) -> Result<(), String> {
    let text = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .ok_or("encode needs a text argument")?;

    let mode = match flag_value(args, "--mode").unwrap_or("byte") {
        "numeric" => Mode::Numeric,
        "alnum" => Mode::Alphanumeric,
        "byte" => Mode::EightBit,
        other => return Err(format!("unknown mode {other:?}")),
    };
    let ec_level = match flag_value(args, "--ec").unwrap_or("M") {
        "L" => ECLevel::L,
        "M" => ECLevel::M,
        "Q" => ECLevel::Q,
        "H" => ECLevel::H,
        other => return Err(format!("unknown EC level {other:?}")),
    };
    let version = flag_value(args, "--version")
        .map(|v| v.parse::<u8>().map_err(|e| format!("bad version: {e}")))
        .transpose()?;
    let scale: usize = flag_value(args, "--scale")
        .unwrap_or("8")
        .parse()
        .map_err(|e| format!("bad scale: {e}"))?;
    let quiet: usize = flag_value(args, "--quiet")
        .unwrap_or("4")
        .parse()
        .map_err(|e| format!("bad quiet zone: {e}"))?;
    let out = flag_value(args, "--out").unwrap_or("qr.png");

    let symbol = qrgrid::encode(text, mode, ec_level, version).map_err(|e| e.to_string())?;
    println!(
        "version {} ({}x{} modules), ec {:?}, mask {}",
        symbol.version(),
        symbol.size(),
        symbol.size(),
        symbol.ec_level(),
        symbol.mask().index()
    );

    let (pixels, width, height) = symbol.to_rgba(scale.max(1), quiet);
    let image = image::RgbaImage::from_raw(width as u32, height as u32, pixels)
        .ok_or("raster buffer mismatch")?;
    image.save(out).map_err(|e| e.to_string())?;
    println!("wrote {out}");
    Ok(())
}

struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn note(&self, event: &DiagEvent) {
        eprintln!("note: {event:?}");
    }
    fn warn(&self, event: &DiagEvent) {
        eprintln!("warn: {event:?}");
    }
}

fn run_decode(args: &[String]) -> Result<(), String> {
    let path = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .ok_or("decode needs an image path")?;

    let image = image::open(path).map_err(|e| e.to_string())?.to_rgba8();
    let (width, height) = (image.width() as usize, image.height() as usize);
    let pixels = image.into_raw();

    let max_version: u8 = flag_value(args, "--max-version")
        .unwrap_or("40")
        .parse()
        .map_err(|e| format!("bad max version: {e}"))?;

    let result = if let Some(region) = flag_value(args, "--region") {
        let parts: Vec<usize> = region
            .split(',')
            .map(|p| p.parse().map_err(|e| format!("bad region: {e}")))
            .collect::<Result<_, _>>()?;
        let &[x0, x1, y0, y1] = parts.as_slice() else {
            return Err("region needs x0,x1,y0,y1".into());
        };
        qrgrid::decode_region(&pixels, width, height, x0, x1, y0, y1, max_version)
    } else if args.iter().any(|a| a == "--verbose") {
        qrgrid::decode_with_sink(&pixels, width, height, &StderrSink)
    } else {
        qrgrid::decode(&pixels, width, height)
    }
    .map_err(|e| e.to_string())?;

    println!("{}", result.text);
    eprintln!(
        "version {}, ec {:?}, mask {}, functional grade {}, error grade {}, block errors {:?}",
        result.version,
        result.ec_level,
        result.mask.index(),
        result.functional_grade,
        result.error_grade,
        result.per_block_errors
    );
    Ok(())
}
