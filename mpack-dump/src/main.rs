use mpack::*;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use anyhow::{anyhow, Context, Result};
use structopt::StructOpt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
enum InputFormat {
    Raw,
    Hex,
    Base64,
}

impl FromStr for InputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raw"    => Ok(InputFormat::Raw),
            "hex"    => Ok(InputFormat::Hex),
            "base64" => Ok(InputFormat::Base64),
            other    => Err(anyhow!("unknown input format `{}`", other)),
        }
    }
}

/// Decode and print MessagePack streams, one value per line
#[derive(StructOpt)]
#[structopt(name = "mdump")]
struct Opt {
    /// file to read from, stdin if absent
    #[structopt(parse(from_os_str))]
    file: Option<PathBuf>,
    /// how the input is encoded
    #[structopt(short, long, default_value = "raw", possible_values = &["raw", "hex", "base64"])]
    input_format: InputFormat,
    /// print binaries as strings
    #[structopt(long)]
    bin_as_str: bool,
    /// print strings as binaries
    #[structopt(long)]
    str_as_bin: bool,
    /// skip this many values first
    #[structopt(short, long, default_value = "0")]
    skip: u64,
    /// stop after this many values
    #[structopt(short = "n", long)]
    count: Option<u64>,
    /// copy the selected values to stdout unchanged instead of printing them
    #[structopt(short, long)]
    copy: bool,
    /// log more, can be repeated; RUST_LOG takes precedence
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

impl Opt {
    fn options(&self) -> DecodeOptions {
        DecodeOptions { bin_as_str: self.bin_as_str, str_as_bin: self.str_as_bin, ..DecodeOptions::default() }
    }
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match opt.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let source: Box<dyn Read> = match &opt.file {
        Some(path) => Box::new(File::open(path).with_context(|| format!("Failed to open {}", path.display()))?),
        None => Box::new(io::stdin()),
    };
    let input = open(BufReader::new(source), opt.input_format)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let n = dump(&opt, input, &mut out)?;
    out.flush().context("Failed to write stdout")?;
    info!(values = n, "done");
    Ok(())
}

/// Raw input is streamed, textual encodings need to be read completely before they can be decoded.
fn open<'a, R: Read + 'a>(mut source: R, format: InputFormat) -> Result<Box<dyn Read + 'a>> {
    if format == InputFormat::Raw {
        return Ok(Box::new(source));
    }
    let mut text = String::new();
    source.read_to_string(&mut text).context("Input is not utf-8")?;
    let text: String = text.split_whitespace().collect();
    let bytes = match format {
        InputFormat::Hex => hex::decode(&text).context("Input is not valid hex")?,
        _ => base64::decode(&text).context("Input is not valid base64")?,
    };
    debug!(len = bytes.len(), ?format, "decoded textual input");
    Ok(Box::new(Cursor::new(bytes)))
}

/// Returns the number of printed or copied values.
fn dump<R: Read, W: Write>(opt: &Opt, input: R, out: &mut W) -> Result<u64> {
    let mut decoder = Decoder::with_options(input, opt.options());
    if opt.skip > 0 {
        decoder.skip_value(opt.skip)
            .map_err(|e| e.at(decoder.position()))
            .with_context(|| format!("Failed to skip {} values", opt.skip))?;
        debug!(skipped = opt.skip, position = decoder.position(), "skipped values");
    }
    let mut n = 0;
    while opt.count.map_or(true, |count| n < count) && decoder.has_next()? {
        let start = decoder.position();
        if opt.copy {
            let len = decoder.read_value(1, out)
                .map_err(|e| e.at(decoder.position()))
                .with_context(|| format!("Failed to copy value {}", n))?;
            debug!(index = n, position = start, len, "copied value");
        } else {
            let value = decoder.unpack()
                .map_err(|e| e.at(decoder.position()))
                .with_context(|| format!("Failed to decode value {}", n))?;
            writeln!(out, "{}", value).context("Failed to write output")?;
            debug!(index = n, position = start, kind = value.type_name(), "printed value");
        }
        n += 1;
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::{dump, open, InputFormat, Opt};
    use structopt::StructOpt;

    fn run(args: &[&str], input: &[u8]) -> anyhow::Result<Vec<u8>> {
        let opt = Opt::from_iter_safe(std::iter::once("mdump").chain(args.iter().copied()))?;
        let input = open(input, opt.input_format)?;
        let mut out = Vec::new();
        dump(&opt, input, &mut out)?;
        Ok(out)
    }

    const STREAM: &[u8] = &[0x01, 0x92, 0xc3, 0xa1, b'x', 0xc4, 0x02, b'h', b'i', 0x81, 0xa1, b'k', 0xc0];

    #[test]
    fn prints_one_value_per_line() {
        let out = run(&[], STREAM).unwrap();
        assert_eq!("1\n[true, \"x\"]\nbin(6869)\n{\"k\": nil}\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn skip_and_count() {
        let out = run(&["--skip", "1", "-n", "2", "--bin-as-str"], STREAM).unwrap();
        assert_eq!("[true, \"x\"]\n\"hi\"\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn copies_verbatim() {
        let out = run(&["--copy", "--skip", "2", "--count", "1"], STREAM).unwrap();
        assert_eq!(&STREAM[5..9], &out[..]);
    }

    #[test]
    fn textual_input() {
        let out = run(&["-i", "hex"], b"92 c3\na178\n").unwrap();
        assert_eq!("[true, \"x\"]\n", String::from_utf8(out).unwrap());
        let out = run(&["--input-format", "base64"], b"ksOheA==").unwrap();
        assert_eq!("[true, \"x\"]\n", String::from_utf8(out).unwrap());
        assert!(run(&["-i", "hex"], b"9").is_err());
        assert!("yaml".parse::<InputFormat>().is_err());
    }

    #[test]
    fn reports_broken_input() {
        let e = run(&[], &[0x01, 0x92, 0xc3]).unwrap_err();
        assert_eq!("Failed to decode value 1", e.to_string());
        let cause = e.chain().nth(1).map(|c| c.to_string()).unwrap_or_default();
        assert_eq!("Unexpected end of input while decoding at input position 3", cause);
    }

}
