use acl_cidr::{AccessList, AccessListError};
use anyhow::Result;
use clap::{ArgAction, Parser};
use log::{debug, info, warn, LevelFilter};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::io::{self, BufRead, Write};
use std::net::Ipv4Addr;
use std::process;

/// Reads one CIDR per line from stdin and prints the accepted entries.
#[derive(Parser)]
#[command(name = "acl-cidr", version)]
struct Opts {
    /// Print `from`, `to` and the entry itself
    #[arg(short, long)]
    range: bool,

    /// Print the smallest set of blocks covering every entry
    #[arg(short, long, conflicts_with = "range")]
    summarize: bool,

    /// Print the entries containing this address, exit 1 if there are none
    #[arg(short, long, value_name = "IP", conflicts_with_all = ["range", "summarize"])]
    check: Option<Ipv4Addr>,

    #[arg(long, default_value = "\t")]
    sep: String,

    /// Raise the log level, may be repeated
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{l} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn read_list<R: BufRead>(input: R) -> Result<AccessList> {
    let mut list = AccessList::new();
    for (n, line) in input.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        match list.add(text) {
            Ok(cidr) => debug!("line {}: {}", n + 1, cidr),
            Err(AccessListError::Duplicate(existing)) => {
                warn!("line {}: {} is the same range as {}", n + 1, text, existing)
            }
            Err(e) => warn!("line {}: {}", n + 1, e),
        }
    }
    Ok(list)
}

/// Writes the entries selected by `opts`. Returns `false` when `--check`
/// matched nothing.
fn render<W: Write>(opts: &Opts, list: &AccessList, out: &mut W) -> Result<bool> {
    if let Some(ip) = opts.check {
        let mut found = false;
        for cidr in list.matching(&ip) {
            writeln!(out, "{}", cidr)?;
            found = true;
        }
        return Ok(found);
    }
    if opts.summarize {
        write!(out, "{}", list.summarize())?;
    } else if opts.range {
        for cidr in list.iter() {
            writeln!(
                out,
                "{}{sep}{}{sep}{}",
                cidr.from_address(),
                cidr.to_address(),
                cidr,
                sep = opts.sep
            )?;
        }
    } else {
        write!(out, "{}", list)?;
    }
    Ok(true)
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose)?;

    let stdin = io::stdin();
    let list = read_list(stdin.lock())?;
    info!("Accepted {} entries", list.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !render(&opts, &list, &mut out)? {
        info!("No entry contains the address");
        process::exit(1);
    }
    out.flush()?;
    Ok(())
}
