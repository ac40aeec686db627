#[macro_use] extern crate error_chain;

use clap::{CommandFactory, Parser};
use mac_vendor::batch::{self, Format};
use mac_vendor::{download_and_persist, CacheStore, Config, Error, ErrorKind, HttpFetcher, Resolver, Result, ResultExt};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

quick_main!(run);

/// Look up Media Access Control addresses against a list of vendors.
#[derive(Parser, Debug)]
#[command(name = "mac-vendor", version)]
struct Args {
    /// MAC address to query
    #[arg(short, long, conflicts_with = "infile")]
    mac: Option<String>,

    /// Comma separated file of MAC addresses, one per line
    #[arg(short, long)]
    infile: Option<PathBuf>,

    /// Write results to this file instead of the console
    #[arg(short, long)]
    outfile: Option<PathBuf>,

    /// Download an updated vendor list
    #[arg(short, long)]
    update: bool,

    /// Show where the vendor list lives and when it was last updated
    #[arg(long)]
    info: bool,

    /// Vendor list location
    #[arg(long, env = "MAC_VENDOR_CACHE")]
    cache: Option<PathBuf>,

    /// Registry to download the vendor list from
    #[arg(long, env = "MAC_VENDOR_URL")]
    url: Option<String>,

    /// Log cache activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,mac_vendor=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Puts a user-facing explanation in front of the errors a user can act on.
fn with_hint(e: Error) -> Error {
    let hint = match *e.kind() {
        ErrorKind::VendorNotFound(_) => Some(
            "MAC Address vendor not found.\nConsider updating the vendor list with --update".to_string()),
        ErrorKind::InvalidAddress(..) => Some(
            "Invalid MAC address submitted, please review and try again".to_string()),
        ErrorKind::TransportError(_) => Some(
            "Unable to connect to the server\nCheck your internet connection, firewall, or proxy".to_string()),
        ErrorKind::UpstreamError(code, ref reason) => Some(format!(
            "IEEE server returned an error\nUnable to obtain updated MAC vendor list\n{}: {}", code, reason)),
        ErrorKind::CacheCorrupt(..) => Some(
            "The vendor list is damaged\nRe-download it with --update".to_string()),
        _ => None,
    };

    match hint {
        Some(hint) => Error::with_chain(e, hint),
        None => e,
    }
}

fn update(fetcher: &HttpFetcher, config: &Config, store: &CacheStore) -> Result<()> {
    download_and_persist(fetcher, &config.registry_url, store).map_err(with_hint)?;
    Ok(())
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::from_env();
    if let Some(ref cache) = args.cache {
        config.cache_path = cache.clone();
    }
    if let Some(ref url) = args.url {
        config.registry_url = url.clone();
    }

    let store = CacheStore::from_config(&config);
    let fetcher = HttpFetcher::new(&config);

    let needs_lookup = args.mac.is_some() || args.infile.is_some();
    if needs_lookup && !args.update && !args.info && !store.exists() {
        println!("Cache file not detected\nAttempting to download cache file");
        update(&fetcher, &config, &store)?;
        println!("Cache file downloaded\nTo update the cache file in future, use the --update argument");
    }

    if args.update {
        println!("Updating vendor list\nThis might take some time");
        update(&fetcher, &config, &store)?;
        println!("Updated vendor file");
    } else if args.info {
        match store.resolve_path() {
            Some(path) => println!("Vendor list: {}", path.display()),
            None => println!("Vendor list: not downloaded yet ({})", store.primary_path().display()),
        }
        match store.last_updated() {
            Some(when) => println!("Last updated: {}", when.format("%Y-%m-%d %H:%M:%S")),
            None => println!("Last updated: unknown"),
        }
    } else if let Some(ref mac) = args.mac {
        let mut resolver = Resolver::new(store);
        let vendor = resolver.lookup(mac).map_err(with_hint)?;
        let result = format!("{} : {}", mac, vendor);

        match args.outfile {
            Some(ref outfile) => {
                fs::write(outfile, format!("{}\n", result))
                    .chain_err(|| format!("Failed to write {}", outfile.display()))?;
                println!("Output file {} written to successfully!", outfile.display());
            }
            None => println!("{}", result),
        }
    } else if let Some(ref infile) = args.infile {
        let input = BufReader::new(File::open(infile)
            .chain_err(|| format!("Failed to open {}", infile.display()))?);
        let mut resolver = Resolver::new(store);

        let summary = match args.outfile {
            Some(ref outfile) => {
                let mut out = BufWriter::new(File::create(outfile)
                    .chain_err(|| format!("Failed to create {}", outfile.display()))?);
                let summary = batch::run(&mut resolver, input, &mut out, Format::Csv).map_err(with_hint)?;
                println!("Output file {} written to successfully!", outfile.display());
                summary
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                batch::run(&mut resolver, input, &mut out, Format::Console).map_err(with_hint)?
            }
        };

        info!(found = summary.found, not_found = summary.not_found, invalid = summary.invalid, "Batch complete");
    } else {
        Args::command().print_help()?;
    }

    Ok(())
}
