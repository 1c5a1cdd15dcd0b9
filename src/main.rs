use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, value_parser};
use englishtopia::config::{SiteConfig, load_or_default};
use englishtopia::fetch::{DirSource, HttpSource, load_all};
use englishtopia::markup::page_skeleton;
use englishtopia::page::{DEFAULT_USER_AGENT, Page};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn site_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("site")
            .long("site")
            .value_name("DIR")
            .help("Site root holding the backend and assets directories")
            .default_value(".")
            .value_parser(value_parser!(PathBuf)),
    )
    .arg(
        Arg::new("backend-url")
            .long("backend-url")
            .value_name("URL")
            .help("Fetch the site documents over HTTP from this base URL instead of the site directory"),
    )
    .arg(
        Arg::new("config")
            .long("config")
            .value_name("FILE")
            .help("JSON site config (defaults are used when omitted)")
            .value_parser(value_parser!(PathBuf)),
    )
}

fn cli() -> Command {
    Command::new("englishtopia")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders the EnglishTopia camp page from its JSON documents")
        .subcommand_required(true)
        .subcommand(
            site_args(Command::new("render").about("Load the documents and write the rendered page"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("FILE")
                        .help("Write HTML here instead of stdout")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("user-agent")
                        .long("user-agent")
                        .value_name("UA")
                        .default_value(DEFAULT_USER_AGENT),
                )
                .arg(
                    Arg::new("settle-ms")
                        .long("settle-ms")
                        .value_name("MS")
                        .help("Virtual time to run deferred page work after loading")
                        .default_value("1000")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(site_args(Command::new("check").about("Load the documents and report item counts")))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct SiteArgs {
    site: PathBuf,
    backend_url: Option<String>,
    config: SiteConfig,
}

fn site_from(matches: &ArgMatches) -> Result<SiteArgs> {
    let site = matches
        .get_one::<PathBuf>("site")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let config = load_or_default(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    Ok(SiteArgs {
        site,
        backend_url: matches.get_one::<String>("backend-url").cloned(),
        config,
    })
}

async fn run_render(matches: &ArgMatches) -> Result<()> {
    let args = site_from(matches)?;
    let user_agent = matches
        .get_one::<String>("user-agent")
        .map_or(DEFAULT_USER_AGENT, String::as_str);
    let settle_ms = matches.get_one::<u64>("settle-ms").copied().unwrap_or(1000);

    let backend_dir = args.site.join(&args.config.backend_path);
    let mut page = Page::boot(args.config, page_skeleton(), user_agent);

    // A failed load leaves the error banner in the output; it is not fatal here.
    let loaded = match &args.backend_url {
        Some(url) => page.load(&HttpSource::new(url)).await,
        None => page.load(&DirSource::new(backend_dir)).await,
    };
    if let Err(e) = &loaded {
        tracing::warn!("Rendering without site data ({} failed)", e.resource());
    }
    page.verify_images(|src| args.site.join(src).is_file());
    page.advance(settle_ms);

    let html = page.document().to_html();
    match matches.get_one::<PathBuf>("out") {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Page written to {}", path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}

async fn run_check(matches: &ArgMatches) -> Result<()> {
    let args = site_from(matches)?;
    let data = match &args.backend_url {
        Some(url) => load_all(&HttpSource::new(url)).await,
        None => load_all(&DirSource::new(args.site.join(&args.config.backend_path))).await,
    }
    .context("Site documents failed to load")?;

    println!("camp: {}", data.info.camp_name);
    println!("whyUs: {}", data.why_us().len());
    println!("activities: {}", data.activities().len());
    println!("reviews: {}", data.reviews().len());
    println!("faq: {}", data.faq().len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("render", m)) => run_render(m).await,
        Some(("check", m)) => run_check(m).await,
        _ => unreachable!("subcommand is required"),
    }
}
