//! ddg-search CLI - image and text search from the command line.

use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::{pin_mut, Stream, StreamExt};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ddg_search::{
    Endpoints, HttpTransport, ImageColor, ImageFilters, ImageLayout, ImageLicense, ImageResult, ImageSize,
    ImageType, SafeSearch, SearchApi, SearchQuery, TextResult, TimeLimit,
};

/// Search DuckDuckGo images and web results
#[derive(Parser)]
#[command(name = "ddg-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Proxy URL (e.g., http://127.0.0.1:8080 or socks5://127.0.0.1:1080)
    #[arg(short, long, global = true)]
    proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long, global = true, default_value = "10")]
    timeout: u64,

    /// Send every request to this base URL instead of duckduckgo.com
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search web results
    Text(CommonArgs),

    /// Search images
    Images(ImageArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Search keywords
    query: String,

    /// Region code, e.g. us-en
    #[arg(short, long, default_value = ddg_search::DEFAULT_REGION)]
    region: String,

    /// Safe search level: on, moderate or off
    #[arg(short, long, default_value = "moderate")]
    safesearch: SafeSearch,

    /// Restrict results to the last day, week, month or year
    #[arg(long, value_enum)]
    timelimit: Option<TimeLimitArg>,

    /// Maximum number of results to display
    #[arg(short, long, default_value = "20")]
    limit: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args)]
struct ImageArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Small, Medium, Large or Wallpaper
    #[arg(long)]
    size: Option<ImageSize>,

    /// color, Monochrome, Red, Orange, ...
    #[arg(long)]
    color: Option<ImageColor>,

    /// photo, clipart, gif, transparent or line
    #[arg(long = "type")]
    image_type: Option<ImageType>,

    /// Square, Tall or Wide
    #[arg(long)]
    layout: Option<ImageLayout>,

    /// any, Public, Share, ShareCommercially, Modify or ModifyCommercially
    #[arg(long)]
    license: Option<ImageLicense>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimeLimitArg {
    Day,
    Week,
    Month,
    Year,
}

impl From<TimeLimitArg> for TimeLimit {
    fn from(arg: TimeLimitArg) -> Self {
        match arg {
            TimeLimitArg::Day => TimeLimit::Day,
            TimeLimitArg::Week => TimeLimit::Week,
            TimeLimitArg::Month => TimeLimit::Month,
            TimeLimitArg::Year => TimeLimit::Year,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output, one object per line
    Json,
}

impl CommonArgs {
    fn query(&self) -> SearchQuery {
        let mut query = SearchQuery::new(&self.query)
            .with_region(&self.region)
            .with_safesearch(self.safesearch);
        if let Some(limit) = self.timelimit {
            query = query.with_timelimit(limit.into());
        }
        query
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut transport = HttpTransport::builder().timeout(Duration::from_secs(cli.timeout));
    if let Some(proxy) = &cli.proxy {
        transport = transport.proxy(proxy);
    }
    let mut api = SearchApi::with_transport(transport.build()?);
    if let Some(base) = &cli.base_url {
        api = api.with_endpoints(Endpoints::with_base(base)?);
    }

    match cli.command {
        Commands::Text(args) => {
            let stream = api.text(args.query())?;
            print_results(stream, args.limit, args.format, |i, r: &TextResult| {
                println!("{}. {}", i + 1, r.title);
                println!("   URL: {}", r.href);
                println!("   {}", r.body);
                println!();
            })
            .await
        }
        Commands::Images(args) => {
            let filters = ImageFilters {
                size: args.size,
                color: args.color,
                image_type: args.image_type,
                layout: args.layout,
                license: args.license,
            };
            let stream = api.images(args.common.query().with_filters(filters))?;
            print_results(stream, args.common.limit, args.common.format, |i, r: &ImageResult| {
                println!("{}. {}", i + 1, r.title);
                println!("   Image: {} ({}x{})", r.image, r.width, r.height);
                println!("   Page:  {}", r.url);
                println!("   Source: {}", r.source);
                println!();
            })
            .await
        }
    }
}

async fn print_results<S, R>(
    stream: S,
    limit: usize,
    format: OutputFormat,
    show: impl Fn(usize, &R),
) -> Result<()>
where
    S: Stream<Item = ddg_search::Result<R>>,
    R: Serialize,
{
    let stream = stream.take(limit);
    pin_mut!(stream);

    let mut index = 0;
    while let Some(result) = stream.next().await {
        let result = result?;
        match format {
            OutputFormat::Text => show(index, &result),
            OutputFormat::Json => println!("{}", serde_json::to_string(&result)?),
        }
        index += 1;
    }

    if index == 0 && matches!(format, OutputFormat::Text) {
        eprintln!("No results.");
    }
    Ok(())
}
