use fanout::*;

use clap::Parser;
use std::io;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of concurrent requests (prompted for if omitted)
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    requests: Option<i64>,

    /// Value of the `id` query parameter (prompted for if omitted)
    #[arg(short, long, allow_negative_numbers = true)]
    id: Option<i64>,

    /// Host of the server under test
    #[arg(long, default_value = model::DEFAULT_HOST)]
    host: String,

    /// Port of the server under test
    #[arg(short, long, default_value_t = model::DEFAULT_PORT)]
    port: u16,

    /// Per-request timeout in seconds; requests wait indefinitely when omitted or 0
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Limit on requests in flight at once
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Print a one-line summary after all requests finish
    #[arg(short, long)]
    summary: bool,

    /// Log level written to stderr
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(&args.log_level, console::colors_enabled_stderr())?;

    let (requests, id) = {
        let mut input = io::stdin().lock();
        let mut output = io::stdout();
        let requests = match args.requests {
            Some(n) => n,
            None => prompt::read_number(&mut input, &mut output, prompt::REQUESTS_PROMPT)?,
        };
        let id = match args.id {
            Some(id) => id,
            None => prompt::read_number(&mut input, &mut output, prompt::ID_PROMPT)?,
        };
        (requests, id)
    };

    let mut config = Config::new(
        Target::new(args.host, args.port),
        prompt::worker_count(requests),
        id,
    );
    config.timeout = args.timeout.map(Duration::from_secs);
    config.max_in_flight = args.max_in_flight;

    let console = report::Console::new(config.workers)?;
    let reports = run(&config, console).await?;

    if args.summary {
        println!("{}", Summary::from_reports(&reports));
    }

    Ok(())
}
