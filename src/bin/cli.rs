//! Cube CLI
//!
//! Command-line interface for a Cube deployment:
//! - Submit events
//! - Query events and metrics
//! - Build aggregate expressions from flags
//! - List event types

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use cube_client::config::{generate_default_config, Config, LoggingConfig};
use cube_client::{
    time, CubeClient, CubeTransport, Event, EventExpression, Filter, FilterValue, InValues, MetricExpression,
    MetricType, QueryParams, Resolution,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "cube")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Cube time-series analytics service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Cube host (overrides config)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit an event
    Put {
        /// Event type
        event_type: String,
        /// Event data as a JSON object
        #[arg(short, long, default_value = "{}")]
        data: String,
        /// Event time (default: now). Supports: "now", RFC 3339, or an age such as 1h, 2D
        #[arg(short, long)]
        time: Option<String>,
        /// Event id; re-sending an id replaces the earlier event
        #[arg(long)]
        id: Option<String>,
    },

    /// Query events matching an expression
    Event {
        /// Event expression, e.g. 'request(path).eq(status, 500)'
        expression: String,
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Evaluate a metric expression
    Metric {
        /// Metric expression, e.g. 'sum(request)'
        expression: String,
        #[command(flatten)]
        range: RangeArgs,
        /// Step (10s, 1m, 5m, 1h, 1d)
        #[arg(long)]
        step: Option<Resolution>,
    },

    /// Build and evaluate a single aggregation
    Aggregate {
        /// Aggregation (sum, min, max, median, distinct)
        metric_type: MetricType,
        /// Event type
        event_type: String,
        /// Property to aggregate
        #[arg(short, long)]
        property: Option<String>,
        /// Filters as kind:property=value, e.g. eq:path=/ or in:status=500,503
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,
        #[command(flatten)]
        range: RangeArgs,
        /// Step (10s, 1m, 5m, 1h, 1d)
        #[arg(long)]
        step: Option<Resolution>,
        /// Print the expression without querying
        #[arg(long)]
        dry_run: bool,
    },

    /// List known event types
    Types,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Query time range
#[derive(Args)]
pub struct RangeArgs {
    /// Start time. Supports: "now", RFC 3339, or an age such as 1h, 2D, 1W
    #[arg(long)]
    pub start: Option<String>,
    /// Stop time (default: now)
    #[arg(long)]
    pub stop: Option<String>,
    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<u64>,
}

impl RangeArgs {
    fn to_params(&self, now: DateTime<Utc>) -> anyhow::Result<QueryParams> {
        let mut params = QueryParams::new();
        if let Some(start) = &self.start {
            params = params.start(parse_time(start, now)?);
        }
        if let Some(stop) = &self.stop {
            params = params.stop(parse_time(stop, now)?);
        }
        if let Some(limit) = self.limit {
            params = params.limit(limit);
        }
        Ok(params)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(host) = &cli.host {
        config.cube.hostname = host.clone();
    }

    init_tracing(&config.logging);

    let client = CubeClient::new(config.client_config())?;
    let now = time::now();

    match cli.command {
        Commands::Put {
            event_type,
            data,
            time,
            id,
        } => {
            let data: Value = serde_json::from_str(&data).context("Event data must be valid JSON")?;
            if !data.is_object() {
                bail!("Event data must be a JSON object");
            }

            let mut event = Event::new(event_type).data(data);
            if let Some(time) = time {
                event = event.at(parse_time(&time, now)?);
            }
            if let Some(id) = id {
                event = event.id(id);
            }

            let sent = client.put(event).await?;
            for event in sent {
                println!("Submitted {} at {}", event.event_type, event.time);
            }
        }

        Commands::Event { expression, range } => {
            let result = client.event(&expression, &range.to_params(now)?).await?;
            print_result(&result, &cli.format)?;
        }

        Commands::Metric {
            expression,
            range,
            step,
        } => {
            let mut params = range.to_params(now)?;
            params.step = step;
            let result = client.metric(&expression, &params).await?;
            print_result(&result, &cli.format)?;
        }

        Commands::Aggregate {
            metric_type,
            event_type,
            property,
            filters,
            range,
            step,
            dry_run,
        } => {
            let mut event = EventExpression::new(event_type);
            if let Some(property) = property {
                event = event.with_property(property);
            }
            for raw in &filters {
                event = event.filter(parse_filter(raw)?);
            }

            let metric = MetricExpression::new(metric_type, event)?;
            if dry_run {
                println!("{}", metric);
                return Ok(());
            }

            let mut params = range.to_params(now)?;
            params.step = step;
            let result = client.metric(&metric, &params).await?;
            print_result(&result, &cli.format)?;
        }

        Commands::Types => {
            let types = client.types().await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&types)?);
            } else if types.is_empty() {
                println!("No event types recorded yet.");
            } else {
                for name in types {
                    println!("{}", name);
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("cube_client={0},cube={0}", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// "now", RFC 3339, or an age relative to `now`
fn parse_time(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if s == "now" {
        return Ok(now);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    time::timeago(s, now).with_context(|| format!("Invalid time: {}", s))
}

/// Integers, then finite floats, then booleans; anything else is a string
fn parse_value(s: &str) -> FilterValue {
    if let Ok(i) = s.parse::<i64>() {
        return FilterValue::from(i);
    }
    if let Some(v) = s.parse::<f64>().ok().and_then(FilterValue::from_f64) {
        return v;
    }
    match s {
        "true" => FilterValue::Bool(true),
        "false" => FilterValue::Bool(false),
        _ => FilterValue::from(s),
    }
}

/// Parse `kind:property=value`; `in` takes a comma-separated list
fn parse_filter(raw: &str) -> anyhow::Result<Filter> {
    let (kind, rest) = raw
        .split_once(':')
        .with_context(|| format!("Filter '{}' must look like kind:property=value", raw))?;
    let (property, value) = rest
        .split_once('=')
        .with_context(|| format!("Filter '{}' must look like kind:property=value", raw))?;

    if kind == "in" {
        let values = InValues::list(value.split(',').map(str::trim));
        return Ok(Filter::in_array(property, values));
    }

    Ok(Filter::from_name(kind, property, parse_value(value))?)
}

fn print_result(data: &Value, format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(data)?);
        return Ok(());
    }

    let rows = match data.as_array() {
        Some(r) => r,
        None => {
            println!("{}", data);
            return Ok(());
        }
    };

    if rows.is_empty() {
        println!("No data for the selected time range");
        return Ok(());
    }

    println!("{:<26} | {}", "Time", "Value");
    println!("{}", "-".repeat(50));

    for row in rows {
        let time = row["time"].as_str().unwrap_or("-");
        let value = row
            .get("value")
            .or_else(|| row.get("data"))
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<26} | {}", time, value);
    }

    Ok(())
}
