//! lbwatch - live dashboard for a load-balancer appliance pair.
//!
//! Without `--api-base` the dashboard runs against the built-in demo backend.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lbwatch_core::render::Rgba;
use lbwatch_core::telemetry::{ApplianceApi, DemoBackend, ExportRequest, HttpClient, ListFilter, Node};
use lbwatch_core::{ChartColors, DashboardConfig};
use lbwatch_core::tui::App;

const DEFAULT_LOG_FILTER: &str = "lbwatch=info,lbwatch_core=info";

#[derive(Parser)]
#[command(
    name = "lbwatch",
    about = "Live dashboard for a load-balancer appliance pair",
    version = lbwatch_core::VERSION
)]
struct Args {
    /// Appliance API base URL, e.g. https://lb.example.com.
    /// If not specified, the built-in demo backend is used.
    #[arg(long, env = "LBWATCH_API_BASE")]
    api_base: Option<String>,

    /// Use the demo backend even when an API base is configured.
    #[arg(long)]
    demo: bool,

    /// Node to monitor on startup (primary or secondary).
    #[arg(long, default_value = "primary", env = "LBWATCH_NODE")]
    node: Node,

    /// Polling interval in seconds.
    #[arg(short, long, default_value = "10", env = "LBWATCH_INTERVAL")]
    interval: u64,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "5", env = "LBWATCH_TIMEOUT")]
    timeout: u64,

    /// Write logs to this file. The dashboard owns the terminal, so logs are
    /// discarded without it.
    #[arg(long, env = "LBWATCH_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Directory the dashboard writes CSV exports to.
    #[arg(long, default_value = ".", env = "LBWATCH_EXPORT_DIR", value_name = "DIR")]
    export_dir: PathBuf,

    /// CPU gauge color, e.g. "hsl(24, 95%, 53%)" or "#f97015".
    #[arg(long, env = "LBWATCH_CPU_COLOR", value_name = "COLOR")]
    cpu_color: Option<Rgba>,

    /// Memory gauge color.
    #[arg(long, env = "LBWATCH_MEM_COLOR", value_name = "COLOR")]
    mem_color: Option<Rgba>,

    /// Request-rate trend color.
    #[arg(long, env = "LBWATCH_HTTP_COLOR", value_name = "COLOR")]
    http_color: Option<Rgba>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Unlock a locked user account and exit.
    Unlock {
        /// Account to unlock.
        username: String,

        /// Node to send the request to (defaults to --node).
        #[arg(long)]
        node: Option<Node>,
    },
    /// Export failover history or user sessions as CSV and exit.
    Export(ExportArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    Failover,
    Sessions,
}

#[derive(ClapArgs)]
struct ExportArgs {
    /// Which list to export.
    #[arg(value_enum)]
    kind: ExportKind,

    /// Node to export from (defaults to --node).
    #[arg(long)]
    node: Option<Node>,

    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    from: Option<String>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    to: Option<String>,

    /// Event or session type (substring match).
    #[arg(long = "type", value_name = "TYPE")]
    kind_filter: Option<String>,

    /// User name (substring match, sessions only).
    #[arg(long)]
    user: Option<String>,

    /// Session status, e.g. Active (sessions only).
    #[arg(long)]
    status: Option<String>,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

impl ExportArgs {
    fn request(&self, default_node: Node) -> ExportRequest {
        let filter = ListFilter {
            from: self.from.clone(),
            to: self.to.clone(),
            kind: self.kind_filter.clone(),
            user: self.user.clone(),
            status: self.status.clone(),
        };
        let node = self.node.unwrap_or(default_node);
        match self.kind {
            ExportKind::Failover => ExportRequest::FailoverHistory(filter.failover_query(node)),
            ExportKind::Sessions => ExportRequest::UserSessions(filter.session_query(node)),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let to_stderr = args.command.is_some();
    init_tracing(args.log_file.as_deref(), to_stderr)?;

    let config = DashboardConfig {
        api_base: args.api_base.clone().filter(|_| !args.demo),
        node: args.node,
        poll_interval: Duration::from_secs(args.interval.max(1)),
        request_timeout: Duration::from_secs(args.timeout.max(1)),
        colors: chart_colors(&args),
        export_dir: args.export_dir.clone(),
        ..DashboardConfig::default()
    };
    let api = build_api(&config)?;

    // Rendering and state live on one thread; fetches are tasks on it.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    match args.command {
        Some(Command::Unlock { username, node }) => {
            runtime.block_on(unlock(api, node.unwrap_or(config.node), &username))
        }
        Some(Command::Export(export_args)) => {
            let request = export_args.request(config.node);
            runtime.block_on(export(api, request, export_args.output.as_deref()))
        }
        None => runtime
            .block_on(App::new(api, config).run())
            .context("dashboard terminated with an error"),
    }
}

fn chart_colors(args: &Args) -> ChartColors {
    let defaults = ChartColors::default();
    ChartColors {
        cpu: args.cpu_color.unwrap_or(defaults.cpu),
        mem: args.mem_color.unwrap_or(defaults.mem),
        http: args.http_color.unwrap_or(defaults.http),
    }
}

fn init_tracing(log_file: Option<&Path>, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("LBWATCH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None if to_stderr => builder.with_writer(io::stderr).init(),
        None => builder.with_writer(io::sink).init(),
    }
    Ok(())
}

fn build_api(config: &DashboardConfig) -> Result<Arc<dyn ApplianceApi>> {
    match &config.api_base {
        Some(base) => {
            let client = HttpClient::new(base.as_str(), config.request_timeout)
                .with_context(|| format!("failed to create API client for {}", base))?;
            info!(base = client.base(), "using appliance API");
            Ok(Arc::new(client))
        }
        None => {
            info!("no API base configured, using demo backend");
            Ok(Arc::new(DemoBackend::default()))
        }
    }
}

async fn unlock(api: Arc<dyn ApplianceApi>, node: Node, username: &str) -> Result<()> {
    let outcome = api
        .unlock_user(node, username)
        .await
        .into_result()
        .with_context(|| format!("unlock request for '{}' on {} failed", username, node))?;

    if let Some(url) = api.auth_redirect() {
        bail!("login required, sign in at {}", url);
    }
    if !outcome.success {
        bail!("{}", outcome.message);
    }
    info!(%node, username, "user unlocked");
    println!("{}", outcome.message);
    Ok(())
}

async fn export(
    api: Arc<dyn ApplianceApi>,
    request: ExportRequest,
    output: Option<&Path>,
) -> Result<()> {
    let csv = api
        .export_csv(&request)
        .await
        .into_result()
        .with_context(|| format!("export from {} failed", request.endpoint()))?;

    if let Some(url) = api.auth_redirect() {
        bail!("login required, sign in at {}", url);
    }
    match output {
        Some(path) => {
            fs::write(path, &csv).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = csv.len(), "export written");
        }
        None => io::stdout()
            .write_all(csv.as_bytes())
            .context("failed to write export to stdout")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_flags_override_defaults() {
        let args = Args::try_parse_from([
            "lbwatch",
            "--cpu-color",
            "#ff0000",
            "--http-color",
            "hsl(120, 100%, 50%)",
        ])
        .unwrap();
        let colors = chart_colors(&args);
        assert_eq!(colors.cpu.to_rgb8(), (255, 0, 0));
        assert_eq!(colors.http.to_rgb8(), (0, 255, 0));
        assert_eq!(colors.mem, ChartColors::default().mem);

        assert!(Args::try_parse_from(["lbwatch", "--mem-color", "hsl(1, 2, 3)"]).is_err());
    }

    #[test]
    fn test_export_args_build_filtered_request() {
        let args = Args::try_parse_from([
            "lbwatch",
            "--node",
            "secondary",
            "export",
            "sessions",
            "--type",
            "VPN",
            "--status",
            "Active",
        ])
        .unwrap();
        let Some(Command::Export(export_args)) = args.command else {
            panic!("expected export subcommand");
        };
        let request = export_args.request(args.node);
        assert_eq!(request.endpoint(), "/api/export/user-sessions");
        assert_eq!(request.node(), Node::Secondary);
        assert_eq!(
            request.params(),
            vec![
                ("node", "secondary".to_string()),
                ("type", "VPN".to_string()),
                ("status", "Active".to_string()),
            ]
        );
        assert!(export_args.output.is_none());
    }
}
