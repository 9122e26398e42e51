//! elemtree: load an HTML document and look up elements by path.
//!
//! ```text
//! elemtree https://example.com/ -p body/.div -c element --all
//! elemtree page.html -p body --flatten
//! curl -s https://example.com/ | elemtree - --tree
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use dom::{Dom, NodeId, NodePath};
use loader::{ResourceLoader, Source};
use net::FetchConfig;
use tracing::{debug, error};

/// Exit status when the document holds no element at all.
const EXIT_NO_ROOT: u8 = 1;
/// Exit status when the document could not be loaded.
const EXIT_LOAD_FAILED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "elemtree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Document to read: an http(s) URL, a file path, or `-` for stdin.
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Slash-separated tag path; prefix a segment with `.` for a direct child.
    #[arg(short = 'p', long = "path", default_value = "")]
    path: String,

    /// Required exact value of the `class` attribute.
    #[arg(short = 'c', long = "class", default_value = "")]
    class: String,

    /// Required exact value of the `id` attribute.
    #[arg(short = 'i', long = "id", default_value = "")]
    id: String,

    /// Print every match instead of the first one.
    #[arg(short = 'a', long = "all", action = ArgAction::SetTrue)]
    all: bool,

    /// Print the descendants of each match instead of the match itself.
    #[arg(long = "flatten", action = ArgAction::SetTrue, conflicts_with = "tree")]
    flatten: bool,

    /// Print the indented structure under each match.
    #[arg(long = "tree", action = ArgAction::SetTrue)]
    tree: bool,

    /// Indentation unit used by `--tree`.
    #[arg(long = "fill", default_value = "  ", requires = "tree")]
    fill: String,

    /// Request timeout in seconds, 0 for none.
    #[arg(long = "timeout", value_name = "SECS", default_value_t = net::TIMEOUT_SECS)]
    timeout: u64,

    /// User-Agent header sent with URL requests.
    #[arg(long = "user-agent", default_value = net::USER_AGENT)]
    user_agent: String,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn query(&self) -> NodePath {
        NodePath::new(&self.path)
            .with_class(&self.class)
            .with_id(&self.id)
    }

    fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout,
            ..FetchConfig::default()
        }
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// One output line: the node's path, then its id and class when set.
fn describe(dom: &Dom, node: NodeId) -> String {
    let mut line = dom.compute_path(node);
    if let Some(el) = dom.get(node) {
        if let Some(id) = el.id().filter(|id| !id.is_empty()) {
            line.push_str(" #");
            line.push_str(id);
        }
        if let Some(class) = el.class().filter(|class| !class.is_empty()) {
            line.push_str(" .");
            line.push_str(class);
        }
    }
    line
}

/// Everything printed for the matches of `cli`'s query.
fn render(dom: &Dom, cli: &Cli) -> String {
    let query = cli.query();
    let root = dom.root();
    let matches = if cli.all {
        dom.find_path_all(root, &query)
    } else {
        dom.find_path(root, &query).into_iter().collect()
    };
    debug!(count = matches.len(), "lookup finished");

    let mut out = String::new();
    for node in matches {
        if cli.tree {
            out.push_str(&dom.structure(node, 0, &cli.fill));
        } else if cli.flatten {
            for child in dom.flatten_children(node) {
                out.push_str(&describe(dom, child));
                out.push('\n');
            }
        } else {
            out.push_str(&describe(dom, node));
            out.push('\n');
        }
    }
    out
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = Source::from_arg(&cli.source);
    let mut loader = ResourceLoader::new(cli.fetch_config());
    let dom = match loader.load(&source) {
        Ok(Some(dom)) => dom,
        Ok(None) => {
            error!(%source, "document has no root element");
            return ExitCode::from(EXIT_NO_ROOT);
        }
        Err(err) => {
            error!(%source, "failed to load document: {err}");
            return ExitCode::from(EXIT_LOAD_FAILED);
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout.write_all(render(&dom, &cli).as_bytes()) {
        if err.kind() != io::ErrorKind::BrokenPipe {
            error!("failed to write output: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
