use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gtd::core::NodeId;
use gtd::format::{self, DotOptions, ListingOptions};
use gtd::projectors::{self, DisplayLabels};
use gtd::storage::ListParser;
use gtd::{FileListParser, Forest, GtdError, InputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gtd", about = "Manipulate a GTD to-do list", version)]
struct Cli {
    /// The GTD file to read.
    #[arg(long, env = "GTD_LIST")]
    list: PathBuf,
    /// The file is already a `=`/`>`/`<` marker stream; skip dedenting.
    #[arg(long)]
    preprocessed: bool,
    /// Output a visual graph of todos (in .dot format).
    #[arg(long)]
    graph: bool,
    /// Hide completed tasks.
    #[arg(long)]
    hide_complete: bool,
    /// Hide goals.
    #[arg(long)]
    hide_goals: bool,
    /// Hide tasks which are not yet completed.
    #[arg(long)]
    hide_incomplete: bool,
    /// Output a list of top-level goals only.
    #[arg(long)]
    top_level_goals: bool,
    /// Show only tasks in this context.
    #[arg(long)]
    context: Option<String>,
    /// Show tasks with no explicit context.
    #[arg(long)]
    no_context: bool,
    /// When printing a to-do list, don't show the total.
    #[arg(long)]
    omit_tally: bool,
    /// Show only the ancestors and descendants of one node.
    #[arg(long)]
    focus: Option<String>,
    /// Show tasks grouped by assignee.
    #[arg(long)]
    show_delegation: bool,
    /// Only show delegated tasks.
    #[arg(long)]
    delegated_only: bool,
    /// Show subtasks of completed tasks.
    #[arg(long)]
    full: bool,
    /// Shell completion request: COMMAND CURRENT LAST.
    #[arg(long, num_args = 0..)]
    completion: Option<Vec<String>>,
    /// Emit the shown nodes as JSON.
    #[arg(long)]
    json: bool,
    /// Enable verbose logging for debugging.
    #[arg(long)]
    verbose: bool,
}

/// Which nodes to show, resolved from the flags.
#[derive(Debug, Clone, Default)]
struct Selection {
    abbreviate: bool,
    show_goals: bool,
    top_level_goals: bool,
    show_complete: bool,
    show_incomplete: bool,
    context: Option<String>,
    no_context: bool,
    focus: Option<String>,
    delegated_only: bool,
}

impl Cli {
    fn selection(&self) -> Selection {
        Selection {
            abbreviate: !self.full,
            show_goals: !self.hide_goals && !self.show_delegation,
            top_level_goals: self.top_level_goals,
            show_complete: !self.hide_complete && !self.top_level_goals,
            show_incomplete: !self.hide_incomplete && !self.top_level_goals,
            context: self.context.clone(),
            no_context: self.no_context,
            focus: self.focus.clone(),
            delegated_only: self.delegated_only,
        }
    }

    fn input_format(&self) -> InputFormat {
        if self.preprocessed {
            InputFormat::MarkerStream
        } else {
            InputFormat::Indented
        }
    }
}

struct Shown {
    nodes: Vec<NodeId>,
    labels: DisplayLabels,
}

fn select(forest: &Forest, sel: &Selection) -> Result<Shown, GtdError> {
    let mut flat = forest.flatten();
    let mut labels = DisplayLabels::default();
    if sel.abbreviate {
        let abbr = projectors::abbreviated(forest, &flat);
        flat = abbr.nodes;
        labels = abbr.labels;
    }

    let mut shown = Vec::new();
    if sel.top_level_goals {
        shown.extend(projectors::top_level_goals(forest, &flat));
    } else if sel.show_goals {
        shown.extend(projectors::goals(forest, &flat));
    }
    if sel.show_complete {
        shown.extend(projectors::complete(forest, &flat));
    }
    if sel.show_incomplete {
        shown.extend(projectors::incomplete(forest, &flat));
    }

    if sel.context.is_some() || sel.no_context {
        shown = projectors::only_contexts(forest, &shown, sel.context.as_deref(), sel.no_context);
    }
    if let Some(description) = &sel.focus {
        let focus = projectors::find(forest, &shown, description).ok_or_else(|| {
            GtdError::NotFound {
                description: description.clone(),
            }
        })?;
        shown = projectors::focus_on(forest, &shown, focus);
    }
    if sel.delegated_only {
        shown = projectors::delegated_only(forest, &shown);
    }

    tracing::debug!(shown = shown.len(), total = forest.len(), "selected nodes");
    Ok(Shown { nodes: shown, labels })
}

fn render(forest: &Forest, shown: &Shown, cli: &Cli) -> Result<String> {
    if cli.graph {
        let graph = format::graph(forest, &shown.nodes);
        return Ok(format::dot(forest, &graph, &shown.labels, &DotOptions::default()));
    }

    if let Some(words) = &cli.completion {
        let [command, current, last] = words.as_slice() else {
            anyhow::bail!("--completion expects COMMAND CURRENT LAST, got {} words", words.len());
        };
        if !(last.is_empty() || last == command) {
            return Ok(String::new());
        }
        let mut out = format::completions(forest, &shown.nodes, current).join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        return Ok(out);
    }

    if cli.show_delegation {
        return Ok(format::delegation_report(forest, &shown.nodes));
    }

    if cli.json {
        let nodes: Vec<_> = shown.nodes.iter().map(|&id| &forest[id]).collect();
        let mut json = serde_json::to_string_pretty(&nodes)?;
        json.push('\n');
        return Ok(json);
    }

    Ok(format::listing(
        forest,
        &shown.nodes,
        ListingOptions {
            include_tally: !cli.omit_tally,
        },
    ))
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "gtd=debug" } else { "gtd=warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let parser = FileListParser {
        format: cli.input_format(),
    };
    let forest = parser
        .parse_file(&cli.list)
        .with_context(|| format!("loading {:?}", cli.list))?;
    let shown = select(&forest, &cli.selection())?;
    print!("{}", render(&forest, &shown, &cli)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const LIST: &str = concat!(
        "Do \"clean house\" home in order to \"host party\"\n",
        "    Do vacuum home [done]\n",
        "        Do \"buy bags\" store [done]\n",
        "    Do windows home\n",
        "Do invite phone in order to \"host party\" \"[delegated to Sam]\"\n",
        "Do laundry [done]\n",
    );

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["gtd", "--list", "unused"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    fn load() -> Forest {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("gtd.txt");
        fs::write(&path, LIST).expect("write list");
        FileListParser::default().parse_file(&path).expect("parse list")
    }

    fn run(args: &[&str]) -> String {
        let forest = load();
        let cli = cli(args);
        let shown = select(&forest, &cli.selection()).expect("select");
        render(&forest, &shown, &cli).expect("render")
    }

    #[test]
    fn default_listing_collapses_done_subtrees() {
        assert_eq!(
            run(&[]),
            "host party\nvacuum\nlaundry\nclean house\nwindows\ninvite\n6 total\n"
        );
        let full = run(&["--full", "--omit-tally"]);
        assert!(full.contains("buy bags\n"));
        assert!(!full.contains("total"));
    }

    #[test]
    fn top_level_goals_hide_tasks() {
        assert_eq!(run(&["--top-level-goals"]), "host party\n1 total\n");
    }

    #[test]
    fn context_and_focus_narrow_the_view() {
        assert_eq!(
            run(&["--context", "home", "--hide-goals", "--omit-tally"]),
            "vacuum\nclean house\nwindows\n"
        );
        assert_eq!(
            run(&["--focus", "clean house", "--omit-tally"]),
            "host party\nvacuum\nclean house\nwindows\n"
        );
    }

    #[test]
    fn missing_focus_is_an_error() {
        let forest = load();
        let err = select(&forest, &cli(&["--focus", "nope"]).selection()).err();
        assert_eq!(
            err,
            Some(GtdError::NotFound {
                description: "nope".into()
            })
        );
    }

    #[test]
    fn delegation_report_groups_by_assignee() {
        let out = run(&["--show-delegation", "--delegated-only"]);
        assert_eq!(out, "Sam:\n\tinvite\n\t1 total\n1 total\n");
    }

    #[test]
    fn graph_output_is_dot() {
        let out = run(&["--graph"]);
        assert!(out.starts_with("digraph gtd {"));
        assert!(out.contains("\"host party\" -> \"clean house\";"));
        assert!(out.contains("\"invite\" [color=yellow];"));
    }

    #[test]
    fn completion_lists_quoted_matches() {
        assert_eq!(run(&["--completion", "gtd", "c", "gtd"]), "'clean house'\n");
        assert_eq!(run(&["--completion", "gtd", "c", "other"]), "");
    }

    #[test]
    fn json_output_serializes_nodes() {
        let out = run(&["--top-level-goals", "--json"]);
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value[0]["description"], "host party");
        assert_eq!(value[0]["kind"], "goal");
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = FileListParser::default()
            .parse_file(std::path::Path::new("/definitely/not/here.gtd"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("not/here.gtd"));
    }
}
