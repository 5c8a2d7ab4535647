//! mcp-hub - MCP capability hub console
//!
//! Keeps a local tool registry in step with the configured MCP servers and
//! lets the operator send prompts and pull resources into the context.

use clap::{Parser, Subcommand};
use mcp_hub::config::HubConfig;
use mcp_hub::infrastructure::mcp::{parse_tool_arguments, McpServerPool};
use mcp_hub::logging::{self, ActivityLog};
use mcp_hub::mcp::{
    format_tool_result, ConnectRequest, DisconnectRequest, HubState, Operator, Reconciler,
    UseOutcome,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Keeps a tool registry in sync with the configured MCP servers
#[derive(Debug, Parser)]
#[command(name = "mcp-hub", version, about)]
struct Cli {
    /// Config file to use instead of the user and project configs
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<PathBuf>,
}

/// One console line; the first word names the command
#[derive(Debug, Parser)]
#[command(multicall = true, help_template = "{all-args}")]
struct ConsoleLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Register tools of servers (all if none given)
    Connect {
        /// Pick servers from a list
        #[arg(short, long)]
        interactive: bool,
        sources: Vec<String>,
    },
    /// Remove registered servers
    Disconnect {
        /// Pick servers from a list and confirm stopping them
        #[arg(short, long)]
        interactive: bool,
        /// Also stop the servers
        #[arg(long)]
        stop: bool,
        sources: Vec<String>,
    },
    /// Re-fetch prompts and resources
    Refresh { sources: Vec<String> },
    /// Connection status of every server
    Status,
    /// Registered tools by category
    Tools,
    /// Cached prompts
    Prompts,
    /// Send a prompt (pick one if no arguments)
    Prompt {
        #[arg(requires = "name")]
        source: Option<String>,
        name: Option<String>,
    },
    /// Cached resources
    Resources,
    /// Add a resource to the context (pick if no arguments)
    Resource {
        #[arg(requires = "uri")]
        source: Option<String>,
        uri: Option<String>,
    },
    /// Call a registered tool with JSON arguments
    Call {
        tool: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        arguments: Vec<String>,
    },
    /// Context entries
    Context {
        #[command(subcommand)]
        action: Option<ContextAction>,
    },
    /// Recent activity, optionally for one server
    Log { source: Option<String> },
    /// Stop servers and exit
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum ContextAction {
    /// Drop an entry by key
    #[command(alias = "remove")]
    Rm { key: String },
}

/// Parse a console line; `Ok(None)` for a blank one
fn parse_command(line: &str) -> Result<Option<Command>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ConsoleLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

fn read_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

fn prompt_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    read_line()
}

/// Operator backed by stdin/stdout
#[derive(Default)]
struct ConsoleOperator {
    /// Text handed to the chat input, most recent last
    chat_input: Vec<String>,
}

/// Map a selection answer (numbers or names) onto `choices`
fn parse_selection(answer: &str, choices: &[String]) -> Vec<String> {
    answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<usize>() {
            Ok(n) if n >= 1 => choices.get(n - 1).cloned(),
            _ => choices.iter().find(|c| c.as_str() == token).cloned(),
        })
        .collect()
}

impl Operator for ConsoleOperator {
    fn select(&mut self, title: &str, choices: &[String]) -> Vec<String> {
        println!("{title}:");
        for (i, choice) in choices.iter().enumerate() {
            println!("  {:>2}) {choice}", i + 1);
        }
        prompt_line("Select (numbers or names, empty to cancel): ")
            .map(|answer| parse_selection(&answer, choices))
            .unwrap_or_default()
    }

    fn confirm(&mut self, question: &str) -> bool {
        prompt_line(&format!("{question} [y/N] "))
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn deliver(&mut self, text: &str) {
        println!("--- chat input ---\n{text}\n------------------");
        self.chat_input.push(text.to_string());
    }
}

struct Console {
    reconciler: Reconciler<McpServerPool>,
    state: HubState,
    operator: ConsoleOperator,
    activity: ActivityLog,
}

impl Console {
    /// Run one command; false once the session should end
    async fn run(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::Connect {
                interactive,
                sources,
            } => {
                let request = ConnectRequest::sources(sources)
                    .interactive(interactive)
                    .on_complete(|summary| {
                        tracing::debug!(outcome = ?summary.outcome, "connect completed");
                    });
                if let Err(e) = self
                    .reconciler
                    .connect(&mut self.state, &mut self.operator, request)
                    .await
                {
                    println!("error: {e}");
                }
            }
            Command::Disconnect {
                interactive,
                stop,
                sources,
            } => {
                let request = DisconnectRequest::sources(sources)
                    .interactive(interactive)
                    .stop_sources(stop);
                if let Err(e) = self
                    .reconciler
                    .disconnect(&mut self.state, &mut self.operator, request)
                    .await
                {
                    println!("error: {e}");
                }
            }
            Command::Refresh { sources } => {
                let summary = self
                    .reconciler
                    .refresh_prompts_and_resources(&mut self.state, &sources)
                    .await;
                println!("{summary}");
                for (source, reason) in &summary.failed {
                    println!("  {source}: {reason}");
                }
            }
            Command::Status => {
                for row in self.reconciler.status(&self.state).await {
                    println!("{row}");
                }
            }
            Command::Tools => {
                let registry = &self.state.registry;
                if registry.tool_count() == 0 {
                    println!("No MCP tools registered.");
                    return true;
                }
                for (category, tools) in registry.snapshot() {
                    println!("{category}: {}", tools.join(", "));
                }
                println!("{} tool(s) registered.", registry.tool_count());
            }
            Command::Prompts => {
                let prompts = self.state.prompts();
                if prompts.is_empty() {
                    println!("No MCP prompts cached.");
                }
                for prompt in prompts {
                    println!("{}", prompt.label());
                }
            }
            Command::Prompt { source, name } => {
                let outcome = match source.zip(name) {
                    Some((source, name)) => Some(
                        self.reconciler
                            .send_prompt(&self.state, &mut self.operator, &source, &name)
                            .await,
                    ),
                    None => {
                        self.reconciler
                            .pick_prompt(&self.state, &mut self.operator)
                            .await
                    }
                };
                tracing::debug!(?outcome, "prompt command finished");
            }
            Command::Resources => {
                let resources = self.state.resources();
                if resources.is_empty() {
                    println!("No MCP resources cached.");
                }
                for resource in resources {
                    println!("{}  <{}>", resource.label(), resource.uri);
                }
            }
            Command::Resource { source, uri } => {
                let outcomes = match source.zip(uri) {
                    Some((source, uri)) => vec![
                        self.reconciler
                            .add_resource_to_context(
                                &mut self.state,
                                &mut self.operator,
                                &source,
                                &uri,
                            )
                            .await,
                    ],
                    None => {
                        self.reconciler
                            .pick_resources(&mut self.state, &mut self.operator)
                            .await
                    }
                };
                let added = outcomes
                    .iter()
                    .filter(|o| matches!(o, UseOutcome::Added { .. }))
                    .count();
                tracing::debug!(added, total = outcomes.len(), "resource command finished");
            }
            Command::Call { tool, arguments } => {
                let response = self
                    .reconciler
                    .call_tool(&self.state, &tool, parse_tool_arguments(&arguments.join(" ")))
                    .await;
                println!("{}", format_tool_result(&response));
            }
            Command::Context {
                action: Some(ContextAction::Rm { key }),
            } => match self.state.registry.remove_context_entry(&key) {
                Some(_) => println!("Removed {key} from the context."),
                None => println!("No context entry {key}."),
            },
            Command::Context { action: None } => {
                let entries = self.state.registry.context_entries();
                if entries.is_empty() {
                    println!("Context is empty.");
                }
                for (key, entry) in entries {
                    println!(
                        "{key}  ({} chars, added {})",
                        entry.content.chars().count(),
                        entry.added_at.format("%H:%M:%S")
                    );
                }
            }
            Command::Log { source } => {
                let entries = match source {
                    Some(source) => self.activity.for_source(&source),
                    None => self.activity.recent(50),
                };
                for entry in entries {
                    println!("{entry}");
                }
            }
        }
        true
    }
}

async fn run(config: HubConfig, activity: ActivityLog) {
    let pool = McpServerPool::from_configs(&config.mcp.servers);
    tracing::info!(servers = pool.len(), "Starting mcp-hub console");

    let mut console = Console {
        reconciler: Reconciler::new(pool),
        state: HubState::default(),
        operator: ConsoleOperator::default(),
        activity,
    };

    println!(
        "mcp-hub: {} MCP server(s) configured. Type `help` for commands.",
        console.reconciler.provider().len()
    );
    while let Some(line) = prompt_line("mcp> ") {
        match parse_command(&line) {
            Ok(Some(command)) => {
                if !console.run(command).await {
                    break;
                }
            }
            Ok(None) => {}
            // usage errors and `help` output alike
            Err(e) => {
                let _ = e.print();
            }
        }
    }

    console.reconciler.provider().shutdown().await;
    tracing::info!("mcp-hub console stopped");
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HubConfig::load_from_file(path),
        None => HubConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &cli.write_config {
        return match config.save_to(path) {
            Ok(()) => {
                println!("Wrote configuration to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let activity = logging::init_logging(
        &config.logging.to_logging_config(),
        config.mcp.activity_buffer_size,
    );

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    rt.block_on(run(config, activity));
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_connect_and_disconnect() {
        assert_eq!(
            parse("connect -i git fs"),
            Command::Connect {
                interactive: true,
                sources: names(&["git", "fs"])
            }
        );
        assert_eq!(
            parse("disconnect --stop git"),
            Command::Disconnect {
                interactive: false,
                stop: true,
                sources: names(&["git"])
            }
        );
    }

    #[test]
    fn test_parse_call_keeps_json() {
        let Command::Call { tool, arguments } = parse(r#"call git:status {"path": "src dir"}"#)
        else {
            panic!("expected a call");
        };
        assert_eq!(tool, "git:status");
        assert_eq!(arguments.join(" "), r#"{"path": "src dir"}"#);

        assert_eq!(
            parse(r#"call calc:add {"n": -1}"#),
            Command::Call {
                tool: "calc:add".to_string(),
                arguments: names(&[r#"{"n":"#, "-1}"])
            }
        );
        assert!(parse_command("call").is_err());
    }

    #[test]
    fn test_parse_pairs_and_misc() {
        assert_eq!(
            parse("resource fs file:///notes.md"),
            Command::Resource {
                source: Some("fs".to_string()),
                uri: Some("file:///notes.md".to_string())
            }
        );
        assert_eq!(
            parse("prompt"),
            Command::Prompt {
                source: None,
                name: None
            }
        );
        assert!(parse_command("prompt git").is_err());
        assert!(parse_command("   ").unwrap().is_none());
        assert_eq!(parse("exit"), Command::Quit);
        assert_eq!(
            parse("log git"),
            Command::Log {
                source: Some("git".to_string())
            }
        );
        assert!(parse_command("bogus").is_err());
    }

    #[test]
    fn test_parse_context_remove() {
        assert_eq!(parse("context"), Command::Context { action: None });
        assert_eq!(
            parse("context rm mcp://fs/file:///a"),
            Command::Context {
                action: Some(ContextAction::Rm {
                    key: "mcp://fs/file:///a".to_string()
                })
            }
        );
    }

    #[test]
    fn test_help_is_reported_as_display_help() {
        let err = parse_command("help").unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("disconnect"));
    }

    #[test]
    fn test_cli_args() {
        let cli = Cli::try_parse_from(["mcp-hub", "-c", "hub.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("hub.toml")));
        assert!(cli.write_config.is_none());

        let cli = Cli::try_parse_from(["mcp-hub", "--write-config", "out.toml"]).unwrap();
        assert_eq!(cli.write_config, Some(PathBuf::from("out.toml")));

        assert!(Cli::try_parse_from(["mcp-hub", "stray"]).is_err());
    }

    #[test]
    fn test_parse_selection() {
        let choices = names(&["git", "fs", "ALL"]);
        assert_eq!(parse_selection("1, 2", &choices), names(&["git", "fs"]));
        assert_eq!(parse_selection("ALL", &choices), names(&["ALL"]));
        assert_eq!(parse_selection("0 9 nope", &choices), Vec::<String>::new());
    }
}
