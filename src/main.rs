//! Idea Vault CLI - capture ideas and link them into a graph.

use clap::Parser;
use ideavault::action_log::ActionLogger;
use ideavault::cli::{Cli, CollectionCommands, Commands, ConfigCommands, IdeaCommands};
use ideavault::commands::{self, IdeaUpdateArgs, Output};
use ideavault::config::{ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config};
use ideavault::storage::BackendType;
use ideavault::{Error, logging};
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match build_overrides(&cli).and_then(|o| resolve_config(&o)) {
        Ok(config) => config,
        Err(e) => exit_with_error(&e, cli.human_readable),
    };
    let human = *config.output_format() == OutputFormat::Human;

    // Serialize command for logging
    let (cmd_name, args_json) = serialize_command(&cli.command);

    let start = Instant::now();
    let result = run_command(cli.command, &config, human);
    let duration = start.elapsed().as_millis() as u64;

    let logger = ActionLogger::new(config.data_dir(), config.action_log_enabled());
    logger.log(
        config.document_key(),
        &cmd_name,
        args_json,
        result.as_ref().err().map(|e| e.to_string()),
        duration,
    );

    if let Err(e) = result {
        exit_with_error(&e, human);
    }
}

/// Turn global CLI flags into configuration overrides.
fn build_overrides(cli: &Cli) -> Result<ConfigOverrides, Error> {
    let mut overrides = ConfigOverrides::new();
    if let Some(ref store) = cli.store {
        let store = BackendType::from_str(store)
            .ok_or_else(|| Error::Config(format!("--store: unknown store: {}", store)))?;
        overrides = overrides.with_store(store);
    }
    if let Some(ref dir) = cli.data_dir {
        overrides = overrides.with_data_dir(dir);
    }
    if let Some(ref endpoint) = cli.endpoint {
        overrides = overrides.with_endpoint(endpoint);
    }
    if let Some(ref key) = cli.document_key {
        overrides = overrides.with_document_key(key);
    }
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    Ok(overrides)
}

fn exit_with_error(e: &Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", e);
    } else {
        let err = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
        eprintln!("{}", err);
    }
    process::exit(1);
}

fn run_command(command: Commands, config: &ResolvedConfig, human: bool) -> Result<(), Error> {
    match command {
        Commands::Idea { command } => match command {
            IdeaCommands::Create {
                title,
                stage,
                priority,
                collection,
                description,
                parent,
            } => {
                let result = commands::idea_create(
                    config,
                    &title,
                    stage.as_deref(),
                    priority.as_deref(),
                    collection,
                    description,
                    parent,
                )?;
                output(&result, human);
            }
            IdeaCommands::Update {
                id,
                title,
                stage,
                priority,
                collection,
                unassign,
                description,
                parent,
                clear_parents,
            } => {
                let args = IdeaUpdateArgs {
                    title,
                    stage,
                    priority,
                    collection,
                    unassign,
                    description,
                    parents: parent,
                    clear_parents,
                };
                let result = commands::idea_update(config, &id, args)?;
                output(&result, human);
            }
            IdeaCommands::Show { id } => {
                let result = commands::idea_show(config, &id)?;
                output(&result, human);
            }
            IdeaCommands::Delete { id } => {
                let result = commands::idea_delete(config, &id)?;
                output(&result, human);
            }
            IdeaCommands::List {
                collection,
                search,
                in_description,
            } => {
                let query = commands::list_query(&collection, search, in_description);
                let result = commands::idea_list(config, &query)?;
                output(&result, human);
            }
            IdeaCommands::Candidates { id, search } => {
                let result = commands::idea_candidates(config, id.as_deref(), search.as_deref())?;
                output(&result, human);
            }
            IdeaCommands::Roots => {
                let result = commands::idea_roots(config)?;
                output(&result, human);
            }
            IdeaCommands::Descendants { id } => {
                let result = commands::idea_descendants(config, &id)?;
                output(&result, human);
            }
            IdeaCommands::Ancestors { id } => {
                let result = commands::idea_ancestors(config, &id)?;
                output(&result, human);
            }
        },

        Commands::Collection { command } => match command {
            CollectionCommands::Create { name } => {
                let result = commands::collection_create(config, &name)?;
                output(&result, human);
            }
            CollectionCommands::Rename { id, name } => {
                let result = commands::collection_rename(config, &id, &name)?;
                output(&result, human);
            }
            CollectionCommands::Delete { id } => {
                let result = commands::collection_delete(config, &id)?;
                output(&result, human);
            }
            CollectionCommands::List => {
                let result = commands::collection_list(config)?;
                output(&result, human);
            }
        },

        Commands::View {
            mode,
            collection,
            search,
            in_description,
        } => {
            let query = commands::list_query(&collection, search, in_description);
            let result = commands::view(config, &mode, query)?;
            output(&result, human);
        }

        Commands::Doctor { fix } => {
            let result = commands::doctor(config, fix)?;
            output(&result, human);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(config);
                output(&result, human);
            }
        },
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Command name and arguments for the action log.
fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    match command {
        Commands::Idea { command } => match command {
            IdeaCommands::Create {
                title,
                stage,
                priority,
                collection,
                description,
                parent,
            } => (
                "idea create".to_string(),
                serde_json::json!({
                    "title": title,
                    "stage": stage,
                    "priority": priority,
                    "collection": collection,
                    "description": description,
                    "parent": parent,
                }),
            ),
            IdeaCommands::Update {
                id,
                title,
                stage,
                priority,
                collection,
                unassign,
                description,
                parent,
                clear_parents,
            } => (
                "idea update".to_string(),
                serde_json::json!({
                    "id": id,
                    "title": title,
                    "stage": stage,
                    "priority": priority,
                    "collection": collection,
                    "unassign": unassign,
                    "description": description,
                    "parent": parent,
                    "clear_parents": clear_parents,
                }),
            ),
            IdeaCommands::Show { id } => ("idea show".to_string(), serde_json::json!({ "id": id })),
            IdeaCommands::Delete { id } => {
                ("idea delete".to_string(), serde_json::json!({ "id": id }))
            }
            IdeaCommands::List {
                collection,
                search,
                in_description,
            } => (
                "idea list".to_string(),
                serde_json::json!({
                    "collection": collection,
                    "search": search,
                    "in_description": in_description,
                }),
            ),
            IdeaCommands::Candidates { id, search } => (
                "idea candidates".to_string(),
                serde_json::json!({ "id": id, "search": search }),
            ),
            IdeaCommands::Roots => ("idea roots".to_string(), serde_json::json!({})),
            IdeaCommands::Descendants { id } => (
                "idea descendants".to_string(),
                serde_json::json!({ "id": id }),
            ),
            IdeaCommands::Ancestors { id } => (
                "idea ancestors".to_string(),
                serde_json::json!({ "id": id }),
            ),
        },

        Commands::Collection { command } => match command {
            CollectionCommands::Create { name } => (
                "collection create".to_string(),
                serde_json::json!({ "name": name }),
            ),
            CollectionCommands::Rename { id, name } => (
                "collection rename".to_string(),
                serde_json::json!({ "id": id, "name": name }),
            ),
            CollectionCommands::Delete { id } => (
                "collection delete".to_string(),
                serde_json::json!({ "id": id }),
            ),
            CollectionCommands::List => ("collection list".to_string(), serde_json::json!({})),
        },

        Commands::View {
            mode,
            collection,
            search,
            in_description,
        } => (
            "view".to_string(),
            serde_json::json!({
                "mode": mode,
                "collection": collection,
                "search": search,
                "in_description": in_description,
            }),
        ),

        Commands::Doctor { fix } => ("doctor".to_string(), serde_json::json!({ "fix": fix })),

        Commands::Config { command } => match command {
            ConfigCommands::Show => ("config show".to_string(), serde_json::json!({})),
        },
    }
}
