use std::str::FromStr;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use shelf_core::{Catalog, CategoryId, Sex, UserId};
use shelf_query::{FilterState, Sort, SortColumn};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "shelfctl", version, about = "Shelf CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Fixture file overriding the bundled collections
    #[arg(long = "fixtures", global = true)]
    fixtures: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SortArg {
    Id,
    Product,
    Category,
    User,
}

impl From<SortArg> for SortColumn {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Id => SortColumn::Id,
            SortArg::Product => SortColumn::Product,
            SortArg::Category => SortColumn::Category,
            SortArg::User => SortColumn::User,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List products after filtering and sorting
    Ls {
        /// Keep only products owned by this user id
        #[arg(long = "user")]
        user: Option<UserId>,
        /// Keep only products in this category id (repeatable)
        #[arg(long = "category")]
        categories: Vec<CategoryId>,
        /// Case-insensitive substring match on product/category/user names
        #[arg(long = "query")]
        query: Option<String>,
        /// Sort column
        #[arg(long = "sort", value_enum)]
        sort: Option<SortArg>,
        /// Sort descending instead of ascending
        #[arg(long = "desc", action = ArgAction::SetTrue)]
        desc: bool,
        /// Print per-stage survivor counts to stderr
        #[arg(long = "explain", action = ArgAction::SetTrue)]
        explain: bool,
    },
    /// List users
    Users,
    /// List categories
    Categories,
}

fn init_tracing() {
    let env = std::env::var("SHELF_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("SHELF_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid SHELF_METRICS_ADDR; expected host:port");
        }
    }
}

fn filter_state(
    user: Option<UserId>,
    categories: &[CategoryId],
    query: Option<&str>,
    sort: Option<SortArg>,
    desc: bool,
) -> FilterState {
    let mut state = FilterState::default();
    state.select_user(user);
    for &id in categories {
        state.toggle_category(id);
    }
    if let Some(q) = query {
        state.set_query(q);
    }
    state.sort = match sort {
        None => Sort::Unsorted,
        Some(col) if desc => Sort::Descending(col.into()),
        Some(col) => Sort::Ascending(col.into()),
    };
    state
}

fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    let catalog = match &cli.fixtures {
        Some(path) => Catalog::load(path)?,
        None => Catalog::bundled()?,
    };

    match cli.command {
        Commands::Ls { user, categories, query, sort, desc, explain } => {
            info!(?user, ?categories, ?query, ?sort, desc, "ls invoked");
            let items = catalog.enrich();
            let state = filter_state(user, &categories, query.as_deref(), sort, desc);
            let (ix, dbg) = shelf_query::apply_with_debug(&items, &state);

            match cli.output {
                Output::Human => {
                    if ix.is_empty() {
                        println!("no products matching selected criteria");
                    } else {
                        println!("{:<4} {:<16} {:<20} USER", "ID", "PRODUCT", "CATEGORY");
                        for &i in &ix {
                            let p = &items[i];
                            let category = p
                                .category
                                .as_ref()
                                .map(|c| format!("{} - {}", c.icon, c.title))
                                .unwrap_or_else(|| "-".to_string());
                            let owner = p
                                .user
                                .as_ref()
                                .map(|u| u.name.as_str())
                                .unwrap_or("Unknown");
                            println!("{:<4} {:<16} {:<20} {}", p.id, p.name, category, owner);
                        }
                    }
                }
                Output::Json => {
                    let rows: Vec<_> = ix.iter().map(|&i| &items[i]).collect();
                    if explain {
                        #[derive(serde::Serialize)]
                        struct Explain<'a, T> {
                            rows: T,
                            debug: &'a shelf_query::PipelineDebug,
                        }
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&Explain { rows, debug: &dbg })?
                        );
                    } else {
                        println!("{}", serde_json::to_string_pretty(&rows)?);
                    }
                }
            }
            if explain && matches!(cli.output, Output::Human) {
                eprintln!(
                    "debug: total={} after_user={} after_categories={} after_query={}",
                    dbg.total, dbg.after_user, dbg.after_categories, dbg.after_query
                );
            }
        }
        Commands::Users => match cli.output {
            Output::Human => {
                println!("{:<4} {:<12} SEX", "ID", "NAME");
                for u in &catalog.users {
                    let sex = match u.sex {
                        Sex::Male => "m",
                        Sex::Female => "f",
                    };
                    println!("{:<4} {:<12} {}", u.id, u.name, sex);
                }
            }
            Output::Json => println!("{}", serde_json::to_string_pretty(&catalog.users)?),
        },
        Commands::Categories => match cli.output {
            Output::Human => {
                println!("{:<4} {:<16} {:<6} OWNER", "ID", "TITLE", "ICON");
                for c in &catalog.categories {
                    println!("{:<4} {:<16} {:<6} {}", c.id, c.title, c.icon, c.owner_id);
                }
            }
            Output::Json => println!("{}", serde_json::to_string_pretty(&catalog.categories)?),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_filter_state() {
        let state = filter_state(Some(2), &[1, 3], Some("milk"), Some(SortArg::User), true);
        assert_eq!(state.selected_user, Some(2));
        assert_eq!(state.selected_categories, vec![1, 3]);
        assert_eq!(state.query, "milk");
        assert_eq!(state.sort, Sort::Descending(SortColumn::User));
    }

    #[test]
    fn no_flags_is_the_default_state() {
        let state = filter_state(None, &[], None, None, false);
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn sort_without_desc_is_ascending() {
        let state = filter_state(None, &[], None, Some(SortArg::Id), false);
        assert_eq!(state.sort, Sort::Ascending(SortColumn::Id));
    }
}
