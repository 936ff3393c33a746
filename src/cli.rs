use std::sync::Arc;

use crate::catalog::filter::FilterState;
use crate::catalog::rng::fresh_seed;
use crate::catalog::session::SessionState;
use crate::catalog::sort::SortMode;
use crate::catalog::view::{spec_line, visible_rows};
use crate::config::AppConfig;
use crate::data::admin::{add_beer, update_beer, BeerUpdate, NewBeer};
use crate::data::cache::CatalogCache;
use crate::data::parse::{parse_number, StockStatus};
use crate::data::source::{source_from_location, BeerSource};
use crate::data::validate::{validate_table, ValidationSeverity};
use crate::logging;
use crate::server::{self, AppState};

const USAGE: &str = "usage: beerlist <serve|list|validate|update|add>";

/// Flags that take no value.
const SWITCHES: &[&str] = &["--json", "--all"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    List,
    Validate,
    Update,
    Add,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("list") => Some(Command::List),
        Some("validate") => Some(Command::Validate),
        Some("update") => Some(Command::Update),
        Some("add") => Some(Command::Add),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    logging::init();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    match command {
        Command::Serve => handle_serve(config),
        Command::List => handle_list(args, &config),
        Command::Validate => handle_validate(args, &config),
        Command::Update => handle_update(args, &config),
        Command::Add => handle_add(args, &config),
    }
}

/// Value following `--name`, if any.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Positional arguments after the subcommand, skipping `--flag value` pairs and switches.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if SWITCHES.contains(&arg.as_str()) {
            continue;
        }
        if arg.starts_with("--") {
            iter.next();
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

fn open_source(args: &[String], config: &AppConfig) -> Result<Box<dyn BeerSource>, i32> {
    let location = flag_value(args, "--source").unwrap_or(config.source.as_str());
    source_from_location(location).map_err(|err| {
        eprintln!("{err}");
        2
    })
}

fn handle_serve(config: AppConfig) -> i32 {
    let state = match AppState::from_config(&config) {
        Ok(state) => Arc::new(state),
        Err(err) => {
            eprintln!("server error: {err}");
            return 1;
        }
    };
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("server error: {err}");
            return 1;
        }
    };
    match runtime.block_on(server::run_server(state, &config.bind)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn parse_sort(raw: &str) -> Option<SortMode> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).ok()
}

fn handle_list(args: &[String], config: &AppConfig) -> i32 {
    let source = match open_source(args, config) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let sort = match flag_value(args, "--sort") {
        Some(raw) => match parse_sort(raw) {
            Some(mode) => mode,
            None => {
                eprintln!("unknown sort '{raw}'");
                return 2;
            }
        },
        None => SortMode::default(),
    };
    let limit = flag_value(args, "--limit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(config.view.paging.initial);
    let all = args.iter().any(|a| a == "--all");

    let cache = CatalogCache::new();
    let catalog = match cache.get_or_load(source.as_ref()) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("load failed: {err}");
            return 1;
        }
    };
    let session = SessionState {
        filters: FilterState {
            search_text: flag_value(args, "--search").unwrap_or_default().to_string(),
            sort,
            country: flag_value(args, "--country").map(str::to_string),
            show_back_order: all,
            show_unavailable: all,
            ..FilterState::default()
        },
        display_limit: limit,
        random_seed: (sort == SortMode::Random).then(fresh_seed),
        ..SessionState::default()
    };
    let rows = visible_rows(&catalog, &session);
    let shown: Vec<_> = rows.iter().take(limit).collect();

    if args.iter().any(|a| a == "--json") {
        let records: Vec<_> = shown.iter().map(|b| &b.record).collect();
        return match serde_json::to_string_pretty(&records) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize beers: {err}");
                1
            }
        };
    }

    println!("id\tstock\tname\tbrewery\tspec");
    for beer in &shown {
        let name = if beer.record.name_jp.trim().is_empty() {
            &beer.record.name_local
        } else {
            &beer.record.name_jp
        };
        println!(
            "{}\t{}\t{}\t{}\t{}",
            beer.record.id,
            beer.stock.symbol(),
            name,
            beer.record.brewery_jp,
            spec_line(beer)
        );
    }
    println!("shown {} of {}", shown.len(), rows.len());
    0
}

fn handle_validate(args: &[String], config: &AppConfig) -> i32 {
    let location = positionals(args)
        .first()
        .copied()
        .or_else(|| flag_value(args, "--source"))
        .unwrap_or(config.source.as_str())
        .to_string();
    let source = match source_from_location(&location) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let table = match source.load() {
        Ok(table) => table,
        Err(err) => {
            eprintln!("load failed: {err}");
            return 1;
        }
    };
    let report = validate_table(&table);
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s) in {} row(s)",
            report.count(ValidationSeverity::Error),
            report.rows
        );
        1
    } else {
        println!("validation passed: {location} ({} rows)", report.rows);
        0
    }
}

fn handle_update(args: &[String], config: &AppConfig) -> i32 {
    let pos = positionals(args);
    let (Some(raw_id), Some(raw_stock)) = (pos.first(), pos.get(1)) else {
        eprintln!(
            "usage: beerlist update <id> <○|△|×> [--price N] [--comment TEXT] [--detail TEXT] [--source PATH]"
        );
        return 2;
    };
    let Ok(id) = raw_id.parse::<i64>() else {
        eprintln!("invalid id '{raw_id}'");
        return 2;
    };
    let source = match open_source(args, config) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let cache = CatalogCache::new();
    let current = match cache.get_or_load(source.as_ref()) {
        Ok(catalog) => catalog.find(id).cloned(),
        Err(err) => {
            eprintln!("load failed: {err}");
            return 1;
        }
    };
    let Some(current) = current else {
        eprintln!("beer {id} not found");
        return 1;
    };

    // Fields not given on the command line keep their current values.
    let price = match flag_value(args, "--price") {
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => match parse_number(raw) {
            Some(p) => Some(p),
            None => {
                eprintln!("invalid price '{raw}'");
                return 2;
            }
        },
        None => current.price_yen,
    };
    let update = BeerUpdate {
        id,
        stock: StockStatus::classify(raw_stock),
        price,
        comment: flag_value(args, "--comment")
            .map(str::to_string)
            .unwrap_or_else(|| current.record.comment.clone()),
        detailed_comment: flag_value(args, "--detail")
            .map(str::to_string)
            .unwrap_or_else(|| current.record.detailed_comment.clone()),
    };
    match update_beer(source.as_ref(), &cache, &update) {
        Ok(beer) => {
            println!(
                "updated beer {id}: {} {}",
                beer.stock.symbol(),
                spec_line(&beer)
            );
            0
        }
        Err(err) => {
            eprintln!("update failed: {err}");
            1
        }
    }
}

fn handle_add(args: &[String], config: &AppConfig) -> i32 {
    let Some(raw) = positionals(args).first().copied() else {
        eprintln!("usage: beerlist add '<json>' [--source PATH]");
        return 2;
    };
    let new_beer: NewBeer = match serde_json::from_str(raw) {
        Ok(beer) => beer,
        Err(err) => {
            eprintln!("invalid beer json: {err}");
            return 2;
        }
    };
    if new_beer.name_local.trim().is_empty() && new_beer.name_jp.trim().is_empty() {
        eprintln!("name_local or name_jp is required");
        return 2;
    }
    let source = match open_source(args, config) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let cache = CatalogCache::new();
    match add_beer(source.as_ref(), &cache, new_beer) {
        Ok(beer) => {
            println!("added beer {}", beer.record.id);
            0
        }
        Err(err) => {
            eprintln!("add failed: {err}");
            1
        }
    }
}
