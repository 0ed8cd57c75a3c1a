use clap::{Parser, Subcommand};
use pharmabook_core::{
    config::access_token, CatalogService, CoreConfig, EmptyReason, Favorites, FilterState,
    JsonFileStorage, KeyValueStorage, Medication, Session, Tab, ViewModel,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pharmabook")]
#[command(about = "Pharmabook clinical reference catalog CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List body systems with their condition counts
    Systems,
    /// List conditions
    List {
        /// Tab: all, favorites, most-consulted or coming-soon
        #[arg(long, default_value = "all")]
        tab: Tab,
        /// Restrict to one system id
        #[arg(long)]
        system: Option<String>,
        /// Case-insensitive search on name and description
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the full clinical record of a condition
    Show {
        /// Condition id or name
        condition: String,
    },
    /// Toggle a condition as favorite
    Favorite {
        /// Condition id
        id: String,
    },
    /// List favorite condition ids
    Favorites,
}

type CliView = ViewModel<JsonFileStorage>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let lookup = |key: &str| std::env::var(key).ok();
    let cfg = CoreConfig::from_lookup(lookup)?;
    let session = access_token(lookup).and_then(Session::new);
    let mut vm: CliView = ViewModel::new(Favorites::load(JsonFileStorage::new(cfg.data_dir())));

    match cli.command {
        Some(Commands::Systems) => {
            if load(&mut vm, &cfg, session) {
                for system in vm.systems() {
                    println!("{:<20} {} ({})", system.id, system.name, system.count);
                }
            }
        }
        Some(Commands::List {
            tab,
            system,
            search,
        }) => {
            if load(&mut vm, &cfg, session) {
                vm.set_filter(list_filter(tab, system, search));

                for condition in vm.visible_conditions() {
                    let marker = if vm.is_favorite(&condition.id) { "*" } else { " " };
                    println!("{} {:<28} {}", marker, condition.id, condition.name);
                }
                if let Some(reason) = vm.empty_reason() {
                    println!("{}", empty_message(reason));
                }
            }
        }
        Some(Commands::Show { condition }) => {
            if load(&mut vm, &cfg, session) {
                let id = vm
                    .data()
                    .resolve_condition_id(&condition)
                    .map(str::to_string)
                    .unwrap_or(condition);
                let favorite = vm.is_favorite(&id);
                match vm.open_condition(&id) {
                    Ok(detail) => {
                        let star = if favorite { " *" } else { "" };
                        println!("{}{} [{}]", detail.name, star, detail.system);
                        if !detail.definition.is_empty() {
                            println!("\n{}", detail.definition);
                        }
                        print_section("Causes", &detail.causes);
                        print_section("Treatment objectives", &detail.objectives);
                        print_section("Symptoms", &detail.symptoms);
                        print_section("Alert signs", &detail.alert_signs);
                        print_section("Referral criteria", &detail.referral_criteria);
                        let medications: Vec<String> =
                            detail.medications.iter().map(format_medication).collect();
                        print_section("Medications", &medications);
                        print_section("Non-pharmacological measures", &detail.non_pharmacological);
                        print_section("General guidance", &detail.general_guidance);
                    }
                    Err(e) => eprintln!("Error showing condition: {}", e),
                }
            }
        }
        Some(Commands::Favorite { id }) => {
            if load(&mut vm, &cfg, session) {
                match favorite_target(&vm, &id) {
                    Some(id) => match vm.toggle_favorite(&id) {
                        Ok(true) => {
                            println!("Added {} to favorites ({} total)", id, vm.favorite_count())
                        }
                        Ok(false) => println!(
                            "Removed {} from favorites ({} total)",
                            id,
                            vm.favorite_count()
                        ),
                        Err(e) => eprintln!("Error updating favorites: {}", e),
                    },
                    None => eprintln!("Error updating favorites: unknown condition: {}", id),
                }
            }
        }
        Some(Commands::Favorites) => {
            if vm.favorite_count() == 0 {
                println!("No favorites yet.");
            } else {
                for id in vm.favorites().ids() {
                    println!("{}", id);
                }
            }
        }
        None => {
            println!("Use 'pharmabook --help' for commands");
        }
    }

    Ok(())
}

/// Filter for `list`. The tab is kept even when a system is given.
fn list_filter(tab: Tab, system: Option<String>, search: Option<String>) -> FilterState {
    FilterState {
        tab,
        system_filter: system.filter(|s| !s.is_empty()),
        search_term: search.unwrap_or_default(),
    }
}

/// Condition id to toggle for user input.
///
/// Input is resolved against the loaded catalog by id or name. An id that is no longer in the
/// catalog can still be toggled off if it is already a favorite.
fn favorite_target<S: KeyValueStorage>(vm: &ViewModel<S>, input: &str) -> Option<String> {
    match vm.data().resolve_condition_id(input) {
        Some(id) => Some(id.to_string()),
        None if vm.is_favorite(input) => Some(input.to_string()),
        None => None,
    }
}

/// Runs one catalog load into `vm`. Prints the failure and returns `false` if it failed.
fn load(vm: &mut CliView, cfg: &CoreConfig, session: Option<Session>) -> bool {
    let service = match CatalogService::from_config(cfg, session) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error configuring catalog: {}", e);
            return false;
        }
    };

    vm.begin_load();
    vm.apply_load(service.load());
    match vm.take_error() {
        Some(e) => {
            eprintln!("Error loading catalog: {}", e);
            false
        }
        None => true,
    }
}

fn empty_message(reason: EmptyReason) -> &'static str {
    match reason {
        EmptyReason::NoFavorites => "No favorites yet. Use 'pharmabook favorite <id>' to add one.",
        EmptyReason::ComingSoon => "Coming soon.",
        EmptyReason::NoSearchMatches => "No conditions match the search.",
        EmptyReason::NoConditions => "No conditions found.",
    }
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}:", title);
    for item in items {
        println!("  - {}", item);
    }
}

fn format_medication(medication: &Medication) -> String {
    let mut line = medication.name.clone();
    for part in [
        &medication.concentration,
        &medication.posology,
        &medication.duration,
    ]
    .into_iter()
    .flatten()
    {
        line.push_str(" | ");
        line.push_str(part);
    }
    if medication.mip {
        line.push_str(" (MIP)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmabook_core::constants::FAVORITES_STORAGE_KEY;
    use pharmabook_core::{normalize, MemoryStorage, RawCondition, RawSystem};
    use serde_json::json;

    fn loaded_view() -> ViewModel<MemoryStorage> {
        let systems: Vec<RawSystem> = serde_json::from_value(json!([
            { "slug": "respiratorio", "name": "Respiratório", "order_index": 1 },
            { "slug": "digestivo", "name": "Digestivo", "order_index": 2 }
        ]))
        .expect("systems should decode");
        let conditions: Vec<RawCondition> = serde_json::from_value(json!([
            { "slug": "asma", "name": "Asma", "systems": { "slug": "respiratorio", "name": "Respiratório" } },
            { "slug": "azia", "name": "Azia", "systems": { "slug": "digestivo", "name": "Digestivo" } },
            { "slug": "rinite", "name": "Rinite", "systems": { "slug": "respiratorio", "name": "Respiratório" } }
        ]))
        .expect("conditions should decode");

        let mut vm = ViewModel::new(Favorites::load(MemoryStorage::new()));
        vm.apply_load(Ok(normalize(&systems, &conditions)));
        vm
    }

    fn visible_ids(vm: &ViewModel<MemoryStorage>) -> Vec<String> {
        vm.visible_conditions()
            .iter()
            .map(|c| c.id.clone())
            .collect()
    }

    #[test]
    fn test_list_keeps_tab_when_system_is_given() {
        let mut vm = loaded_view();
        vm.toggle_favorite("asma").expect("toggle should succeed");
        vm.toggle_favorite("azia").expect("toggle should succeed");

        let cli = Cli::try_parse_from([
            "pharmabook",
            "list",
            "--tab",
            "favorites",
            "--system",
            "respiratorio",
        ])
        .expect("list should parse");
        let Some(Commands::List {
            tab,
            system,
            search,
        }) = cli.command
        else {
            panic!("expected list command");
        };

        vm.set_filter(list_filter(tab, system, search));
        assert_eq!(visible_ids(&vm), vec!["asma"]);

        vm.set_filter(list_filter(
            Tab::ComingSoon,
            Some("respiratorio".into()),
            None,
        ));
        assert!(visible_ids(&vm).is_empty());
    }

    #[test]
    fn test_favorite_target_resolves_names() {
        let vm = loaded_view();

        assert_eq!(favorite_target(&vm, "Asma"), Some("asma".to_string()));
        assert_eq!(favorite_target(&vm, "rinite"), Some("rinite".to_string()));
        assert_eq!(favorite_target(&vm, "Gripe"), None);
    }

    #[test]
    fn test_favorite_target_allows_removing_stale_ids() {
        let storage = MemoryStorage::new();
        storage
            .set(FAVORITES_STORAGE_KEY, "[\"retirada\"]")
            .expect("set should succeed");
        let mut vm = ViewModel::new(Favorites::load(storage));
        vm.apply_load(Ok(loaded_view().data().clone()));

        assert_eq!(
            favorite_target(&vm, "retirada"),
            Some("retirada".to_string())
        );
    }

    #[test]
    fn test_format_medication_skips_missing_fields() {
        let medication = Medication {
            name: "Loratadina".into(),
            concentration: Some("10 mg".into()),
            posology: None,
            duration: Some("7 dias".into()),
            mip: true,
        };

        assert_eq!(
            format_medication(&medication),
            "Loratadina | 10 mg | 7 dias (MIP)"
        );
    }

    #[test]
    fn test_list_tab_accepts_portuguese_alias() {
        let cli = Cli::try_parse_from(["pharmabook", "list", "--tab", "favoritas"])
            .expect("list should parse");

        match cli.command {
            Some(Commands::List { tab, .. }) => assert_eq!(tab, Tab::Favorites),
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_list_rejects_unknown_tab() {
        assert!(Cli::try_parse_from(["pharmabook", "list", "--tab", "popular"]).is_err());
    }
}
