use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use property_desk::api::{ApiClient, PropertyApi};
use property_desk::config;
use property_desk::inquiry::{InquiryForm, ScheduleBoard};
use property_desk::listing::{Applied, PropertyList};
use property_desk::model::{PropertyRecord, ViewingStatus, PROPERTY_STATUSES, PROPERTY_TYPES};
use property_desk::wizard::{FormDraft, Submitted, Wizard, WizardError, WizardStep};

#[derive(Debug, Parser)]
#[command(author, version, about = "Browse and manage property listings")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List properties matching a filter
    List {
        /// 1-based page to show
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long = "type")]
        property_type: Option<String>,
        #[arg(long)]
        bedrooms: Option<u32>,
        #[arg(long)]
        bathrooms: Option<u32>,
        #[arg(long)]
        min_price: Option<u64>,
        #[arg(long)]
        max_price: Option<u64>,
        /// Required amenity (repeatable)
        #[arg(long = "amenity")]
        amenities: Vec<String>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the amenity catalogue
    Amenities,
    /// Archive a property by id
    Archive { id: String },
    /// Create a property from a JSON draft file
    Create {
        #[arg(long)]
        draft: PathBuf,
    },
    /// Update a property from a JSON record file (must carry its id)
    Edit {
        #[arg(long)]
        record: PathBuf,
    },
    /// Send an inquiry about a property
    Inquire {
        property_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Show viewings scheduled for a day (defaults to today, UTC)
    Schedules {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print an example config file
    ExampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if let Command::ExampleConfig = args.command {
        print!("{}", config::example());
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let api = ApiClient::from_config(&cfg)?;
    info!(base_url = %api.base_url(), "using backend");

    match args.command {
        Command::List {
            page,
            property_type,
            bedrooms,
            bathrooms,
            min_price,
            max_price,
            amenities,
            json,
        } => {
            if let Some(kind) = property_type.as_deref() {
                if !PROPERTY_TYPES.contains(&kind) {
                    warn!(property_type = %kind, "not one of the listed property types");
                }
            }
            let mut list = PropertyList::from_config(&cfg);
            list.update_filter(|c| {
                c.property_type = property_type;
                c.bedrooms = bedrooms;
                c.bathrooms = bathrooms;
                c.min_price = min_price;
                c.max_price = max_price;
            });
            for amenity in &amenities {
                list.toggle_amenity(amenity);
            }
            let ticket = list.commit_filter();
            let (catalogue, applied) = futures::join!(api.amenities(), list.fetch(&api, ticket));
            if let Ok(catalogue) = catalogue {
                for unknown in amenities.iter().filter(|a| !catalogue.iter().any(|c| c == *a)) {
                    warn!(amenity = %unknown, "amenity is not in the backend catalogue");
                }
            }
            ensure_loaded(applied)?;

            if page != 1 {
                match list.go_to_page(page) {
                    Some(ticket) => ensure_loaded(list.fetch(&api, ticket).await)?,
                    None => warn!(
                        page,
                        page_count = list.pages().page_count(),
                        "page out of range; showing page 1"
                    ),
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(list.records())?);
            } else {
                print_records(&list);
            }
        }
        Command::Amenities => {
            for name in api.amenities().await? {
                println!("{}", name);
            }
        }
        Command::Archive { id } => {
            api.archive_property(&id).await?;
            println!("Archived {}", id);
        }
        Command::Create { draft } => {
            let draft: FormDraft = read_json(&draft).await?;
            let mut wizard = Wizard::new();
            wizard.open(None);
            *wizard.draft_mut()? = draft;
            run_wizard(&mut wizard, &api).await?;
        }
        Command::Edit { record } => {
            let record: PropertyRecord = read_json(&record).await?;
            let mut wizard = Wizard::new();
            wizard.open(Some(&record));
            run_wizard(&mut wizard, &api).await?;
        }
        Command::Inquire {
            property_id,
            name,
            email,
            phone,
            message,
        } => {
            let form = InquiryForm {
                name,
                email,
                phone,
                message,
            };
            form.submit(&api, &property_id).await?;
            println!("Thank you for your inquiry!");
        }
        Command::Schedules { date } => {
            let mut board = match date {
                Some(day) => ScheduleBoard::new(day),
                None => ScheduleBoard::today(),
            };
            board.load(&api).await?;
            print_schedules(&board);
        }
        Command::ExampleConfig => unreachable!("example-config is printed before the config is loaded"),
    }

    Ok(())
}

fn ensure_loaded(applied: Applied) -> Result<()> {
    match applied {
        Applied::Failed(message) => Err(anyhow!("failed to load properties: {}", message)),
        Applied::Cleared => {
            warn!("backend answered with an unexpected shape; no properties shown");
            Ok(())
        }
        Applied::Loaded { .. } | Applied::PageClamped { .. } | Applied::Stale => Ok(()),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Walk the form step by step the way the interactive form does, stopping at
/// the first step that does not validate.
async fn run_wizard(wizard: &mut Wizard, api: &dyn PropertyApi) -> Result<()> {
    if let Some(draft) = wizard.draft() {
        if !PROPERTY_TYPES.contains(&draft.property_type.as_str()) {
            warn!(property_type = %draft.property_type, "not one of the listed property types");
        }
        if !PROPERTY_STATUSES.contains(&draft.status.as_str()) {
            warn!(status = %draft.status, "not one of the listed statuses");
        }
    }
    while wizard.step() != WizardStep::Amenities {
        let step = wizard.step();
        match wizard.advance() {
            Ok(_) => {}
            Err(WizardError::Invalid(errors)) => {
                eprintln!("Step {} ({}) is incomplete:", step.number(), step.title());
                for (field, message) in errors.iter() {
                    eprintln!("  {}: {}", field, message);
                }
                bail!("property form is incomplete");
            }
            Err(err) => return Err(err.into()),
        }
    }

    match wizard.submit(api).await {
        Ok(Submitted::Created(record)) => {
            let id = record.map(|r| r.id).unwrap_or_else(|| "(unknown id)".into());
            println!("Created property {}", id);
            Ok(())
        }
        Ok(Submitted::Updated { id, .. }) => {
            println!("Updated property {}", id);
            Ok(())
        }
        Err(WizardError::Invalid(errors)) => {
            for (step, fields) in errors.by_step() {
                eprintln!("Step {} ({}):", step.number(), step.title());
                for (field, message) in fields {
                    eprintln!("  {}: {}", field, message);
                }
            }
            bail!("property form is invalid")
        }
        Err(err) => Err(err.into()),
    }
}

fn print_records(list: &PropertyList) {
    let records = list.records();
    if records.is_empty() {
        println!("No properties found matching your criteria.");
        return;
    }
    for (i, property) in records.iter().enumerate() {
        println!("{}. {} [{}] {}", i + 1, property.title, property.property_type, property.price);
        println!("   {} bd, {} ba, {} sq ft", property.bedrooms, property.bathrooms, property.area_sq_ft);
        println!("   {}", property.location.one_line());
        if !property.amenities.is_empty() {
            println!("   Amenities: {}", property.amenities.join(", "));
        }
        println!("   ID: {}", property.id);
    }
    let pages = list.pages();
    match pages.total_count() {
        Some(total) => println!(
            "Page {} of {} ({} total)",
            pages.page_index(),
            pages.page_count(),
            total
        ),
        None => println!("{} properties", records.len()),
    }
}

fn print_schedules(board: &ScheduleBoard) {
    let schedules = board.schedules();
    println!(
        "{}: {} viewing{} scheduled",
        board.selected().format("%A, %B %-d, %Y"),
        schedules.len(),
        if schedules.len() == 1 { "" } else { "s" }
    );
    for s in schedules {
        let status = s.viewing_status();
        let marker = match status {
            ViewingStatus::Cancelled => "x",
            ViewingStatus::Completed => "✓",
            _ => "-",
        };
        println!(
            "{} {} {} with {} ({}, {})",
            marker,
            s.viewing_date.format("%H:%M"),
            status.as_str(),
            s.client.full_name,
            s.client.email,
            s.client.phone
        );
        if !s.notes.trim().is_empty() {
            println!("    Notes: {}", s.notes);
        }
    }
}
