//! jpt-tools CLI entry point

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use anyhow::Result;

use jpt_tools::config::{self, Config, Layout};
use jpt_tools::regenerate::{CommandRegenerator, Regenerator, SkipRegeneration};
use jpt_tools::unit_tests::{self, TestSubject, UnitTestRequest};
use jpt_tools::{ui, Error};

#[derive(Parser)]
#[command(name = "jpt-tools")]
#[command(about = "🪐 Jupiter engine developer tools")]
#[command(version)]
struct Cli {
    /// Unit-test project root (defaults to the current Scripts folder's parent)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a unit test and register it with its category
    AddUnitTest {
        /// Name of the type under test, e.g. DynamicArray
        #[arg(short, long)]
        subject: Option<String>,

        /// Category relative to the Source folder, e.g. Core/Containers
        #[arg(short, long)]
        category: Option<String>,

        /// Don't regenerate project files afterwards
        #[arg(long)]
        no_regenerate: bool,
    },

    /// Regenerate IDE project files
    Regenerate,

    /// Show the resolved project layout
    Status,

    /// Write a default config file
    Init,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = config::load()?;
    let root = cli.root.as_deref();

    match cli.command.unwrap_or(Commands::AddUnitTest {
        subject: None,
        category: None,
        no_regenerate: false,
    }) {
        Commands::AddUnitTest { subject, category, no_regenerate } => {
            let layout = Layout::resolve(&config, root)?;
            run_add_unit_test(&config, layout, subject, category, no_regenerate)?;
        }

        Commands::Regenerate => {
            let layout = Layout::resolve(&config, root)?;
            let regenerator = CommandRegenerator::from_command(&config.regenerate_command)?;
            ui::print_thinking(&format!("Running {}", regenerator.describe()));
            regenerator.regenerate(&layout.scripts_dir)?;
            ui::print_success("Project files regenerated");
        }

        Commands::Status => {
            println!("🪐 Jupiter Tools Status\n");
            println!("Config: {:?}{}", config::config_path(), if config::config_path().exists() { "" } else { " (defaults)" });
            match Layout::resolve(&config, root) {
                Ok(layout) => {
                    println!("Root: {:?}", layout.root);
                    println!("Source: {:?}", layout.source_dir);
                    println!("Scripts: {:?}", layout.scripts_dir);
                    println!("Aggregation files: {:?}", layout.application_layer_dir);
                    println!("Application: {:?}{}", layout.application_file, if layout.application_file.exists() { "" } else { " (not found)" });
                    println!("Module extension: .{}", layout.module_extension);
                }
                Err(e) => println!("Layout: {}", e),
            }
            println!("Regenerate: {}", config.regenerate_command.join(" "));
        }

        Commands::Init => {
            let path = config::config_path();
            if path.exists() {
                ui::print_step(&format!("Config already exists at {:?}", path));
            } else {
                config::save(&Config::default())?;
                ui::print_success(&format!("Wrote default config to {:?}", path));
            }
        }
    }

    Ok(())
}

fn run_add_unit_test(
    config: &Config,
    layout: Layout,
    subject: Option<String>,
    category: Option<String>,
    no_regenerate: bool,
) -> Result<()> {
    use inquire::Text;

    ui::print_header("Add Unit Test", &layout);

    let name = match subject {
        Some(name) => name,
        None => Text::new("What's the unit test's subject's name?")
            .with_help_message("e.g. DynamicArray")
            .prompt()
            .map_err(Error::from)?,
    };
    let category = match category {
        Some(category) => category,
        None => Text::new("What's the subject's category relative to the Source folder?")
            .with_help_message("e.g. Core/Types, Input/Controllers, System/Timing")
            .prompt()
            .map_err(Error::from)?,
    };

    let request = UnitTestRequest::new(TestSubject::new(&name, &category)?, layout);

    let regenerator: Box<dyn Regenerator> = if no_regenerate {
        Box::new(SkipRegeneration)
    } else {
        let regenerator = CommandRegenerator::from_command(&config.regenerate_command)?;
        ui::print_thinking(&format!("Adding {} and regenerating project files with {}", name.trim(), regenerator.describe()));
        Box::new(regenerator)
    };

    scaffold_and_report(&request, regenerator.as_ref())
}

/// Run the scaffold and print what it changed.
///
/// An existing module ends the run after a single "Quitting" line; other
/// errors are returned and printed once by `main`.
fn scaffold_and_report(request: &UnitTestRequest, regenerator: &dyn Regenerator) -> Result<()> {
    let added = match unit_tests::scaffold(request, regenerator) {
        Ok(added) => added,
        Err(Error::AlreadyExists(path)) => {
            ui::print_error(&format!("{:?} has already been created. Quitting", path));
            return Ok(());
        }
        Err(e @ Error::Collaborator(_)) => {
            ui::print_warning("Unit test files were kept; regenerate the project files manually");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    ui::print_success(&format!("Created {:?}", added.module_path));
    if added.aggregation_created {
        ui::print_step(&format!("Created {:?}", added.aggregation_path));
    }
    if added.lines_inserted > 0 {
        ui::print_step(&format!("Registered in {:?}", added.aggregation_path));
    } else {
        ui::print_warning(&format!("{:?} already listed {}", added.aggregation_path, request.subject.name()));
    }
    if let Some(app) = &added.registered_in {
        ui::print_step(&format!("Added category to {:?}", app));
    }

    Ok(())
}
