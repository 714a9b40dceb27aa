use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use ts_animation::{AnimationAdapter, HeadlessEngine};
use ts_app::{
    Announcer, AppConfig, AppError, AppResult, EMPTY_TABLE_TEXT, GENERIC_DESCRIPTION, InputError,
    LiveRegion, RunError, Session, TRAILING_ROW_TEXT, header_cells,
};
use ts_catalog::{Catalog, SimulationDescriptor};
use ts_core::{InputValueSet, Millis, TrialId, format_number};

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(about = "trialscope CLI - run catalog simulations without a window", long_about = None)]
struct Cli {
    /// Application config file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Catalog file (YAML or JSON); overrides the config
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List simulations in the catalog
    Simulations,
    /// Validate a catalog file
    Validate {
        /// Path to the catalog file
        catalog_path: PathBuf,
    },
    /// Show the precomputed outputs for a set of inputs
    Lookup {
        simulation_id: String,
        /// Inputs as key=value
        inputs: Vec<String>,
    },
    /// Show the animation description for a set of inputs
    Describe {
        simulation_id: String,
        /// Inputs as key=value
        inputs: Vec<String>,
    },
    /// Drive a session on a virtual clock and print the resulting table
    Session {
        simulation_id: String,
        /// One trial per flag, inputs as "key=value,key=value"
        #[arg(long = "run")]
        runs: Vec<String>,
        /// Trial ids to delete after the runs
        #[arg(long = "delete")]
        deletes: Vec<u32>,
        /// Behave as if the animation failed to load
        #[arg(long)]
        no_animation: bool,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Simulations => cmd_simulations(&load_catalog(&config, cli.catalog.as_deref())?),
        Commands::Validate { catalog_path } => cmd_validate(&catalog_path),
        Commands::Lookup {
            simulation_id,
            inputs,
        } => {
            let catalog = load_catalog(&config, cli.catalog.as_deref())?;
            cmd_lookup(&catalog, &simulation_id, &inputs)
        }
        Commands::Describe {
            simulation_id,
            inputs,
        } => {
            let catalog = load_catalog(&config, cli.catalog.as_deref())?;
            cmd_describe(&catalog, &simulation_id, &inputs)
        }
        Commands::Session {
            simulation_id,
            runs,
            deletes,
            no_animation,
        } => {
            let catalog = load_catalog(&config, cli.catalog.as_deref())?;
            cmd_session(catalog, &config, &simulation_id, &runs, &deletes, no_animation)
        }
    }
}

fn load_catalog(config: &AppConfig, override_path: Option<&Path>) -> AppResult<Catalog> {
    match override_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading catalog from command line");
            Ok(ts_catalog::load_path(path)?)
        }
        None => config.load_catalog(),
    }
}

fn simulation<'a>(catalog: &'a Catalog, id: &str) -> AppResult<&'a SimulationDescriptor> {
    catalog
        .get_simulation(id)
        .ok_or_else(|| AppError::Run(RunError::SimulationNotFound(id.to_string())))
}

/// Parse `key=value` pairs against the simulation's inputs.
fn parse_inputs<'a, I>(simulation: &SimulationDescriptor, pairs: I) -> AppResult<InputValueSet>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut values = InputValueSet::new();
    for pair in pairs {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, raw) = pair.split_once('=').ok_or_else(|| {
            AppError::InvalidInput(format!("expected key=value, got '{}'", pair))
        })?;
        let input = simulation
            .input(key.trim())
            .ok_or_else(|| InputError::UnknownInput {
                id: key.trim().to_string(),
            })?;
        values.set(input.id.clone(), input.parse_value(raw));
    }
    Ok(values)
}

fn cmd_simulations(catalog: &Catalog) -> AppResult<()> {
    let simulations = catalog.list_simulations();
    if simulations.is_empty() {
        println!("No simulations found in catalog");
        return Ok(());
    }
    println!("Simulations:");
    for sim in simulations {
        println!(
            "  {} - {} ({} inputs, {} outputs, max {} trials)",
            sim.id,
            sim.name,
            sim.inputs.len(),
            sim.outputs.len(),
            sim.max_trials
        );
        for input in &sim.inputs {
            let detail = match input.options() {
                Some(options) => options.join(" | "),
                None => input.control.label().to_string(),
            };
            println!("      {:<20} {}", input.id, detail);
        }
    }
    Ok(())
}

fn cmd_validate(catalog_path: &Path) -> AppResult<()> {
    println!("Validating catalog: {}", catalog_path.display());
    let catalog = ts_catalog::load_path(catalog_path)?;
    println!(
        "✓ Catalog is valid ({} simulations, {} data sets)",
        catalog.simulations.len(),
        catalog.datasets.len()
    );
    Ok(())
}

fn cmd_lookup(catalog: &Catalog, simulation_id: &str, pairs: &[String]) -> AppResult<()> {
    let sim = simulation(catalog, simulation_id)?;
    let inputs = parse_inputs(sim, pairs.iter().map(String::as_str))?;
    let outputs = catalog.lookup_outputs(simulation_id, &inputs);
    if outputs.is_empty() {
        println!("No precomputed result for these inputs");
        return Ok(());
    }
    for output in &sim.outputs {
        if let Some(value) = outputs.get(&output.id) {
            let unit = output.unit.as_deref().unwrap_or("");
            println!("  {:<20} {} {}", output.label, format_number(*value), unit);
        }
    }
    Ok(())
}

fn cmd_describe(catalog: &Catalog, simulation_id: &str, pairs: &[String]) -> AppResult<()> {
    let sim = simulation(catalog, simulation_id)?;
    let inputs = parse_inputs(sim, pairs.iter().map(String::as_str))?;
    let description = catalog
        .lookup_description(simulation_id, &inputs)
        .unwrap_or_else(|| GENERIC_DESCRIPTION.to_string());
    println!("{}", description);
    Ok(())
}

/// Live region that echoes each announcement as it appears.
struct ConsoleAnnouncer {
    region: LiveRegion,
}

impl Announcer for ConsoleAnnouncer {
    fn announce(&mut self, text: &str, now: Millis) {
        self.region.announce(text, now);
    }

    fn tick(&mut self, now: Millis) {
        let was_empty = self.region.content().is_empty();
        self.region.tick(now);
        if was_empty && !self.region.content().is_empty() {
            println!("  [{:>6} ms] announce: {}", now, self.region.content());
        }
    }

    fn next_due(&self) -> Option<Millis> {
        self.region.next_due()
    }
}

/// Advance through every pending timer. Returns the final clock value.
fn settle(session: &mut Session<ConsoleAnnouncer>, mut now: Millis) -> Millis {
    while let Some(due) = session.next_due() {
        now = now.max(due);
        session.tick(now);
    }
    now
}

fn cmd_session(
    catalog: Catalog,
    config: &AppConfig,
    simulation_id: &str,
    runs: &[String],
    deletes: &[u32],
    no_animation: bool,
) -> AppResult<()> {
    let sim = simulation(&catalog, simulation_id)?.clone();
    let engine = if no_animation {
        HeadlessEngine::failing("animation disabled")
    } else {
        HeadlessEngine::for_simulation(&sim)
    };
    let announcer = ConsoleAnnouncer {
        region: LiveRegion::new(config.timing.announce_clear_ms),
    };
    let mut session = Session::new(
        catalog,
        AnimationAdapter::new(Box::new(engine)),
        announcer,
        config.timing.clone(),
        Some(simulation_id),
    );
    println!(
        "Session: {} (animation: {:?})",
        sim.name,
        session.orchestrator().adapter().status()
    );

    let mut now: Millis = 0;
    for run in runs {
        let inputs = parse_inputs(&sim, run.split(','))?;
        for (id, value) in inputs.iter() {
            session.set_input(id, value.clone())?;
        }
        match session.request_run(now) {
            Ok(ticket) => println!(
                "  [{:>6} ms] trial {} requested (row {}, animated: {})",
                now, ticket.trial_id, ticket.row, ticket.animated
            ),
            Err(err) => println!("  [{:>6} ms] run refused: {}", now, err),
        }
        now = settle(&mut session, now);
    }

    for &id in deletes {
        let Ok(trial_id) = TrialId::new(id) else {
            println!("  [{:>6} ms] {} is not a trial id", now, id);
            continue;
        };
        if session.request_delete(trial_id, None, None, now) {
            now = settle(&mut session, now);
            println!("  [{:>6} ms] trial {} deleted", now, trial_id);
        } else {
            println!("  [{:>6} ms] trial {} could not be deleted", now, trial_id);
        }
    }

    print_table(&session, &sim);
    Ok(())
}

fn print_table(session: &Session<ConsoleAnnouncer>, sim: &SimulationDescriptor) {
    let trials = session.orchestrator().trials();
    let mut header = header_cells(sim);
    header.pop();
    let rows: Vec<Vec<String>> = trials.iter().map(|t| t.row_cells(sim)).collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|r| r[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("\n{}", line(&header));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    if rows.is_empty() {
        println!("{}", EMPTY_TABLE_TEXT);
        return;
    }
    for row in &rows {
        println!("{}", line(row));
    }
    if trials.len() < sim.max_trials as usize {
        println!("{}", TRAILING_ROW_TEXT);
    }
}
