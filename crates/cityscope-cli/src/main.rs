// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cityscope_core::config::ExplorerConfig;
use cityscope_core::display::{flag_emoji, format_coordinates, format_population};
use cityscope_core::filter::filter_groups;
use cityscope_core::geonames::Generator;
use cityscope_core::{links, wiki, Dataset, MarkerId};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// City dataset to use instead of the built-in one
    #[arg(short, long, env = "CITYSCOPE_DATASET")]
    dataset: Option<PathBuf>,

    /// Print debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a dataset from the GeoNames dumps
    Generate {
        /// Where the GeoNames downloads are kept between runs
        #[arg(long)]
        work_dir: Option<PathBuf>,
        #[arg(short, long, default_value = "cities.json")]
        output: PathBuf,
    },
    /// List countries with their city counts
    List,
    /// Search countries and cities (case-insensitive substring)
    Search { query: String },
    /// Show one city and its reference links
    Show {
        iso: String,
        city: String,
        /// Also look up the Wikipedia photo URL
        #[arg(long)]
        image: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("cityscope")
        .build();
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ExplorerConfig::load();

    if let Commands::Generate { work_dir, output } = &cli.command {
        let work_dir = work_dir
            .clone()
            .unwrap_or_else(|| cityscope_core::get_config_root().join("geonames"));
        let client = wiki::build_blocking_client(&config)?;

        println!("Generating dataset in {:?}", work_dir);
        let dataset = Generator::new(work_dir, client)
            .run()
            .context("Dataset generation failed")?;
        dataset
            .save(output)
            .with_context(|| format!("Could not write {:?}", output))?;
        println!(
            "Wrote {} countries / {} cities to {:?}",
            dataset.groups.len(),
            dataset.city_count(),
            output
        );
        return Ok(());
    }

    let override_path = cli.dataset.as_deref().or(config.dataset_path.as_deref());
    let dataset = Dataset::load_or_embedded(override_path).context("Could not load dataset")?;

    match &cli.command {
        Commands::Generate { .. } => {}
        Commands::List => {
            for group in &dataset.groups {
                println!(
                    "{} {} ({}) - {} cities",
                    flag_emoji(&group.iso2),
                    group.name,
                    group.iso2,
                    group.cities.len()
                );
            }
        }
        Commands::Search { query } => {
            let results = filter_groups(&dataset, query);
            if results.is_empty() {
                println!("No countries or cities match '{}'", query);
            }
            for fg in results {
                println!("{} {}", flag_emoji(&fg.group.iso2), fg.group.name);
                for city in fg.cities {
                    println!("    {}", city.name);
                }
            }
        }
        Commands::Show { iso, city, image } => {
            let id = MarkerId::new(&iso.to_ascii_uppercase(), city);
            let (group, city) = dataset.city(&id)?;

            println!("{} {}, {}", flag_emoji(&group.iso2), city.name, group.name);
            println!("Population:  {}", format_population(city.population));
            println!("Coordinates: {}", format_coordinates(city.lat, city.lon));
            for link in links::all(city) {
                println!("{:<12} {}", format!("{}:", link.label), link.url);
            }

            if *image {
                let client = wiki::build_blocking_client(&config)?;
                match wiki::fetch_image_url_blocking(&client, &config, city)
                    .context("Image lookup failed")?
                {
                    Some(url) => println!("Image:       {}", url),
                    None => println!("Image:       (none)"),
                }
            }
        }
    }

    Ok(())
}
