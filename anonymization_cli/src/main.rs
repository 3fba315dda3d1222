//
// Copyright 2026 The Project Oak Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use std::{fs, path::PathBuf};

use anonymization::{
    aggregate::{ContributionBounds, PrivateAggregator},
    AnonymizationConfig, Anonymizer, Pseudonymizer, Record,
};
use anyhow::Context;
use clap::Parser;
use differential_privacy::{budget::PrivacyBudgetLedger, noise::laplace_noise::Laplace};
use log::info;
use serde_json::json;

#[derive(clap::Subcommand, Clone, Debug, PartialEq)]
enum Command {
    /// Pseudonymize and k-anonymize a JSON array of records
    Anonymize {
        /// Path to an anonymization config in JSON format.
        #[arg(long, value_parser = path_exists)]
        config: PathBuf,
        /// Path to a JSON array of records.
        #[arg(long, value_parser = path_exists)]
        input: PathBuf,
        /// Where to write the released records. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a pseudonym for each identifier, using salts that live for this process only
    Pseudonymize {
        #[arg(long)]
        purpose: String,
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
    /// Release a noised count, or a noised bounded sum of one field
    Aggregate {
        /// Path to a JSON array of records.
        #[arg(long, value_parser = path_exists)]
        input: PathBuf,
        #[arg(long)]
        total_epsilon: f64,
        /// Epsilon to spend on this query.
        #[arg(long)]
        epsilon: f64,
        /// Integer field to sum. Counts records if absent.
        #[arg(long, requires_all = ["lower", "upper"])]
        field: Option<String>,
        /// Lower clamping bound of each contribution to the sum.
        #[arg(long, requires = "field", allow_hyphen_values = true)]
        lower: Option<f64>,
        /// Upper clamping bound of each contribution to the sum.
        #[arg(long, requires = "field", allow_hyphen_values = true)]
        upper: Option<f64>,
    },
}

#[derive(Parser, Debug)]
#[command(about = "Privacy-preserving anonymization of record batches")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

fn path_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.exists() {
        Err(format!("path does not exist: {}", s))
    } else {
        Ok(path)
    }
}

fn read_records(path: &PathBuf) -> anyhow::Result<Vec<Record>> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("couldn't read records from {}", path.display()))?;
    serde_json::from_str(&input).context("couldn't parse records")
}

fn anonymize(config: PathBuf, input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let config: AnonymizationConfig = serde_json::from_str(
        &fs::read_to_string(&config)
            .with_context(|| format!("couldn't read config from {}", config.display()))?,
    )
    .context("couldn't parse config")?;
    let records = read_records(&input)?;

    let anonymizer =
        Anonymizer::new(config, Pseudonymizer::new()).context("invalid anonymization config")?;
    let dataset = anonymizer.run(&records).context("couldn't anonymize records")?;
    info!("anonymization summary: {:?}", dataset.summary);
    let summary = serde_json::to_string(&dataset.summary).context("couldn't encode summary")?;

    let released = serde_json::to_string_pretty(&dataset.into_records())
        .context("couldn't encode released records")?;
    match output {
        Some(output) => {
            fs::write(&output, released)
                .with_context(|| format!("couldn't write records to {}", output.display()))?;
            println!("{}", summary);
        }
        None => {
            println!("{}", released);
            eprintln!("{}", summary);
        }
    }
    Ok(())
}

fn pseudonymize(purpose: &str, identifiers: &[String]) -> anyhow::Result<()> {
    let pseudonymizer = Pseudonymizer::new();
    for identifier in identifiers {
        let token = pseudonymizer
            .pseudonymize(identifier, purpose)
            .context("couldn't pseudonymize identifier")?;
        println!("{}", token);
    }
    Ok(())
}

fn aggregate(
    input: PathBuf,
    total_epsilon: f64,
    epsilon: f64,
    sum_over: Option<(String, ContributionBounds)>,
) -> anyhow::Result<()> {
    let records = read_records(&input)?;
    let ledger = PrivacyBudgetLedger::new(total_epsilon).context("invalid privacy budget")?;
    let noise = Laplace::new().context("couldn't seed noise source")?;
    let mut aggregator = PrivateAggregator::new(&ledger, noise);

    let (query, value) = match sum_over {
        Some((field, bounds)) => {
            let query = format!("sum({})", field);
            let value = aggregator.sum(&query, &records, &field, bounds, epsilon);
            (query, value)
        }
        None => {
            let query = "count".to_string();
            let value = aggregator.count(&query, &records, epsilon);
            (query, value)
        }
    };
    let value = value.with_context(|| format!("couldn't answer {}", query))?;

    let report = json!({
        "query": query,
        "value": value,
        "budget": ledger.status(),
        "allocations": ledger.allocations(),
    });
    println!("{}", serde_json::to_string_pretty(&report).context("couldn't encode report")?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let Args { command } = Args::parse();

    match command {
        Command::Anonymize { config, input, output } => anonymize(config, input, output),
        Command::Pseudonymize { purpose, identifiers } => pseudonymize(&purpose, &identifiers),
        Command::Aggregate { input, total_epsilon, epsilon, field, lower, upper } => {
            let sum_over = match (field, lower, upper) {
                (Some(field), Some(lower), Some(upper)) => Some((
                    field,
                    ContributionBounds::new(lower, upper).context("invalid contribution bounds")?,
                )),
                _ => None,
            };
            aggregate(input, total_epsilon, epsilon, sum_over)
        }
    }
}
