use af_analysis::{
    AnalysisConfig, AnalysisResult, EdgeQuery, ProfileRow, assess_all, assess_node, basic_quality,
    edge_concentrations, edge_time_series, profile_at_end, profile_at_time, quality_report,
};
use af_core::TimeSlider;
use af_results::{LoadedJob, ModelType, load_job_file, payload_fingerprint, plottable_variables};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "af-cli")]
#[command(about = "asmflow CLI - analyze activated-sludge simulation results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct JobArgs {
    /// Path to the job result JSON file
    job_path: PathBuf,
    /// Model family (asm1, asm1slim, asm3, udm); overrides the config
    #[arg(long)]
    model: Option<ModelType>,
    /// Analysis config (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a job result and print its shape
    Validate {
        #[command(flatten)]
        job: JobArgs,
    },
    /// Report data quality issues
    Quality {
        #[command(flatten)]
        job: JobArgs,
        /// Print the per-node report as JSON
        #[arg(long)]
        detailed: bool,
    },
    /// Steady-state verdicts per node and variable
    Steady {
        #[command(flatten)]
        job: JobArgs,
        /// Restrict to one node id
        #[arg(long)]
        node: Option<String>,
        /// Tail fraction used for the slope fit
        #[arg(long)]
        tail_ratio: Option<f64>,
    },
    /// Edge values at one time index
    Edges {
        #[command(flatten)]
        job: JobArgs,
        /// Time index (normalized into range)
        #[arg(long, allow_negative_numbers = true)]
        time_index: Option<f64>,
        /// Variables to propagate (defaults to every plottable variable)
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,
        /// Restrict to these edge ids
        #[arg(long = "edge", value_delimiter = ',')]
        edges: Vec<String>,
    },
    /// Edge values over a time-index range, as CSV
    EdgeSeries {
        #[command(flatten)]
        job: JobArgs,
        #[arg(long, allow_negative_numbers = true)]
        from: f64,
        #[arg(long, allow_negative_numbers = true)]
        to: f64,
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,
        #[arg(long = "edge", value_delimiter = ',')]
        edges: Vec<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Spatial profile across nodes
    Profile {
        #[command(flatten)]
        job: JobArgs,
        /// Node labels, in profile order
        #[arg(long, value_delimiter = ',', required = true)]
        nodes: Vec<String>,
        #[arg(long, value_delimiter = ',', required = true)]
        variables: Vec<String>,
        /// Time index; final values when omitted
        #[arg(long, allow_negative_numbers = true)]
        time_index: Option<f64>,
    },
}

fn main() -> AnalysisResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { job } => cmd_validate(&job),
        Commands::Quality { job, detailed } => cmd_quality(&job, detailed),
        Commands::Steady {
            job,
            node,
            tail_ratio,
        } => cmd_steady(&job, node.as_deref(), tail_ratio),
        Commands::Edges {
            job,
            time_index,
            variables,
            edges,
        } => cmd_edges(&job, time_index, variables, &edges),
        Commands::EdgeSeries {
            job,
            from,
            to,
            variables,
            edges,
            output,
        } => cmd_edge_series(&job, (from, to), variables, &edges, output.as_deref()),
        Commands::Profile {
            job,
            nodes,
            variables,
            time_index,
        } => cmd_profile(&job, &nodes, &variables, time_index),
    }
}

/// Load the config (or defaults) and the job, with `--model` taking precedence.
fn load(args: &JobArgs) -> AnalysisResult<(AnalysisConfig, LoadedJob)> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(model) = args.model {
        config.model = model;
    }
    tracing::info!(job = %args.job_path.display(), model = %config.model, "loading job");
    let job = load_job_file(&args.job_path, config.model)?;
    Ok((config, job))
}

fn variables_or_default(job: &LoadedJob, variables: Vec<String>) -> Vec<String> {
    if !variables.is_empty() {
        return variables;
    }
    plottable_variables(&job.result, job.model)
        .into_iter()
        .map(|v| v.name)
        .collect()
}

fn fmt_value(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.6}")
    } else {
        "n/a".to_string()
    }
}

fn cmd_validate(args: &JobArgs) -> AnalysisResult<()> {
    let (_, job) = load(args)?;
    let rd = &job.result;
    println!("✓ {} result is valid", job.model.display_name());
    println!("  Time points: {}", rd.len());
    println!("  Nodes: {}", rd.node_data.len());
    println!("  Edges: {}", rd.payload_edges().len());
    println!("  Fingerprint: {}", payload_fingerprint(rd));

    let misaligned = rd.misaligned_series();
    if !misaligned.is_empty() {
        println!("  Series not aligned with the time axis:");
        for (node_id, variable) in misaligned {
            println!("    - {node_id} {variable}");
        }
    }
    Ok(())
}

fn cmd_quality(args: &JobArgs, detailed: bool) -> AnalysisResult<()> {
    let (config, job) = load(args)?;

    if detailed {
        let report = quality_report(&job.result, config.model);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let issues = basic_quality(&job.result, config.model);
    if issues.is_empty() {
        println!("✓ No data quality issues");
    } else {
        println!("Data quality issues:");
        for issue in issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}

fn cmd_steady(args: &JobArgs, node: Option<&str>, tail_ratio: Option<f64>) -> AnalysisResult<()> {
    let (config, job) = load(args)?;
    let tail_ratio = tail_ratio.unwrap_or(config.tail_ratio);

    let verdicts: Vec<(String, Vec<_>)> = match node {
        Some(id) => {
            let variables = variables_or_default(&job, Vec::new());
            vec![(id.to_string(), assess_node(&job.result, id, &variables, tail_ratio)?)]
        }
        None => assess_all(&job.result, config.model, tail_ratio)?
            .into_iter()
            .collect(),
    };

    println!("node,variable,t95,t95_time,relative_slope,status");
    for (node_id, rows) in verdicts {
        for v in rows {
            println!(
                "{},{},{},{},{},{}",
                node_id,
                v.variable,
                v.t95.map_or_else(|| "-".to_string(), |i| i.to_string()),
                v.t95_time.map_or_else(|| "-".to_string(), fmt_value),
                fmt_value(v.relative_slope),
                v.status.map_or("-", |s| s.as_str()),
            );
        }
    }
    Ok(())
}

fn cmd_edges(
    args: &JobArgs,
    time_index: Option<f64>,
    variables: Vec<String>,
    selected: &[String],
) -> AnalysisResult<()> {
    let (config, job) = load(args)?;
    let variables = variables_or_default(&job, variables);
    let slider = TimeSlider::for_len(job.result.len());
    let index = time_index.map_or(slider.default_index(), |raw| slider.index(raw));

    let query = config.edge_query(&variables, selected);
    let rows = edge_concentrations(&job.result, &config.edge_params, &query, index);

    println!("Edges at time index {index}:");
    if rows.is_empty() {
        println!("  (none)");
    }
    for row in rows {
        println!("  {} [{}]", row.edge_label, row.edge_id);
        for (var, value) in &row.values {
            println!("    {var}: {}", fmt_value(*value));
        }
    }
    Ok(())
}

fn cmd_edge_series(
    args: &JobArgs,
    range: (f64, f64),
    variables: Vec<String>,
    selected: &[String],
    output: Option<&Path>,
) -> AnalysisResult<()> {
    let (config, job) = load(args)?;
    let variables = variables_or_default(&job, variables);
    let query: EdgeQuery<'_> = config.edge_query(&variables, selected);
    let series = edge_time_series(
        &job.result,
        &config.edge_params,
        &query,
        range,
        config.min_separation,
    );

    let mut csv = format!("edge_id,time,{}\n", variables.join(","));
    for edge in &series {
        for (k, t) in edge.times.iter().enumerate() {
            let values: Vec<String> = variables
                .iter()
                .map(|v| edge.values.get(v).map_or(String::new(), |s| s[k].to_string()))
                .collect();
            csv.push_str(&format!("{},{},{}\n", edge.edge_id, t, values.join(",")));
        }
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!("✓ Exported {} edge series to {}", series.len(), path.display());
    } else {
        print!("{csv}");
    }
    Ok(())
}

fn cmd_profile(
    args: &JobArgs,
    nodes: &[String],
    variables: &[String],
    time_index: Option<f64>,
) -> AnalysisResult<()> {
    let (_, job) = load(args)?;

    let rows: Vec<ProfileRow> = match time_index {
        Some(raw) => {
            let index = TimeSlider::for_len(job.result.len()).index(raw);
            println!("Profile at time index {index}:");
            profile_at_time(&job.result, nodes, variables, index)
        }
        None => {
            println!("Profile at end of run:");
            profile_at_end(&job.result, nodes, variables)
        }
    };

    for row in rows {
        let cells: Vec<String> = variables
            .iter()
            .map(|v| {
                let value = row.values.get(v).copied().flatten();
                format!("{v}={}", value.map_or_else(|| "-".to_string(), fmt_value))
            })
            .collect();
        println!("  {}: {}", row.node, cells.join(", "));
    }
    Ok(())
}
