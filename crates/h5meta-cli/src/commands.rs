use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use h5meta_container::{ContainerReader, JsonContainerReader};
use h5meta_pipeline::{
    catalog, run_coordinated, run_local, FileStatus, ManifestEntry, Partition, RunSummary,
    ScanConfig, StoreConfig, Worker, DEFAULT_EXTENSIONS,
};
use h5meta_scan::ContainerWalker;
use h5meta_types::{MetadataRecord, NodeRecord};
use tracing::info;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Scan(args) => cmd_scan(args, cli.format),
        Command::Inspect(args) => cmd_inspect(args, cli.format),
        Command::Manifest(args) => cmd_manifest(args, cli.format),
    }
}

fn scan_config(args: &ScanArgs) -> anyhow::Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    if let Some(manifest) = &args.manifest {
        config.manifest = manifest.clone();
    }
    if let Some(source_root) = &args.source_root {
        config.mapping.source_root = source_root.clone();
    }
    if let Some(target_root) = &args.target_root {
        config.mapping.target_root = target_root.clone();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(root) = &args.store_dir {
        config.store = StoreConfig::Directory { root: root.clone() };
    } else if args.memory_store {
        config.store = StoreConfig::Memory;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_scan(args: ScanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = scan_config(&args)?;
    let catalog: Arc<[ManifestEntry]> = catalog::load(&config.manifest)
        .with_context(|| format!("cannot load manifest {}", config.manifest.display()))?
        .into();
    let store = config.open_store().context("cannot open metadata store")?;
    let worker = Worker::new(config.open_reader(), store, config.mapping.clone());

    let summary = match (args.worker_index, args.worker_count) {
        (Some(index), Some(count)) => {
            run_coordinated(&worker, catalog, Partition::new(index, count)?)
        }
        (None, None) => run_local(&worker, catalog, config.workers)?,
        _ => bail!("--worker-index and --worker-count must be given together"),
    };
    info!(run = %summary.run_id, total = summary.total(), "scan complete");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&summary),
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        let status = match report.status {
            FileStatus::Published => report.status.label().green(),
            FileStatus::Partial => report.status.label().yellow(),
            FileStatus::Failed => report.status.label().red(),
        };
        let target = report.target.as_deref().unwrap_or("-");
        println!(
            "  [{}] {:>9}  {} -> {}",
            report.worker,
            status,
            report.source,
            target.cyan()
        );
        if let Some(error) = &report.error {
            println!("      {}", error.dimmed());
        }
    }
    let mark = if summary.is_clean() {
        "✓".green().bold()
    } else {
        "!".yellow().bold()
    };
    println!(
        "{} {} files: {} published, {} partial, {} failed ({} inline failures)",
        mark,
        summary.total().to_string().bold(),
        summary.published.to_string().green(),
        summary.partial.to_string().yellow(),
        summary.failed.to_string().red(),
        summary.inline_failures()
    );
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = args.path.to_string_lossy();
    let container = JsonContainerReader::new()
        .open(&path)
        .with_context(|| format!("cannot open container {path}"))?;
    let record = ContainerWalker::new().walk(container.as_ref())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => print_record(&record),
    }
    Ok(())
}

fn print_record(record: &MetadataRecord) {
    println!("{}", record.source.bold());
    for node in &record.nodes {
        print_node(node);
    }
    println!(
        "{} nodes, {} attributes, {} failures",
        record.len(),
        record.attribute_count(),
        record.failure_count()
    );
}

fn print_node(node: &NodeRecord) {
    let depth = node.path.split('/').filter(|c| !c.is_empty()).count();
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}{} {}", node.path.yellow(), node.kind.to_string().dimmed());
    if let Some(datatype) = &node.datatype {
        line.push_str(&format!(" {datatype}"));
    }
    if let Some(dataspace) = &node.dataspace {
        line.push_str(&format!(" {dataspace}"));
    }
    if let Some(target) = &node.link_target {
        line.push_str(&format!(" -> {}", target.cyan()));
    }
    println!("{line}");

    if let Some(props) = &node.properties {
        let mut parts = vec![format!("layout={}", props.layout.label())];
        if props.chunk.is_some() {
            parts.push(format!("chunk=[{}]", props.chunk_text()));
        }
        if !props.filters.is_empty() {
            parts.push(format!("filters={}", props.filters_text()));
        }
        parts.push(format!("alloc={}", props.alloc_time.label()));
        parts.push(format!("fill={}", props.fill_time.label()));
        parts.push(format!("storage={}", props.storage_size));
        println!("{indent}  {}", parts.join(" ").dimmed());
    }
    for attribute in &node.attributes {
        match &attribute.value {
            Ok(decoded) => println!(
                "{indent}  @{} ({}) = {}",
                attribute.key,
                attribute.datatype,
                decoded.text
            ),
            Err(failure) => println!(
                "{indent}  @{} ({}) {}",
                attribute.key,
                attribute.datatype,
                failure.to_string().red()
            ),
        }
    }
    for failure in &node.failures {
        println!("{indent}  {}", failure.to_string().red());
    }
}

fn cmd_manifest(args: ManifestArgs, format: OutputFormat) -> anyhow::Result<()> {
    let extensions: Vec<&str> = if args.extensions.is_empty() {
        DEFAULT_EXTENSIONS.to_vec()
    } else {
        args.extensions.iter().map(String::as_str).collect()
    };
    let paths = catalog::discover(&args.root, &extensions)?;
    catalog::write_manifest(&args.output, &paths)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&paths)?),
        OutputFormat::Text => println!(
            "{} Wrote {} paths to {}",
            "✓".green().bold(),
            paths.len().to_string().bold(),
            args.output.display()
        ),
    }
    Ok(())
}
