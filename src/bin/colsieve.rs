//! Command line entrypoint: write synthetic reads tables and run filtered scans.

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context};
use clap::Parser;
use colsieve::{
    and, apply_filter_with, dataset::ReadGenerator, eq, gt, gt_eq, lt, lt_eq, not, not_eq,
    storage::parquet::write_file, user_defined, BlockSource, DataType, ExclusiveRange, Filter,
    FilterOptions, ParquetTable, ParquetWriteOptions, Predicate, ScalarValue, Schema,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "colsieve CLI")]
enum Command {
    /// Write a synthetic reads table to a Parquet file.
    Generate {
        /// Destination file; replaced if it exists.
        #[arg(long)]
        out: PathBuf,
        /// Number of reads.
        #[arg(long, default_value = "10000")]
        rows: usize,
        /// Reads per row group.
        #[arg(long, default_value = "1024")]
        rows_per_block: usize,
        /// Generator seed.
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Percentage of absent random keys.
        #[arg(long, default_value = "20")]
        null_percent: u8,
    },
    /// Scan a Parquet file, printing the records that pass the filter.
    Scan {
        /// File to scan.
        #[arg(long)]
        file: PathBuf,
        /// Clause `COLUMN OP VALUE` with OP one of = != < <= > >=; a leading `!`
        /// negates it and `null` tests presence. Repeated clauses are ANDed.
        #[arg(long = "where")]
        clauses: Vec<String>,
        /// Exclusive range `COLUMN:LOW:HIGH` over an int64 column.
        #[arg(long)]
        range: Option<String>,
        /// Decode every block instead of pruning with statistics.
        #[arg(long)]
        no_prune: bool,
        /// Decide blocks in parallel before decoding.
        #[arg(long)]
        parallel: bool,
        /// Stop after this many records.
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Command::parse() {
        Command::Generate {
            out,
            rows,
            rows_per_block,
            seed,
            null_percent,
        } => {
            let mut generator = ReadGenerator::new(seed).null_percent(null_percent);
            let reads = generator.generate(rows)?;
            let options = ParquetWriteOptions::default().rows_per_block(rows_per_block);
            let blocks = write_file(&out, Arc::clone(generator.schema()), reads, options)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("wrote {rows} reads in {blocks} blocks to {}", out.display());
        }
        Command::Scan {
            file,
            clauses,
            range,
            no_prune,
            parallel,
            limit,
        } => {
            let table = ParquetTable::open(&file)
                .with_context(|| format!("opening {}", file.display()))?;
            let filter = build_filter(table.schema(), &clauses, range.as_deref())?;
            let options = FilterOptions::default()
                .prune_blocks(!no_prune)
                .parallel_pruning(parallel);

            let mut scan = apply_filter_with(&table, filter, options);
            for record in scan.by_ref().take(limit.unwrap_or(usize::MAX)) {
                println!("{}", record?);
            }
            let metrics = scan.metrics();
            println!(
                "blocks: {} total, {} pruned, {} decoded; records: {} decoded, {} kept",
                metrics.blocks_total,
                metrics.blocks_pruned,
                metrics.blocks_decoded,
                metrics.records_decoded,
                metrics.records_kept,
            );
        }
    }

    Ok(())
}

fn build_filter(
    schema: &Schema,
    clauses: &[String],
    range: Option<&str>,
) -> anyhow::Result<Filter> {
    let mut predicates = clauses
        .iter()
        .map(|clause| parse_clause(schema, clause))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if let Some(range) = range {
        predicates.push(parse_range(schema, range)?);
    }
    Ok(predicates.into_iter().reduce(and).into())
}

fn parse_clause(schema: &Schema, clause: &str) -> anyhow::Result<Predicate> {
    let clause = clause.trim();
    let (negated, clause) = match clause.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, clause),
    };
    let mut parts = clause.split_whitespace();
    let (Some(name), Some(op)) = (parts.next(), parts.next()) else {
        bail!("expected `COLUMN OP VALUE`, got `{clause}`");
    };
    let raw = parts.collect::<Vec<_>>().join(" ");
    if raw.is_empty() {
        bail!("missing value in `{clause}`");
    }

    let index = schema
        .index_of(name)
        .with_context(|| format!("unknown column `{name}`"))?;
    let data_type = schema.columns()[index].data_type();
    let column = schema.column(name, data_type)?;
    let value: ScalarValue = match (raw.as_str(), data_type) {
        ("null", _) => ScalarValue::Null,
        (raw, DataType::Int64) => raw
            .parse::<i64>()
            .with_context(|| format!("`{raw}` is not an int64"))?
            .into(),
        (raw, DataType::Utf8) => raw.trim_matches('"').into(),
    };

    let predicate = match op {
        "=" | "==" => eq(&column, value)?,
        "!=" => not_eq(&column, value)?,
        "<" => lt(&column, value)?,
        "<=" => lt_eq(&column, value)?,
        ">" => gt(&column, value)?,
        ">=" => gt_eq(&column, value)?,
        other => bail!("unknown operator `{other}`"),
    };
    Ok(if negated { not(predicate) } else { predicate })
}

fn parse_range(schema: &Schema, range: &str) -> anyhow::Result<Predicate> {
    let mut parts = range.split(':');
    let (Some(name), Some(low), Some(high), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        bail!("expected `COLUMN:LOW:HIGH`, got `{range}`");
    };
    let column = schema.int64_column(name)?;
    let low = low.trim().parse::<i64>().context("range lower bound")?;
    let high = high.trim().parse::<i64>().context("range upper bound")?;
    Ok(user_defined(&column, ExclusiveRange::new(low, high))?)
}

#[cfg(test)]
mod tests {
    use colsieve::dataset::reads_schema;

    use super::*;

    #[test]
    fn parses_clauses() {
        let schema = reads_schema();
        let location = schema.int64_column("mapLocation").expect("column");
        let key = schema.int64_column("randomKey1").expect("column");
        let dna = schema.utf8_column("dnaString").expect("column");

        assert_eq!(
            parse_clause(&schema, "mapLocation > 30").expect("clause"),
            gt(&location, 30_i64).expect("gt")
        );
        assert_eq!(
            parse_clause(&schema, "! randomKey1 = null").expect("clause"),
            not(eq(&key, ScalarValue::Null).expect("eq"))
        );
        assert_eq!(
            parse_clause(&schema, "dnaString = \"XYXYXY\"").expect("clause"),
            eq(&dna, "XYXYXY").expect("eq")
        );
        assert!(parse_clause(&schema, "mapLocation ~ 3").is_err());
        assert!(parse_clause(&schema, "mapLocation >").is_err());
        assert!(parse_clause(&schema, "missing = 1").is_err());
        assert!(parse_clause(&schema, "mapLocation < null").is_err());
    }

    #[test]
    fn combines_clauses_and_range() {
        let schema = reads_schema();
        assert!(build_filter(&schema, &[], None).expect("filter").is_noop());

        let clauses = vec!["mapLocation >= 0".to_owned(), "randomKey1 != null".to_owned()];
        let filter = build_filter(&schema, &clauses, Some("mapLocation:-50:50")).expect("filter");
        let predicate = filter.predicate().expect("predicate");
        assert_eq!(predicate.columns().len(), 2);
        assert!(parse_range(&schema, "mapLocation:1").is_err());
        assert!(parse_range(&schema, "dnaString:1:2").is_err());
    }
}
