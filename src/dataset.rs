//! Synthetic sequencing reads used by tests, benchmarks and the CLI.
//!
//! Reads are sorted by map location, so row groups written from them carry
//! narrow, mostly disjoint `mapLocation` ranges.

use std::sync::Arc;

use colsieve_predicate::{DataType, ScalarValue};

use crate::{
    error::RecordError,
    record::Record,
    schema::{Schema, SchemaRef},
};

/// Column names of the reads table.
pub mod columns {
    /// Unique read id.
    pub const ID: &str = "id";
    /// Nucleotide sequence.
    pub const DNA_STRING: &str = "dnaString";
    /// Sorted position of the read.
    pub const MAP_LOCATION: &str = "mapLocation";
    /// Optional key in `1..300`.
    pub const RANDOM_KEY_1: &str = "randomKey1";
    /// Optional key in `1..200`.
    pub const RANDOM_KEY_2: &str = "randomKey2";
}

const MAX_KEY_1: i64 = 300;
const MAX_KEY_2: i64 = 200;
const MIN_DNA_LEN: usize = 5;
const MAX_DNA_LEN: usize = 20;
const NUCLEOTIDES: &[u8; 4] = b"AGCT";
// Fixed sequences shared by several reads, so equality filters hit more than one row.
const PINNED_DNA: [(usize, &str); 4] = [
    (2, "AGTCACTG"),
    (6, "CTGACTA"),
    (8, "TCAGCTACG"),
    (9, "TCAGCTACG"),
];

/// Schema of the reads table.
#[must_use]
pub fn reads_schema() -> SchemaRef {
    let schema = Schema::builder()
        .required(columns::ID, DataType::Int64)
        .required(columns::DNA_STRING, DataType::Utf8)
        .required(columns::MAP_LOCATION, DataType::Int64)
        .optional(columns::RANDOM_KEY_1, DataType::Int64)
        .optional(columns::RANDOM_KEY_2, DataType::Int64)
        .build();
    match schema {
        Ok(schema) => Arc::new(schema),
        Err(err) => unreachable!("reads schema is statically valid: {err}"),
    }
}

/// Inclusive bounds of generated map locations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapBounds {
    /// Lowest possible location.
    pub low: i64,
    /// Highest possible location.
    pub high: i64,
}

impl MapBounds {
    /// Width of the bounds.
    #[must_use]
    pub fn range(&self) -> i64 {
        self.high - self.low
    }

    /// Exclusive bounds covering the middle half of the locations.
    #[must_use]
    pub fn middle_half(&self) -> (i64, i64) {
        let range = self.range();
        (range / 4 + self.low, range * 3 / 4 + self.low)
    }
}

impl Default for MapBounds {
    fn default() -> Self {
        MapBounds {
            low: -100,
            high: 100,
        }
    }
}

/// Seeded generator of reads.
#[derive(Debug)]
pub struct ReadGenerator {
    rng: fastrand::Rng,
    schema: SchemaRef,
    bounds: MapBounds,
    null_percent: u8,
}

impl ReadGenerator {
    /// Generator with default bounds and a fifth of the keys absent.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        ReadGenerator {
            rng: fastrand::Rng::with_seed(seed),
            schema: reads_schema(),
            bounds: MapBounds::default(),
            null_percent: 20,
        }
    }

    /// Draw map locations from `low..=high`; the bounds are reordered if needed.
    #[must_use]
    pub fn map_bounds(self, low: i64, high: i64) -> Self {
        ReadGenerator {
            bounds: MapBounds {
                low: low.min(high),
                high: low.max(high),
            },
            ..self
        }
    }

    /// Percentage of absent random keys, clamped to 100.
    #[must_use]
    pub fn null_percent(self, null_percent: u8) -> Self {
        ReadGenerator {
            null_percent: null_percent.min(100),
            ..self
        }
    }

    /// Schema of the generated records.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Location bounds in effect.
    #[must_use]
    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    /// Generate `count` reads ordered by map location.
    ///
    /// Ids interleave ascending odd numbers with descending even ones.
    pub fn generate(&mut self, count: usize) -> Result<Vec<Record>, RecordError> {
        let mut locations: Vec<i64> = (0..count)
            .map(|_| self.rng.i64(self.bounds.low..=self.bounds.high))
            .collect();
        locations.sort_unstable();

        let mut ascending = 1_i64;
        let mut descending = 2 * count as i64;
        let mut reads = Vec::with_capacity(count);
        for (position, location) in locations.into_iter().enumerate() {
            let id = if position % 2 == 0 {
                ascending += 2;
                ascending - 2
            } else {
                descending -= 2;
                descending + 2
            };
            let dna = match PINNED_DNA.iter().find(|(index, _)| *index == position) {
                Some((_, pinned)) => (*pinned).to_owned(),
                None => self.dna(),
            };
            let key1 = self.key(MAX_KEY_1);
            let key2 = self.key(MAX_KEY_2);
            let values: Vec<ScalarValue> = vec![
                id.into(),
                dna.into(),
                location.into(),
                key1.into(),
                key2.into(),
            ];
            reads.push(Record::try_new(Arc::clone(&self.schema), values)?);
        }
        Ok(reads)
    }

    fn dna(&mut self) -> String {
        let len = self.rng.usize(MIN_DNA_LEN..MAX_DNA_LEN);
        (0..len)
            .map(|_| NUCLEOTIDES[self.rng.usize(..NUCLEOTIDES.len())] as char)
            .collect()
    }

    fn key(&mut self, max: i64) -> Option<i64> {
        if self.rng.u8(..100) < self.null_percent {
            None
        } else {
            Some(self.rng.i64(1..max))
        }
    }
}
