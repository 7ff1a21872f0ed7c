//! Whitespace-Delimited Log Loader

use crate::error::LoadError;
use crate::reading::SensorReading;
use crate::sensors::{FIELDS_PER_LINE, SENSOR_COUNT, SETTING_COUNT};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Loader for headerless C-MAPSS logs (`train_FD001.txt` and friends)
///
/// Loads are all-or-nothing: the first malformed line aborts with its
/// 1-based line number.
#[derive(Debug, Clone)]
pub struct FrameLoader {
    /// Enforce contiguous cycles starting at 1 within each unit
    check_cycles: bool,
}

impl FrameLoader {
    /// Create a loader that enforces the per-unit cycle invariant
    pub fn new() -> Self {
        Self { check_cycles: true }
    }

    /// Skip the per-unit cycle check (for truncated test logs)
    pub fn without_cycle_check(mut self) -> Self {
        self.check_cycles = false;
        self
    }

    /// Load every reading from a file
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Vec<SensorReading>, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let readings = self.load_reader(BufReader::new(file)).map_err(|e| match e {
            LoadError::Io { source, .. } => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        let units: HashSet<u32> = readings.iter().map(|r| r.unit_id).collect();
        info!(
            "Loaded {} rows from {} ({} units)",
            readings.len(),
            path.display(),
            units.len()
        );
        Ok(readings)
    }

    /// Load every reading from an in-memory log
    pub fn load_str(&self, input: &str) -> Result<Vec<SensorReading>, LoadError> {
        self.load_reader(input.as_bytes())
    }

    /// Load every reading from a buffered reader
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<Vec<SensorReading>, LoadError> {
        let mut readings = Vec::new();
        let mut last_cycle: HashMap<u32, u32> = HashMap::new();

        for (idx, bytes) in reader.split(b'\n').enumerate() {
            let line_no = idx + 1;
            let mut bytes = bytes.map_err(|source| LoadError::Io {
                path: Default::default(),
                source,
            })?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            let line = String::from_utf8(bytes)
                .map_err(|_| LoadError::format(line_no, "invalid UTF-8"))?;
            if line.trim().is_empty() {
                continue;
            }

            let reading = parse_line(line_no, &line)?;
            if self.check_cycles {
                let expected = last_cycle.get(&reading.unit_id).map_or(1, |c| c + 1);
                if reading.cycle != expected {
                    return Err(LoadError::format(
                        line_no,
                        format!(
                            "unit {} cycle {} out of sequence (expected {})",
                            reading.unit_id, reading.cycle, expected
                        ),
                    ));
                }
                last_cycle.insert(reading.unit_id, reading.cycle);
            }
            readings.push(reading);
        }

        debug!("Parsed {} readings", readings.len());
        Ok(readings)
    }
}

impl Default for FrameLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one log line into a reading
fn parse_line(line_no: usize, line: &str) -> Result<SensorReading, LoadError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELDS_PER_LINE {
        return Err(LoadError::format(
            line_no,
            format!("expected {} fields, found {}", FIELDS_PER_LINE, fields.len()),
        ));
    }

    let unit_id = parse_index(line_no, "unit_nr", fields[0])?;
    let cycle = parse_index(line_no, "time_cycles", fields[1])?;

    let mut settings = [0.0; SETTING_COUNT];
    for (i, slot) in settings.iter_mut().enumerate() {
        *slot = parse_value(line_no, fields[2 + i])?;
    }

    let mut sensors = [0.0; SENSOR_COUNT];
    for (i, slot) in sensors.iter_mut().enumerate() {
        *slot = parse_value(line_no, fields[2 + SETTING_COUNT + i])?;
    }

    Ok(SensorReading {
        unit_id,
        cycle,
        settings,
        sensors,
    })
}

/// Unit and cycle columns: positive integers, tolerating `12.0` style
fn parse_index(line_no: usize, column: &str, field: &str) -> Result<u32, LoadError> {
    let value = match field.parse::<u32>() {
        Ok(v) => v,
        Err(_) => {
            let f = parse_value(line_no, field)?;
            if f.fract() != 0.0 || f < 0.0 || f > u32::MAX as f64 {
                return Err(LoadError::format(
                    line_no,
                    format!("{column} must be a positive integer, found {field:?}"),
                ));
            }
            f as u32
        }
    };
    if value == 0 {
        return Err(LoadError::format(
            line_no,
            format!("{column} must be a positive integer, found 0"),
        ));
    }
    Ok(value)
}

fn parse_value(line_no: usize, field: &str) -> Result<f64, LoadError> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LoadError::format(
            line_no,
            format!("non-numeric field {field:?}"),
        )),
    }
}
