//! Sensor Sets and Column Naming
//!
//! Sensor indices are 1-based, matching the C-MAPSS documentation (`s_1`..`s_21`).

/// Operational settings per reading
pub const SETTING_COUNT: usize = 3;

/// Sensor channels per reading
pub const SENSOR_COUNT: usize = 21;

/// Whitespace-separated fields per raw log line (unit, cycle, settings, sensors)
pub const FIELDS_PER_LINE: usize = 2 + SETTING_COUNT + SENSOR_COUNT;

/// Sensors with zero variance across the FD001 training set
pub const CONSTANT_SENSORS: [usize; 6] = [1, 5, 10, 16, 18, 19];

/// Informative sensors that rolling and normalization features derive from
pub const KEY_SENSORS: [usize; 14] = [2, 3, 4, 7, 8, 9, 11, 12, 13, 14, 15, 17, 20, 21];

/// Whether a sensor is globally excluded
pub fn is_constant(index: usize) -> bool {
    CONSTANT_SENSORS.contains(&index)
}

/// Whether a sensor carries derived features
pub fn is_key(index: usize) -> bool {
    KEY_SENSORS.contains(&index) && !is_constant(index)
}

/// Column name for a sensor, e.g. `s_4`
pub fn sensor_name(index: usize) -> String {
    format!("s_{index}")
}

/// Column name for an operational setting, e.g. `setting_2`
pub fn setting_name(index: usize) -> String {
    format!("setting_{index}")
}

/// Parse `s_{n}` back into a sensor index
pub fn parse_sensor_name(name: &str) -> Option<usize> {
    let index: usize = name.strip_prefix("s_")?.parse().ok()?;
    (1..=SENSOR_COUNT).contains(&index).then_some(index)
}

/// Parse `setting_{n}` back into a setting index
pub fn parse_setting_name(name: &str) -> Option<usize> {
    let index: usize = name.strip_prefix("setting_")?.parse().ok()?;
    (1..=SETTING_COUNT).contains(&index).then_some(index)
}

/// Sensors kept after constant pruning, in index order
pub fn retained_sensors() -> impl Iterator<Item = usize> {
    (1..=SENSOR_COUNT).filter(|&i| !is_constant(i))
}

/// Fields of a raw snapshot: every setting plus every non-constant sensor
pub fn snapshot_fields() -> Vec<String> {
    (1..=SETTING_COUNT)
        .map(setting_name)
        .chain(retained_sensors().map(sensor_name))
        .collect()
}

/// Canonical column names of a raw log line
pub fn column_names() -> Vec<String> {
    let mut names = vec!["unit_nr".to_string(), "time_cycles".to_string()];
    names.extend((1..=SETTING_COUNT).map(setting_name));
    names.extend((1..=SENSOR_COUNT).map(sensor_name));
    names
}
