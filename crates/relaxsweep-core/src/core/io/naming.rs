//! File and directory names of a sweep manifest.
//!
//! Record names are a delimited token scheme, `a<i>_b<j>.csv`, with indices zero-padded to
//! four digits so that a plain directory listing sorts in row-major order. Parsing splits on
//! the delimiters and never relies on character offsets, so wider indices still round-trip.

use crate::core::models::grid::AxisId;

pub const AXIS_A_FILE: &str = "axis-a.toml";
pub const AXIS_B_FILE: &str = "axis-b.toml";
pub const RECORD_EXTENSION: &str = "csv";

pub fn axis_file_name(axis: AxisId) -> &'static str {
    match axis {
        AxisId::A => AXIS_A_FILE,
        AxisId::B => AXIS_B_FILE,
    }
}

pub fn record_file_name(i: usize, j: usize) -> String {
    format!(
        "{}{:04}_{}{:04}.{}",
        AxisId::A.token(),
        i,
        AxisId::B.token(),
        j,
        RECORD_EXTENSION
    )
}

/// Recovers `(i, j)` from a record file name, or `None` for any other file.
pub fn parse_record_file_name(name: &str) -> Option<(usize, usize)> {
    let stem = name.strip_suffix(RECORD_EXTENSION)?.strip_suffix('.')?;
    let (a_token, b_token) = stem.split_once('_')?;
    let i = parse_index(a_token.strip_prefix(AxisId::A.token())?)?;
    let j = parse_index(b_token.strip_prefix(AxisId::B.token())?)?;
    Some((i, j))
}

pub fn run_dir_name(prefix: &str, run: usize) -> String {
    format!("{prefix}{run}")
}

/// Recovers the run number from a run directory name. Only the canonical spelling is accepted
/// (`run7`, not `run07`), so two directories can never claim the same run number.
pub fn parse_run_dir_name(name: &str, prefix: &str) -> Option<usize> {
    let digits = name.strip_prefix(prefix)?;
    let run = parse_index(digits)?;
    (run_dir_name(prefix, run) == name).then_some(run)
}

fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_names_are_zero_padded_tokens() {
        assert_eq!(record_file_name(7, 2), "a0007_b0002.csv");
        assert_eq!(record_file_name(12345, 0), "a12345_b0000.csv");
    }

    #[test]
    fn record_names_round_trip() {
        for (i, j) in [(0, 0), (80, 11), (9999, 10000)] {
            assert_eq!(parse_record_file_name(&record_file_name(i, j)), Some((i, j)));
        }
    }

    #[test]
    fn foreign_files_are_not_records() {
        for name in [
            AXIS_A_FILE,
            AXIS_B_FILE,
            "a0001_b0002.npy",
            "a0001-b0002.csv",
            "b0001_a0002.csv",
            "a_b0002.csv",
            "a+1_b0002.csv",
            "a0001_b0002_extra.csv",
            ".a0001_b0002.csv.tmp",
        ] {
            assert_eq!(parse_record_file_name(name), None, "{name}");
        }
    }

    #[test]
    fn run_dir_names_round_trip_canonically() {
        assert_eq!(run_dir_name("T1p_5spin_run", 3), "T1p_5spin_run3");
        assert_eq!(parse_run_dir_name("T1p_5spin_run3", "T1p_5spin_run"), Some(3));
        assert_eq!(parse_run_dir_name("T1p_5spin_run03", "T1p_5spin_run"), None);
        assert_eq!(parse_run_dir_name("T1p_5spin_run", "T1p_5spin_run"), None);
        assert_eq!(parse_run_dir_name("other3", "T1p_5spin_run"), None);
    }
}
