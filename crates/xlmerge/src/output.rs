//! Output file naming.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Timelike};

/// File name for a merge finishing at the given time: `merged-HH-MM-SS.xlsx`
pub fn output_file_name(time: DateTime<Local>) -> String {
    format!(
        "merged-{:02}-{:02}-{:02}.xlsx",
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// Full output path for a merge finishing now
pub fn output_path(dir: &Path) -> PathBuf {
    dir.join(output_file_name(Local::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn name_embeds_the_time() {
        let t = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 3).unwrap();
        assert_eq!(output_file_name(t), "merged-09-07-03.xlsx");
    }

    #[test]
    fn path_lands_in_the_given_directory() {
        let p = output_path(Path::new("/tmp/out"));
        assert!(p.starts_with("/tmp/out"));
        let name = p.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("merged-"));
        assert!(name.ends_with(".xlsx"));
    }
}
