use crate::domain::{LiquidusError, LiquidusResult};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Left-aligns `text` in a column of `width` characters.
///
/// Text that fills or overflows the column is followed by one space so that
/// adjacent columns never fuse into a single token.
pub fn left_cell(text: &str, width: usize) -> String {
    if text.chars().count() >= width {
        format!("{text} ")
    } else {
        format!("{text:<width$}")
    }
}

/// Right-aligns `text` in a column of `width` characters, with the same
/// overflow separation rule as [`left_cell`].
pub fn right_cell(text: &str, width: usize) -> String {
    if text.chars().count() >= width {
        format!(" {text}")
    } else {
        format!("{text:>width$}")
    }
}

pub fn read_input_bytes(path: &Path) -> LiquidusResult<Vec<u8>> {
    fs::read(path).map_err(|source| {
        LiquidusError::io_system(
            "IO.INPUT_READ",
            format!("failed to read input '{}': {}", path.display(), source),
        )
    })
}

pub fn create_artifact_writer(path: &Path) -> LiquidusResult<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| {
            LiquidusError::io_system(
                "IO.OUTPUT_DIRECTORY",
                format!(
                    "failed to create output directory '{}': {}",
                    parent.display(),
                    source
                ),
            )
        })?;
    }

    File::create(path).map(BufWriter::new).map_err(|source| {
        LiquidusError::io_system(
            "IO.ARTIFACT_CREATE",
            format!("failed to create artifact '{}': {}", path.display(), source),
        )
    })
}

pub fn artifact_write_error(path: &Path, source: impl std::fmt::Display) -> LiquidusError {
    LiquidusError::io_system(
        "IO.ARTIFACT_WRITE",
        format!("failed to write artifact '{}': {}", path.display(), source),
    )
}

#[cfg(test)]
mod tests {
    use super::{create_artifact_writer, left_cell, read_input_bytes, right_cell};
    use crate::domain::LiquidusErrorCategory;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn cells_pad_to_column_width() {
        assert_eq!(left_cell("Si", 6), "Si    ");
        assert_eq!(right_cell("1.500", 8), "   1.500");
    }

    #[test]
    fn overflowing_cells_keep_a_separator() {
        assert_eq!(left_cell("Ca2Al2SiO7(s)xx", 14), "Ca2Al2SiO7(s)xx ");
        assert_eq!(right_cell("12345678.000", 10), " 12345678.000");
        assert_eq!(right_cell("1234.000", 8), " 1234.000");
    }

    #[test]
    fn artifact_writer_creates_missing_parent_directories() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("nested/out/parsed.txt");

        let mut writer = create_artifact_writer(&path).expect("writer should open");
        writer.write_all(b"line\n").expect("write should succeed");
        writer.flush().expect("flush should succeed");
        drop(writer);

        assert_eq!(fs::read(&path).expect("artifact readable"), b"line\n");
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = read_input_bytes(&temp.path().join("missing.xml"))
            .expect_err("missing input should fail");
        assert_eq!(error.category(), LiquidusErrorCategory::IoSystemError);
        assert_eq!(error.placeholder(), "IO.INPUT_READ");
    }
}
