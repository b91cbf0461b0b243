//! Sparse coordinate matrix files.
//!
//! The reader accepts the matrix-exchange coordinate layout used by the
//! dataset archives: `%` comments, a `rows cols nvals` header and one
//! `row col [value]` line per entry. `nvals` counts the header itself, so a
//! file declaring `nvals` holds `nvals - 1` entries.

use crate::error::BenchError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Element type of a matrix (and of the dataset built from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Pattern-only entries
    Void,
    Int,
    Float,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Int => "int",
            Self::Float => "float",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Numeric payload of a valued entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    fn parse(token: &str) -> Option<Self> {
        let looks_float = token.contains(['.', 'e', 'E']);
        if !looks_float && let Ok(v) = token.parse::<i64>() {
            return Some(Self::Int(v));
        }
        token.parse::<f64>().ok().map(Self::Float)
    }

    fn value_type(self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            // Debug keeps a '.' or exponent so the value reads back as a float.
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// One coordinate record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    /// 1-based row index.
    pub row: u64,
    /// 1-based column index.
    pub col: u64,
    /// Edge value, `None` for pattern-only entries.
    pub value: Option<Value>,
}

impl Entry {
    pub fn void(row: u64, col: u64) -> Self {
        Self {
            row,
            col,
            value: None,
        }
    }

    pub fn valued(row: u64, col: u64, value: Value) -> Self {
        Self {
            row,
            col,
            value: Some(value),
        }
    }
}

/// Symmetry qualifier from a `%%MatrixMarket` banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symmetry {
    #[default]
    General,
    Symmetric,
    SkewSymmetric,
    Hermitian,
}

impl Symmetry {
    fn from_banner(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if !tokens.next()?.eq_ignore_ascii_case("%%MatrixMarket") {
            return None;
        }
        match tokens.last()?.to_ascii_lowercase().as_str() {
            "symmetric" => Some(Self::Symmetric),
            "skew-symmetric" => Some(Self::SkewSymmetric),
            "hermitian" => Some(Self::Hermitian),
            _ => Some(Self::General),
        }
    }

    fn banner_name(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Symmetric => "symmetric",
            Self::SkewSymmetric => "skew-symmetric",
            Self::Hermitian => "hermitian",
        }
    }
}

/// In-memory triple list.
///
/// All entries share the same arity: either every entry carries a value or
/// none does.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixData {
    /// Declared row count.
    pub rows: u64,
    /// Declared column count.
    pub cols: u64,
    /// Entries in file order.
    pub entries: Vec<Entry>,
    /// Symmetry from the `%%MatrixMarket` banner, `General` without one.
    pub symmetry: Symmetry,
}

impl MatrixData {
    pub fn new(rows: u64, cols: u64, entries: Vec<Entry>) -> Self {
        Self {
            rows,
            cols,
            entries,
            symmetry: Symmetry::General,
        }
    }

    /// Element type, decided by the first entry.
    pub fn value_type(&self) -> ValueType {
        self.entries
            .first()
            .and_then(|e| e.value)
            .map_or(ValueType::Void, Value::value_type)
    }

    pub fn has_values(&self) -> bool {
        self.value_type() != ValueType::Void
    }

    /// Copy of the matrix with every value dropped.
    #[must_use]
    pub fn remove_values(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| Entry::void(e.row, e.col))
                .collect(),
            ..self.clone()
        }
    }

    /// Copy of the matrix with random values of the given type.
    ///
    /// Integers are drawn from `1..=100`, floats from `[0, 1)`. Asking for
    /// [`ValueType::Void`] is the same as [`MatrixData::remove_values`].
    #[must_use]
    pub fn generate_values<R: Rng + ?Sized>(&self, ty: ValueType, rng: &mut R) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|e| match ty {
                ValueType::Void => Entry::void(e.row, e.col),
                ValueType::Int => Entry::valued(e.row, e.col, Value::Int(rng.random_range(1..=100))),
                ValueType::Float => Entry::valued(e.row, e.col, Value::Float(rng.random::<f64>())),
            })
            .collect();
        Self {
            entries,
            ..self.clone()
        }
    }

    /// Whether the matrix describes a directed graph.
    ///
    /// A symmetric banner means undirected; otherwise the graph is undirected
    /// only if every off-diagonal edge has its mirror.
    pub fn is_directed(&self) -> bool {
        if self.symmetry != Symmetry::General {
            return false;
        }
        let edges: HashSet<(u64, u64)> = self.entries.iter().map(|e| (e.row, e.col)).collect();
        edges
            .iter()
            .any(|&(r, c)| r != c && !edges.contains(&(c, r)))
    }
}

fn strip_comment(line: &str) -> &str {
    line.find('%').map_or(line, |idx| &line[..idx]).trim()
}

fn parse_header(path: &Path, line_no: usize, line: &str) -> crate::Result<(u64, u64, u64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [rows, cols, nvals] = fields.as_slice() else {
        return Err(BenchError::malformed(
            path,
            line_no,
            format!("expected `rows cols nvals`, found `{line}`"),
        ));
    };
    let parse = |token: &str| {
        token
            .parse::<u64>()
            .map_err(|e| BenchError::malformed(path, line_no, format!("bad header field `{token}`: {e}")))
    };
    Ok((parse(rows)?, parse(cols)?, parse(nvals)?))
}

fn parse_entry(path: &Path, line_no: usize, line: &str) -> crate::Result<Entry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let index = |token: &str| {
        token
            .parse::<u64>()
            .map_err(|e| BenchError::malformed(path, line_no, format!("bad index `{token}`: {e}")))
    };
    match tokens.as_slice() {
        [row, col] => Ok(Entry::void(index(row)?, index(col)?)),
        [row, col, value] => {
            let value = Value::parse(value)
                .ok_or_else(|| BenchError::malformed(path, line_no, format!("bad value `{value}`")))?;
            Ok(Entry::valued(index(row)?, index(col)?, value))
        }
        _ => Err(BenchError::malformed(
            path,
            line_no,
            format!("expected 2 or 3 tokens, found {}", tokens.len()),
        )),
    }
}

/// Read only the `rows cols nvals` header.
pub fn load_header(path: &Path) -> crate::Result<(u64, u64, u64)> {
    let reader = BufReader::new(File::open(path)?);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let content = strip_comment(&line);
        if !content.is_empty() {
            return parse_header(path, idx + 1, content);
        }
    }
    Err(BenchError::malformed(path, 0, "missing header line"))
}

/// Load a whole matrix file.
pub fn load(path: &Path) -> crate::Result<MatrixData> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines().enumerate();
    let mut symmetry = Symmetry::General;

    let (rows, cols, nvals) = loop {
        let Some((idx, line)) = lines.next() else {
            return Err(BenchError::malformed(path, 0, "missing header line"));
        };
        let line = line?;
        if let Some(banner) = Symmetry::from_banner(&line) {
            symmetry = banner;
        }
        let content = strip_comment(&line);
        if !content.is_empty() {
            break parse_header(path, idx + 1, content)?;
        }
    };

    let expected = usize::try_from(nvals.saturating_sub(1))
        .map_err(|_| BenchError::malformed(path, 0, format!("nvals {nvals} is too large")))?;
    let mut entries = Vec::with_capacity(expected.min(1 << 20));
    let mut arity = None;

    while entries.len() < expected {
        let Some((idx, line)) = lines.next() else {
            return Err(BenchError::malformed(
                path,
                0,
                format!("expected {expected} entries, found {}", entries.len()),
            ));
        };
        let line = line?;
        let content = strip_comment(&line);
        if content.is_empty() {
            continue;
        }
        let entry = parse_entry(path, idx + 1, content)?;
        let valued = entry.value.is_some();
        match arity {
            None => arity = Some(valued),
            Some(first) if first != valued => {
                return Err(BenchError::malformed(
                    path,
                    idx + 1,
                    "entry arity differs from the first entry",
                ));
            }
            Some(_) => {}
        }
        entries.push(entry);
    }

    Ok(MatrixData {
        rows,
        cols,
        entries,
        symmetry,
    })
}

/// Write a matrix in the format [`load`] reads.
///
/// Arity follows the first entry; an empty matrix is written as a bare header.
pub fn save(path: &Path, matrix: &MatrixData) -> crate::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    if matrix.symmetry != Symmetry::General {
        let field = match matrix.value_type() {
            ValueType::Void => "pattern",
            ValueType::Int => "integer",
            ValueType::Float => "real",
        };
        writeln!(
            out,
            "%%MatrixMarket matrix coordinate {field} {}",
            matrix.symmetry.banner_name()
        )?;
    }

    let nvals = if matrix.entries.is_empty() {
        0
    } else {
        matrix.entries.len() + 1
    };
    writeln!(out, "{} {} {nvals}", matrix.rows, matrix.cols)?;

    let valued = matrix.has_values();
    for entry in &matrix.entries {
        match entry.value {
            Some(value) if valued => writeln!(out, "{} {} {value}", entry.row, entry.col)?,
            _ => writeln!(out, "{} {}", entry.row, entry.col)?,
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_skips_comments_and_counts_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "g.mtx",
            "%%MatrixMarket matrix coordinate pattern general\n% comment\n\n3 3 3 % trailing\n1 2\n2 3\n",
        );

        let m = load(&path).unwrap();
        assert_eq!((m.rows, m.cols), (3, 3));
        assert_eq!(m.entries, vec![Entry::void(1, 2), Entry::void(2, 3)]);
        assert_eq!(m.value_type(), ValueType::Void);
        assert_eq!(load_header(&path).unwrap(), (3, 3, 3));
    }

    #[test]
    fn test_mixed_arity_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.mtx", "2 2 3\n1 2 5\n2 1\n");

        let err = load(&path).unwrap_err();
        assert!(matches!(err, BenchError::MalformedMatrix { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_truncated_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "short.mtx", "2 2 4\n1 2\n");
        assert!(matches!(load(&path), Err(BenchError::MalformedMatrix { .. })));
    }

    #[test]
    fn test_value_types() {
        let dir = tempfile::tempdir().unwrap();
        let ints = write(&dir, "i.mtx", "2 2 2\n1 2 7\n");
        let floats = write(&dir, "f.mtx", "2 2 2\n1 2 0.5\n");
        assert_eq!(load(&ints).unwrap().value_type(), ValueType::Int);
        assert_eq!(load(&floats).unwrap().value_type(), ValueType::Float);
    }

    #[test]
    fn test_is_directed() {
        let mut m = MatrixData::new(3, 3, vec![Entry::void(1, 2), Entry::void(2, 1), Entry::void(3, 3)]);
        assert!(!m.is_directed());

        m.entries.push(Entry::void(1, 3));
        assert!(m.is_directed());

        m.symmetry = Symmetry::Symmetric;
        assert!(!m.is_directed());
    }

    #[test]
    fn test_symmetric_banner_survives_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sym.mtx");
        let mut m = MatrixData::new(2, 2, vec![Entry::void(2, 1)]);
        m.symmetry = Symmetry::Symmetric;

        save(&path, &m).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.symmetry, Symmetry::Symmetric);
        assert!(!loaded.is_directed());
    }

    #[test]
    fn test_generate_and_remove_values() {
        let m = MatrixData::new(4, 4, vec![Entry::void(1, 2), Entry::void(3, 4)]);
        let mut rng = rand::rng();

        let ints = m.generate_values(ValueType::Int, &mut rng);
        assert_eq!(ints.value_type(), ValueType::Int);
        assert!(ints.entries.iter().all(|e| matches!(e.value, Some(Value::Int(1..=100)))));

        let floats = m.generate_values(ValueType::Float, &mut rng);
        assert!(
            floats
                .entries
                .iter()
                .all(|e| matches!(e.value, Some(Value::Float(v)) if (0.0..1.0).contains(&v)))
        );
        assert_eq!(floats.remove_values(), m);
    }

    #[test]
    fn test_empty_matrix_saves_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mtx");
        save(&path, &MatrixData::new(5, 5, Vec::new())).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "5 5 0\n");
        assert!(load(&path).unwrap().entries.is_empty());
    }

    fn arb_matrix() -> impl Strategy<Value = MatrixData> {
        let coords = prop::collection::vec((1u64..64, 1u64..64), 0..40);
        (coords, 0u8..3, any::<u64>()).prop_map(|(coords, kind, seed)| {
            let entries = coords
                .into_iter()
                .enumerate()
                .map(|(i, (r, c))| {
                    let salt = seed.wrapping_add(i as u64);
                    match kind {
                        0 => Entry::void(r, c),
                        1 => Entry::valued(r, c, Value::Int((salt % 2001) as i64 - 1000)),
                        _ => Entry::valued(r, c, Value::Float((salt % 100_000) as f64 / 7.0)),
                    }
                })
                .collect();
            MatrixData::new(64, 64, entries)
        })
    }

    proptest! {
        #[test]
        fn test_save_load_round_trip(m in arb_matrix()) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("m.mtx");
            save(&path, &m).unwrap();
            let loaded = load(&path).unwrap();
            prop_assert_eq!(&loaded.entries, &m.entries);
            prop_assert_eq!(loaded.rows, m.rows);
            prop_assert_eq!(loaded.value_type(), m.value_type());
        }
    }
}
