//! Flat-file similarity index.
//!
//! Stores a fixed set of case embeddings in a single binary file and answers
//! nearest-neighbor queries with a brute-force squared-L2 scan. Case
//! identifiers live in a JSON sidecar (`<index>.meta.json`) whose position
//! corresponds to each vector's insertion position; a position the sidecar
//! does not cover resolves to a synthetic `case_<position>` identifier.
//!
//! File layout: `MRIX` magic, u32 version, u32 dimension, u32 count, then
//! `count * dimension` little-endian f32 values in row-major order.

use std::cmp::Ordering;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::IndexError;
use crate::domain::ports::{SearchHit, SimilarityIndex};

const INDEX_MAGIC: &[u8; 4] = b"MRIX";
const INDEX_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Per-case feature files carry their own small header.
const FEATURE_MAGIC: &[u8; 4] = b"MRVC";

/// In-memory flat index over case embeddings.
///
/// Loaded once at startup and safe for concurrent read-only use; queries
/// never mutate it.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    count: usize,
    vectors: Vec<f32>,
    ids: Vec<String>,
}

impl FlatIndex {
    /// Open an index file and its identifier sidecar.
    ///
    /// A missing sidecar is tolerated (all identifiers become synthetic); a
    /// corrupt one is not.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::Missing(path.to_path_buf()));
            }
            Err(err) => return Err(IndexError::Io(err)),
        };

        let (dimension, count) = parse_header(&bytes)?;

        let expected_len = HEADER_LEN + count * dimension * 4;
        if bytes.len() != expected_len {
            return Err(IndexError::Malformed(format!(
                "expected {expected_len} bytes for {count} vectors of dimension {dimension}, found {}",
                bytes.len()
            )));
        }

        let vectors = bytes[HEADER_LEN..]
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let ids = read_sidecar(&sidecar_path(path))?;

        Ok(Self {
            dimension,
            count,
            vectors,
            ids,
        })
    }

    /// Build an index by stacking every feature file in `features_dir`.
    ///
    /// Files are visited in name order so insertion positions are stable;
    /// each case identifier is the feature file's stem.
    pub fn build_from_dir(features_dir: &Path) -> Result<Self, IndexError> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(features_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "vec"))
            .collect();
        entries.sort();

        if entries.is_empty() {
            return Err(IndexError::Empty);
        }

        let mut dimension = 0usize;
        let mut vectors = Vec::new();
        let mut ids = Vec::with_capacity(entries.len());

        for path in &entries {
            let vector = read_feature_file(path).map_err(|err| {
                IndexError::Malformed(format!("feature file {}: {err}", path.display()))
            })?;

            if dimension == 0 {
                dimension = vector.len();
            } else if vector.len() != dimension {
                return Err(IndexError::Malformed(format!(
                    "feature file {} has dimension {}, expected {dimension}",
                    path.display(),
                    vector.len()
                )));
            }

            vectors.extend_from_slice(&vector);
            ids.push(
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }

        Ok(Self {
            dimension,
            count: ids.len(),
            vectors,
            ids,
        })
    }

    /// Write the index file and its identifier sidecar.
    pub fn write(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut bytes = Vec::with_capacity(HEADER_LEN + self.vectors.len() * 4);
        bytes.extend_from_slice(INDEX_MAGIC);
        bytes.extend_from_slice(&INDEX_VERSION.to_le_bytes());
        bytes.extend_from_slice(&u32::try_from(self.dimension).unwrap_or(u32::MAX).to_le_bytes());
        bytes.extend_from_slice(&u32::try_from(self.count).unwrap_or(u32::MAX).to_le_bytes());
        for value in &self.vectors {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        std::fs::write(path, bytes)?;

        let sidecar = serde_json::to_string(&self.ids)
            .map_err(|err| IndexError::Malformed(err.to_string()))?;
        std::fs::write(sidecar_path(path), sidecar)?;

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Case identifiers in insertion order, as recorded in the sidecar.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    fn vector_at(&self, position: usize) -> &[f32] {
        let start = position * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    fn id_at(&self, position: usize) -> String {
        self.ids
            .get(position)
            .cloned()
            .unwrap_or_else(|| format!("case_{position}"))
    }
}

#[async_trait]
impl SimilarityIndex for FlatIndex {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if self.count == 0 {
            return Err(IndexError::Empty);
        }
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = (0..self.count)
            .map(|position| (position, squared_l2(vector, self.vector_at(position))))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| SearchHit {
                id: self.id_at(position),
                distance,
            })
            .collect())
    }
}

fn parse_header(bytes: &[u8]) -> Result<(usize, usize), IndexError> {
    if bytes.len() < HEADER_LEN {
        return Err(IndexError::Malformed("file shorter than header".to_string()));
    }
    if &bytes[0..4] != INDEX_MAGIC {
        return Err(IndexError::Malformed("bad magic".to_string()));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != INDEX_VERSION {
        return Err(IndexError::Malformed(format!(
            "unsupported version {version}"
        )));
    }

    let dimension = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let count = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
    if dimension == 0 {
        return Err(IndexError::Malformed("zero dimension".to_string()));
    }

    Ok((dimension, count))
}

fn sidecar_path(index_path: &Path) -> PathBuf {
    let mut os: OsString = index_path.as_os_str().to_owned();
    os.push(".meta.json");
    PathBuf::from(os)
}

fn read_sidecar(path: &Path) -> Result<Vec<String>, IndexError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents)
            .map_err(|err| IndexError::Malformed(format!("sidecar {}: {err}", path.display()))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(IndexError::Io(err)),
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Read a per-case feature file: `MRVC` magic, u32 dimension, then the
/// little-endian f32 values.
pub fn read_feature_file(path: &Path) -> Result<Vec<f32>, std::io::Error> {
    let bytes = std::fs::read(path)?;
    let malformed =
        |msg: &str| std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string());

    if bytes.len() < 8 || &bytes[0..4] != FEATURE_MAGIC {
        return Err(malformed("not a feature file"));
    }
    let dimension = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    if bytes.len() != 8 + dimension * 4 {
        return Err(malformed("feature file length does not match its header"));
    }

    Ok(bytes[8..]
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Write a per-case feature file next to its siblings in the features dir.
pub fn write_feature_file(path: &Path, vector: &[f32]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut bytes = Vec::with_capacity(8 + vector.len() * 4);
    bytes.extend_from_slice(FEATURE_MAGIC);
    bytes.extend_from_slice(&u32::try_from(vector.len()).unwrap_or(u32::MAX).to_le_bytes());
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    std::fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn features_fixture(dir: &Path) {
        write_feature_file(&dir.join("case_a.vec"), &[0.0, 0.0]).unwrap();
        write_feature_file(&dir.join("case_b.vec"), &[1.0, 0.0]).unwrap();
        write_feature_file(&dir.join("case_c.vec"), &[3.0, 4.0]).unwrap();
    }

    #[test]
    fn build_write_open_round_trip() {
        let temp = TempDir::new().unwrap();
        features_fixture(temp.path());

        let built = FlatIndex::build_from_dir(temp.path()).unwrap();
        assert_eq!(built.len(), 3);
        assert_eq!(built.ids(), &["case_a", "case_b", "case_c"]);

        let index_path = temp.path().join("index.vec");
        built.write(&index_path).unwrap();

        let reopened = FlatIndex::open(&index_path).unwrap();
        assert_eq!(reopened.len(), 3);
        assert_eq!(SimilarityIndex::dimension(&reopened), 2);
        assert_eq!(reopened.ids(), &["case_a", "case_b", "case_c"]);
    }

    #[tokio::test]
    async fn search_ranks_by_ascending_distance() {
        let temp = TempDir::new().unwrap();
        features_fixture(temp.path());
        let index = FlatIndex::build_from_dir(temp.path()).unwrap();

        let hits = index.search(&[0.9, 0.0], 3).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
        assert_eq!(ids, vec!["case_b", "case_a", "case_c"]);
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[tokio::test]
    async fn search_truncates_to_k() {
        let temp = TempDir::new().unwrap();
        features_fixture(temp.path());
        let index = FlatIndex::build_from_dir(temp.path()).unwrap();

        let hits = index.search(&[0.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn missing_sidecar_positions_get_synthetic_ids() {
        let temp = TempDir::new().unwrap();
        features_fixture(temp.path());
        let built = FlatIndex::build_from_dir(temp.path()).unwrap();

        let index_path = temp.path().join("index.vec");
        built.write(&index_path).unwrap();
        // Truncate the sidecar to a single known id.
        std::fs::write(sidecar_path(&index_path), r#"["case_a"]"#).unwrap();

        let reopened = FlatIndex::open(&index_path).unwrap();
        let hits = reopened.search(&[2.0, 2.0], 3).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
        assert!(ids.contains(&"case_a"));
        assert!(ids.contains(&"case_1"));
        assert!(ids.contains(&"case_2"));
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let temp = TempDir::new().unwrap();
        features_fixture(temp.path());
        let index = FlatIndex::build_from_dir(temp.path()).unwrap();

        let err = index.search(&[0.0, 0.0, 0.0], 3).await.unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn opening_a_missing_file_reports_missing() {
        let temp = TempDir::new().unwrap();
        let err = FlatIndex::open(&temp.path().join("absent.vec")).unwrap_err();
        assert!(matches!(err, IndexError::Missing(_)));
    }

    #[test]
    fn opening_garbage_reports_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("garbage.vec");
        std::fs::write(&path, b"not an index at all").unwrap();
        let err = FlatIndex::open(&path).unwrap_err();
        assert!(matches!(err, IndexError::Malformed(_)));
    }

    #[test]
    fn building_from_an_empty_dir_reports_empty() {
        let temp = TempDir::new().unwrap();
        let err = FlatIndex::build_from_dir(temp.path()).unwrap_err();
        assert!(matches!(err, IndexError::Empty));
    }

    #[test]
    fn feature_files_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("case.vec");
        write_feature_file(&path, &[1.5, -2.0, 0.25]).unwrap();
        assert_eq!(read_feature_file(&path).unwrap(), vec![1.5, -2.0, 0.25]);
    }
}
