//! Named graph datasets with lazily computed, cached properties.

pub mod cache;
pub mod catalog;
pub mod downloader;
pub mod matrix;

pub use cache::PropertyCache;
pub use downloader::{DatasetSource, HttpDownloader};
pub use matrix::ValueType;

use crate::config::{BenchmarkConfig, SizeCategory};
use crate::error::BenchError;
use std::path::{Path, PathBuf};

const KEY_PATH: &str = "path";
const KEY_DIRECTED: &str = "directed";
const KEY_ELEMENT_TYPE: &str = "element_type";
const KEY_EDGES: &str = "edges";

/// A graph file on disk plus its memoized properties.
///
/// Each property is computed from the matrix the first time it is asked for
/// and read from the [`PropertyCache`] afterwards. Cached values are never
/// invalidated automatically.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    path: PathBuf,
    cache: PropertyCache,
}

impl Dataset {
    /// Resolve a dataset by catalog name, URL or local file name.
    ///
    /// Fails with [`BenchError::MissingSource`] when the name has no cached
    /// path, no known URL and no file in the dataset directory.
    pub fn open(name: &str, config: &BenchmarkConfig, source: &dyn DatasetSource) -> crate::Result<Self> {
        let cache = PropertyCache::new(&config.properties_path);
        let local = config
            .dataset_dir
            .join(catalog::local_stem(name))
            .with_extension("mtx");

        let url = if catalog::is_url(name) {
            Some(name.to_string())
        } else {
            config.dataset_urls.get(name).cloned()
        };
        let cached: Option<PathBuf> = cache.get(name, KEY_PATH)?;

        let path = match (cached, url) {
            (Some(path), _) if path.exists() => path,
            _ if local.exists() => local,
            (_, Some(url)) => source.materialize(&url, &local)?,
            (Some(path), None) => path,
            (None, None) => return Err(BenchError::MissingSource(name.to_string())),
        };
        cache.set(name, KEY_PATH, &path)?;

        Ok(Self {
            name: name.to_string(),
            path,
            cache,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the graph is directed.
    pub fn directed(&self) -> crate::Result<bool> {
        self.cache.get_or_eval(&self.name, KEY_DIRECTED, || {
            tracing::info!("[{} | properties]: computing directedness", self.name);
            Ok(matrix::load(&self.path)?.is_directed())
        })
    }

    /// Element type of the edge values.
    pub fn element_type(&self) -> crate::Result<ValueType> {
        self.cache.get_or_eval(&self.name, KEY_ELEMENT_TYPE, || {
            tracing::info!("[{} | properties]: computing element type", self.name);
            Ok(matrix::load(&self.path)?.value_type())
        })
    }

    /// Declared entry count from the matrix header.
    pub fn edges(&self) -> crate::Result<u64> {
        self.cache.get_or_eval(&self.name, KEY_EDGES, || {
            let (_, _, nvals) = matrix::load_header(&self.path)?;
            Ok(nvals)
        })
    }

    pub fn category(&self) -> crate::Result<SizeCategory> {
        Ok(SizeCategory::from_edges(self.edges()?))
    }
}
