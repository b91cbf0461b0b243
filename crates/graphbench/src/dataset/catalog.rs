//! Built-in dataset catalog.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const COLLECTION: &str = "https://suitesparse-collection-website.herokuapp.com/MM";

/// Known datasets and their archive locations in the SuiteSparse collection.
pub const CATALOG: &[(&str, &str)] = &[
    ("1128_bus", "HB/1138_bus.tar.gz"),
    ("bcspwr03", "HB/bcspwr03.tar.gz"),
    ("soc-LiveJournal", "SNAP/soc-LiveJournal1.tar.gz"),
    ("hollywood-09", "LAW/hollywood-2009.tar.gz"),
    ("Journals", "Pajek/Journals.tar.gz"),
];

/// Datasets benchmarked when none are selected.
pub const BENCHMARK_DATASETS: &[&str] = &[
    "1128_bus",
    "bcspwr03",
    "soc-LiveJournal",
    "hollywood-09",
    "Journals",
];

/// Catalog as a name to URL map.
pub fn default_urls() -> BTreeMap<String, String> {
    CATALOG
        .iter()
        .map(|(name, rel)| ((*name).to_string(), format!("{COLLECTION}/{rel}")))
        .collect()
}

/// Whether a dataset name is itself a download URL.
pub fn is_url(name: &str) -> bool {
    name.starts_with("http://") || name.starts_with("https://")
}

/// Stem of the last path segment of a URL, without archive extensions.
pub fn archive_stem(url: &str) -> &str {
    let file = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .unwrap_or(url);
    [".tar.gz", ".tgz", ".tar", ".gz"]
        .iter()
        .find_map(|ext| file.strip_suffix(ext))
        .unwrap_or(file)
}

/// Local file stem for a dataset.
///
/// Catalog names map to themselves; URLs map to `<stem>-<hash8>` so two URLs
/// sharing a file name do not collide.
pub fn local_stem(name: &str) -> String {
    if !is_url(name) {
        return name.to_string();
    }
    let digest = hex::encode(Sha256::digest(name.as_bytes()));
    format!("{}-{}", archive_stem(name), &digest[..8])
}
