//! Named GraphQL query templates.
//!
//! Queries live in the crate's `queries/` directory and are compiled into the
//! binary. Each file becomes one Tera template keyed by its file name minus
//! the extension, so `queries/rockets.graphql` is looked up as `rockets`.

use crate::error::{ClientError, StoreError};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use tera::{Context, Tera};
use walkdir::WalkDir;

pub const MISSION_BY_ID: &str = "mission_by_id";
pub const MISSIONS_BY_MANUFACTURER: &str = "missions_by_manufacturer";
pub const PAST_LAUNCHES: &str = "past_launches";
pub const ROCKETS: &str = "rockets";

/// Query files bundled at build time, as `(file name, contents)`.
pub const EMBEDDED_QUERIES: &[(&str, &str)] = &[
    (
        "mission_by_id.graphql",
        include_str!("../queries/mission_by_id.graphql"),
    ),
    (
        "missions_by_manufacturer.graphql",
        include_str!("../queries/missions_by_manufacturer.graphql"),
    ),
    (
        "past_launches.graphql",
        include_str!("../queries/past_launches.graphql"),
    ),
    ("rockets.graphql", include_str!("../queries/rockets.graphql")),
];

/// Immutable mapping from query name to parsed template.
#[derive(Debug)]
pub struct QueryStore {
    tera: Tera,
    names: Vec<String>,
}

impl QueryStore {
    /// Load the bundled queries.
    pub fn build() -> Result<Self, StoreError> {
        Self::from_sources(EMBEDDED_QUERIES.iter().copied())
    }

    /// Load queries from `(file name, contents)` pairs.
    pub fn from_sources<I, N, C>(sources: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for (file_name, contents) in sources {
            let name = query_name(file_name.as_ref());
            if !seen.insert(name.clone()) {
                return Err(StoreError::DuplicateName { name });
            }

            tera.add_raw_template(&name, contents.as_ref())
                .map_err(|source| StoreError::TemplateParse {
                    name: name.clone(),
                    source,
                })?;

            tracing::debug!(query = %name, file = file_name.as_ref(), "loaded query template");
            names.push(name);
        }

        names.sort();
        tracing::info!(query_count = names.len(), "query store built");

        Ok(Self { tera, names })
    }

    /// Load every file directly inside `dir`. Subdirectories are ignored.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let mut sources = Vec::new();

        let metadata = fs::metadata(dir).map_err(|source| StoreError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(StoreError::DirectoryRead {
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|source| StoreError::DirectoryRead {
                path: dir.to_path_buf(),
                source: source.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            let contents =
                fs::read_to_string(entry.path()).map_err(|source| StoreError::FileRead {
                    file: file_name.clone(),
                    source,
                })?;
            sources.push((file_name, contents));
        }

        Self::from_sources(sources)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    /// Query names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Render the named query with `context`.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, ClientError> {
        if !self.contains(name) {
            return Err(ClientError::QueryNotFound {
                name: name.to_string(),
            });
        }

        self.tera
            .render(name, context)
            .map_err(|source| ClientError::TemplateRender {
                name: name.to_string(),
                source,
            })
    }
}

fn query_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}
