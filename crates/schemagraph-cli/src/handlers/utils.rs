//! Shared utilities for command handlers
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::cli::LoadingArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use schemagraph::loader::{CachingFetcher, DocumentParser, FileFetcher};
use schemagraph::{CompiledSchema, SchemaLoader};
use serde_json::Value;
use std::path::Path;

/// Build a loader that reads external references from the filesystem
pub fn build_loader(config: &Config, args: &LoadingArgs) -> SchemaLoader {
    let fetcher = match &args.fetch_root {
        Some(root) => FileFetcher::confined_to(root),
        None => FileFetcher::new(),
    };
    let loader = SchemaLoader::with_config(config.loader_config(args));

    let cache = config.cache.to_cache_config();
    if cache.enabled {
        loader.with_fetcher(CachingFetcher::with_config(fetcher, cache))
    } else {
        loader.with_fetcher(fetcher)
    }
}

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        tracing::error!(path = %path.display(), "file not found");
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Load and compile the schema at `path`
pub fn load_schema(loader: &SchemaLoader, path: &Path) -> Result<CompiledSchema> {
    require_file(path)?;
    Ok(loader.load_file(path)?)
}

/// Read an instance document, JSON or YAML by extension
pub fn read_document(path: &Path) -> Result<Value> {
    require_file(path)?;
    Ok(DocumentParser::new().parse_file(path)?)
}
