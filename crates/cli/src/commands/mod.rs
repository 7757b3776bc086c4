//! Command implementations.
//!
//! Each command returns the text it wants printed so it can be tested
//! without capturing stdout.

pub mod fetch;
pub mod get;
pub mod list;
pub mod put;

use crate::cli::Commands;
use std::path::PathBuf;
use tooldist_core::Config;
use tooldist_core::tools::{Environ, VersionFilter};
use tooldist_storage::{EmptyStorage, FileStorage, Storage, StorageReader};

/// The stores a command runs against.
#[derive(Debug, Clone)]
pub struct Stores {
    private: FileStorage,
    public: Option<FileStorage>,
}

impl Stores {
    pub fn new(private: impl Into<PathBuf>, public: Option<PathBuf>) -> Self {
        Self {
            private: FileStorage::new(private),
            public: public.map(FileStorage::new),
        }
    }

    pub fn private(&self) -> &FileStorage {
        &self.private
    }
}

impl Environ for Stores {
    fn storage(&self) -> &dyn Storage {
        &self.private
    }

    fn public_storage(&self) -> &dyn StorageReader {
        match &self.public {
            Some(public) => public,
            None => &EmptyStorage,
        }
    }
}

/// Resolved configuration plus the stores it names.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub stores: Stores,
}

impl Context {
    /// Combine loaded configuration with command-line overrides.
    pub fn new(
        config: Config,
        storage: Option<PathBuf>,
        public_storage: Option<PathBuf>,
    ) -> miette::Result<Self> {
        let private = storage
            .or_else(|| config.storage.private.clone())
            .ok_or_else(|| {
                tooldist_core::Error::config(
                    "no private store configured",
                    "Pass --storage, set TOOLDIST_STORAGE, or add [storage] private to config.toml",
                )
            })?;
        let public = public_storage.or_else(|| config.storage.public.clone());
        Ok(Self {
            stores: Stores::new(private, public),
            config,
        })
    }

    /// The given stream, or the configured one.
    pub fn stream<'a>(&'a self, stream: Option<&'a str>) -> &'a str {
        stream.unwrap_or(&self.config.stream)
    }
}

fn filter(major: u32, minor: Option<u32>) -> VersionFilter {
    VersionFilter { major, minor }
}

/// Run a parsed command.
pub fn execute(ctx: &Context, command: Commands) -> miette::Result<String> {
    match command {
        Commands::Put {
            dir,
            stream,
            version,
            os,
            arch,
            legacy,
        } => put::run(
            ctx,
            &put::PutArgs {
                dir,
                stream,
                version,
                os,
                arch,
                legacy,
            },
        ),
        Commands::List { query, format } => list::run(ctx, &query, format),
        Commands::Fetch { query, dest } => fetch::run(ctx, &query, &dest),
        Commands::Get { major, dest } => get::run(ctx, major, &dest),
    }
}
