//! # dialectbench-runtime
//!
//! Everything in dialectbench that touches the network or the filesystem.
//!
//! - [`providers`]: the [`LlmProvider`] trait and the Gemini backend
//! - [`config`]: [`RuntimeConfig`] from defaults, YAML, environment and flags
//! - [`pipeline`] and [`translator`]: per-row work against a provider
//! - [`processor`]: one CSV file in, one CSV file out
//! - [`dispatcher`]: task catalogs and the bounded worker pool
//!
//! ## Example
//!
//! ```rust,ignore
//! use dialectbench_runtime::{dispatcher, Dispatcher, FileProcessor, ProviderRegistry, RuntimeConfig};
//!
//! let config = Arc::new(RuntimeConfig::load(None, Default::default())?);
//! let provider = ProviderRegistry::with_defaults()
//!     .create(&config.provider, &config.provider_settings())?;
//! let processor = Arc::new(FileProcessor::new(provider, Arc::clone(&config)));
//! let dispatcher = Dispatcher::new(processor, config.max_workers);
//!
//! let tasks = dispatcher::filter_existing(dispatcher::mednli_tasks(&config.data_dir));
//! let reports = dispatcher.run_batch(tasks).await;
//! ```

pub mod config;
pub mod dispatcher;
pub mod pipeline;
pub mod processor;
pub mod providers;
pub mod translator;

pub use config::{ConfigError, ConfigFile, ConfigOverrides, RuntimeConfig};
pub use dispatcher::{BatchSummary, Dispatcher, TaskDescriptor};
pub use pipeline::RowPipeline;
pub use processor::{FileProcessor, FileReport, ProcessError};
pub use providers::{
    ApiCredential, CompletionConfig, CompletionResponse, CredentialSource, LlmProvider,
    ProviderError, ProviderFactory, ProviderRegistry, TokenUsage,
};
pub use translator::Translator;

#[cfg(feature = "gemini")]
pub use providers::{GeminiProvider, GeminiProviderFactory};
