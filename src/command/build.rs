use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Args;
use itertools::Itertools;
use log::debug;
use log::info;
use log::warn;

use crate::build::config::EXT_SUBDIR;
use crate::build::config::SOURCE_SUBDIR;
use crate::build::header::KMER_HEADER_FILENAME;
use crate::build::header::KMER_HEADER_RELPATH;
use crate::build::configure_and_build;
use crate::build::ensure_kmer_header;
use crate::build::sync_tree;
use crate::build::BuildConfig;
use crate::build::BuildLock;
use crate::utils::check_cmake;
use crate::utils::check_make;
use crate::utils::to_absolute_path;

use super::determine_thread_count;

pub const DEFAULT_TARGET: &str = "debruijn";
pub const DEFAULT_PATH_OUT: &str = ".";

///////////////////////////////
/// Maintain precompiled per-K build trees of the assembler
#[derive(Args)]
pub struct BuildCMD {
    #[arg(short = 'k', long = "kmer-sizes", value_delimiter = ',', default_values_t = [21u32, 33, 55])]
    /// K values to compile, comma separated
    pub k_values: Vec<u32>,

    #[arg(short = 's', long = "source", value_parser = clap::value_parser!(PathBuf))]
    /// Assembler source home; must contain the src/ and ext/ trees
    pub path_source: PathBuf,

    #[arg(short = 'o', long = "output", value_parser = clap::value_parser!(PathBuf), default_value = DEFAULT_PATH_OUT)]
    /// Root under which precompiled/ is kept
    pub path_output: PathBuf,

    #[arg(long = "target", default_value = DEFAULT_TARGET)]
    /// Build system target to produce for each K
    pub target: String,

    //Thread settings
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    num_threads_total: Option<usize>,
}
impl BuildCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        self.verify_k_values()?;
        self.verify_source_home()?;
        check_cmake()?;
        check_make()?;

        let jobs = determine_thread_count(self.num_threads_total)?;

        let config = BuildConfig {
            k_values: self.k_values.clone(),
            source_home: to_absolute_path(&self.path_source)?,
            output_root: to_absolute_path(&self.path_output)?,
            target: self.target.clone(),
            jobs,
        };
        Builder::run(&config)?;

        log::info!("Build has finished succesfully");
        Ok(())
    }

    fn verify_k_values(&self) -> Result<()> {
        if self.k_values.is_empty() {
            anyhow::bail!("No K values given");
        }
        for &k in &self.k_values {
            if k == 0 {
                anyhow::bail!("K=0 is not a usable k-mer size");
            }
            if k % 2 == 0 {
                warn!("K={} is even; assemblies normally use odd K", k);
            }
        }
        Ok(())
    }

    fn verify_source_home(&self) -> Result<()> {
        for sub in [SOURCE_SUBDIR, EXT_SUBDIR] {
            let path = self.path_source.join(sub);
            if !path.is_dir() {
                anyhow::bail!(
                    "Source home {} is missing its {}/ tree",
                    self.path_source.display(),
                    sub
                );
            }
        }
        Ok(())
    }
}

///////////////////////////////
/// Sequential per-K orchestration: sync the sources into the K's build
/// tree, drop the K header in, configure and build. Each K is guarded by
/// an advisory lock so concurrent invocations take turns per K rather
/// than corrupt a tree
pub struct Builder {}
impl Builder {
    pub fn run(config: &BuildConfig) -> Result<()> {
        let precompiled = config.precompiled_root();
        fs::create_dir_all(&precompiled)
            .with_context(|| format!("Failed to create {}", precompiled.display()))?;
        info!("Compiling K values: {}", config.k_values.iter().join(", "));

        for &k in &config.k_values {
            let _lock = BuildLock::acquire(&config.lock_path(k))?;
            Self::build_k(config, k)?;
        }
        Ok(())
    }

    fn build_k(config: &BuildConfig, k: u32) -> Result<()> {
        info!("== Compiling with K={} ==", k);
        let build_dir = config.build_dir(k);

        let keep = |name: &OsStr| name == OsStr::new(KMER_HEADER_FILENAME);
        for sub in [SOURCE_SUBDIR, EXT_SUBDIR] {
            let stats = sync_tree(
                &config.source_home.join(sub),
                &build_dir.join(sub),
                &keep,
            )?;
            debug!(
                "Synced {}/: {} copied, {} removed, {} dirs created",
                sub, stats.files_copied, stats.entries_removed, stats.dirs_created
            );
        }

        if ensure_kmer_header(&build_dir, k)? {
            debug!("Wrote {} for K={}", KMER_HEADER_RELPATH, k);
        }

        configure_and_build(&build_dir, &config.target, config.jobs)
    }
}
