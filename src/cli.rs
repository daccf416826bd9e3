use clap::Parser;
use std::path::{Path, PathBuf};

use crate::big::{ExtractOptions, Overwrite};
use crate::filter::EntryFilter;

#[derive(Parser, Debug)]
#[command(name = "bigx")]
#[command(version)]
#[command(about = "Extract files from BIG5/BIG4/BIGF archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  bigx CLASH.big                 extract everything into ./CLASH/\n  \
  bigx -d out --no-archive-dir VIDEO.big   extract straight into out/\n  \
  bigx -l CLASH.big '*.tga'      list the .tga files in CLASH.big\n  \
  bigx -p CLASH.big readme.txt   print readme.txt to stdout")]
pub struct Cli {
    /// BIG archive path
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Files to extract, by name, path or glob (default: all)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely, with header details, offsets and sizes
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<PathBuf>,

    /// Extract directly into exdir instead of a directory named after the archive
    #[arg(long = "no-archive-dir")]
    pub no_archive_dir: bool,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Number of files to extract concurrently
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value_t = 1,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn filter(&self) -> EntryFilter {
        EntryFilter::new(self.files.clone(), self.exclude.clone())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            output_dir: self
                .extract_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
            archive_dir: !self.no_archive_dir,
            overwrite: if self.never_overwrite {
                Overwrite::Never
            } else {
                Overwrite::Always
            },
            jobs: usize::from(self.jobs),
        }
    }

    /// Directory entries are extracted under.
    pub fn output_root(&self) -> PathBuf {
        self.extract_options().output_root(Path::new(&self.file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["bigx", "games/CLASH.big"]).unwrap();
        let options = cli.extract_options();

        assert_eq!(options.output_dir, PathBuf::from("."));
        assert!(options.archive_dir);
        assert_eq!(options.overwrite, Overwrite::Always);
        assert_eq!(options.jobs, 1);
        assert_eq!(cli.output_root(), PathBuf::from("./CLASH"));
    }

    #[test]
    fn test_extract_flags() {
        let cli = Cli::try_parse_from([
            "bigx", "-d", "out", "--no-archive-dir", "-n", "-j", "4", "VIDEO.big", "*.bik",
        ])
        .unwrap();
        let options = cli.extract_options();

        assert_eq!(cli.output_root(), PathBuf::from("out"));
        assert_eq!(options.overwrite, Overwrite::Never);
        assert_eq!(options.jobs, 4);
        assert_eq!(cli.files, vec!["*.bik".to_string()]);
    }

    #[test]
    fn test_rejects_zero_jobs() {
        assert!(Cli::try_parse_from(["bigx", "-j", "0", "a.big"]).is_err());
    }

    #[test]
    fn test_requires_archive() {
        assert!(Cli::try_parse_from(["bigx"]).is_err());
    }

    #[test]
    fn test_pipe_is_quiet() {
        let cli = Cli::try_parse_from(["bigx", "-p", "a.big"]).unwrap();
        assert!(cli.is_quiet());
        assert!(!cli.is_very_quiet());
    }
}
