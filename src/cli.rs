use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory for downloads and organized output
    #[arg(short, long, global = true)]
    pub work_dir: Option<PathBuf>,

    /// Target language for translation (overrides the configuration)
    #[arg(short, long, global = true)]
    pub target_lang: Option<String>,

    /// Suffix of translated files, `<title>_<suffix>.srt` (defaults to the target language
    /// when `--target-lang` changes it)
    #[arg(long, global = true)]
    pub suffix: Option<String>,

    /// Without a subcommand the video URL is asked for interactively
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    /// Apply the language flags on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(target) = &self.target_lang {
            if *target != config.languages.target {
                config.languages.target = target.clone();
                config.languages.target_suffix = target.clone();
            }
        }
        if let Some(suffix) = &self.suffix {
            config.languages.target_suffix = suffix.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video, translate its subtitles and burn them in
    Run {
        /// Video URL
        url: String,

        /// Keep the translated subtitles separate instead of burning them in
        #[arg(long)]
        no_burn: bool,
    },

    /// Download only the subtitles of a video and translate them
    Subs {
        /// Video URL
        url: String,
    },

    /// Translate a local SRT file
    Translate {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output translated file (defaults to <stem>_<suffix>.srt next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language of the input (detected from the file name when omitted)
        #[arg(short, long)]
        source_lang: Option<String>,
    },

    /// Burn a subtitle file into a video
    Embed {
        /// Input video file
        #[arg(long)]
        video: PathBuf,

        /// Subtitle file
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(default_value = "config.toml")]
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_interactive() {
        let args = Args::try_parse_from(["subburn"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_run_with_global_flags() {
        let args = Args::try_parse_from([
            "subburn", "run", "https://example.com/v", "--no-burn", "-t", "fr", "-w", "/tmp/out",
        ])
        .unwrap();

        assert_eq!(args.target_lang.as_deref(), Some("fr"));
        assert_eq!(args.work_dir, Some(PathBuf::from("/tmp/out")));
        match args.command {
            Some(Commands::Run { url, no_burn }) => {
                assert_eq!(url, "https://example.com/v");
                assert!(no_burn);
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn test_translate_arguments() {
        let args = Args::try_parse_from(["subburn", "translate", "-i", "in.srt", "-s", "en"]).unwrap();
        match args.command {
            Some(Commands::Translate { input, output, source_lang }) => {
                assert_eq!(input, PathBuf::from("in.srt"));
                assert_eq!(output, None);
                assert_eq!(source_lang.as_deref(), Some("en"));
            }
            _ => panic!("expected translate subcommand"),
        }
    }

    #[test]
    fn test_same_target_keeps_configured_suffix() {
        let args = Args::try_parse_from(["subburn", "-t", "km"]).unwrap();
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.languages.target, "km");
        assert_eq!(config.languages.target_suffix, "kh");
    }

    #[test]
    fn test_new_target_and_explicit_suffix() {
        let mut config = Config::default();
        Args::try_parse_from(["subburn", "-t", "fr"]).unwrap().apply_overrides(&mut config);
        assert_eq!(config.languages.target, "fr");
        assert_eq!(config.languages.target_suffix, "fr");

        let mut config = Config::default();
        Args::try_parse_from(["subburn", "-t", "vi", "--suffix", "vn"])
            .unwrap()
            .apply_overrides(&mut config);
        assert_eq!(config.languages.target, "vi");
        assert_eq!(config.languages.target_suffix, "vn");

        let mut config = Config::default();
        Args::try_parse_from(["subburn"]).unwrap().apply_overrides(&mut config);
        assert_eq!(config.languages.target_suffix, "kh");
    }

    #[test]
    fn test_init_config_default_path() {
        let args = Args::try_parse_from(["subburn", "init-config"]).unwrap();
        assert!(matches!(args.command, Some(Commands::InitConfig { path }) if path == PathBuf::from("config.toml")));
    }
}
