// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ring-road")]
#[command(about = "Infinite road with recycled rings and a starfield", long_about = None)]
pub struct Cli {
    /// Hide the debug panel and FPS overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// JSON file overriding scene parameters
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for starfield placement and ring recycling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Star alpha-map texture, overriding the configured one
    #[arg(long = "star-texture", value_name = "PATH")]
    pub star_texture: Option<PathBuf>,
}

impl Cli {
    /// Texture path to load: the flag wins over the configured path
    pub fn star_texture_or(&self, configured: &str) -> PathBuf {
        self.star_texture
            .clone()
            .unwrap_or_else(|| PathBuf::from(configured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_show_ui() {
        let cli = Cli::parse_from(["ring-road"]);
        assert!(!cli.no_ui);
        assert!(cli.config.is_none());
        assert!(cli.seed.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::parse_from([
            "ring-road",
            "--no-ui",
            "--config",
            "scene.json",
            "--seed",
            "42",
            "--star-texture",
            "dot.png",
        ]);
        assert!(cli.no_ui);
        assert_eq!(cli.config, Some(PathBuf::from("scene.json")));
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.star_texture_or("ignored.png"), PathBuf::from("dot.png"));
    }

    #[test]
    fn texture_falls_back_to_config() {
        let cli = Cli::default();
        assert_eq!(cli.star_texture_or("a/b.png"), PathBuf::from("a/b.png"));
    }
}
