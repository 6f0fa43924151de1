#![deny(missing_docs)]

//! # TM16XX Patch CLI
//!
//! Pre-build hook that fixes the `min()` type mismatch in the vendored TM16XX
//! driver before compiling for ESP32-S3. Run it from the project root with no
//! arguments.

use clap::Parser;
use tm16xx_patch_core::AppResult;

mod patch;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Patch vendored TM16XX sources before build")]
struct Cli {
    #[clap(flatten)]
    patch: patch::PatchArgs,
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    patch::execute(&cli.patch)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_build_hook() {
        let cli = Cli::try_parse_from(["tm16xx-patch"]).unwrap();
        assert_eq!(cli.patch.root, PathBuf::from(".pio/libdeps"));
        assert_eq!(cli.patch.file_name, "TM16XX.cpp");
        assert_eq!(cli.patch.pattern, "min(7, intensity)");
        assert_eq!(cli.patch.replacement, "min((byte)7, intensity)");
        assert!(!cli.patch.dry_run);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let res = Cli::try_parse_from(["tm16xx-patch", "--pattern", ""]);
        assert!(res.is_err());
    }
}
