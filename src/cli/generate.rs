//! `generate` command: install the binary as a Terraform credentials helper.

use anyhow::{Context, Result};
use clap::Args;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use super::config_cmd::confirm;
use super::output;
use crate::credentials::Platform;

/// Name Terraform looks for in its plugins directory.
pub const PLUGIN_NAME: &str = "terraform-credentials-terracreds";

/// Block registering this helper in the Terraform CLI configuration.
pub const CLI_CONFIG_BLOCK: &str = "credentials_helper \"terracreds\" {\n  args = []\n}\n";

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Also write the Terraform CLI configuration file
    #[arg(long)]
    pub create_cli_config: bool,

    /// Overwrite an existing CLI configuration without asking
    #[arg(short, long)]
    pub force: bool,
}

/// Where Terraform expects its plugins and CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformPaths {
    pub plugin_dir: PathBuf,
    pub binary: PathBuf,
    pub cli_config: PathBuf,
}

impl TerraformPaths {
    /// Layout for `platform` rooted at the user's profile directory.
    ///
    /// On Windows `profile` is the roaming application data directory.
    pub fn for_platform(platform: Platform, profile: &Path) -> Self {
        match platform {
            Platform::Windows => {
                let plugin_dir = profile.join("terraform.d").join("plugins");
                Self {
                    binary: plugin_dir.join(format!("{}.exe", PLUGIN_NAME)),
                    plugin_dir,
                    cli_config: profile.join("terraform.rc"),
                }
            }
            Platform::MacOs | Platform::Linux => {
                let terraform_dir = profile.join(".terraform.d");
                let plugin_dir = terraform_dir.join("plugins");
                Self {
                    binary: plugin_dir.join(PLUGIN_NAME),
                    plugin_dir,
                    cli_config: profile.join(".terraformrc"),
                }
            }
        }
    }

    /// Layout for the running platform and user.
    pub fn current() -> Result<Self> {
        let platform = Platform::current();
        Ok(Self::for_platform(platform, &profile_dir(platform)?))
    }
}

fn profile_dir(platform: Platform) -> Result<PathBuf> {
    let var = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);

    let dir = match platform {
        Platform::Windows => var("APPDATA")
            .or_else(|| var("USERPROFILE").map(|p| p.join("AppData").join("Roaming"))),
        Platform::MacOs | Platform::Linux => var("HOME"),
    };
    dir.context("Unable to determine the user profile directory")
}

pub fn handle_generate_command(args: GenerateArgs) -> Result<()> {
    let paths = TerraformPaths::current()?;
    let source = std::env::current_exe().context("Unable to locate the running executable")?;

    install_plugin(&source, &paths)?;
    output::print_success(&format!("Installed the credentials helper to {}", paths.binary.display()));

    if args.create_cli_config {
        write_cli_config(&paths.cli_config, args.force, &mut std::io::stdin().lock())?;
    }
    Ok(())
}

/// Copy `source` to the plugin location, creating the directory.
pub fn install_plugin(source: &Path, paths: &TerraformPaths) -> Result<()> {
    std::fs::create_dir_all(&paths.plugin_dir).with_context(|| {
        format!("Failed to create plugins directory: {}", paths.plugin_dir.display())
    })?;

    if source == paths.binary {
        return Ok(());
    }

    std::fs::copy(source, &paths.binary)
        .with_context(|| format!("Failed to copy binary to {}", paths.binary.display()))?;
    Ok(())
}

/// Write the CLI configuration, asking before replacing an existing file.
///
/// Returns whether the file was written.
pub fn write_cli_config<R: BufRead>(path: &Path, force: bool, input: &mut R) -> Result<bool> {
    if path.exists() && !force {
        output::print_warning(&format!(
            "This replaces every setting in {}. Continue? [y/N]",
            path.display()
        ));
        if !confirm(input)? {
            output::print_info("CLI configuration left unchanged");
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, CLI_CONFIG_BLOCK)
        .with_context(|| format!("Failed to write CLI configuration: {}", path.display()))?;
    output::print_success(&format!("Wrote {}", path.display()));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_unix_layout() {
        let paths = TerraformPaths::for_platform(Platform::Linux, Path::new("/home/dev"));
        assert_eq!(paths.plugin_dir, Path::new("/home/dev/.terraform.d/plugins"));
        assert_eq!(paths.binary, Path::new("/home/dev/.terraform.d/plugins/terraform-credentials-terracreds"));
        assert_eq!(paths.cli_config, Path::new("/home/dev/.terraformrc"));
    }

    #[test]
    fn test_windows_layout() {
        let profile = Path::new("roaming");
        let paths = TerraformPaths::for_platform(Platform::Windows, profile);
        assert_eq!(paths.plugin_dir, profile.join("terraform.d").join("plugins"));
        assert!(paths.binary.ends_with("terraform-credentials-terracreds.exe"));
        assert_eq!(paths.cli_config, profile.join("terraform.rc"));
    }

    #[test]
    fn test_install_plugin_copies_binary() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("terracreds");
        std::fs::write(&source, b"binary").unwrap();

        let paths = TerraformPaths::for_platform(Platform::Linux, &dir.path().join("home"));
        install_plugin(&source, &paths).unwrap();
        assert_eq!(std::fs::read(&paths.binary).unwrap(), b"binary");
    }

    #[test]
    fn test_cli_config_written_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".terraformrc");

        assert!(write_cli_config(&path, false, &mut Cursor::new("")).unwrap());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("credentials_helper \"terracreds\""));
    }

    #[test]
    fn test_existing_cli_config_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".terraformrc");
        std::fs::write(&path, "plugin_cache_dir = \"/tmp\"\n").unwrap();

        assert!(!write_cli_config(&path, false, &mut Cursor::new("\n")).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("plugin_cache_dir"));

        assert!(write_cli_config(&path, true, &mut Cursor::new("")).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CLI_CONFIG_BLOCK);
    }
}
