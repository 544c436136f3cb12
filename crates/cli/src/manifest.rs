use anyhow::{Context, Result, bail};
use argkit::{Command, Invocation, Opt, Program, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MANIFEST_NAME: &str = "argkit.json";

/// Handler attached to every command declared in a manifest.
pub type ManifestAction = fn(&Invocation) -> Result<()>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Match flag spellings case-sensitively.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict: bool,

    /// Global options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionManifest>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandManifest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionManifest {
    /// Declaration such as `--output, -o`.
    pub flags: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Integer, boolean, string, or a list of those.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandManifest {
    /// Declaration such as `install <pkg> [dir]`.
    pub usage: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionManifest>,
}

#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub path: PathBuf,
    pub manifest: Manifest,
}

impl OptionManifest {
    fn to_opt(&self) -> Result<Opt> {
        let opt = Opt::new(self.flags.as_str(), self.description.as_str())
            .with_context(|| format!("invalid option declaration: {:?}", self.flags))?;
        let Some(raw) = &self.default else {
            return Ok(opt);
        };
        let value: Value = serde_json::from_value(raw.clone()).with_context(|| {
            format!(
                "invalid default {raw} for option {:?}: expected an integer, boolean, string or a list of those",
                self.flags
            )
        })?;
        Ok(opt.default_value(value))
    }
}

impl CommandManifest {
    fn to_command(&self, action: ManifestAction) -> Result<Command> {
        let mut cmd = Command::new(self.usage.as_str())
            .with_context(|| format!("invalid command declaration: {:?}", self.usage))?
            .describe(self.description.as_str());
        for alias in &self.aliases {
            cmd = cmd.alias(alias.as_str());
        }
        for opt in &self.options {
            cmd = cmd.option(opt.to_opt()?);
        }
        Ok(cmd.action(action))
    }
}

impl Manifest {
    /// Build a [`Program`] whose commands (and fallback) all run `action`.
    pub fn to_program(&self, action: ManifestAction) -> Result<Program> {
        let name = self.name.as_deref().unwrap_or("argkit");
        let mut program = Program::new(name).strict(self.strict);
        if let Some(version) = &self.version {
            program = program.version(version.as_str());
        }
        for opt in &self.options {
            program = program.option(opt.to_opt()?);
        }
        for cmd in &self.commands {
            program = program.command(cmd.to_command(action)?);
        }
        program.validate().context("invalid manifest")?;
        Ok(program.action(action))
    }
}

pub fn load_manifest(manifest_path: Option<&Path>) -> Result<Option<LoadedManifest>> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let (path, explicit) = match manifest_path {
        Some(p) => (resolve_against(&cwd, p), true),
        None => (cwd.join(DEFAULT_MANIFEST_NAME), false),
    };

    if !path.exists() {
        if explicit {
            bail!("manifest not found: {}", path.display());
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    let manifest: Manifest = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse manifest JSON: {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded manifest");
    Ok(Some(LoadedManifest { path, manifest }))
}

pub fn default_manifest(name: &str) -> Manifest {
    Manifest {
        name: Some(name.to_string()),
        version: Some("0.1.0".to_string()),
        strict: false,
        options: vec![OptionManifest {
            flags: "--debug, -d".to_string(),
            description: "Enable debug output".to_string(),
            default: None,
        }],
        commands: vec![CommandManifest {
            usage: "hello <name>".to_string(),
            description: "Greets the user".to_string(),
            aliases: vec!["hi".to_string()],
            options: vec![OptionManifest {
                flags: "--greet, -g".to_string(),
                description: "Greet message".to_string(),
                default: Some(serde_json::json!("Hello")),
            }],
        }],
    }
}

pub fn write_default_manifest(
    project_dir: &Path,
    name: Option<&str>,
    overwrite: bool,
) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_MANIFEST_NAME);
    if dest.exists() && !overwrite {
        bail!(
            "{} already exists (use --force to overwrite)",
            dest.display()
        );
    }

    let project_name = match name {
        Some(name) => name.to_string(),
        None => guess_project_name(project_dir).unwrap_or_else(|| "my-cli".to_string()),
    };
    let manifest = default_manifest(&project_name);

    let bytes = serde_json::to_vec_pretty(&manifest).context("failed to serialize manifest")?;
    let mut out = String::from_utf8(bytes).context("manifest is not valid UTF-8")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if overwrite && dest.exists() {
        fs::remove_file(&dest).with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn guess_project_name(project_dir: &Path) -> Option<String> {
    // `.` and `..` carry no name; fall back to the current directory.
    let file_name = project_dir.file_name().and_then(|s| s.to_str());
    let direct = file_name.filter(|s| !s.is_empty() && *s != "." && *s != "..");
    if let Some(name) = direct {
        return Some(name.to_string());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
}
