use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::debug;

use crate::error::ConfigError;
use crate::load::{self, Format, parse_config};
use crate::model::{ConfigFile, OverrideBlock, PresetRef, is_path_like};
use crate::preset::{Preset, PresetRegistry};
use crate::resolve::{ResolvedConfig, resolve};

pub const CONFIG_FILE_ENV: &str = "LINTRC_CONFIG_FILE";
pub const PROJECT_CONFIG_NAMES: [&str; 5] = [
    ".lintrc",
    ".lintrc.yaml",
    ".lintrc.yml",
    ".lintrc.json",
    ".lintrc.toml",
];
const INLINE_ORIGIN: &str = "<inline>";

/// Minimal environment abstraction used by tests to cover file system and env-var behavior.
pub trait Env {
    /// Current working directory.
    fn current_dir(&self) -> PathBuf;
    /// Platform configuration directory (e.g., XDG config dir).
    fn config_dir(&self) -> Option<PathBuf>;
    /// Read and decode file contents.
    ///
    /// # Errors
    /// Returns an error string when the file cannot be read or decoded.
    fn read_to_string(&self, p: &Path) -> Result<String, String>;
    fn path_exists(&self, p: &Path) -> bool;
    fn env_var(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnv;

impl Env for SystemEnv {
    fn current_dir(&self) -> PathBuf {
        PathBuf::from(".")
    }
    fn config_dir(&self) -> Option<PathBuf> {
        dirs_next::config_dir()
    }
    fn read_to_string(&self, p: &Path) -> Result<String, String> {
        let bytes = fs::read(p).map_err(|e| e.to_string())?;
        load::decode(&bytes)
    }
    fn path_exists(&self, p: &Path) -> bool {
        p.exists()
    }
    fn env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

#[derive(Debug, Clone)]
struct CompiledOverride {
    block: OverrideBlock,
    files: GlobSet,
    excluded: Option<GlobSet>,
}

impl CompiledOverride {
    fn matches(&self, rel: &Path) -> bool {
        self.files.is_match(rel) && !self.excluded.as_ref().is_some_and(|ex| ex.is_match(rel))
    }
}

/// A loaded configuration file together with every preset it can reach.
///
/// The base resolution is computed once at load time; per-file resolutions
/// layer matching `overrides` blocks on a copy of it.
#[derive(Debug, Clone)]
pub struct LintConfig {
    file: ConfigFile,
    presets: PresetRegistry,
    ignore_matcher: Option<Gitignore>,
    overrides: Vec<CompiledOverride>,
    resolved: ResolvedConfig,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            file: ConfigFile::default(),
            presets: PresetRegistry::with_builtins(),
            ignore_matcher: None,
            overrides: Vec::new(),
            resolved: ResolvedConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub config_data: Option<String>,
}

impl LintConfig {
    /// Parse configuration data without filesystem access.
    ///
    /// # Errors
    /// Returns an error when the data does not parse, or when `extends` names
    /// a preset file (which requires filesystem access).
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Self::load(s, Format::Yaml, INLINE_ORIGIN, None, Path::new(""))
    }

    /// Parse configuration data, loading preset files through `envx`
    /// relative to `base_dir`.
    ///
    /// # Errors
    /// Returns an error when the data or a referenced preset file cannot be
    /// read or parsed, or a pattern in `ignorePatterns`/`overrides` is invalid.
    pub fn load(
        text: &str,
        format: Format,
        origin: &str,
        envx: Option<&dyn Env>,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let file = parse_config(text, format, origin)?;
        let mut presets = PresetRegistry::with_builtins();
        let mut loading = Vec::new();
        load_path_presets(&mut presets, file.extends.as_slice(), envx, base_dir, &mut loading)?;
        for block in &file.overrides {
            load_path_presets(&mut presets, block.extends.as_slice(), envx, base_dir, &mut loading)?;
        }

        let ignore_matcher = build_ignore_matcher(file.ignore_patterns.as_slice(), base_dir, origin)?;
        let overrides = file
            .overrides
            .iter()
            .map(|block| compile_override(block, origin))
            .collect::<Result<Vec<_>, _>>()?;

        let resolved = resolve_base(&file, &presets);
        if !resolved.unresolved.is_empty() {
            debug!(origin, unresolved = ?resolved.unresolved, "presets left for the engine");
        }

        Ok(Self {
            file,
            presets,
            ignore_matcher,
            overrides,
            resolved,
        })
    }

    #[must_use]
    pub const fn file(&self) -> &ConfigFile {
        &self.file
    }

    #[must_use]
    pub const fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    /// The configuration with no per-file overrides applied.
    #[must_use]
    pub const fn resolved(&self) -> &ResolvedConfig {
        &self.resolved
    }

    #[must_use]
    pub fn ignore_patterns(&self) -> &[String] {
        self.file.ignore_patterns.as_slice()
    }

    /// Resolution for one file: the base plus every `overrides` block whose
    /// globs match `path` relative to `base_dir`, in declaration order.
    #[must_use]
    pub fn resolve_for(&self, path: &Path, base_dir: &Path) -> ResolvedConfig {
        let rel = relative_to(path, base_dir);
        let mut out = self.resolved.clone();
        for compiled in self.overrides.iter().filter(|o| o.matches(&rel)) {
            out.apply(compiled.block.layer(), &self.presets);
        }
        out
    }

    /// Returns true when `path` should be ignored according to `ignorePatterns`.
    /// Matching is performed on the path relative to `base_dir`.
    #[must_use]
    pub fn is_file_ignored(&self, path: &Path, base_dir: &Path) -> bool {
        let Some(matcher) = &self.ignore_matcher else {
            return false;
        };
        let rel = relative_to(path, base_dir);
        // Patterns are anchored at base_dir; a path outside it cannot match.
        if rel.has_root() {
            return false;
        }
        matcher.matched_path_or_any_parents(&rel, false).is_ignore()
    }
}

fn resolve_base(file: &ConfigFile, presets: &PresetRegistry) -> ResolvedConfig {
    let mut out = resolve(
        file.extends.as_slice(),
        &file.env,
        &file.globals,
        &file.rules,
        presets,
    );
    out.extra.extend(file.extra.clone());
    out
}

/// Load every path-like preset in `refs` into `registry`.
///
/// Top-level references are registered under the identifier as written.
/// References inside preset files are rewritten to the resolved path so
/// that equal relative names in different directories stay distinct.
fn load_path_presets(
    registry: &mut PresetRegistry,
    refs: &[PresetRef],
    envx: Option<&dyn Env>,
    base_dir: &Path,
    loading: &mut Vec<PathBuf>,
) -> Result<(), ConfigError> {
    for id in refs.iter().filter_map(PresetRef::as_id) {
        if !is_path_like(id) || registry.contains(id) {
            continue;
        }
        let Some(envx) = envx else {
            return Err(ConfigError::invalid(
                INLINE_ORIGIN,
                format!("extends '{id}' requires filesystem access for resolution"),
            ));
        };
        let resolved = resolve_extend_path(id, envx, Some(base_dir));
        let key = preset_key(&resolved);
        if !registry.contains(&key) {
            let preset = load_preset_file(registry, &resolved, envx, loading)?;
            registry.insert(key.clone(), preset);
        }
        if let Some(preset) = registry.get_cloned(&key) {
            registry.insert(id, preset);
        }
    }
    Ok(())
}

fn load_preset_file(
    registry: &mut PresetRegistry,
    path: &Path,
    envx: &dyn Env,
    loading: &mut Vec<PathBuf>,
) -> Result<Preset, ConfigError> {
    let text = envx.read_to_string(path).map_err(|message| ConfigError::Read {
        path: path.to_path_buf(),
        message,
    })?;
    let origin = path.display().to_string();
    let mut preset = Preset::from(parse_config(&text, Format::from_path(path), &origin)?);
    debug!(preset = %origin, "loaded preset file");

    let parent = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
    loading.push(path.to_path_buf());
    for reference in &mut preset.extends {
        let Some(id) = reference.as_id().filter(|id| is_path_like(id)) else {
            continue;
        };
        let nested = resolve_extend_path(id, envx, Some(&parent));
        let key = preset_key(&nested);
        // A file already on the loading stack is a cycle; the resolver
        // reports it when it meets the same key again.
        if !registry.contains(&key) && !loading.contains(&nested) {
            let inner = load_preset_file(registry, &nested, envx, loading)?;
            registry.insert(key.clone(), inner);
        }
        *reference = PresetRef::from(key);
    }
    loading.pop();
    Ok(preset)
}

fn preset_key(path: &Path) -> String {
    normalize(path).display().to_string()
}

fn build_ignore_matcher(
    patterns: &[String],
    base_dir: &Path,
    origin: &str,
) -> Result<Option<Gitignore>, ConfigError> {
    let mut builder = GitignoreBuilder::new(base_dir);
    let mut any_pattern = false;
    for pat in patterns {
        for line in pat.lines() {
            let normalized = line.trim_end_matches(['\r']);
            if normalized.trim().is_empty() {
                continue;
            }
            builder.add_line(None, normalized).map_err(|err| {
                ConfigError::invalid(
                    origin,
                    format!("ignore pattern '{normalized}' is invalid: {err}"),
                )
            })?;
            any_pattern = true;
        }
    }
    if !any_pattern {
        return Ok(None);
    }
    builder
        .build()
        .map(Some)
        .map_err(|err| ConfigError::invalid(origin, format!("ignorePatterns: {err}")))
}

fn compile_override(block: &OverrideBlock, origin: &str) -> Result<CompiledOverride, ConfigError> {
    if block.files.is_empty() {
        return Err(ConfigError::invalid(
            origin,
            "overrides entries need at least one pattern in 'files'",
        ));
    }
    let files = build_globset(block.files.as_slice(), origin)?;
    let excluded = if block.excluded_files.is_empty() {
        None
    } else {
        Some(build_globset(block.excluded_files.as_slice(), origin)?)
    };
    Ok(CompiledOverride {
        block: block.clone(),
        files,
        excluded,
    })
}

fn build_globset(patterns: &[String], origin: &str) -> Result<GlobSet, ConfigError> {
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        let normalized = pat.strip_prefix("./").unwrap_or(pat);
        let glob = Glob::new(normalized).map_err(|err| {
            ConfigError::invalid(origin, format!("overrides pattern '{pat}' is invalid: {err}"))
        })?;
        b.add(glob);
    }
    b.build()
        .map_err(|err| ConfigError::invalid(origin, format!("overrides patterns: {err}")))
}

fn resolve_extend_path(entry: &str, envx: &dyn Env, base_dir: Option<&Path>) -> PathBuf {
    let candidate = PathBuf::from(entry);
    if candidate.is_absolute() {
        return normalize(&candidate);
    }
    if let Some(joined) = base_dir
        .map(|base| normalize(&base.join(&candidate)))
        .filter(|candidate| envx.path_exists(candidate))
    {
        return joined;
    }
    let cwd = envx.current_dir();
    let fallback = normalize(&cwd.join(&candidate));
    if envx.path_exists(&fallback) {
        fallback
    } else {
        base_dir.map_or_else(|| candidate.clone(), |base| normalize(&base.join(&candidate)))
    }
}

// Collecting the components drops interior `.` segments.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// `path` relative to `base_dir`, with `.` segments dropped on both sides so
/// `./sub` and `sub` name the same directory. Paths outside `base_dir` are
/// returned unchanged.
fn relative_to(path: &Path, base_dir: &Path) -> PathBuf {
    let path = without_cur_dir(path);
    let base = without_cur_dir(base_dir);
    path.strip_prefix(&base)
        .map_or_else(|_| path.clone(), Path::to_path_buf)
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|part| !matches!(part, Component::CurDir))
        .collect()
}

/// Result of configuration discovery.
#[derive(Debug, Clone)]
pub struct ConfigContext {
    pub config: LintConfig,
    pub base_dir: PathBuf,
    pub source: Option<PathBuf>,
}

impl ConfigContext {
    #[must_use]
    pub fn resolve_for(&self, path: &Path) -> ResolvedConfig {
        self.config.resolve_for(path, &self.base_dir)
    }

    #[must_use]
    pub fn is_file_ignored(&self, path: &Path) -> bool {
        self.config.is_file_ignored(path, &self.base_dir)
    }
}

fn default_context(base_dir: PathBuf) -> ConfigContext {
    ConfigContext {
        config: LintConfig::default(),
        base_dir,
        source: None,
    }
}

fn load_context(
    envx: &dyn Env,
    data: &str,
    format: Format,
    base_dir: PathBuf,
    source: Option<PathBuf>,
) -> Result<ConfigContext, ConfigError> {
    let origin = source
        .as_ref()
        .map_or_else(|| INLINE_ORIGIN.to_string(), |p| p.display().to_string());
    let config = LintConfig::load(data, format, &origin, Some(envx), &base_dir)?;
    debug!(origin, base_dir = %base_dir.display(), "configuration loaded");
    Ok(ConfigContext {
        config,
        base_dir,
        source,
    })
}

fn ctx_from_config_path_core(envx: &dyn Env, p: &Path) -> Result<ConfigContext, ConfigError> {
    let data = envx.read_to_string(p).map_err(|message| ConfigError::Read {
        path: p.to_path_buf(),
        message,
    })?;
    let base = p
        .parent()
        .map_or_else(|| envx.current_dir(), Path::to_path_buf);
    load_context(envx, &data, Format::from_path(p), base, Some(p.to_path_buf()))
}

/// Discover configuration with precedence:
/// config-data > config-file > project > env var > user-global > defaults.
///
/// # Errors
/// Returns an error when a config file cannot be read or parsed.
pub fn discover_config(
    inputs: &[PathBuf],
    overrides: &Overrides,
) -> Result<ConfigContext, ConfigError> {
    discover_config_with(inputs, overrides, &SystemEnv)
}

/// Discover configuration using a provided `Env` implementation.
///
/// # Errors
/// Returns an error when a configuration file cannot be read or parsed.
pub fn discover_config_with(
    inputs: &[PathBuf],
    overrides: &Overrides,
    envx: &dyn Env,
) -> Result<ConfigContext, ConfigError> {
    if let Some(ref data) = overrides.config_data {
        return load_context(envx, data, Format::Yaml, envx.current_dir(), None);
    }
    if let Some(ref file) = overrides.config_file {
        return ctx_from_config_path_core(envx, file);
    }
    if let Some(cfg_path) = find_project_config_core(envx, inputs) {
        return ctx_from_config_path_core(envx, &cfg_path);
    }
    if let Some(ctx) = try_env_config_core(envx)? {
        return Ok(ctx);
    }
    let cwd = envx.current_dir();
    Ok(try_user_global_core(envx, &cwd)?.unwrap_or_else(|| default_context(cwd)))
}

/// Variant of `discover_config` with injectable environment-variable lookup.
///
/// # Errors
/// Returns an error when a config file cannot be read or parsed.
pub fn discover_config_with_env(
    inputs: &[PathBuf],
    overrides: &Overrides,
    env_get: &dyn Fn(&str) -> Option<String>,
) -> Result<ConfigContext, ConfigError> {
    struct ClosureEnv<'a> {
        get: &'a dyn Fn(&str) -> Option<String>,
    }
    impl Env for ClosureEnv<'_> {
        fn current_dir(&self) -> PathBuf {
            SystemEnv.current_dir()
        }
        fn config_dir(&self) -> Option<PathBuf> {
            SystemEnv.config_dir()
        }
        fn read_to_string(&self, p: &Path) -> Result<String, String> {
            SystemEnv.read_to_string(p)
        }
        fn path_exists(&self, p: &Path) -> bool {
            SystemEnv.path_exists(p)
        }
        fn env_var(&self, key: &str) -> Option<String> {
            (self.get)(key)
        }
    }
    discover_config_with(inputs, overrides, &ClosureEnv { get: env_get })
}

/// Discover the effective config for a single file, ignoring env/global overrides.
/// Precedence: nearest project config up-tree from the file's directory,
/// then user-global, then defaults.
///
/// # Errors
/// Returns an error when a config file cannot be read or parsed.
pub fn discover_per_file(path: &Path) -> Result<ConfigContext, ConfigError> {
    discover_per_file_with(path, &SystemEnv)
}

/// Discover the effective config for a single file using a provided `Env`.
///
/// # Errors
/// Returns an error when a configuration file cannot be read or parsed.
pub fn discover_per_file_with(path: &Path, envx: &dyn Env) -> Result<ConfigContext, ConfigError> {
    let start_dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };

    if let Some(cfg_path) = find_project_config_core(envx, &[start_dir.to_path_buf()]) {
        return ctx_from_config_path_core(envx, &cfg_path);
    }
    Ok(try_user_global_core(envx, start_dir)?
        .unwrap_or_else(|| default_context(envx.current_dir())))
}

fn try_env_config_core(envx: &dyn Env) -> Result<Option<ConfigContext>, ConfigError> {
    envx.env_var(CONFIG_FILE_ENV)
        .map(PathBuf::from)
        .filter(|p| envx.path_exists(p))
        .map(|p| ctx_from_config_path_core(envx, &p))
        .transpose()
}

fn try_user_global_core(
    envx: &dyn Env,
    base_dir: &Path,
) -> Result<Option<ConfigContext>, ConfigError> {
    envx.config_dir()
        .map(|base| base.join("lintrc").join("config"))
        .filter(|p| envx.path_exists(p))
        .map(|p| {
            let data = envx.read_to_string(&p).map_err(|message| ConfigError::Read {
                path: p.clone(),
                message,
            })?;
            load_context(envx, &data, Format::Yaml, base_dir.to_path_buf(), Some(p))
        })
        .transpose()
}

fn find_project_config_core(envx: &dyn Env, inputs: &[PathBuf]) -> Option<PathBuf> {
    let mut starts: Vec<PathBuf> = Vec::new();
    let cwd = envx.current_dir();
    if inputs.is_empty() {
        starts.push(cwd.clone());
    } else {
        for p in inputs {
            let s = if p.is_dir() {
                p.clone()
            } else {
                p.parent().map_or_else(|| cwd.clone(), Path::to_path_buf)
            };
            let abs = if s.is_absolute() { s } else { cwd.join(s) };
            if !starts.iter().any(|e| e == &abs) {
                starts.push(abs);
            }
        }
    }
    let home_dir = envx
        .env_var("HOME")
        .map(PathBuf::from)
        .or_else(dirs_next::home_dir);
    let home_abs = home_dir.as_ref().map(|h| {
        if h.is_absolute() {
            h.clone()
        } else {
            cwd.join(h)
        }
    });
    for start in starts {
        let mut dir = start;
        loop {
            for name in PROJECT_CONFIG_NAMES {
                let cand = dir.join(name);
                if envx.path_exists(&cand) {
                    return Some(cand);
                }
            }
            if home_abs.as_ref().is_some_and(|home| home == &dir) {
                break;
            }
            match dir.parent() {
                Some(parent) if parent != dir && !parent.as_os_str().is_empty() => {
                    dir = parent.to_path_buf();
                }
                _ => break,
            }
        }
    }
    None
}
