use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use bridge_core::{LOCAL_BASE, ROUTE_PREFIX};
use serde::Serialize;

use self::template::{WrapperContext, WrapperTemplates, comment_safe, js_single_quoted};

pub mod template;

/// Directory names never descended into: VCS metadata, dependency caches,
/// build output and the generator's own output tree.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    ".next",
    ".nuxt",
    ".svelte-kit",
    ".vercel",
    ".netlify",
    "api",
];

/// Path segment that marks a legacy function directory.
pub const FUNCTION_MARKER: &str = "/netlify/functions/";

/// Output directory, relative to the scan root.
pub const OUTPUT_DIR: &str = "api/netlify";

const TYPESCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];
const JAVASCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs"];

/// Every extension a wrapper can be written with. A route name is taken as
/// soon as a wrapper with any of them exists.
const WRAPPER_EXTENSIONS: &[&str] = &["ts", "js"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    TypeScript,
    JavaScript,
}

impl Language {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if TYPESCRIPT_EXTENSIONS.contains(&ext) {
            Some(Self::TypeScript)
        } else if JAVASCRIPT_EXTENSIONS.contains(&ext) {
            Some(Self::JavaScript)
        } else {
            None
        }
    }

    pub fn wrapper_extension(self) -> &'static str {
        match self {
            Self::TypeScript => "ts",
            Self::JavaScript => "js",
        }
    }

    fn template_name(self) -> &'static str {
        match self {
            Self::TypeScript => "wrapper.ts",
            Self::JavaScript => "wrapper.js",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredModule {
    pub source_path: PathBuf,
    pub derived_base_name: String,
    pub generated_wrapper_path: PathBuf,
}

/// Route names already claimed during one generation run.
#[derive(Debug, Default)]
pub struct NamingRegistry {
    claimed: HashSet<String>,
}

impl NamingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `<out_dir>/<base>.<ext>`, or the first free `<base>-N.<ext>`.
    /// A name is taken when it was claimed earlier in this run or a wrapper
    /// with that stem and any wrapper extension exists on disk, so a `.js`
    /// and a `.ts` wrapper never share a route.
    pub fn claim(
        &mut self,
        out_dir: &Path,
        base: &str,
        ext: &str,
        exists: impl Fn(&Path) -> bool,
    ) -> PathBuf {
        let taken = |stem: &str| {
            self.claimed.contains(stem)
                || WRAPPER_EXTENSIONS
                    .iter()
                    .any(|wrapper_ext| exists(&out_dir.join(format!("{stem}.{wrapper_ext}"))))
        };
        let mut stem = base.to_string();
        let mut suffix = 1;
        while taken(&stem) {
            stem = format!("{base}-{suffix}");
            suffix += 1;
        }
        let candidate = out_dir.join(format!("{stem}.{ext}"));
        if suffix > 1 {
            tracing::warn!(
                base,
                wrapper = %candidate.display(),
                "wrapper name taken, using suffixed name"
            );
        }
        self.claimed.insert(stem);
        candidate
    }
}

/// A wrapper ready to be written. Paths are relative to the scan root.
#[derive(Clone, Debug)]
pub struct GeneratedWrapper {
    pub module: DiscoveredModule,
    pub route: String,
    pub contents: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct GenerationSummary {
    pub count: usize,
    pub created: Vec<CreatedWrapper>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CreatedWrapper {
    pub src: String,
    pub wrapper: String,
}

/// Walks `root` and returns every legacy function module, relative to
/// `root`, sorted.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(root, root, &mut found)?;
    found.sort();
    found.dedup();
    Ok(found)
}

fn walk(root: &Path, dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if file_type.is_dir() {
            let skipped = entry
                .file_name()
                .to_str()
                .is_some_and(|name| SKIP_DIRS.contains(&name));
            if !skipped {
                walk(root, &path, found)?;
            }
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        if is_function_module(&relative) {
            found.push(relative);
        }
    }
    Ok(())
}

/// True when `relative` sits under a `netlify/functions` directory and has
/// a script extension. Type declaration files never hold a handler.
pub fn is_function_module(relative: &Path) -> bool {
    let normalized = format!("/{}", slash_path(relative));
    normalized.contains(FUNCTION_MARKER)
        && !normalized.ends_with(".d.ts")
        && Language::from_path(relative).is_some()
}

/// Turns scan results into wrapper descriptors without touching disk;
/// `exists` answers whether a root-relative path is already present.
pub fn plan(
    sources: &[PathBuf],
    registry: &mut NamingRegistry,
    exists: impl Fn(&Path) -> bool,
) -> Result<Vec<GeneratedWrapper>> {
    let templates = WrapperTemplates::new()?;
    let out_dir = Path::new(OUTPUT_DIR);
    let mut wrappers = Vec::with_capacity(sources.len());

    for source in sources {
        let Some(language) = Language::from_path(source) else {
            continue;
        };
        let base = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .with_context(|| format!("source {} has no usable file name", source.display()))?
            .to_string();
        let wrapper_path = registry.claim(out_dir, &base, language.wrapper_extension(), &exists);
        let route = wrapper_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&base)
            .to_string();
        let import_path = import_path(out_dir, source);
        let source_display = comment_safe(&slash_path(source));
        let route_path = comment_safe(&format!("{ROUTE_PREFIX}{route}"));
        let quoted_import = js_single_quoted(&import_path);
        let contents = templates.render(
            language,
            &WrapperContext {
                source: &source_display,
                route: &route_path,
                missing_message: format!("No Netlify handler export in {quoted_import}"),
                import_path: quoted_import,
                local_base: LOCAL_BASE,
            },
        )?;

        wrappers.push(GeneratedWrapper {
            module: DiscoveredModule {
                source_path: source.clone(),
                derived_base_name: base,
                generated_wrapper_path: wrapper_path,
            },
            route,
            contents,
        });
    }
    Ok(wrappers)
}

/// Writes every wrapper under `root`, creating the output directory first.
/// Stops at the first I/O error; files already written stay.
pub fn write_wrappers(root: &Path, wrappers: &[GeneratedWrapper]) -> Result<GenerationSummary> {
    let out_dir = root.join(OUTPUT_DIR);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.display()))?;

    let mut created = Vec::with_capacity(wrappers.len());
    for wrapper in wrappers {
        let target = root.join(&wrapper.module.generated_wrapper_path);
        fs::write(&target, &wrapper.contents)
            .with_context(|| format!("failed to write {}", target.display()))?;
        tracing::debug!(
            src = %wrapper.module.source_path.display(),
            wrapper = %target.display(),
            "wrote wrapper"
        );
        created.push(CreatedWrapper {
            src: slash_path(&wrapper.module.source_path),
            wrapper: slash_path(&wrapper.module.generated_wrapper_path),
        });
    }

    Ok(GenerationSummary {
        count: created.len(),
        created,
    })
}

/// Full run: discover under `root`, plan against what is on disk, write.
pub fn generate(root: &Path) -> Result<GenerationSummary> {
    let sources = discover(root)?;
    tracing::info!(root = %root.display(), modules = sources.len(), "discovered legacy functions");
    let mut registry = NamingRegistry::new();
    let wrappers = plan(&sources, &mut registry, |path| root.join(path).exists())?;
    write_wrappers(root, &wrappers)
}

/// Import specifier for `source` as seen from a file inside `from_dir`.
/// Both paths are relative to the same root.
pub fn import_path(from_dir: &Path, source: &Path) -> String {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = source.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
