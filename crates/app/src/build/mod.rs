//! One-shot asset build: bundle the browser player and stage widget pages.

pub mod minify;
pub mod sourcemap;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use minify::{minify, SourceLine};
use sourcemap::{encode_mappings, SourceMap};

pub const BUNDLE_FILE: &str = "tutorial-video-player.js";

/// Input and output locations, all derived from a project root.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub entry: PathBuf,
    pub dist_dir: PathBuf,
    pub widgets_src: PathBuf,
    pub widgets_out: PathBuf,
}

impl BuildPaths {
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            entry: root.join("web").join("src").join("index.js"),
            dist_dir: root.join("web").join("dist"),
            widgets_src: root.join("widgets").join("src"),
            widgets_out: root.join("widgets").join("assets"),
        }
    }
}

/// What a bundle run wrote.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    pub script_path: PathBuf,
    pub map_path: PathBuf,
    pub modules: Vec<String>,
    pub bytes: usize,
}

struct Module {
    name: String,
    text: String,
}

/// `'./x.js'` of an `import` statement line, if the line is one.
fn import_specifier(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("import")?;
    if !rest.starts_with(|c: char| matches!(c, ' ' | '\'' | '"' | '{' | '*')) {
        return None;
    }
    let tail = match rest.rfind(" from ") {
        Some(pos) => &rest[pos + " from ".len()..],
        None => rest,
    }
    .trim_start();
    let quote = tail.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = &tail[1..];
    let end = body.find(quote)?;
    Some(&body[..end])
}

fn module_name(path: &Path, root: &Path) -> Result<String, AppError> {
    let rel = path.strip_prefix(root).map_err(|_| {
        AppError::Build(format!(
            "{} is outside the source root {}",
            path.display(),
            root.display()
        ))
    })?;
    Ok(rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Depth-first walk of relative imports. Dependencies land before their
/// dependents and each module once.
fn collect(
    path: &Path,
    root: &Path,
    visited: &mut HashSet<PathBuf>,
    active: &mut Vec<PathBuf>,
    out: &mut Vec<Module>,
) -> Result<(), AppError> {
    if active.iter().any(|p| p == path) {
        return Err(AppError::Build(format!("circular import of {}", path.display())));
    }
    if !visited.insert(path.to_path_buf()) {
        return Ok(());
    }

    let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    let name = module_name(path, root)?;
    active.push(path.to_path_buf());

    for spec in text.lines().filter_map(import_specifier) {
        if !(spec.starts_with("./") || spec.starts_with("../")) {
            return Err(AppError::Build(format!(
                "{}: cannot bundle package import '{}'",
                name, spec
            )));
        }
        let dir = path.parent().unwrap_or(root);
        let target = dir.join(spec);
        let target = target.canonicalize().map_err(|e| AppError::io(&target, e))?;
        collect(&target, root, visited, active, out)?;
    }

    active.pop();
    out.push(Module { name, text });
    Ok(())
}

/// Rewrite an exporting declaration of a dependency into a local one.
/// `None` drops the line.
fn unexport(line: &str) -> Result<Option<&str>, String> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("export {") || trimmed.starts_with("export{") {
        return Ok(None);
    }
    if trimmed.starts_with("export default") {
        return Err("default exports are only supported in the entry module".into());
    }
    Ok(Some(trimmed.strip_prefix("export ").unwrap_or(line)))
}

/// Bundle `entry` and its relative imports into `dist_dir`, writing the
/// script and its source map. Output is deterministic for a given tree.
pub fn bundle(entry: &Path, dist_dir: &Path) -> Result<BundleOutput, AppError> {
    let entry = entry
        .canonicalize()
        .map_err(|e| AppError::io(entry, e))?;
    let root = entry
        .parent()
        .ok_or_else(|| AppError::Build(format!("entry {} has no parent directory", entry.display())))?
        .to_path_buf();

    let mut modules = Vec::new();
    collect(&entry, &root, &mut HashSet::new(), &mut Vec::new(), &mut modules)?;
    let names: Vec<String> = modules.iter().map(|m| m.name.clone()).collect();
    let entry_index = modules.len() - 1;

    let mut input = Vec::new();
    for (source, module) in modules.iter().enumerate() {
        for (line, text) in module.text.lines().enumerate() {
            if import_specifier(text).is_some() {
                continue;
            }
            let text = if source == entry_index {
                text
            } else {
                match unexport(text) {
                    Ok(Some(t)) => t,
                    Ok(None) => continue,
                    Err(msg) => {
                        return Err(AppError::Build(format!("{}:{}: {}", module.name, line + 1, msg)))
                    }
                }
            };
            input.push(SourceLine { source, line, text });
        }
    }

    let lines = minify(input, &names)?;

    let map_file = format!("{}.map", BUNDLE_FILE);
    let mut script = String::new();
    let mut mappings = Vec::with_capacity(lines.len() + 1);
    for line in lines {
        script.push_str(&line.text);
        script.push('\n');
        mappings.push(line.mappings);
    }
    script.push_str(&format!("//# sourceMappingURL={}\n", map_file));
    mappings.push(Vec::new());

    let map = SourceMap {
        version: 3,
        file: BUNDLE_FILE.into(),
        sources: names.clone(),
        sources_content: modules.into_iter().map(|m| m.text).collect(),
        names: Vec::new(),
        mappings: encode_mappings(&mappings),
    };

    std::fs::create_dir_all(dist_dir).map_err(|e| AppError::io(dist_dir, e))?;
    let script_path = dist_dir.join(BUNDLE_FILE);
    let map_path = dist_dir.join(&map_file);
    std::fs::write(&script_path, &script).map_err(|e| AppError::io(&script_path, e))?;
    std::fs::write(&map_path, serde_json::to_vec(&map)?).map_err(|e| AppError::io(&map_path, e))?;

    tracing::info!(path = %script_path.display(), modules = names.len(), bytes = script.len(), "bundle written");
    Ok(BundleOutput {
        script_path,
        map_path,
        modules: names,
        bytes: script.len(),
    })
}

/// Copy every `*.html` in `src` to `out`, in name order. Returns the names.
pub fn build_widgets(src: &Path, out: &Path) -> Result<Vec<String>, AppError> {
    std::fs::create_dir_all(out).map_err(|e| AppError::io(out, e))?;

    let mut pages: Vec<String> = std::fs::read_dir(src)
        .map_err(|e| AppError::io(src, e))?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.ends_with(".html"))
        .collect();
    pages.sort();

    for page in &pages {
        let from = src.join(page);
        std::fs::copy(&from, out.join(page)).map_err(|e| AppError::io(&from, e))?;
        tracing::info!(widget = %page, "widget built");
    }
    Ok(pages)
}

/// Run both build tasks.
pub fn run_all(paths: &BuildPaths) -> Result<(BundleOutput, Vec<String>), AppError> {
    let bundle = bundle(&paths.entry, &paths.dist_dir)?;
    let widgets = build_widgets(&paths.widgets_src, &paths.widgets_out)?;
    Ok((bundle, widgets))
}
