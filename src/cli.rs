//! Minimal CLI: catalog files → (schema | check)
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use swagger_osi::{Catalog, CatalogFile, Definitions, Referenced, RenameRule, SchemaOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive OpenAPI 2.0 schema definitions from JSON type catalogs
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// derive the catalog roots and print `{definitions, schemas}`
    Schema(SchemaOut),
    /// derive every root and report failures, dangling and recursive definitions
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more catalog files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

/// Overrides for the catalog's `options` block.
#[derive(Args, Debug, Clone, Default)]
struct OptionSettings {
    /// rename rule for record field labels (e.g. camelCase)
    #[arg(long)]
    field_label: Option<RenameRule>,

    /// rename rule for sum variant tags
    #[arg(long)]
    constructor_tag: Option<RenameRule>,

    /// rename rule for definition names
    #[arg(long)]
    datatype_name: Option<RenameRule>,

    /// prefix removed from field names before renaming
    #[arg(long)]
    strip_field_prefix: Option<String>,

    /// give every single-field record the schema of its field
    #[arg(long)]
    unwrap_unary_records: bool,

    /// keep the object form for sums without payloads
    #[arg(long)]
    no_nullary_string_tag: bool,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    option_settings: OptionSettings,

    /// catalog key to derive; repeatable (catalog roots if omitted)
    #[arg(long = "root")]
    roots: Vec<String>,

    /// emit self-contained root schemas wherever no recursion is involved
    #[arg(long)]
    inline: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    option_settings: OptionSettings,
}

/// What `schema` prints: ready to drop into a Swagger document.
#[derive(Serialize)]
struct Fragment<'a> {
    definitions: &'a Definitions,
    schemas: IndexMap<String, Referenced>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> anyhow::Result<Catalog> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut catalog = Catalog::new();
        for source_path in source_paths {
            let shown = source_path.display();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read catalog file {shown}"))?;
            let file = CatalogFile::from_json(&source)
                .with_context(|| format!("failed to parse catalog file {shown}"))?;
            catalog
                .merge(file)
                .with_context(|| format!("failed to merge catalog file {shown}"))?;
            info!(path = %shown, shapes = catalog.shapes.len(), "loaded catalog");
        }
        Ok(catalog)
    }
}

impl OptionSettings {
    fn apply(&self, mut options: SchemaOptions) -> SchemaOptions {
        if let Some(rule) = self.field_label {
            options.field_label = rule;
        }
        if let Some(rule) = self.constructor_tag {
            options.constructor_tag = rule;
        }
        if let Some(rule) = self.datatype_name {
            options.datatype_name = rule;
        }
        if let Some(prefix) = &self.strip_field_prefix {
            options.strip_field_prefix = Some(prefix.clone());
        }
        if self.unwrap_unary_records {
            options.unwrap_unary_records = true;
        }
        if self.no_nullary_string_tag {
            options.all_nullary_to_string_tag = false;
        }
        options
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let catalog = target.input_settings.load()?;
                let options = target.option_settings.apply(catalog.options.clone());
                let generator = catalog.generator_with(options)?;
                let roots = if target.roots.is_empty() { &catalog.roots } else { &target.roots };

                let mut definitions = Definitions::new();
                let mut schemas = IndexMap::new();
                for root in roots {
                    let reference = generator
                        .declare_key(root, &mut definitions)
                        .with_context(|| format!("failed to derive `{root}`"))?;
                    schemas.insert(root.clone(), reference);
                }
                if target.inline {
                    schemas = schemas
                        .into_iter()
                        .map(|(root, reference)| (root, inline_root(&definitions, reference)))
                        .collect();
                }

                let fragment = Fragment { definitions: &definitions, schemas };
                let fragment_src = serde_json::to_string_pretty(&fragment)?;
                write_output(target.out.as_deref(), &fragment_src)
            }
            Command::Check(target) => {
                let catalog = target.input_settings.load()?;
                let options = target.option_settings.apply(catalog.options.clone());
                let generator = catalog.generator_with(options)?;

                let mut definitions = Definitions::new();
                let mut failures = 0usize;
                for root in &catalog.roots {
                    match generator.declare_key(root, &mut definitions) {
                        Ok(_) => println!("{} {root}", "ok".green()),
                        Err(error) => {
                            failures += 1;
                            println!("{} {root}: {error}", "failed".red());
                        }
                    }
                }
                for name in definitions.dangling() {
                    println!("{} dangling reference to `{name}`", "warning:".yellow());
                }
                let recursive: Vec<&str> = definitions.recursive().into_iter().collect();
                if !recursive.is_empty() {
                    println!("recursive definitions: {}", recursive.join(", "));
                }
                println!("{} definitions from {} roots", definitions.len(), catalog.roots.len());

                if failures > 0 {
                    bail!("{failures} of {} roots failed", catalog.roots.len());
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Root reference with every non-recursive definition spliced in.
fn inline_root(definitions: &Definitions, reference: Referenced) -> Referenced {
    let recursive = definitions.recursive();
    match reference {
        Referenced::Ref(name) if !recursive.contains(name.as_str()) => match definitions.get(&name) {
            Some(body) => Referenced::inline(definitions.inline_non_recursive(body.clone())),
            None => Referenced::Ref(name),
        },
        Referenced::Inline(schema) => Referenced::inline(definitions.inline_non_recursive(*schema)),
        other => other,
    }
}

fn write_output(out: Option<&Path>, src: &str) -> anyhow::Result<()> {
    let Some(out) = out else {
        println!("{src}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
