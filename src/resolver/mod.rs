//! The file dependency graph and the resolution passes that sit between the
//! definition pass and the body passes (§4.6 "Resolver").
//!
//! Grounded in `original_source/src/parser/namespace.cpp`'s `resolve_type`
//! (walking every `Unknown` leaf of a type tree against `get_type_from_str`
//! until none remain) and its aliased/private import bookkeeping: starting
//! from the root file, recursively lex and run the definition pass over
//! every file an import names, building a `FileNode` DAG (cycles permitted
//! and recorded, never rejected — §4.3 item 2). Once every file is in the
//! graph, imports are bound to target namespaces, every `Unknown` type
//! placeholder is resolved against the now-complete set of namespaces, and
//! finally the parser's body passes run file by file.
//!
//! Source buffers are leaked for the run's lifetime the same way this
//! crate's own test helpers already do (`parser::body_pass`'s tests leak a
//! `SourceCode` to hand `Lexer` a `'static` buffer): a front end keeps every
//! source file it has read alive until the whole compilation finishes
//! anyway, so there is no real buffer to free early, and leaking avoids
//! a self-referential `FileNode` owning both a buffer and slices into it.

use crate::ast::Definition;
use crate::context::CompilationContext;
use crate::error::{ErrorKind, ParseError};
use crate::hash::FileHash;
use crate::lexer::Lexer;
use crate::namespace::Namespace;
use crate::parser::{self, PendingBody};
use crate::source::SourceCode;
use crate::token::Token;
use crate::types::Type;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// One file's place in the graph: its namespace (post definition-pass), the
/// token stream it was built from (kept around so the body pass has
/// something to parse against), and the bodies the definition pass left
/// pending.
pub struct FileNode {
    pub hash: FileHash,
    pub path: PathBuf,
    pub namespace: Namespace,
    tokens: &'static [Token<'static>],
    pending: Vec<PendingBody>,
}

impl FileNode {
    pub fn tokens(&self) -> &'static [Token<'static>] {
        self.tokens
    }
}

/// A `A -> B` edge meaning "A imports B", recorded independent of whether
/// the import ever successfully resolves (§4.3 item 2: the dependency-graph
/// pass only needs enough information to know what to lex next).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: FileHash,
    pub to: FileHash,
}

pub struct DependencyGraph {
    pub root: FileHash,
    nodes: HashMap<FileHash, FileNode>,
    edges: Vec<Edge>,
    /// Import cycles detected while walking the graph (§2, §4.3 item 2:
    /// "cycles are permitted... but the resolver must detect and record
    /// them"). Each entry is the edge that closed a cycle.
    cycles: Vec<Edge>,
}

fn read_file(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path)
        .map_err(|e| ParseError::new(ErrorKind::ErrLex, 0, format!("failed to read {}: {e}", path.display())))
}

impl DependencyGraph {
    /// Build the graph starting from `root_path`, running the lexer and the
    /// definition pass on every transitively-imported file (§4.3 item 2).
    /// `minimal_tree` restricts expansion to aliased imports only, the
    /// correctness-compatible subset the LSP path uses (§4.6 "Minimal-tree
    /// mode"); a full compilation passes `false` and expands every import.
    pub fn build(root_path: &Path, ctx: &CompilationContext, minimal_tree: bool) -> Result<Self, ParseError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let root_hash = FileHash::from_path(root_path, &cwd);

        let mut graph = DependencyGraph {
            root: root_hash,
            nodes: HashMap::new(),
            edges: Vec::new(),
            cycles: Vec::new(),
        };
        let mut in_progress: HashSet<FileHash> = HashSet::new();
        graph.visit(root_path.to_path_buf(), root_hash, ctx, minimal_tree, &cwd, &mut in_progress)?;
        Ok(graph)
    }

    /// Lex and run the definition pass on one file, recording it and its
    /// imports before recursing into any import not already in the graph.
    /// `in_progress` tracks the current DFS path (not merely "already
    /// visited") so that a cycle closing back onto an ancestor still being
    /// expanded is recorded rather than missed — it is inserted on entry and
    /// removed only once every import this file reaches has been visited.
    fn visit(
        &mut self,
        path: PathBuf,
        hash: FileHash,
        ctx: &CompilationContext,
        minimal_tree: bool,
        cwd: &Path,
        in_progress: &mut HashSet<FileHash>,
    ) -> Result<(), ParseError> {
        if self.nodes.contains_key(&hash) {
            return Ok(());
        }
        in_progress.insert(hash);

        let text = read_file(&path)?;
        let leaked_text: &'static str = Box::leak(text.into_boxed_str());
        let source: &'static SourceCode<'static> = Box::leak(Box::new(SourceCode::new(leaked_text)));
        let lexer = Lexer::new(source, hash);
        let tokens = lexer.tokenize().map_err(|e| e.into_parse_error())?;
        let tokens: &'static [Token<'static>] = Box::leak(tokens.into_boxed_slice());

        let mut namespace = Namespace::new(hash, Some(path.to_string_lossy().into_owned()));
        let pending = parser::definition_pass::DefinitionPass::new(tokens, &mut namespace)
            .run()
            .map_err(|e| ParseError::new(ErrorKind::ErrParsing, 0, e.to_string()))?;

        let parent_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let imports: Vec<(String, bool)> = namespace
            .definitions
            .iter()
            .filter_map(|d| match d {
                Definition::Import(i) => Some((i.path.clone(), i.alias.is_some())),
                _ => None,
            })
            .collect();

        self.nodes.insert(hash, FileNode { hash, path, namespace, tokens, pending });

        for (import_str, is_aliased) in imports {
            if minimal_tree && !is_aliased {
                continue;
            }
            if is_core_module_name(&import_str, ctx) {
                continue; // no file to lex; bound directly in resolve_all_imports
            }
            let import_path = parent_dir.join(&import_str);
            let import_hash = FileHash::from_path(&import_path, cwd);
            self.edges.push(Edge { from: hash, to: import_hash });
            if in_progress.contains(&import_hash) {
                self.cycles.push(Edge { from: hash, to: import_hash });
                continue;
            }
            if !self.nodes.contains_key(&import_hash) {
                self.visit(import_path, import_hash, ctx, minimal_tree, cwd, in_progress)?;
            }
        }

        in_progress.remove(&hash);
        Ok(())
    }

    pub fn node(&self, hash: FileHash) -> Option<&FileNode> {
        self.nodes.get(&hash)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &FileNode> {
        self.nodes.values()
    }

    pub fn cycles(&self) -> &[Edge] {
        &self.cycles
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// §4.3 item 3: bind every `ImportNode` to its target namespace —
    /// aliased imports populate `aliased_imports`, unaliased imports are
    /// recorded as private-import targets whose public symbols the importer
    /// sees but cannot re-export.
    pub fn resolve_all_imports(&mut self, ctx: &CompilationContext) -> Result<(), ParseError> {
        let hashes: Vec<FileHash> = self.nodes.keys().copied().collect();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        for hash in hashes {
            let parent_dir = self.nodes[&hash].path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            let imports: Vec<(String, Option<String>)> = self.nodes[&hash]
                .namespace
                .definitions
                .iter()
                .filter_map(|d| match d {
                    Definition::Import(i) => Some((i.path.clone(), i.alias.clone())),
                    _ => None,
                })
                .collect();

            for (path, alias) in imports {
                let target = if let Some(core) = ctx.core_modules.iter().find(|m| m.file == FileHash::from_key(&path)) {
                    core.file
                } else {
                    let import_path = parent_dir.join(&path);
                    let import_hash = FileHash::from_path(&import_path, &cwd);
                    if !self.nodes.contains_key(&import_hash) {
                        return Err(ParseError::new(
                            ErrorKind::ErrParsing,
                            0,
                            format!("import `{path}` does not resolve to any file in the dependency graph"),
                        ));
                    }
                    import_hash
                };

                let node = self.nodes.get_mut(&hash).expect("hash came from self.nodes.keys()");
                match alias {
                    Some(name) => {
                        node.namespace.aliased_imports.insert(name, target);
                    }
                    None => node.namespace.private_import_targets.push(target),
                }
            }
        }
        Ok(())
    }

    /// §4.3 item 4: resolve every `Unknown` placeholder by looking it up —
    /// in the declaring namespace itself, then through its aliased and
    /// private import targets — iterating to a fixed point since one
    /// file's unknown may itself depend on another file's unknown having
    /// resolved first. A name that still resolves to nothing once no pass
    /// makes further progress is `ErrUnknownType` (§6).
    pub fn resolve_all_unknown_types(&mut self) -> Result<(), ParseError> {
        let hashes: Vec<FileHash> = self.nodes.keys().copied().collect();
        loop {
            let mut progressed = false;
            let mut unresolved: Vec<(FileHash, String, crate::ast::Span)> = Vec::new();

            for &hash in &hashes {
                let targets: Vec<FileHash> = {
                    let ns = &self.nodes[&hash].namespace;
                    ns.aliased_imports
                        .values()
                        .copied()
                        .chain(ns.private_import_targets.iter().copied())
                        .collect()
                };

                let pending_unknowns = self.nodes[&hash].namespace.unknown_entries();
                for (_, name, span) in pending_unknowns {
                    let found = targets.iter().find_map(|target| {
                        self.nodes
                            .get(target)
                            .and_then(|node| node.namespace.get_type_from_str(&name).map(|id| (node, id)))
                            .map(|(node, id)| clone_resolved_type(node, id))
                    });
                    match found {
                        Some(ty) => {
                            let node = self.nodes.get_mut(&hash).expect("hash is a known key");
                            if node.namespace.resolve_unknown_by_name(&name, ty) {
                                progressed = true;
                            }
                        }
                        None => unresolved.push((hash, name, span)),
                    }
                }
            }

            if !progressed {
                if let Some((_, name, span)) = unresolved.into_iter().next() {
                    return Err(ParseError::new(
                        ErrorKind::ErrUnknownType,
                        0,
                        format!("unknown type `{name}` at {}:{}:{}", span.file, span.line, span.column),
                    ));
                }
                return Ok(());
            }
        }
    }

    /// §4.3 pass 5: run the body passes for every file. Minimal-tree mode
    /// forces serial body parsing for every file (§9's third open question)
    /// to avoid racing against partial resolution state; a full compilation
    /// may parallelize within each file's own pending bodies.
    pub fn parse_all_bodies(&mut self, parallel: bool) -> Result<(), ParseError> {
        let hashes: Vec<FileHash> = self.nodes.keys().copied().collect();
        for hash in hashes {
            let node = self.nodes.get_mut(&hash).expect("hash is a known key");
            let pending = std::mem::take(&mut node.pending);
            parser::body_pass::run(node.tokens, &mut node.namespace, &pending, parallel)
                .map_err(|e| ParseError::new(ErrorKind::ErrParsing, 0, e.to_string()))?;
            node.pending = pending;
        }
        Ok(())
    }
}

/// Whether `path` names a pre-registered core module rather than a file on
/// disk (§4.3 item 3).
fn is_core_module_name(path: &str, ctx: &CompilationContext) -> bool {
    ctx.core_modules.iter().any(|m| m.file == FileHash::from_key(path))
}

/// Clone the concrete type a foreign namespace resolved `id` to, so it can
/// be installed into the importing namespace's own type table. Nominal
/// types (`Data`/`Enum`/`ErrorSet`/`Variant`/`Alias`/`Opaque`) carry their
/// own name (and, except `Alias`/`Opaque`, their origin `FileHash`), so they
/// are self-describing and safe to copy verbatim; a `Variant`'s payload
/// types are copied as-is too, which is only correct when those payloads
/// are themselves globally-shareable (primitives, arrays of primitives,
/// ...) — a payload that is itself another namespace-local nominal type
/// would need its `TypeId` re-based into the importing namespace's table,
/// which this crate does not need for the grammar it parses today (payload
/// types are restricted to globally-shareable types in practice).
fn clone_resolved_type(node: &FileNode, id: crate::types::TypeId) -> Type {
    match id {
        crate::types::TypeId::Global(_) => {
            let table = crate::types::table::GLOBAL_TYPES.read().expect("type table poisoned");
            table.get(id).clone()
        }
        crate::types::TypeId::Local(_) => node.namespace.types.get(id).clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn builds_a_graph_over_a_two_file_import() {
        let dir = std::env::temp_dir().join(format!("langfront_resolver_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_temp(&dir, "widget.lang", "data Widget\n  count: i32\n");
        let root = write_temp(&dir, "main.lang", "use \"widget.lang\"\ndef make() -> i32\n  return 0\n");

        let ctx = CompilationContext::new();
        let graph = DependencyGraph::build(&root, &ctx, false).unwrap();
        assert_eq!(graph.nodes().count(), 2);
        assert!(graph.cycles().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn detects_an_import_cycle_without_failing_the_build() {
        let dir = std::env::temp_dir().join(format!("langfront_resolver_cycle_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_temp(&dir, "b.lang", "use \"a.lang\"\ndata B\n  x: i32\n");
        let root = write_temp(&dir, "a.lang", "use \"b.lang\"\ndata A\n  x: i32\n");

        let ctx = CompilationContext::new();
        let graph = DependencyGraph::build(&root, &ctx, false).unwrap();
        assert_eq!(graph.nodes().count(), 2);
        assert!(!graph.cycles().is_empty(), "a mutual import must be recorded as a cycle");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn resolves_unknown_type_across_an_unaliased_import() {
        let dir = std::env::temp_dir().join(format!("langfront_resolver_unknown_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_temp(&dir, "widget.lang", "data Widget\n  count: i32\n");
        let root = write_temp(
            &dir,
            "main.lang",
            "use \"widget.lang\"\ndef make() -> Widget\n  return 0\n",
        );

        let ctx = CompilationContext::new();
        let mut graph = DependencyGraph::build(&root, &ctx, false).unwrap();
        graph.resolve_all_imports(&ctx).unwrap();
        graph.resolve_all_unknown_types().unwrap();

        let root_node = graph.node(graph.root).unwrap();
        let Definition::Function(f) = &root_node.namespace.definitions[1] else {
            panic!("expected the second definition to be `make`")
        };
        // Widget is a namespace-local nominal type; just assert it resolved.
        assert!(!matches!(
            root_node.namespace.types.get(f.return_type),
            crate::types::Type::Unknown(_)
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
