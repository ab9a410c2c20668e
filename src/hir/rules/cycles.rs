use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use super::{Rule, RuleContext};
use crate::base::{FileId, Span};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCode, RelatedInfo};
use crate::hir::ids::Target;
use crate::hir::resolve::Bindings;

/// Reports relation cycles.
///
/// Cycles are a legitimate pattern (request/response, callbacks), so every
/// finding is `Info` and never blocks a build. A cycle whose relations are
/// all declared in one file is reported by that file's check; a cycle that
/// needs relations from several files is reported once by the cross-file
/// pass, anchored on the relation that closes it.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleDetectionRule;

/// Adjacency in declaration order. Each edge keeps every site that declares
/// it, first declaration first.
type Graph<'a> = IndexMap<&'a Target, IndexMap<&'a Target, Vec<(FileId, Span)>>>;

impl Rule for CycleDetectionRule {
    fn name(&self) -> &'static str {
        "cycle-detection"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let graph = build_graph([ctx]);
        find_cycles(&graph)
            .iter()
            .map(|cycle| report(&graph, cycle))
            .collect()
    }

    fn check_across(&self, files: &[RuleContext<'_>]) -> Vec<Diagnostic> {
        let graph = build_graph(files);
        find_cycles(&graph)
            .iter()
            .filter(|cycle| declaring_file(&graph, cycle).is_none())
            .map(|cycle| report(&graph, cycle))
            .collect()
    }
}

fn build_graph<'a, 'c>(files: impl IntoIterator<Item = &'c RuleContext<'a>>) -> Graph<'a>
where
    'a: 'c,
{
    let mut graph: Graph<'a> = IndexMap::new();
    for ctx in files {
        let bindings: &'a Bindings = ctx.bindings;
        for relation in bindings.declared() {
            if let Some((from, to)) = relation.edge() {
                graph
                    .entry(from)
                    .or_default()
                    .entry(to)
                    .or_default()
                    .push((ctx.file, relation.span));
                graph.entry(to).or_default();
            }
        }
    }
    graph
}

/// Depth-first search with an explicit work stack. Every node is expanded
/// once; a back edge to a node on the current path closes a cycle.
fn find_cycles<'a>(graph: &Graph<'a>) -> Vec<Vec<&'a Target>> {
    let mut done: FxHashSet<&'a Target> = FxHashSet::default();
    let mut seen: FxHashSet<Vec<&'a Target>> = FxHashSet::default();
    let mut cycles = Vec::new();

    for root in graph.keys().copied() {
        if done.contains(root) {
            continue;
        }
        let mut path: Vec<&'a Target> = vec![root];
        let mut on_path: FxHashSet<&'a Target> = FxHashSet::default();
        on_path.insert(root);
        // next edge to follow, per path entry
        let mut cursors: Vec<usize> = vec![0];

        while let Some(node) = path.last().copied() {
            let depth = path.len() - 1;
            let next = graph
                .get(node)
                .and_then(|edges| edges.get_index(cursors[depth]))
                .map(|(next, _)| *next);
            let Some(next) = next else {
                path.pop();
                cursors.pop();
                on_path.remove(node);
                done.insert(node);
                continue;
            };
            cursors[depth] += 1;

            if on_path.contains(next) {
                if let Some(pos) = path.iter().position(|n| *n == next) {
                    let cycle = canonical(&path[pos..]);
                    if seen.insert(cycle.clone()) {
                        cycles.push(cycle);
                    }
                }
            } else if !done.contains(next) {
                path.push(next);
                on_path.insert(next);
                cursors.push(0);
            }
        }
    }
    cycles
}

/// Rotation starting at the smallest node, so one cycle found from different
/// entry points compares equal and is reported the same way.
fn canonical<'a>(cycle: &[&'a Target]) -> Vec<&'a Target> {
    let min = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[min..].iter().chain(&cycle[..min]).copied().collect()
}

/// Consecutive pairs of the cycle, closing edge last.
fn edges<'c, 'a>(cycle: &'c [&'a Target]) -> impl Iterator<Item = (&'a Target, &'a Target)> + 'c {
    let closing = cycle.last().copied().zip(cycle.first().copied());
    cycle.windows(2).map(|pair| (pair[0], pair[1])).chain(closing)
}

fn sites<'g>(graph: &'g Graph<'_>, from: &Target, to: &Target) -> &'g [(FileId, Span)] {
    graph
        .get(from)
        .and_then(|edges| edges.get(to))
        .map_or(&[][..], Vec::as_slice)
}

/// A file that declares every relation of the cycle on its own.
fn declaring_file(graph: &Graph<'_>, cycle: &[&Target]) -> Option<FileId> {
    let mut pairs = edges(cycle);
    let (from, to) = pairs.next()?;
    let mut common: Vec<FileId> = sites(graph, from, to).iter().map(|(f, _)| *f).collect();
    for (from, to) in pairs {
        let here = sites(graph, from, to);
        common.retain(|file| here.iter().any(|(f, _)| f == file));
    }
    common.first().copied()
}

fn report(graph: &Graph<'_>, cycle: &[&Target]) -> Diagnostic {
    let site = |from: &Target, to: &Target| {
        sites(graph, from, to)
            .first()
            .copied()
            .unwrap_or((from.file, Span::default()))
    };

    let mut path: Vec<String> = cycle.iter().map(|t| t.qid.to_string()).collect();
    path.push(cycle[0].qid.to_string());

    // anchor on the edge that closes the cycle
    let last = cycle[cycle.len() - 1];
    let (file, span) = site(last, cycle[0]);
    let mut diagnostic = Diagnostic::info(
        DiagnosticCode::CycleDetected,
        file,
        span,
        format!("relation cycle: {}", path.join(" -> ")),
    );
    for pair in cycle.windows(2) {
        let (file, span) = site(pair[0], pair[1]);
        diagnostic = diagnostic.with_related(RelatedInfo::new(
            file,
            span,
            format!("{} -> {}", pair[0].qid, pair[1].qid),
        ));
    }
    diagnostic
}
