//! Validation rules.
//!
//! A [`Validator`] runs an ordered list of independent [`Rule`]s over one
//! resolved file. Rules share no state and never see each other's output;
//! diagnostics come back in registration order, then in the order each rule
//! found them. Deciding which severities block a build is left to callers.

mod complexity;
mod cycles;
mod external;
mod layering;
mod orphans;
mod references;
mod scenarios;
mod unique;

use std::sync::Arc;

use rustc_hash::FxHashSet;

pub use complexity::ComplexityRule;
pub use cycles::CycleDetectionRule;
pub use external::ExternalRule;
pub use layering::LayeringRule;
pub use orphans::OrphanDetectionRule;
pub use references::ValidReferenceRule;
pub use scenarios::ScenarioReferenceRule;
pub use unique::UniqueIdentifierRule;

use super::diagnostics::Diagnostic;
use super::ids::{QualifiedId, Target};
use super::resolve::{Bindings, ModelSet, resolve};
use crate::base::{FileId, Span};
use crate::config::AnalysisConfig;
use crate::syntax::{Declared, Element, Model};

/// Everything a rule may look at for one file.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub file: FileId,
    pub model: &'a Model,
    pub bindings: &'a Bindings,
    /// Other models, for classifying and locating cross-file targets.
    pub workspace: Option<&'a ModelSet>,
    /// Elements of this file targeted by relations declared in other files.
    pub external_endpoints: Option<&'a FxHashSet<QualifiedId>>,
}

impl<'a> RuleContext<'a> {
    pub fn new(file: FileId, model: &'a Model, bindings: &'a Bindings) -> Self {
        Self {
            file,
            model,
            bindings,
            workspace: None,
            external_endpoints: None,
        }
    }

    pub fn with_workspace(mut self, workspace: &'a ModelSet) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn with_external_endpoints(mut self, endpoints: &'a FxHashSet<QualifiedId>) -> Self {
        self.external_endpoints = Some(endpoints);
        self
    }

    /// The element a target denotes, if its model is available.
    pub fn element(&self, target: &Target) -> Option<&'a Element> {
        self.elements(target).into_iter().next()
    }

    /// Every element declared under the target's qualified id. More than one
    /// only when siblings share an identifier.
    pub fn elements(&self, target: &Target) -> Vec<&'a Element> {
        let model = if target.file == self.file {
            self.model
        } else {
            match self.workspace.and_then(|ws| ws.get(&target.file)) {
                Some(model) => model.as_ref(),
                None => return Vec::new(),
            }
        };
        let Some((first, rest)) = target.qid.segments().split_first() else {
            return Vec::new();
        };
        let mut current: Vec<&'a Element> =
            model.elements.iter().filter(|e| e.name() == first).collect();
        for segment in rest {
            current = current
                .into_iter()
                .flat_map(|e| e.children().iter().filter(|c| c.name() == segment))
                .collect();
        }
        current
    }

    /// Where the target's identifier is declared.
    pub fn declaration_span(&self, target: &Target) -> Option<Span> {
        self.element(target).map(|e| e.decl().name_span)
    }
}

/// One independent check over a resolved file.
pub trait Rule: Send + Sync {
    /// Stable name, used to disable the rule in configuration.
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic>;

    /// Findings that only show up when several files are looked at together,
    /// such as a cycle whose relations live in different files. Runs once
    /// per validation of a file set, after the per-file checks.
    fn check_across(&self, _files: &[RuleContext<'_>]) -> Vec<Diagnostic> {
        Vec::new()
    }
}

/// Ordered set of rules.
#[derive(Clone, Default)]
pub struct Validator {
    rules: Vec<Arc<dyn Rule>>,
}

impl Validator {
    /// A validator with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in rule with default settings.
    pub fn with_builtin_rules() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }

    /// The built-in rules, minus the ones `config` disables.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let builtin: [Arc<dyn Rule>; 8] = [
            Arc::new(UniqueIdentifierRule),
            Arc::new(ValidReferenceRule),
            Arc::new(CycleDetectionRule),
            Arc::new(OrphanDetectionRule),
            Arc::new(LayeringRule),
            Arc::new(ExternalRule),
            Arc::new(ScenarioReferenceRule),
            Arc::new(ComplexityRule::new(
                config.max_children,
                config.max_outgoing_relations,
            )),
        ];
        let mut validator = Self::new();
        for rule in builtin {
            if config.is_rule_enabled(rule.name()) {
                validator.rules.push(rule);
            } else {
                tracing::debug!(rule = rule.name(), "rule disabled by configuration");
            }
        }
        validator
    }

    /// Append a rule; it runs after every rule already registered.
    pub fn register(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Arc::new(rule));
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.register(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule and concatenate their findings.
    pub fn validate(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            let found = rule.check(ctx);
            tracing::trace!(rule = rule.name(), file = %ctx.file, found = found.len(), "rule finished");
            diagnostics.extend(found);
        }
        diagnostics
    }

    /// Run every rule's cross-file check over `files`.
    pub fn validate_across(&self, files: &[RuleContext<'_>]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            let found = rule.check_across(files);
            tracing::trace!(rule = rule.name(), files = files.len(), found = found.len(), "cross-file check finished");
            diagnostics.extend(found);
        }
        diagnostics
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rule_names())
            .finish()
    }
}

/// Resolve a single model on its own and run every built-in rule.
pub fn validate(file: FileId, model: &Arc<Model>) -> Vec<Diagnostic> {
    let bindings = resolve(file, model);
    Validator::with_builtin_rules().validate(&RuleContext::new(file, model, &bindings))
}
