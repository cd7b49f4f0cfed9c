//! Paint server lookup and template-chain resolution.
//!
//! A gradient or pattern may name another node of its family through `href`.
//! Every attribute it leaves unset is taken from that template, then from the
//! template's template, and so on. The walk is an explicit loop over a visited
//! set, so cyclic documents terminate.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::attributes::{GradientAttributes, GradientStop, PatternAttributes};
use crate::builder::ResolvedPaint;
use crate::color::Color;
use crate::config::{CyclePolicy, ResolverConfig};
use crate::document::{NodeKind, PaintServerSource};
use crate::error::{PaintError, Result};
use crate::paint::{Iri, PaintSpec};

/// Outcome of walking a paint server's template chain.
///
/// Holds the merged attributes plus the reason the walk stopped early, if it
/// did. Turn it into a descriptor with [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ServerResolution<H> {
    pub(crate) iri: Iri,
    pub(crate) node: H,
    pub(crate) kind: NodeKind,
    pub(crate) chain: Vec<H>,
    pub(crate) gradient: GradientAttributes,
    pub(crate) pattern: PatternAttributes,
    pub(crate) stops: Vec<GradientStop>,
    pub(crate) content: Option<H>,
    pub(crate) interruption: Option<PaintError>,
}

impl<H: Copy> ServerResolution<H> {
    fn new(iri: &Iri, node: H, kind: NodeKind) -> Self {
        Self {
            iri: iri.clone(),
            node,
            kind,
            chain: Vec::new(),
            gradient: GradientAttributes::default(),
            pattern: PatternAttributes::default(),
            stops: Vec::new(),
            content: None,
            interruption: None,
        }
    }

    /// Merge one node of the chain into the accumulated attributes.
    fn absorb<S>(&mut self, source: &S, node: H, kind: NodeKind)
    where
        S: PaintServerSource<Handle = H> + ?Sized,
    {
        let first = self.chain.is_empty();
        self.chain.push(node);

        if kind.is_gradient() {
            // Shape-specific geometry only flows between gradients of the
            // same shape.
            let mut attrs = source.gradient_attributes(node);
            attrs.retain_geometry(kind == NodeKind::RadialGradient);
            if kind != self.kind {
                attrs.retain_geometry(self.kind == NodeKind::RadialGradient);
            }
            if first {
                self.gradient = attrs;
            } else {
                self.gradient.fill_unset_from(&attrs);
            }

            if self.stops.is_empty() {
                self.stops = source.stops(node);
            }
        } else {
            let attrs = source.pattern_attributes(node);
            if first {
                self.pattern = attrs;
            } else {
                self.pattern.fill_unset_from(&attrs);
            }

            if self.content.is_none() && source.has_content(node) {
                self.content = Some(node);
            }
        }
    }

    /// The reference the walk started from.
    pub fn iri(&self) -> &Iri {
        &self.iri
    }

    /// The node the paint referenced directly.
    pub fn node(&self) -> H {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Nodes merged, starting node first.
    pub fn chain(&self) -> &[H] {
        &self.chain
    }

    /// Merged gradient attributes, before defaults.
    pub fn gradient_attributes(&self) -> &GradientAttributes {
        &self.gradient
    }

    /// Merged pattern attributes, before defaults. The tile is the starting
    /// node's own.
    pub fn pattern_attributes(&self) -> &PatternAttributes {
        &self.pattern
    }

    /// Stops of the first node in the chain that declares any.
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// First pattern node in the chain with children of its own.
    pub fn content(&self) -> Option<H> {
        self.content
    }

    /// Why the walk stopped before reaching the end of the chain.
    pub fn interruption(&self) -> Option<&PaintError> {
        self.interruption.as_ref()
    }

    /// Whether the whole chain was merged.
    pub fn is_complete(&self) -> bool {
        self.interruption.is_none()
    }

    /// Whether the walk stopped on a loop (or on a chain long enough to be
    /// treated as one).
    pub fn is_cyclic(&self) -> bool {
        matches!(
            self.interruption,
            Some(PaintError::CyclicReference(_)) | Some(PaintError::TemplateChainTooLong { .. })
        )
    }

    /// Fail with the interruption when `policy` rejects cyclic chains and
    /// this walk stopped on one.
    pub fn check_cycle_policy(&self, policy: CyclePolicy) -> Result<()> {
        match &self.interruption {
            Some(err) if policy == CyclePolicy::Fallback && self.is_cyclic() => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

/// Resolves paints against a read-only document.
///
/// Holds no mutable state; share it freely between threads when the source
/// allows concurrent reads.
#[derive(Debug)]
pub struct PaintResolver<'a, S: ?Sized> {
    pub(crate) source: &'a S,
    pub(crate) config: ResolverConfig,
}

impl<S: ?Sized> Clone for PaintResolver<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            config: self.config.clone(),
        }
    }
}

impl<'a, S> PaintResolver<'a, S>
where
    S: PaintServerSource + ?Sized,
{
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, ResolverConfig::default())
    }

    pub fn with_config(source: &'a S, config: ResolverConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn source(&self) -> &'a S {
        self.source
    }

    /// Look up a paint server and merge its template chain.
    ///
    /// Fails only when `iri` itself cannot be used. Problems further down the
    /// chain stop the walk and are recorded on the returned resolution.
    pub fn resolve_server(&self, iri: &Iri) -> Result<ServerResolution<S::Handle>> {
        let source = self.source;
        let node = source
            .lookup_by_iri(iri)
            .ok_or_else(|| PaintError::ReferenceNotFound(iri.to_string()))?;
        let kind = source.node_kind(node);
        if !kind.is_paint_server() {
            return Err(PaintError::WrongReferenceKind {
                iri: iri.to_string(),
                kind,
            });
        }

        let mut resolution = ServerResolution::new(iri, node, kind);
        resolution.absorb(source, node, kind);

        let mut visited = HashSet::from([node]);
        let mut current = node;
        while let Some(link) = source.template_link(current) {
            if resolution.chain.len() > self.config.max_template_chain {
                resolution.interruption = Some(PaintError::TemplateChainTooLong {
                    iri: iri.to_string(),
                    limit: self.config.max_template_chain,
                });
                break;
            }

            let Some(target) = source.lookup_by_iri(&link) else {
                resolution.interruption = Some(PaintError::ReferenceNotFound(link.to_string()));
                break;
            };

            let target_kind = source.node_kind(target);
            if !kind.accepts_template(target_kind) {
                resolution.interruption = Some(PaintError::WrongReferenceKind {
                    iri: link.to_string(),
                    kind: target_kind,
                });
                break;
            }

            if !visited.insert(target) {
                resolution.interruption = Some(PaintError::CyclicReference(link.to_string()));
                break;
            }

            resolution.absorb(source, target, target_kind);
            current = target;
        }

        if let Some(err) = &resolution.interruption {
            warn!(%iri, error = %err, merged = resolution.chain.len(), "Template chain interrupted");
        } else {
            debug!(%iri, ?kind, merged = resolution.chain.len(), "Resolved paint server");
        }

        Ok(resolution)
    }

    /// Resolve a paint server all the way to a descriptor, honoring the
    /// configured cycle policy.
    ///
    /// Fails when the merged server cannot paint, e.g. a gradient that ends
    /// up with no stops.
    pub fn resolve(&self, iri: &Iri) -> Result<ResolvedPaint<S::Handle>> {
        let resolution = self.resolve_server(iri)?;
        resolution.check_cycle_policy(self.config.cycle_policy)?;
        resolution.build()
    }

    /// Resolve a paint spec without applying any fallback.
    ///
    /// `currentColor` becomes `current_color`; references are resolved with
    /// [`resolve`](Self::resolve).
    pub fn resolve_paint(
        &self,
        spec: &PaintSpec,
        current_color: Color,
    ) -> Result<ResolvedPaint<S::Handle>> {
        match spec {
            PaintSpec::None => Ok(ResolvedPaint::None),
            PaintSpec::CurrentColor => Ok(ResolvedPaint::Solid(current_color)),
            PaintSpec::Solid(color) => Ok(ResolvedPaint::Solid(*color)),
            PaintSpec::Reference { iri, .. } => self.resolve(iri),
        }
    }
}
