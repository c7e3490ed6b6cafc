// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion driver: runs every stage for one material.

use crate::cache::DedupCache;
use crate::config::ConversionSettings;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, TracingSink};
use crate::error::ConversionError;
use crate::gamma::apply_gamma;
use crate::instantiate::instantiate;
use crate::links::{reconstruct, LinkRecord};
use crate::post::{post_process, PostContext};
use crate::registry::TypeRegistry;
use crate::schedule::schedule;
use crate::snapshot::{Snapshot, SourceGraphProvider, SourceNodeId};
use crate::target::TargetHost;
use crate::transfer::{transfer, TransferContext, TransferNotes};
use ordoplay_shader_graph::MaterialId;

/// What to convert
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    /// Source material identifier, the cache key
    pub source_id: String,
    /// Gamma for colour images; the settings default when `None`
    pub gamma: Option<f32>,
    /// Scale of the object the material is assigned to
    pub object_scale: [f32; 3],
}

impl ConversionRequest {
    /// Request with default gamma and unit object scale
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            gamma: None,
            object_scale: [1.0, 1.0, 1.0],
        }
    }

    /// Use an explicit gamma
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = Some(gamma);
        self
    }

    /// Set the host object scale
    pub fn with_object_scale(mut self, scale: [f32; 3]) -> Self {
        self.object_scale = scale;
        self
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// Target material
    pub target_id: MaterialId,
    /// The target came from the dedup cache
    pub cache_hit: bool,
    /// Non-fatal problems, empty on a cache hit
    pub diagnostics: Vec<Diagnostic>,
    /// Links created in the target, empty on a cache hit
    pub links: Vec<LinkRecord>,
}

/// Runs conversions with one set of settings
pub struct Converter {
    settings: ConversionSettings,
    registry: TypeRegistry,
    sink: Box<dyn DiagnosticSink>,
}

impl Converter {
    /// Converter with the standard type registry, reporting to `tracing`
    pub fn new(settings: ConversionSettings) -> Self {
        Self {
            settings,
            registry: TypeRegistry::standard(),
            sink: Box::new(TracingSink),
        }
    }

    /// Replace the type registry
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the diagnostics sink
    pub fn with_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Settings in use
    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Convert one source material into `host`.
    ///
    /// An unchanged source whose target still exists is served from
    /// `cache`; the requested gamma is applied either way.
    pub fn convert_material(
        &self,
        cache: &DedupCache,
        provider: &dyn SourceGraphProvider,
        host: &mut dyn TargetHost,
        request: &ConversionRequest,
    ) -> Result<ConversionOutcome, ConversionError> {
        let snapshot = Snapshot::capture(provider, &self.settings.flatten)?;
        let fingerprint = snapshot.fingerprint(request.object_scale, &self.settings)?;
        tracing::debug!(
            source = %request.source_id,
            nodes = snapshot.node_count(),
            links = snapshot.links().len(),
            "snapshot captured"
        );

        let mut diagnostics = Diagnostics::new();
        let mut links = Vec::new();
        let lookup = cache.get_or_convert(
            &request.source_id,
            &fingerprint,
            &mut *host,
            |host, id| host.contains_material(id),
            |host| self.build(&snapshot, host, request, &mut diagnostics, &mut links),
        )?;

        let gamma = request.gamma.unwrap_or(self.settings.default_gamma);
        let graph = host
            .material_graph(lookup.target_id)
            .ok_or(ConversionError::MaterialNotFound(lookup.target_id))?;
        apply_gamma(graph, gamma);

        diagnostics.deliver(self.sink.as_ref());
        tracing::info!(
            source = %request.source_id,
            target = %lookup.target_id,
            cache_hit = lookup.hit,
            warnings = diagnostics.len(),
            "material converted"
        );

        Ok(ConversionOutcome {
            target_id: lookup.target_id,
            cache_hit: lookup.hit,
            diagnostics: diagnostics.into_vec(),
            links,
        })
    }

    fn build(
        &self,
        snapshot: &Snapshot,
        host: &mut dyn TargetHost,
        request: &ConversionRequest,
        diagnostics: &mut Diagnostics,
        links: &mut Vec<LinkRecord>,
    ) -> Result<MaterialId, ConversionError> {
        let order = schedule(snapshot)?;
        tracing::debug!(nodes = order.len(), "schedule computed");

        let material = host.create_material(snapshot.material());
        let built = self.populate(snapshot, &order, material, &mut *host, request, diagnostics, links);
        if built.is_err() {
            // Leave no half-built material behind
            host.discard_material(material);
        }
        built.map(|()| material)
    }

    fn populate(
        &self,
        snapshot: &Snapshot,
        order: &[SourceNodeId],
        material: MaterialId,
        host: &mut dyn TargetHost,
        request: &ConversionRequest,
        diagnostics: &mut Diagnostics,
        links: &mut Vec<LinkRecord>,
    ) -> Result<(), ConversionError> {
        let graph = host
            .material_graph(material)
            .ok_or(ConversionError::MaterialNotFound(material))?;

        let mut table = instantiate(snapshot, order, &self.registry, &mut *graph, diagnostics);
        tracing::debug!(converted = table.len(), "nodes instantiated");

        let mut notes = TransferNotes::default();
        transfer(
            &mut TransferContext {
                graph: &mut *graph,
                snapshot,
                settings: &self.settings,
                object_scale: request.object_scale,
                table: &mut table,
                diagnostics: &mut *diagnostics,
                notes: &mut notes,
            },
            order,
        );

        *links = reconstruct(snapshot, &table, &mut *graph, diagnostics);

        post_process(&mut PostContext {
            graph,
            snapshot,
            settings: &self.settings,
            table: &mut table,
            notes: &notes,
            diagnostics,
        });
        Ok(())
    }

    /// Re-apply gamma to an existing target material
    pub fn update_gamma(
        &self,
        host: &mut dyn TargetHost,
        target_id: MaterialId,
        gamma: f32,
    ) -> Result<usize, ConversionError> {
        let graph = host
            .material_graph(target_id)
            .ok_or(ConversionError::MaterialNotFound(target_id))?;
        Ok(apply_gamma(graph, gamma))
    }

    /// Convert several materials. A failure is reported for its own
    /// material and never stops the rest.
    pub fn convert_batch<'p>(
        &self,
        cache: &DedupCache,
        host: &mut dyn TargetHost,
        jobs: impl IntoIterator<Item = (&'p dyn SourceGraphProvider, ConversionRequest)>,
    ) -> Vec<(String, Result<ConversionOutcome, ConversionError>)> {
        jobs.into_iter()
            .map(|(provider, request)| {
                let result = self.convert_material(cache, provider, &mut *host, &request);
                if let Err(error) = &result {
                    tracing::warn!(source = %request.source_id, %error, "material conversion failed");
                }
                (request.source_id, result)
            })
            .collect()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConversionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentNode, SourceDocument};
    use crate::kind::SourceKind;
    use crate::target::InMemoryScene;

    fn stone() -> SourceDocument {
        let mut doc = SourceDocument::new("Stone");
        doc.push_node(DocumentNode::standard("BSDF", SourceKind::Principled));
        doc.push_node(DocumentNode::standard("Output", SourceKind::MaterialOutput));
        doc.link("BSDF", "BSDF", "Output", "Surface");
        doc
    }

    #[test]
    fn test_convert_creates_material() {
        let converter = Converter::default();
        let cache = DedupCache::new();
        let mut scene = InMemoryScene::with_catalog();

        let outcome = converter
            .convert_material(&cache, &stone(), &mut scene, &ConversionRequest::new("Stone"))
            .unwrap();
        assert!(!outcome.cache_hit);
        assert_eq!(outcome.links.len(), 1);
        assert_eq!(scene.material(outcome.target_id).unwrap().name, "Stone");
    }

    #[test]
    fn test_update_gamma_on_missing_material() {
        let converter = Converter::default();
        let mut scene = InMemoryScene::with_catalog();
        let missing = MaterialId::new();
        assert!(matches!(
            converter.update_gamma(&mut scene, missing, 2.2),
            Err(ConversionError::MaterialNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_cyclic_source_is_fatal() {
        let mut doc = SourceDocument::new("Loop");
        doc.push_node(DocumentNode::standard("A", SourceKind::Invert));
        doc.push_node(DocumentNode::standard("B", SourceKind::Invert));
        doc.link("A", "Color", "B", "Color");
        doc.link("B", "Color", "A", "Color");

        let converter = Converter::default();
        let cache = DedupCache::new();
        let mut scene = InMemoryScene::with_catalog();
        let result = converter.convert_material(&cache, &doc, &mut scene, &ConversionRequest::new("Loop"));
        assert!(matches!(result, Err(ConversionError::Cyclic(_))));
        assert!(cache.is_empty());
        assert_eq!(scene.material_count(), 0);
    }

    /// Host whose materials can be created but never edited
    struct LockedScene(InMemoryScene);

    impl TargetHost for LockedScene {
        fn create_material(&mut self, name: &str) -> MaterialId {
            self.0.create_material(name)
        }

        fn contains_material(&self, id: MaterialId) -> bool {
            self.0.contains_material(id)
        }

        fn discard_material(&mut self, id: MaterialId) -> bool {
            self.0.discard_material(id)
        }

        fn material_graph(&mut self, _id: MaterialId) -> Option<&mut dyn crate::target::TargetGraph> {
            None
        }
    }

    #[test]
    fn test_failed_build_discards_material() {
        let converter = Converter::default();
        let cache = DedupCache::new();
        let mut host = LockedScene(InMemoryScene::with_catalog());

        let result = converter.convert_material(&cache, &stone(), &mut host, &ConversionRequest::new("Stone"));
        assert!(matches!(result, Err(ConversionError::MaterialNotFound(_))));
        assert_eq!(host.0.material_count(), 0);
        assert!(cache.is_empty());
    }
}
