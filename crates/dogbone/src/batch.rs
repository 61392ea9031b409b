//! One relief run over the selected corner edges.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::error::{DogboneError, Result};
use crate::params::ToolParameters;
use crate::query::BRepQuery;
use crate::registry::{EdgeRecordOf, FaceRecord, SelectionRegistry};
use crate::tool::{dogbone_tool, ToolSolid};

/// Every relief body for one target body, to be unioned and subtracted in
/// a single Boolean.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolBody<B> {
    pub body: B,
    pub tools: Vec<ToolSolid>,
}

/// Host side of a run: performs the Boolean subtraction on a body.
pub trait CutSink<B> {
    fn cut(&mut self, tool_body: &ToolBody<B>) -> Result<()>;
}

/// Collects the tool bodies instead of cutting.
impl<B: Clone> CutSink<B> for Vec<ToolBody<B>> {
    fn cut(&mut self, tool_body: &ToolBody<B>) -> Result<()> {
        self.push(tool_body.clone());
        Ok(())
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport<B> {
    /// Edges that produced a relief body.
    pub processed: usize,
    /// Edges whose face or edge had gone stale.
    pub skipped: usize,
    /// Edges that failed, plus bodies the sink failed to cut.
    pub error_count: usize,
    /// Bodies handed to the sink successfully.
    pub bodies: Vec<B>,
    pub elapsed: Duration,
}

impl<B> Default for PassReport<B> {
    fn default() -> Self {
        Self {
            processed: 0,
            skipped: 0,
            error_count: 0,
            bodies: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

/// A relief run against one model with fixed parameters.
pub struct DogbonePass<'a, Q: BRepQuery> {
    query: &'a Q,
    params: &'a ToolParameters,
}

impl<'a, Q: BRepQuery> DogbonePass<'a, Q> {
    pub fn new(query: &'a Q, params: &'a ToolParameters) -> Self {
        Self { query, params }
    }

    /// Build relief bodies for every selected edge, body by body, and hand
    /// each body's tools to `sink`.
    ///
    /// Stale faces and edges are skipped. Per-edge failures are logged and
    /// counted without stopping the run. An edge registered on two faces is
    /// cut once.
    #[instrument(skip_all)]
    pub fn run(&self, registry: &SelectionRegistry<Q>, sink: &mut impl CutSink<Q::Body>) -> Result<PassReport<Q::Body>> {
        let started = Instant::now();
        self.params.validate()?;
        if self.query.bodies().is_empty() {
            return Err(DogboneError::NoActiveModel);
        }

        let mut report = PassReport::default();
        let mut queued = HashSet::new();
        let mut groups: Vec<(Q::Body, Vec<(&EdgeRecordOf<Q>, &FaceRecord<Q::Face>)>)> = Vec::new();

        for edge_id in registry.selected_edges() {
            let Some(record) = registry.edge_record(edge_id) else {
                continue;
            };
            let Some(face) = registry.face_record(record.face_record) else {
                continue;
            };
            let edge = record.corner.edge;
            if !self.query.is_valid_face(face.face) || !self.query.is_valid_edge(edge) {
                warn!(?edge, face = ?face.face, "stale selection, skipping");
                report.skipped += 1;
                continue;
            }
            let Some(body) = self.query.face_body(face.face) else {
                warn!(face = ?face.face, "face has no body, skipping");
                report.skipped += 1;
                continue;
            };
            if !queued.insert(edge) {
                debug!(?edge, "edge already queued from another face");
                continue;
            }
            match groups.iter_mut().find(|(b, _)| *b == body) {
                Some((_, edges)) => edges.push((record, face)),
                None => groups.push((body, vec![(record, face)])),
            }
        }

        for (body, edges) in groups {
            let mut tools = Vec::with_capacity(edges.len());
            for (record, face) in edges {
                let top = if self.params.from_top { face.top_plane.as_ref() } else { None };
                match dogbone_tool(self.query, &record.corner, self.params, top) {
                    Ok(tool) => {
                        report.processed += 1;
                        tools.push(tool);
                    }
                    Err(err) => {
                        warn!(edge = ?record.corner.edge, %err, "relief failed");
                        report.error_count += 1;
                    }
                }
            }
            if tools.is_empty() {
                continue;
            }

            let tool_body = ToolBody { body, tools };
            match sink.cut(&tool_body) {
                Ok(()) => report.bodies.push(body),
                Err(err) => {
                    warn!(?body, %err, "cut failed");
                    report.error_count += 1;
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            processed = report.processed,
            skipped = report.skipped,
            errors = report.error_count,
            elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
            "dogbone pass finished"
        );
        Ok(report)
    }
}
