// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dirty/invalid propagation and lazy re-evaluation.
//!
//! Marking is cheap and never recomputes anything by itself; recomputation
//! happens on demand, either through an explicit [`Scene::evaluate`] call or
//! through the scene-wide sweep. Evaluation pulls its inputs: asking one
//! node for its value transitively resolves the whole upstream chain, so the
//! sweep can visit nodes in plain insertion order.

use crate::node::{GuardedInput, NodeContent, NodeId, TransformError};
use crate::scene::Scene;
use crate::value::{OutputValue, Payload};

/// Error message stored when a node is invalidated without a specific cause
const DEFAULT_INVALID_MESSAGE: &str = "Something went wrong";

/// Error during evaluation or propagation
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Node not found in the scene
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// A propagation or evaluation pass revisited a node already on its
    /// current path
    #[error("Cycle detected at node {0:?}")]
    CycleDetected(NodeId),

    /// The node's content is not of the requested concrete type
    #[error("Node {0:?} content has unexpected type")]
    ContentTypeMismatch(NodeId),

    /// A transform reported a recognized domain failure
    #[error("Node {node:?} transform failed: {message}")]
    Transform {
        /// The failing node
        node: NodeId,
        /// The transform's error message
        message: String,
    },
}

/// Outcome of a scene-wide sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Nodes that were asked and did not surface an error
    pub evaluated: usize,
    /// Nodes whose evaluation surfaced an error, with the error
    pub failures: Vec<(NodeId, EvalError)>,
}

impl SweepReport {
    /// Whether the sweep finished without surfaced errors
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Scene {
    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    /// Set a node's dirty flag and fire the matching content hook. Marking
    /// dirty also raises the scene's modified flag.
    pub fn mark_dirty(&mut self, node_id: NodeId, value: bool) {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return;
        };
        node.dirty = value;
        if value {
            node.content.on_marked_dirty();
            self.set_modified(true);
        } else {
            node.content.on_unmarked_dirty();
        }
    }

    /// Mark a node invalid with an error message and fire the content hook
    pub fn mark_invalid(&mut self, node_id: NodeId, message: impl Into<String>) {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return;
        };
        node.invalid = true;
        node.error_message = Some(message.into());
        node.content.on_marked_invalid();
    }

    /// Clear a node's invalid flag and error message and fire the hook
    pub fn unmark_invalid(&mut self, node_id: NodeId) {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return;
        };
        node.invalid = false;
        node.error_message = None;
        node.content.on_unmarked_invalid();
    }

    fn set_invalid_flag(&mut self, node_id: NodeId, value: bool) {
        if value {
            self.mark_invalid(node_id, DEFAULT_INVALID_MESSAGE);
        } else {
            self.unmark_invalid(node_id);
        }
    }

    // ------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------

    /// Set the dirty flag on direct children only. Further cascading is left
    /// to the children's own recomputation.
    pub fn mark_children_dirty(&mut self, node_id: NodeId, value: bool) {
        for child in self.children_of(node_id) {
            self.mark_dirty(child, value);
        }
    }

    /// Set the dirty flag on every descendant, depth first. Converging paths
    /// re-visit their shared descendants (marking is idempotent); a revisit
    /// on the current walk path is a cycle.
    pub fn mark_descendants_dirty(&mut self, node_id: NodeId, value: bool) -> Result<(), EvalError> {
        let mut path = Vec::new();
        self.walk_descendants_dirty(node_id, value, &mut path)
    }

    fn walk_descendants_dirty(
        &mut self,
        node_id: NodeId,
        value: bool,
        path: &mut Vec<NodeId>,
    ) -> Result<(), EvalError> {
        if path.contains(&node_id) {
            return Err(EvalError::CycleDetected(node_id));
        }
        path.push(node_id);
        for child in self.children_of(node_id) {
            self.mark_dirty(child, value);
            self.walk_descendants_dirty(child, value, path)?;
        }
        path.pop();
        Ok(())
    }

    /// Set the invalid flag on direct children only
    pub fn mark_children_invalid(&mut self, node_id: NodeId, value: bool) {
        for child in self.children_of(node_id) {
            self.set_invalid_flag(child, value);
        }
    }

    /// Set the invalid flag on every descendant, depth first, with the same
    /// walk semantics as [`Scene::mark_descendants_dirty`]
    pub fn mark_descendants_invalid(
        &mut self,
        node_id: NodeId,
        value: bool,
    ) -> Result<(), EvalError> {
        let mut path = Vec::new();
        self.walk_descendants_invalid(node_id, value, &mut path)
    }

    fn walk_descendants_invalid(
        &mut self,
        node_id: NodeId,
        value: bool,
        path: &mut Vec<NodeId>,
    ) -> Result<(), EvalError> {
        if path.contains(&node_id) {
            return Err(EvalError::CycleDetected(node_id));
        }
        path.push(node_id);
        for child in self.children_of(node_id) {
            self.set_invalid_flag(child, value);
            self.walk_descendants_invalid(child, value, path)?;
        }
        path.pop();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Output access
    // ------------------------------------------------------------------

    /// Resolve a node's output for one output socket index.
    ///
    /// A dirty or invalid node has no servable output: staleness is never
    /// silently handed to consumers.
    pub fn get_output(&self, node_id: NodeId, index: usize) -> Option<Payload> {
        let node = self.nodes.get(&node_id)?;
        if node.dirty || node.invalid {
            return None;
        }
        node.output_value.as_ref()?.get(index).cloned()
    }

    /// A node's whole cached output value, masked the same way as
    /// [`Scene::get_output`]
    pub fn node_output(&self, node_id: NodeId) -> Option<&OutputValue> {
        let node = self.nodes.get(&node_id)?;
        if node.dirty || node.invalid {
            return None;
        }
        node.output_value.as_ref()
    }

    /// Resolve one guarded input slot for a node.
    ///
    /// Soft failures (no edge, malformed connection, upstream output
    /// unavailable) mark the requesting node invalid with a descriptive
    /// message and yield the `(None, None)` sentinel; they never surface as
    /// errors. The only hard error is a cycle hit by the upstream pull.
    pub fn get_guarded_input(
        &mut self,
        node_id: NodeId,
        index: usize,
    ) -> Result<GuardedInput, EvalError> {
        let socket_id = match self
            .nodes
            .get(&node_id)
            .and_then(|n| n.inputs.get(index))
            .copied()
        {
            Some(id) => id,
            None => {
                tracing::debug!("node {node_id:?} has no input socket at {index}");
                self.mark_invalid(node_id, "Input is not connected");
                return Ok((None, None));
            }
        };

        let edge_id = match self
            .sockets
            .get(&socket_id)
            .and_then(|s| s.edges.first())
            .copied()
        {
            Some(id) => id,
            None => {
                self.mark_invalid(node_id, "Input is not connected");
                return Ok((None, None));
            }
        };

        let other_id = match self
            .edges
            .get(&edge_id)
            .and_then(|e| e.other_socket(socket_id))
        {
            Some(id) => id,
            None => {
                self.mark_invalid(node_id, "Connection is not valid");
                return Ok((None, None));
            }
        };

        let (upstream, upstream_index, socket_type) = match self.sockets.get(&other_id) {
            Some(s) => (s.node, s.index, s.socket_type),
            None => {
                self.mark_invalid(node_id, "Connection is not valid");
                return Ok((None, None));
            }
        };

        // give the upstream node a chance to recompute before reading it
        match self.evaluate(upstream) {
            Ok(_) => {}
            Err(err @ EvalError::CycleDetected(_)) => return Err(err),
            Err(err) => {
                tracing::debug!("upstream {upstream:?} failed during pull: {err}");
            }
        }

        match self.get_output(upstream, upstream_index) {
            Some(payload) => Ok((Some(payload), Some(socket_type))),
            None => {
                self.mark_invalid(node_id, "Input is not valid");
                Ok((None, None))
            }
        }
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Evaluate a node, recomputing only when it is dirty or invalid.
    ///
    /// A clean node returns its cached value without invoking the transform.
    /// On success the node becomes clean, stale invalid states are cleared
    /// down the chain, and direct children are marked dirty when the output
    /// actually changed. Precondition and internal failures invalidate the
    /// node and return `Ok(None)`; recognized domain failures invalidate the
    /// node and surface as [`EvalError::Transform`].
    pub fn evaluate(&mut self, node_id: NodeId) -> Result<Option<OutputValue>, EvalError> {
        let node = self
            .nodes
            .get(&node_id)
            .ok_or(EvalError::NodeNotFound(node_id))?;
        if !node.dirty && !node.invalid {
            return Ok(node.output_value.clone());
        }
        if self.eval_stack.contains(&node_id) {
            return Err(EvalError::CycleDetected(node_id));
        }

        self.eval_stack.push(node_id);
        let result = self.evaluate_now(node_id);
        self.eval_stack.pop();
        result
    }

    fn evaluate_now(&mut self, node_id: NodeId) -> Result<Option<OutputValue>, EvalError> {
        let input_count = self
            .nodes
            .get(&node_id)
            .map(|n| n.inputs.len())
            .unwrap_or(0);
        let mut inputs: Vec<GuardedInput> = Vec::with_capacity(input_count);
        for index in 0..input_count {
            inputs.push(self.get_guarded_input(node_id, index)?);
        }

        let (outcome, changed) = {
            let node = self
                .nodes
                .get_mut(&node_id)
                .ok_or(EvalError::NodeNotFound(node_id))?;
            let outcome = node.content.compute(&inputs);
            let changed = if let Ok(value) = &outcome {
                let changed = node.output_value.as_ref() != Some(value);
                node.output_value = Some(value.clone());
                changed
            } else {
                false
            };
            (outcome, changed)
        };

        match outcome {
            Ok(value) => {
                self.mark_dirty(node_id, false);
                self.unmark_invalid(node_id);
                self.mark_descendants_invalid(node_id, false)?;
                if changed {
                    self.mark_children_dirty(node_id, true);
                }
                Ok(Some(value))
            }
            Err(TransformError::Precondition(message)) => {
                tracing::debug!("node {node_id:?} preconditions unmet: {message}");
                self.mark_invalid(node_id, message);
                Ok(None)
            }
            Err(TransformError::Domain(message)) => {
                self.mark_invalid(node_id, message.clone());
                Err(EvalError::Transform {
                    node: node_id,
                    message,
                })
            }
            Err(TransformError::Internal(message)) => {
                tracing::error!("node {node_id:?} failed unexpectedly: {message}");
                self.mark_invalid(node_id, "Internal node error. See log for details");
                Ok(None)
            }
        }
    }

    /// Ask every node in insertion order to evaluate once.
    ///
    /// The order is a dispatch convenience, not a topological sort; the pull
    /// recursion inside [`Scene::evaluate`] resolves upstream chains
    /// regardless of where the sweep enters them. A failing node never stops
    /// the sweep; surfaced errors are collected in the report.
    pub fn evaluate_all(&mut self) -> SweepReport {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let mut report = SweepReport::default();
        for node_id in ids {
            match self.evaluate(node_id) {
                Ok(_) => report.evaluated += 1,
                Err(err) => {
                    tracing::warn!("sweep: node {node_id:?} failed: {err}");
                    report.failures.push((node_id, err));
                }
            }
        }
        report
    }

    /// Edit a node's typed content in place, then mark it and its
    /// descendants dirty — the entry point for configuration changes.
    pub fn configure<T, F>(&mut self, node_id: NodeId, edit: F) -> Result<(), EvalError>
    where
        T: NodeContent + 'static,
        F: FnOnce(&mut T),
    {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(EvalError::NodeNotFound(node_id))?;
        let content = node
            .content
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(EvalError::ContentTypeMismatch(node_id))?;
        edit(content);

        self.mark_dirty(node_id, true);
        if let Err(err) = self.mark_descendants_dirty(node_id, true) {
            tracing::warn!("dirty propagation after configure stopped: {err}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::SocketType;
    use std::any::Any;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct CountingSource {
        value: f64,
        computes: Rc<Cell<usize>>,
    }

    impl CountingSource {
        fn new(value: f64) -> (Self, Rc<Cell<usize>>) {
            let computes = Rc::new(Cell::new(0));
            (
                Self {
                    value,
                    computes: Rc::clone(&computes),
                },
                computes,
            )
        }
    }

    impl NodeContent for CountingSource {
        fn op_code(&self) -> &'static str {
            "counting_source"
        }
        fn type_code(&self) -> &'static str {
            "Test"
        }
        fn title(&self) -> &'static str {
            "Counting Source"
        }
        fn input_sockets(&self) -> Vec<SocketType> {
            Vec::new()
        }
        fn output_sockets(&self) -> Vec<SocketType> {
            vec![SocketType::Number]
        }
        fn compute(&mut self, _inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
            self.computes.set(self.computes.get() + 1);
            Ok(OutputValue::Single(Payload::Number(self.value)))
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct AddOne {
        computes: Rc<Cell<usize>>,
    }

    impl AddOne {
        fn new() -> Self {
            Self {
                computes: Rc::new(Cell::new(0)),
            }
        }
    }

    impl NodeContent for AddOne {
        fn op_code(&self) -> &'static str {
            "add_one"
        }
        fn type_code(&self) -> &'static str {
            "Test"
        }
        fn title(&self) -> &'static str {
            "Add One"
        }
        fn input_sockets(&self) -> Vec<SocketType> {
            vec![SocketType::Number]
        }
        fn output_sockets(&self) -> Vec<SocketType> {
            vec![SocketType::Number]
        }
        fn compute(&mut self, inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
            self.computes.set(self.computes.get() + 1);
            match inputs.first() {
                Some((Some(Payload::Number(n)), _)) => {
                    Ok(OutputValue::Single(Payload::Number(n + 1.0)))
                }
                _ => Err(TransformError::Precondition("Input is not valid".into())),
            }
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Failing {
        domain: bool,
    }

    impl NodeContent for Failing {
        fn op_code(&self) -> &'static str {
            "failing"
        }
        fn type_code(&self) -> &'static str {
            "Test"
        }
        fn title(&self) -> &'static str {
            "Failing"
        }
        fn input_sockets(&self) -> Vec<SocketType> {
            Vec::new()
        }
        fn output_sockets(&self) -> Vec<SocketType> {
            vec![SocketType::Number]
        }
        fn compute(&mut self, _inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
            if self.domain {
                Err(TransformError::Domain("bad value".into()))
            } else {
                Err(TransformError::Internal("boom".into()))
            }
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn wire(scene: &mut Scene, from: NodeId, to: NodeId) {
        let out = scene.node(from).unwrap().output_sockets()[0];
        let input = scene.node(to).unwrap().input_sockets()[0];
        scene.connect(out, input).unwrap();
    }

    #[test]
    fn test_evaluate_memoizes_clean_nodes() {
        let mut scene = Scene::new();
        let (content, computes) = CountingSource::new(5.0);
        let source = scene.add_node(Box::new(content));

        for _ in 0..3 {
            let value = scene.evaluate(source).unwrap();
            assert_eq!(value, Some(OutputValue::Single(Payload::Number(5.0))));
        }
        assert_eq!(computes.get(), 1);

        scene.mark_dirty(source, true);
        scene.evaluate(source).unwrap();
        assert_eq!(computes.get(), 2);
    }

    #[test]
    fn test_pull_resolves_whole_upstream_chain() {
        let mut scene = Scene::new();
        let (content, _) = CountingSource::new(1.0);
        let source = scene.add_node(Box::new(content));
        let a = scene.add_node(Box::new(AddOne::new()));
        let b = scene.add_node(Box::new(AddOne::new()));
        wire(&mut scene, source, a);
        wire(&mut scene, a, b);

        let value = scene.evaluate(b).unwrap();
        assert_eq!(value, Some(OutputValue::Single(Payload::Number(3.0))));
        for id in [source, a, b] {
            let node = scene.node(id).unwrap();
            assert!(!node.is_dirty());
            assert!(!node.is_invalid());
        }
    }

    #[test]
    fn test_mark_descendants_dirty_reaches_chain_and_diamond() {
        let mut scene = Scene::new();
        let (content, _) = CountingSource::new(1.0);
        let a = scene.add_node(Box::new(content));
        let b = scene.add_node(Box::new(AddOne::new()));
        let c = scene.add_node(Box::new(AddOne::new()));
        wire(&mut scene, a, b);
        wire(&mut scene, b, c);

        scene.evaluate_all();
        assert!(!scene.node(c).unwrap().is_dirty());

        scene.mark_descendants_dirty(a, true).unwrap();
        assert!(!scene.node(a).unwrap().is_dirty());
        assert!(scene.node(b).unwrap().is_dirty());
        assert!(scene.node(c).unwrap().is_dirty());
    }

    #[derive(Debug)]
    struct Join {
        computes: Rc<Cell<usize>>,
    }

    impl NodeContent for Join {
        fn op_code(&self) -> &'static str {
            "join"
        }
        fn type_code(&self) -> &'static str {
            "Test"
        }
        fn title(&self) -> &'static str {
            "Join"
        }
        fn input_sockets(&self) -> Vec<SocketType> {
            vec![SocketType::Number, SocketType::Number]
        }
        fn output_sockets(&self) -> Vec<SocketType> {
            vec![SocketType::Number]
        }
        fn compute(&mut self, inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
            self.computes.set(self.computes.get() + 1);
            let mut total = 0.0;
            for slot in inputs {
                match slot {
                    (Some(Payload::Number(n)), _) => total += n,
                    _ => return Err(TransformError::Precondition("Input is not valid".into())),
                }
            }
            Ok(OutputValue::Single(Payload::Number(total)))
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_diamond_marks_shared_descendant() {
        let mut scene = Scene::new();
        let (content, _) = CountingSource::new(1.0);
        let a = scene.add_node(Box::new(content));
        let b = scene.add_node(Box::new(AddOne::new()));
        let c = scene.add_node(Box::new(AddOne::new()));
        let d = scene.add_node(Box::new(Join {
            computes: Rc::new(Cell::new(0)),
        }));
        wire(&mut scene, a, b);
        wire(&mut scene, a, c);
        let d_inputs = scene.node(d).unwrap().input_sockets().to_vec();
        let b_out = scene.node(b).unwrap().output_sockets()[0];
        let c_out = scene.node(c).unwrap().output_sockets()[0];
        scene.connect(b_out, d_inputs[0]).unwrap();
        scene.connect(c_out, d_inputs[1]).unwrap();

        scene.evaluate_all();
        assert_eq!(
            scene.node_output(d),
            Some(&OutputValue::Single(Payload::Number(4.0)))
        );

        scene.mark_descendants_dirty(a, true).unwrap();
        for id in [b, c, d] {
            assert!(scene.node(id).unwrap().is_dirty());
        }
    }

    #[test]
    fn test_mark_children_dirty_stops_at_direct_children() {
        let mut scene = Scene::new();
        let (content, _) = CountingSource::new(1.0);
        let a = scene.add_node(Box::new(content));
        let b = scene.add_node(Box::new(AddOne::new()));
        let c = scene.add_node(Box::new(AddOne::new()));
        wire(&mut scene, a, b);
        wire(&mut scene, b, c);
        scene.evaluate_all();

        scene.mark_children_dirty(a, true);
        assert!(scene.node(b).unwrap().is_dirty());
        assert!(!scene.node(c).unwrap().is_dirty());
    }

    #[test]
    fn test_invalid_masks_cached_output() {
        let mut scene = Scene::new();
        let (content, _) = CountingSource::new(7.0);
        let source = scene.add_node(Box::new(content));
        scene.evaluate(source).unwrap();
        assert!(scene.get_output(source, 0).is_some());

        scene.mark_invalid(source, "broken");
        assert!(!scene.node(source).unwrap().is_dirty());
        assert!(scene.get_output(source, 0).is_none());
        assert!(scene.node_output(source).is_none());
        // the cached value itself is still there, only masked
        assert!(scene.node(source).unwrap().cached_output().is_some());
    }

    #[test]
    fn test_guarded_input_soft_fails_when_unconnected() {
        let mut scene = Scene::new();
        let lonely = scene.add_node(Box::new(AddOne::new()));

        let slot = scene.get_guarded_input(lonely, 0).unwrap();
        assert_eq!(slot, (None, None));
        let node = scene.node(lonely).unwrap();
        assert!(node.is_invalid());
        assert!(!node.error_message().unwrap().is_empty());
    }

    #[test]
    fn test_precondition_failure_does_not_surface() {
        let mut scene = Scene::new();
        let lonely = scene.add_node(Box::new(AddOne::new()));

        let value = scene.evaluate(lonely).unwrap();
        assert!(value.is_none());
        assert!(scene.node(lonely).unwrap().is_invalid());

        let report = scene.evaluate_all();
        assert!(report.is_clean());
    }

    #[test]
    fn test_domain_error_surfaces_but_sweep_continues() {
        let mut scene = Scene::new();
        let bad = scene.add_node(Box::new(Failing { domain: true }));
        let (content, _) = CountingSource::new(2.0);
        let good = scene.add_node(Box::new(content));

        assert!(matches!(
            scene.evaluate(bad),
            Err(EvalError::Transform { .. })
        ));
        assert_eq!(
            scene.node(bad).unwrap().error_message(),
            Some("bad value")
        );

        let report = scene.evaluate_all();
        assert_eq!(report.failures.len(), 1);
        assert!(!scene.node(good).unwrap().is_dirty());
    }

    #[test]
    fn test_internal_error_is_swallowed() {
        let mut scene = Scene::new();
        let bad = scene.add_node(Box::new(Failing { domain: false }));

        let value = scene.evaluate(bad).unwrap();
        assert!(value.is_none());
        assert!(scene.node(bad).unwrap().is_invalid());

        let report = scene.evaluate_all();
        assert!(report.is_clean());
    }

    #[test]
    fn test_cycle_detected_during_evaluation() {
        let mut scene = Scene::new();
        let a = scene.add_node(Box::new(AddOne::new()));
        let b = scene.add_node(Box::new(AddOne::new()));
        wire(&mut scene, a, b);
        wire(&mut scene, b, a);

        assert!(matches!(
            scene.evaluate(a),
            Err(EvalError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_cycle_detected_during_propagation() {
        let mut scene = Scene::new();
        let a = scene.add_node(Box::new(AddOne::new()));
        let b = scene.add_node(Box::new(AddOne::new()));
        wire(&mut scene, a, b);
        wire(&mut scene, b, a);

        assert!(matches!(
            scene.mark_descendants_dirty(a, true),
            Err(EvalError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_success_clears_stale_invalid_downstream() {
        let mut scene = Scene::new();
        let (content, _) = CountingSource::new(1.0);
        let source = scene.add_node(Box::new(content));
        let a = scene.add_node(Box::new(AddOne::new()));
        wire(&mut scene, source, a);
        scene.evaluate_all();

        scene.mark_invalid(a, "stale failure");
        scene.mark_dirty(source, true);
        scene.evaluate(source).unwrap();
        assert!(!scene.node(a).unwrap().is_invalid());
    }

    #[test]
    fn test_changed_output_marks_children_dirty() {
        let mut scene = Scene::new();
        let (content, _) = CountingSource::new(1.0);
        let source = scene.add_node(Box::new(content));
        let a = scene.add_node(Box::new(AddOne::new()));
        wire(&mut scene, source, a);
        scene.evaluate_all();
        assert!(!scene.node(a).unwrap().is_dirty());

        // change the source's data behind the engine's back, then only mark
        // the source itself dirty: recomputation notices the changed output
        // and stales the direct consumer
        let node = scene.node_mut(source).unwrap();
        node.content
            .as_any_mut()
            .downcast_mut::<CountingSource>()
            .unwrap()
            .value = 9.0;
        scene.mark_dirty(source, true);

        scene.evaluate(source).unwrap();
        assert!(scene.node(a).unwrap().is_dirty());

        // unchanged recomputation leaves the consumer clean
        scene.evaluate(a).unwrap();
        scene.mark_dirty(source, true);
        scene.evaluate(source).unwrap();
        assert!(!scene.node(a).unwrap().is_dirty());
    }

    #[test]
    fn test_sweep_resolves_reverse_insertion_order() {
        let mut scene = Scene::new();
        // downstream nodes inserted before their source
        let b = scene.add_node(Box::new(AddOne::new()));
        let a = scene.add_node(Box::new(AddOne::new()));
        let (content, computes) = CountingSource::new(1.0);
        let source = scene.add_node(Box::new(content));
        wire(&mut scene, source, a);
        wire(&mut scene, a, b);

        let report = scene.evaluate_all();
        assert!(report.is_clean());
        assert_eq!(computes.get(), 1);
        assert_eq!(
            scene.node_output(b),
            Some(&OutputValue::Single(Payload::Number(3.0)))
        );
    }

    #[test]
    fn test_evaluate_unknown_node() {
        let mut scene = Scene::new();
        assert!(matches!(
            scene.evaluate(NodeId::new()),
            Err(EvalError::NodeNotFound(_))
        ));
    }
}
