//! Sequential execution of a compiled operation queue.

use super::{Operation, OperationResult, QueueContext};
use crate::error::CliResult;
use crate::parameter::{ParameterName, ParameterPool};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    NotStarted,
    Running,
    Completed,
    Aborted,
}

/// Ordered operations for one command invocation.
///
/// Execution is strictly sequential. The first failing operation aborts the
/// queue: its result is never recorded, later operations never run, and the
/// error propagates to the caller untouched.
pub struct OperationQueue {
    operations: Vec<Box<dyn Operation>>,
    state: QueueState,
}

impl Default for OperationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationQueue {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            state: QueueState::NotStarted,
        }
    }

    pub fn add(&mut self, operation: Box<dyn Operation>) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn operation_names(&self) -> Vec<&'static str> {
        self.operations.iter().map(|op| op.name()).collect()
    }

    /// Union of every operation's current input set. Recomputed on each
    /// call, never cached, because input sets can grow during execution.
    pub fn required_parameters(&self) -> BTreeSet<ParameterName> {
        let mut required = BTreeSet::new();
        for operation in &self.operations {
            required.extend(operation.input_parameters().iter().copied());
        }
        required
    }

    /// Run every operation in order, appending each success to `results`.
    pub fn run(
        &mut self,
        pool: &mut ParameterPool,
        results: &mut Vec<OperationResult>,
    ) -> CliResult<()> {
        self.state = QueueState::Running;
        for index in 0..self.operations.len() {
            let mut others = BTreeSet::new();
            for (other_index, operation) in self.operations.iter().enumerate() {
                if other_index != index {
                    others.extend(operation.input_parameters().iter().copied());
                }
            }
            let context = QueueContext::new(others);

            let operation = &mut self.operations[index];
            log::info!("Running operation \"{}\".", operation.name());
            match operation.execute(pool, &context) {
                Ok(result) => results.push(result),
                Err(err) => {
                    self.state = QueueState::Aborted;
                    return Err(err);
                }
            }
        }
        self.state = QueueState::Completed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use crate::operation::input_set;
    use crate::parameter::{Parameter, ParameterSource};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingOperation {
        name: &'static str,
        inputs: BTreeSet<ParameterName>,
        log: Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    }

    impl Operation for RecordingOperation {
        fn name(&self) -> &'static str {
            self.name
        }

        fn input_parameters(&self) -> &BTreeSet<ParameterName> {
            &self.inputs
        }

        fn execute(
            &mut self,
            _pool: &mut ParameterPool,
            _context: &QueueContext,
        ) -> CliResult<OperationResult> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                return Err(CliError::OperationFailed(format!("{} failed", self.name)));
            }
            Ok(OperationResult::new(self.name))
        }
    }

    fn recording(
        name: &'static str,
        inputs: &[ParameterName],
        log: &Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    ) -> Box<RecordingOperation> {
        Box::new(RecordingOperation {
            name,
            inputs: input_set(inputs),
            log: Rc::clone(log),
            fail,
        })
    }

    #[test]
    fn runs_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = OperationQueue::new();
        queue.add(recording("first", &[], &log, false));
        queue.add(recording("second", &[], &log, false));
        queue.add(recording("third", &[], &log, false));

        let mut pool = ParameterPool::new();
        let mut results = Vec::new();
        queue.run(&mut pool, &mut results).expect("all succeed");

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
        assert_eq!(results.len(), 3);
        assert_eq!(queue.state(), QueueState::Completed);
    }

    #[test]
    fn failure_aborts_without_recording_the_failing_result() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = OperationQueue::new();
        queue.add(recording("first", &[], &log, false));
        queue.add(recording("second", &[], &log, true));
        queue.add(recording("third", &[], &log, false));

        let mut pool = ParameterPool::new();
        let mut results = Vec::new();
        let err = queue.run(&mut pool, &mut results).expect_err("second fails");

        assert!(matches!(err, CliError::OperationFailed(_)));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(results.len(), 1);
        assert_eq!(queue.state(), QueueState::Aborted);
    }

    #[test]
    fn required_parameters_is_the_union_of_inputs() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = OperationQueue::new();
        queue.add(recording(
            "a",
            &[ParameterName::Region, ParameterName::ApplicationName],
            &log,
            false,
        ));
        queue.add(recording(
            "b",
            &[ParameterName::Region, ParameterName::EnvironmentName],
            &log,
            false,
        ));

        let required = queue.required_parameters();
        assert_eq!(
            required,
            input_set(&[
                ParameterName::Region,
                ParameterName::ApplicationName,
                ParameterName::EnvironmentName,
            ])
        );
    }

    struct GrowingOperation {
        inputs: BTreeSet<ParameterName>,
        seen: Rc<RefCell<BTreeSet<ParameterName>>>,
    }

    impl Operation for GrowingOperation {
        fn name(&self) -> &'static str {
            "growing"
        }

        fn input_parameters(&self) -> &BTreeSet<ParameterName> {
            &self.inputs
        }

        fn execute(
            &mut self,
            _pool: &mut ParameterPool,
            context: &QueueContext,
        ) -> CliResult<OperationResult> {
            self.inputs.insert(ParameterName::DatabaseMasterPassword);
            *self.seen.borrow_mut() = context.required_with(&self.inputs);
            Ok(OperationResult::new("growing"))
        }
    }

    #[test]
    fn requirement_growth_is_visible_in_the_same_step() {
        let seen = Rc::new(RefCell::new(BTreeSet::new()));
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = OperationQueue::new();
        queue.add(Box::new(GrowingOperation {
            inputs: input_set(&[ParameterName::Region]),
            seen: Rc::clone(&seen),
        }));
        queue.add(recording("later", &[ParameterName::ApplicationName], &log, false));

        let mut pool = ParameterPool::new();
        pool.put(
            Parameter::new(ParameterName::Region, "us-east-1", ParameterSource::Default),
            false,
        );
        let mut results = Vec::new();
        queue.run(&mut pool, &mut results).expect("queue runs");

        let seen = seen.borrow();
        assert!(seen.contains(&ParameterName::DatabaseMasterPassword));
        assert!(seen.contains(&ParameterName::ApplicationName));
        assert!(seen.contains(&ParameterName::Region));

        // The queue-level view reflects the growth too.
        assert!(queue
            .required_parameters()
            .contains(&ParameterName::DatabaseMasterPassword));
    }
}
