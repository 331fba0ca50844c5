// Rewrite Pass Infrastructure

use crate::core::error::Result;
use crate::ir::{make_reduction_notation, verify_concrete, Assignment, IndexStmt};
use crate::rewriter::default::IndexNotationRewriter;
use crate::rewriter::strict::IndexNotationRewriterStrict;

/// A transformation of index notation statements
pub trait RewritePass {
    /// Run the pass on a statement
    /// Returns the input handle when nothing changed
    fn run(&mut self, stmt: &IndexStmt) -> Result<IndexStmt>;

    /// Get pass name
    fn name(&self) -> &str;
}

/// Pass manager for running multiple passes in order
pub struct PassManager {
    passes: Vec<Box<dyn RewritePass>>,
    verify: bool,
}

impl PassManager {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            verify: false,
        }
    }

    /// Pass manager that checks the statement after every pass
    pub fn with_verification() -> Self {
        Self {
            verify: true,
            ..Self::new()
        }
    }

    pub fn set_verify(&mut self, verify: bool) -> &mut Self {
        self.verify = verify;
        self
    }

    pub fn add_pass(&mut self, pass: Box<dyn RewritePass>) {
        self.passes.push(pass);
    }

    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    pub fn run_all(&mut self, stmt: &IndexStmt) -> Result<IndexStmt> {
        let mut current = stmt.clone();
        for pass in &mut self.passes {
            log::debug!("Running rewrite pass: {}", pass.name());
            let next = pass.run(&current)?;
            if next.ptr_eq(&current) {
                log::trace!("Pass '{}' made no changes", pass.name());
            } else {
                log::debug!("Pass '{}' rewrote the statement to {}", pass.name(), next);
            }
            if self.verify {
                verify_concrete(&next)?;
            }
            current = next;
        }
        Ok(current)
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Makes implicit summations explicit in every plain assignment
pub struct ReductionNotationPass;

impl ReductionNotationPass {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReductionNotationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexNotationRewriter for ReductionNotationPass {
    fn rewrite_assignment(&mut self, _op: &Assignment, stmt: &IndexStmt) -> IndexStmt {
        make_reduction_notation(stmt)
    }
}

impl RewritePass for ReductionNotationPass {
    fn run(&mut self, stmt: &IndexStmt) -> Result<IndexStmt> {
        Ok(self.rewrite_stmt(stmt))
    }

    fn name(&self) -> &str {
        "reduction-notation"
    }
}
