/*
    ==============================  records/lib.rs  ==============================
    Entry point for record member synthesis

    Declarations are bound into an `Asg` first, then every type's member table
    is resolved, synthesized and validated in parallel. The resulting
    `Compilation` answers member table queries, binds `with` expressions and
    hands out interpreters for the synthesized bodies.
    ------------------------------------------------------------------------------
*/

use asg::{Asg, MemberKey, MemberTable, ResolutionOutcome, SlotKind, Type};
use ast::{AstFile, MemberInit};
pub use bind_with::{BindError, BindErrorKind, BoundWith, WithScope};
use build_records::{ExecutorStats, RecordCtx};
use compiler::{BuildOptions, CancellationToken, Cancelled};
use diagnostics::Diagnostics;
pub use interpret::{InterpretError, Interpreter, Value};
use source_files::SourceFiles;

/// Binds the declarations of `file`, reporting declaration errors
pub fn declare<'a>(file: &AstFile, source_files: &'a SourceFiles, diagnostics: &Diagnostics<'a>) -> Asg<'a> {
    build_asg::build_asg(file, source_files, diagnostics)
}

pub fn compile<'a>(
    asg: &'a Asg<'a>,
    diagnostics: &'a Diagnostics<'a>,
    options: &'a BuildOptions,
) -> Result<Compilation<'a>, Cancelled> {
    compile_cancellable(asg, diagnostics, options, CancellationToken::new())
}

/// Resolves every member table. Once `cancellation` fires no further table is
/// published and the whole compilation is abandoned.
pub fn compile_cancellable<'a>(
    asg: &'a Asg<'a>,
    diagnostics: &'a Diagnostics<'a>,
    options: &'a BuildOptions,
    cancellation: CancellationToken,
) -> Result<Compilation<'a>, Cancelled> {
    let ctx = RecordCtx::new(asg, diagnostics, options).with_cancellation(cancellation);
    let stats = build_records::build_records(&ctx)?;

    tracing::debug!(
        completed = stats.num_completed,
        errors = diagnostics.num_errors(),
        warnings = diagnostics.num_warnings(),
        "compiled"
    );

    Ok(Compilation { ctx, stats })
}

pub struct Compilation<'a> {
    ctx: RecordCtx<'a>,
    stats: ExecutorStats,
}

impl<'a> Compilation<'a> {
    pub fn asg(&self) -> &'a Asg<'a> {
        self.ctx.asg
    }

    pub fn ctx(&self) -> &RecordCtx<'a> {
        &self.ctx
    }

    pub fn stats(&self) -> &ExecutorStats {
        &self.stats
    }

    pub fn diagnostics(&self) -> &'a Diagnostics<'a> {
        self.ctx.diagnostics
    }

    pub fn table(&self, type_name: &str) -> Option<&MemberTable> {
        self.ctx.published(self.ctx.asg.lookup(type_name)?)
    }

    pub fn outcome(&self, type_name: &str, slot: SlotKind) -> Option<&ResolutionOutcome> {
        self.table(type_name)?.outcome(slot)
    }

    /// Member filling `slot` of `type_name`, if one exists
    pub fn slot_member(&self, type_name: &str, slot: SlotKind) -> Option<MemberKey> {
        self.table(type_name)?.slot_member(slot)
    }

    pub fn bind_with(
        &self,
        receiver_type: &Type,
        inits: &[MemberInit],
        scope: WithScope,
    ) -> Result<BoundWith, BindError> {
        bind_with::bind_with(&self.ctx, receiver_type, inits, scope)
    }

    pub fn interpreter(&self) -> Interpreter<'_, 'a> {
        Interpreter::new(&self.ctx, None)
    }

    /// Interpreter that gives up after `max_steps` statements and calls
    pub fn bounded_interpreter(&self, max_steps: u64) -> Interpreter<'_, 'a> {
        Interpreter::new(&self.ctx, Some(max_steps))
    }
}
