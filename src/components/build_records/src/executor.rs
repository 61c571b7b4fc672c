/*
    ==================  components/build_records/src/executor.rs  ==================
    Computes every member table using a pool of workers.

    A type is only queued once the table of its base type is published, so
    workers never wait on each other for a table that is still being built.
    ---------------------------------------------------------------------------
*/

use crate::RecordCtx;
use asg::TypeRef;
use compiler::Cancelled;
use std::{
    collections::{HashMap, VecDeque},
    sync::{Condvar, Mutex},
    thread,
};

pub struct Executor<'c, 'a> {
    ctx: &'c RecordCtx<'a>,
    truth: Mutex<Truth>,
    wake: Condvar,
}

#[derive(Debug, Default)]
struct Truth {
    queue: VecDeque<TypeRef>,
    dependents: HashMap<TypeRef, Vec<TypeRef>>,
    remaining: usize,
    cancelled: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExecutorStats {
    pub num_completed: usize,
    pub num_workers: usize,
}

impl<'c, 'a> Executor<'c, 'a> {
    pub fn new(ctx: &'c RecordCtx<'a>) -> Self {
        let mut truth = Truth::default();

        for (ty, symbol) in ctx.asg.types.iter() {
            truth.remaining += 1;

            match symbol.base.filter(|_| !symbol.in_cycle) {
                Some(base) => truth.dependents.entry(base).or_default().push(ty),
                None => truth.queue.push_back(ty),
            }
        }

        Self {
            ctx,
            truth: Mutex::new(truth),
            wake: Condvar::new(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn start(self) -> Result<ExecutorStats, Cancelled> {
        let total = self.truth.lock().unwrap().remaining;

        let num_workers = self
            .ctx
            .options
            .available_parallelism
            .get()
            .min(total)
            .max(1);

        if num_workers == 1 {
            self.work();
        } else {
            thread::scope(|scope| {
                for _ in 0..num_workers {
                    scope.spawn(|| self.work());
                }
            });
        }

        let truth = self.truth.into_inner().unwrap();

        if truth.cancelled {
            return Err(Cancelled);
        }

        let stats = ExecutorStats {
            num_completed: total - truth.remaining,
            num_workers,
        };

        tracing::debug!(?stats, "member tables published");
        Ok(stats)
    }

    fn work(&self) {
        let mut guard = self.truth.lock().unwrap();

        loop {
            let ty = loop {
                if guard.cancelled || guard.remaining == 0 {
                    return;
                }

                if let Some(ty) = guard.queue.pop_front() {
                    break ty;
                }

                guard = self.wake.wait(guard).unwrap();
            };

            drop(guard);
            let result = self.ctx.members(ty).map(|_| ());
            guard = self.truth.lock().unwrap();

            match result {
                Ok(()) => {
                    guard.remaining -= 1;

                    if let Some(dependents) = guard.dependents.remove(&ty) {
                        guard.queue.extend(dependents);
                    }
                }
                Err(Cancelled) => guard.cancelled = true,
            }

            self.wake.notify_all();
        }
    }
}
